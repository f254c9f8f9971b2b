//! Type-state markers for context progression.
//!
//! These zero-sized types encode at compile time whether a
//! [`Ctx`](crate::Ctx) has a resolved principal and whether its
//! permissions have been checked.

/// Marker for a context whose credential has not been resolved.
#[derive(Debug, Clone, Copy)]
pub struct Unauthed {
    _private: (),
}

/// Marker for a context with a resolved principal but no checked permissions.
#[derive(Debug, Clone, Copy)]
pub struct Authed {
    _private: (),
}

/// Marker for a context whose required permissions were all granted.
///
/// Only this state may touch the data layer.
#[derive(Debug, Clone, Copy)]
pub struct Authorized {
    _private: (),
}
