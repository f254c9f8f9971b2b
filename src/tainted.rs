use std::fmt;

/// A wrapper for untrusted request input.
///
/// Query parameters, path parameters, headers and body fields enter the crate
/// as `Tainted<T>`. The only way to use the value is through a
/// [`Sanitizer`](crate::Sanitizer), which either rejects it or promotes it to a
/// [`Verified`](crate::Verified) value.
///
/// # Examples
///
/// ```
/// use client_projects::Tainted;
///
/// let page = Tainted::new("2".to_string());
/// // `page` has no Deref/AsRef; it must be sanitized before use.
/// let _ = page;
/// ```
// Clone is required: the same input may be read by more than one sanitizer.
#[derive(Clone, PartialEq, Eq)]
pub struct Tainted<T> {
    // Must stay private, otherwise sanitizers can be bypassed.
    inner: T,
}

impl<T> Tainted<T> {
    /// Marks a value as untrusted.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Sanitizers consume the raw value here; nothing outside the crate can.
    pub(crate) fn into_inner(self) -> T {
        self.inner
    }
}

// Do NOT add Deref, AsRef, Borrow or From/Into conversions to Tainted<T>.

impl<T: fmt::Debug> fmt::Debug for Tainted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tainted").field("inner", &self.inner).finish()
    }
}
