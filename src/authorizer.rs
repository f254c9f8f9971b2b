use crate::capability::{Action, Grant, Resource};
use crate::request::Principal;

/// Result of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The principal may perform the action.
    Allowed,
    /// The principal may not perform the action.
    Denied,
}

impl Decision {
    /// True for `Allowed`.
    pub fn is_allowed(self) -> bool {
        self == Decision::Allowed
    }
}

/// Decides whether `principal` may perform `action` on `resource`.
///
/// Wildcard grants allow every action; explicit grants allow their members;
/// a resource without a grant denies everything. Pure function of its inputs.
///
/// # Examples
///
/// ```
/// use client_projects::{authorize, Action, Decision, PermissionSet, Principal, Resource};
///
/// let reader = Principal::new("r", "Reader", PermissionSet::read_only());
/// assert_eq!(authorize(&reader, Resource::Projects, Action::Index), Decision::Allowed);
/// assert_eq!(authorize(&reader, Resource::Projects, Action::Create), Decision::Denied);
/// ```
pub fn authorize(principal: &Principal, resource: Resource, action: Action) -> Decision {
    match principal.permissions.grant(resource) {
        Some(Grant::All) => Decision::Allowed,
        Some(grant) if grant.permits(action) => Decision::Allowed,
        _ => Decision::Denied,
    }
}
