use crate::capability::{Action, Resource};

/// A policy requirement checked by [`PolicyGate`](crate::PolicyGate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyReq {
    /// Requires `action` on `resource`.
    Authorized {
        /// Resource being touched
        resource: Resource,
        /// Operation on it
        action: Action,
    },
}

/// Policy requiring permission for one action on one resource.
///
/// Requirements are checked in the order they were added, so a nested write
/// lists the parent check first:
///
/// ```
/// use client_projects::{Action, Authorized, Resource};
///
/// let parent = Authorized::to(Resource::Clients, Action::Show);
/// let child = Authorized::to(Resource::Projects, Action::Create);
/// # let _ = (parent, child);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorized {
    resource: Resource,
    action: Action,
}

impl Authorized {
    /// Creates an authorization requirement.
    pub fn to(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }
}

impl From<Authorized> for PolicyReq {
    fn from(auth: Authorized) -> Self {
        PolicyReq::Authorized {
            resource: auth.resource,
            action: auth.action,
        }
    }
}
