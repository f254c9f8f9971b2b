//! Resource/action capabilities.
//!
//! A [`PermissionSet`] maps each [`Resource`] to a [`Grant`]: either the
//! wildcard (every action) or a finite set of [`Action`]s. A resource with no
//! entry behaves like an empty set.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A guarded API resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    /// The `clients` collection
    Clients,
    /// The `projects` collection
    Projects,
}

impl Resource {
    /// Every resource the API knows about.
    pub const ALL: [Resource; 2] = [Resource::Clients, Resource::Projects];

    /// Canonical resource name, as used for view roots and permission keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Clients => "clients",
            Resource::Projects => "projects",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clients" => Ok(Resource::Clients),
            "projects" => Ok(Resource::Projects),
            other => Err(UnknownName(other.to_string())),
        }
    }
}

/// An operation on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// List the collection
    Index,
    /// Read a single entity
    Show,
    /// Create an entity
    Create,
    /// Modify an entity
    Update,
    /// Remove an entity
    Delete,
}

impl Action {
    /// Every action the API knows about.
    pub const ALL: [Action; 5] = [
        Action::Index,
        Action::Show,
        Action::Create,
        Action::Update,
        Action::Delete,
    ];

    /// Canonical action name.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Index => "index",
            Action::Show => "show",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// Returned when parsing an unrecognised resource or action name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown name '{0}'")]
pub struct UnknownName(pub String);

/// Permission on one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    /// Every action is permitted.
    All,
    /// Only the listed actions are permitted. May be empty.
    Only(BTreeSet<Action>),
}

impl Grant {
    /// A grant that permits nothing.
    pub fn none() -> Self {
        Grant::Only(BTreeSet::new())
    }

    /// A grant for exactly the given actions.
    pub fn only(actions: impl IntoIterator<Item = Action>) -> Self {
        Grant::Only(actions.into_iter().collect())
    }

    /// Returns true if `action` is covered by this grant.
    pub fn permits(&self, action: Action) -> bool {
        match self {
            Grant::All => true,
            Grant::Only(actions) => actions.contains(&action),
        }
    }
}

/// Mapping from resource to grant.
///
/// # Examples
///
/// ```
/// use client_projects::{Action, Grant, PermissionSet, Resource};
///
/// let perms = PermissionSet::new()
///     .with(Resource::Projects, Grant::All)
///     .with(Resource::Clients, Grant::only([Action::Show]));
///
/// assert!(perms.grant(Resource::Projects).is_some());
/// assert!(!perms.is_unrestricted());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    grants: BTreeMap<Resource, Grant>,
}

impl PermissionSet {
    /// An empty permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the grant for `resource`, replacing any previous one.
    pub fn with(mut self, resource: Resource, grant: Grant) -> Self {
        self.grants.insert(resource, grant);
        self
    }

    /// Wildcard on every resource.
    pub fn full_access() -> Self {
        Resource::ALL
            .into_iter()
            .fold(Self::new(), |set, r| set.with(r, Grant::All))
    }

    /// Empty action set on every resource.
    pub fn no_access() -> Self {
        Resource::ALL
            .into_iter()
            .fold(Self::new(), |set, r| set.with(r, Grant::none()))
    }

    /// `show` and `index` on every resource.
    pub fn read_only() -> Self {
        Resource::ALL.into_iter().fold(Self::new(), |set, r| {
            set.with(r, Grant::only([Action::Show, Action::Index]))
        })
    }

    /// The grant for `resource`, if one was configured.
    pub fn grant(&self, resource: Resource) -> Option<&Grant> {
        self.grants.get(&resource)
    }

    /// True when every known resource carries the wildcard.
    ///
    /// This is the admin-equivalent status used by list views.
    pub fn is_unrestricted(&self) -> bool {
        Resource::ALL
            .into_iter()
            .all(|r| matches!(self.grant(r), Some(Grant::All)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for r in Resource::ALL {
            assert_eq!(r.as_str().parse::<Resource>().unwrap(), r);
        }
        for a in Action::ALL {
            assert_eq!(a.as_str().parse::<Action>().unwrap(), a);
        }
        assert_eq!(
            "widgets".parse::<Resource>().unwrap_err(),
            UnknownName("widgets".into())
        );
        assert!("destroy".parse::<Action>().is_err());
    }

    #[test]
    fn wildcard_permits_everything() {
        for a in Action::ALL {
            assert!(Grant::All.permits(a));
        }
    }

    #[test]
    fn empty_grant_permits_nothing() {
        for a in Action::ALL {
            assert!(!Grant::none().permits(a));
        }
    }

    #[test]
    fn explicit_grant_permits_members_only() {
        let grant = Grant::only([Action::Show, Action::Index]);

        assert!(grant.permits(Action::Show));
        assert!(grant.permits(Action::Index));
        assert!(!grant.permits(Action::Create));
        assert!(!grant.permits(Action::Delete));
    }

    #[test]
    fn reference_sets_cover_every_resource() {
        for r in Resource::ALL {
            assert_eq!(PermissionSet::full_access().grant(r), Some(&Grant::All));
            assert_eq!(PermissionSet::no_access().grant(r), Some(&Grant::none()));
            assert_eq!(
                PermissionSet::read_only().grant(r),
                Some(&Grant::only([Action::Index, Action::Show]))
            );
        }
    }

    #[test]
    fn only_full_access_is_unrestricted() {
        assert!(PermissionSet::full_access().is_unrestricted());
        assert!(!PermissionSet::read_only().is_unrestricted());
        assert!(!PermissionSet::no_access().is_unrestricted());
        assert!(!PermissionSet::new()
            .with(Resource::Projects, Grant::All)
            .is_unrestricted());
    }
}
