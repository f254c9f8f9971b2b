//! Credential → principal resolution.

use std::collections::HashMap;
use std::fmt;

use crate::capability::PermissionSet;
use crate::request::Principal;
use crate::secret::Secret;

/// Outcome of resolving a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The credential matched a binding.
    Authenticated(Principal),
    /// No credential, or one that matched nothing.
    Unauthenticated,
}

impl Resolution {
    /// The principal, if resolution succeeded.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Resolution::Authenticated(p) => Some(p),
            Resolution::Unauthenticated => None,
        }
    }

    /// Converts into the principal, if any.
    pub fn into_principal(self) -> Option<Principal> {
        match self {
            Resolution::Authenticated(p) => Some(p),
            Resolution::Unauthenticated => None,
        }
    }
}

/// Fixed table of credential → principal bindings.
///
/// Built once at startup and only read afterwards, so it can be shared across
/// threads without synchronization. `Debug` lists principals, never tokens.
///
/// # Examples
///
/// ```
/// use client_projects::{CredentialTable, PermissionSet, Principal, Resolution, Secret};
///
/// let table = CredentialTable::new().bind(
///     Secret::new("t0k3n".to_string()),
///     Principal::new("ops", "Operations", PermissionSet::full_access()),
/// );
///
/// let presented = Secret::new("t0k3n".to_string());
/// assert!(matches!(table.resolve(Some(&presented)), Resolution::Authenticated(_)));
/// assert_eq!(table.resolve(None), Resolution::Unauthenticated);
/// ```
#[derive(Default)]
pub struct CredentialTable {
    bindings: HashMap<String, Principal>,
}

impl CredentialTable {
    /// An empty table; every credential resolves to `Unauthenticated`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `credential` to `principal`.
    ///
    /// Empty credentials are ignored so that an unset token can never match
    /// an empty one presented by a caller.
    pub fn bind(mut self, credential: Secret<String>, principal: Principal) -> Self {
        let token = credential.expose_secret();
        if !token.is_empty() {
            self.bindings.insert(token.clone(), principal);
        }
        self
    }

    /// The three reference bindings: full access, no access, read-only.
    ///
    /// Any token passed as `None` binds nothing.
    pub fn reference(
        full_access: Option<Secret<String>>,
        no_access: Option<Secret<String>>,
        read_only: Option<Secret<String>>,
    ) -> Self {
        let bindings = [
            (
                full_access,
                Principal::new("full-access", "Full Access", PermissionSet::full_access()),
            ),
            (
                no_access,
                Principal::new("no-access", "No Access", PermissionSet::no_access()),
            ),
            (
                read_only,
                Principal::new("read-only", "Read Only", PermissionSet::read_only()),
            ),
        ];

        bindings
            .into_iter()
            .fold(Self::new(), |table, (token, principal)| match token {
                Some(token) => table.bind(token, principal),
                None => table,
            })
    }

    /// Resolves a presented credential. Pure lookup; never fails.
    pub fn resolve(&self, credential: Option<&Secret<String>>) -> Resolution {
        credential
            .map(|c| c.expose_secret())
            .filter(|token| !token.is_empty())
            .and_then(|token| self.bindings.get(token.as_str()))
            .cloned()
            .map_or(Resolution::Unauthenticated, Resolution::Authenticated)
    }

    /// Number of bound credentials.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Debug for CredentialTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.bindings.values().map(|p| p.id.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("CredentialTable")
            .field("principals", &names)
            .finish()
    }
}
