use crate::capability::PermissionSet;
use crate::secret::Secret;

/// Metadata about an incoming request.
///
/// Contains the request identifier and the credential presented by the
/// caller, if any. The credential is resolved into a [`Principal`] once per
/// request and the result is passed along explicitly.
#[derive(Debug)]
pub struct RequestMeta {
    /// Unique identifier for this request
    pub request_id: String,
    /// Opaque bearer credential, if one was presented
    pub credential: Option<Secret<String>>,
}

/// A resolved caller: identity plus capabilities.
///
/// Immutable for the lifetime of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Unique identifier for this principal
    pub id: String,
    /// Display name
    pub name: String,
    /// Resource → action grants
    pub permissions: PermissionSet,
}

impl Principal {
    /// Creates a principal.
    pub fn new(id: impl Into<String>, name: impl Into<String>, permissions: PermissionSet) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            permissions,
        }
    }

    /// Admin-equivalent status: wildcard on every resource.
    pub fn is_admin(&self) -> bool {
        self.permissions.is_unrestricted()
    }
}
