use std::marker::PhantomData;

use crate::capability::{Action, Resource};
use crate::error::ApiError;
use crate::gate::PolicyGate;
use crate::logging::RequestLog;
use crate::policy::Authorized as Permission;
use crate::request::Principal;
use crate::resolver::Resolution;
use crate::state::{Authed, Authorized, Unauthed};

/// Per-request execution context.
///
/// `Ctx<S>` is generic over its authentication/authorization state:
/// - `Ctx<Unauthed>`: credential not yet resolved
/// - `Ctx<Authed>`: principal resolved, no permission checked
/// - `Ctx<Authorized>`: principal resolved and every required permission granted
///
/// ```text
/// Ctx<Unauthed> --authenticate--> Ctx<Authed> --PolicyGate::build--> Ctx<Authorized>
/// ```
///
/// The principal lives here and nowhere else: handlers receive it through the
/// context instead of looking it up from ambient state.
///
/// `Ctx` cannot be constructed outside this crate; the web middleware creates
/// `Ctx<Unauthed>` and the state transitions do the rest.
#[derive(Debug, Clone)]
pub struct Ctx<S = Authorized> {
    request_id: String,
    principal: Option<Principal>,
    grants: Vec<(Resource, Action)>,
    _state: PhantomData<S>,
}

// ============================================================================
// Shared methods (available on all states)
// ============================================================================

impl<S> Ctx<S> {
    /// Returns the request ID for this context.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the principal if present.
    ///
    /// Always `Some` for `Ctx<Authed>` and `Ctx<Authorized>`.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Admin-equivalent status of the principal (false when unresolved).
    pub fn is_admin(&self) -> bool {
        self.principal.as_ref().is_some_and(Principal::is_admin)
    }

    /// Request-scoped logger.
    pub fn log(&self) -> RequestLog<'_> {
        RequestLog::new(
            &self.request_id,
            self.principal.as_ref().map(|p| p.id.as_str()),
        )
    }

    fn transition<T>(self, grants: Vec<(Resource, Action)>) -> Ctx<T> {
        Ctx {
            request_id: self.request_id,
            principal: self.principal,
            grants,
            _state: PhantomData,
        }
    }
}

// ============================================================================
// Ctx<Unauthed> - Initial state
// ============================================================================

impl Ctx<Unauthed> {
    pub(crate) fn new_unauthed(request_id: String) -> Self {
        Self {
            request_id,
            principal: None,
            grants: Vec::new(),
            _state: PhantomData,
        }
    }

    /// Attaches the resolved principal.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthenticated`] if resolution failed.
    pub fn authenticate(mut self, resolution: Resolution) -> Result<Ctx<Authed>, ApiError> {
        match resolution {
            Resolution::Authenticated(principal) => {
                tracing::debug!(
                    request_id = %self.request_id,
                    principal = %principal.id,
                    "credential resolved"
                );
                self.principal = Some(principal);
                Ok(self.transition(Vec::new()))
            }
            Resolution::Unauthenticated => {
                tracing::warn!(request_id = %self.request_id, "missing or unknown credential");
                Err(ApiError::Unauthenticated)
            }
        }
    }
}

// ============================================================================
// Ctx<Authed> - Authenticated but not authorized
// ============================================================================

impl Ctx<Authed> {
    /// Checks a single permission. Shorthand for a one-requirement
    /// [`PolicyGate`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] if the permission is not granted.
    pub fn authorize(
        self,
        resource: Resource,
        action: Action,
    ) -> Result<Ctx<Authorized>, ApiError> {
        PolicyGate::new(self)
            .require(Permission::to(resource, action))
            .build()
    }

    pub(crate) fn into_authorized(self, grants: Vec<(Resource, Action)>) -> Ctx<Authorized> {
        self.transition(grants)
    }
}

// ============================================================================
// Ctx<Authorized> - Every required permission granted
// ============================================================================

impl Ctx<Authorized> {
    /// Permissions that were checked and granted, in check order.
    pub fn grants(&self) -> &[(Resource, Action)] {
        &self.grants
    }

    /// True if `(resource, action)` was checked and granted for this request.
    pub fn is_granted(&self, resource: Resource, action: Action) -> bool {
        self.grants.contains(&(resource, action))
    }
}
