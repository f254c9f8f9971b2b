use crate::authorizer::{authorize, Decision};
use crate::context::Ctx;
use crate::error::ApiError;
use crate::policy::PolicyReq;
use crate::state::{Authed, Authorized};

/// The authorization gate.
///
/// `PolicyGate` is the only way to obtain a `Ctx<Authorized>`. It checks
/// every requirement, in the order they were added, before any data is read
/// or written; the first denial stops the request.
///
/// # Examples
///
/// ```
/// use client_projects::web::{extract_authed, RequestAdapter};
/// use client_projects::{Action, Authorized, CredentialTable, PolicyGate, Resource, Secret};
///
/// let table = CredentialTable::reference(Some(Secret::new("full".to_string())), None, None);
///
/// let mut adapter = RequestAdapter::new("req-123".to_string());
/// adapter.add_query_param("token".to_string(), "full".to_string());
/// let extraction = extract_authed(&adapter, &table).expect("known token");
///
/// let ctx = PolicyGate::new(extraction.context)
///     .require(Authorized::to(Resource::Clients, Action::Show))
///     .require(Authorized::to(Resource::Projects, Action::Create))
///     .build()
///     .expect("full access");
///
/// assert!(ctx.is_granted(Resource::Projects, Action::Create));
/// ```
#[derive(Debug)]
pub struct PolicyGate {
    ctx: Ctx<Authed>,
    requirements: Vec<PolicyReq>,
}

impl PolicyGate {
    /// Creates a gate for an authenticated context.
    pub fn new(ctx: Ctx<Authed>) -> Self {
        Self {
            ctx,
            requirements: Vec::new(),
        }
    }

    /// Adds a requirement, ignoring exact duplicates.
    pub fn require(mut self, policy: impl Into<PolicyReq>) -> Self {
        let req = policy.into();

        if !self.requirements.contains(&req) {
            self.requirements.push(req);
        }

        self
    }

    /// Checks every requirement and, if all pass, returns the authorized context.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] for the first denied requirement. The
    /// error does not say which one; the log does.
    pub fn build(self) -> Result<Ctx<Authorized>, ApiError> {
        let Some(principal) = self.ctx.principal() else {
            return Err(ApiError::Unauthenticated);
        };

        let mut grants = Vec::with_capacity(self.requirements.len());

        for req in &self.requirements {
            let PolicyReq::Authorized { resource, action } = *req;

            match authorize(principal, resource, action) {
                Decision::Allowed => {
                    tracing::debug!(
                        request_id = %self.ctx.request_id(),
                        principal = %principal.id,
                        %resource,
                        %action,
                        "permission granted"
                    );
                    grants.push((resource, action));
                }
                Decision::Denied => {
                    tracing::warn!(
                        request_id = %self.ctx.request_id(),
                        principal = %principal.id,
                        %resource,
                        %action,
                        "permission denied"
                    );
                    return Err(ApiError::Forbidden);
                }
            }
        }

        Ok(self.ctx.into_authorized(grants))
    }
}
