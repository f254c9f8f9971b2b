//! Builds request contexts from a [`RequestAdapter`].
//!
//! ```text
//! RequestAdapter
//!   ↓ extract_unauthed
//! (Ctx<Unauthed>, TaintedInputs, credential)
//!   ↓ extract_authed: CredentialTable::resolve + Ctx::authenticate
//! (Ctx<Authed>, TaintedInputs)
//!   ↓ PolicyGate::build (handler)
//! Ctx<Authorized>
//! ```
//!
//! Nothing here authorizes; that is the gate's job.

use crate::context::Ctx;
use crate::error::ApiError;
use crate::resolver::CredentialTable;
use crate::secret::Secret;
use crate::state::{Authed, Unauthed};

use super::{ExtractMetadata, ExtractTaintedInputs, RequestAdapter, TaintedInputs};

/// An unauthenticated context, the request's inputs and its credential.
///
/// # Examples
///
/// ```
/// use client_projects::web::{extract_unauthed, RequestAdapter};
///
/// let adapter = RequestAdapter::new("req-001".to_string());
/// let extraction = extract_unauthed(&adapter);
///
/// assert_eq!(extraction.context.request_id(), "req-001");
/// assert!(extraction.context.principal().is_none());
/// assert!(extraction.credential.is_none());
/// ```
#[derive(Debug)]
pub struct UnauthenticatedExtraction {
    /// Context with no principal
    pub context: Ctx<Unauthed>,
    /// Every untrusted input of the request
    pub inputs: TaintedInputs,
    /// The presented credential, not yet resolved
    pub credential: Option<Secret<String>>,
}

/// An authenticated context and the request's inputs.
#[derive(Debug)]
pub struct AuthenticatedExtraction {
    /// Context carrying the resolved principal
    pub context: Ctx<Authed>,
    /// Every untrusted input of the request
    pub inputs: TaintedInputs,
}

/// Builds an unauthenticated context.
pub fn extract_unauthed(adapter: &RequestAdapter) -> UnauthenticatedExtraction {
    let meta = adapter.extract_metadata();

    UnauthenticatedExtraction {
        context: Ctx::new_unauthed(meta.request_id),
        inputs: adapter.extract_tainted_inputs(),
        credential: meta.credential,
    }
}

/// Resolves the request's credential and builds an authenticated context.
///
/// # Errors
///
/// [`ApiError::Unauthenticated`] when no credential was presented or it
/// matches no binding in `credentials`.
///
/// # Examples
///
/// ```
/// use client_projects::web::{extract_authed, RequestAdapter};
/// use client_projects::{ApiError, CredentialTable, Secret};
///
/// let table = CredentialTable::reference(None, None, Some(Secret::new("ro".to_string())));
///
/// let mut adapter = RequestAdapter::new("req-auth".to_string());
/// adapter.add_query_param("token".to_string(), "ro".to_string());
/// let extraction = extract_authed(&adapter, &table).unwrap();
/// assert_eq!(extraction.context.principal().unwrap().id, "read-only");
///
/// let anonymous = RequestAdapter::new("req-anon".to_string());
/// assert_eq!(extract_authed(&anonymous, &table).unwrap_err(), ApiError::Unauthenticated);
/// ```
pub fn extract_authed(
    adapter: &RequestAdapter,
    credentials: &CredentialTable,
) -> Result<AuthenticatedExtraction, ApiError> {
    let UnauthenticatedExtraction {
        context,
        inputs,
        credential,
    } = extract_unauthed(adapter);

    let resolution = credentials.resolve(credential.as_ref());
    let context = context.authenticate(resolution)?;

    Ok(AuthenticatedExtraction { context, inputs })
}
