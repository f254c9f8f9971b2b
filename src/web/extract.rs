//! Extraction boundary traits.
//!
//! Framework-specific request types implement these to hand the crate its
//! request metadata and untrusted inputs.

use crate::request::RequestMeta;

use super::TaintedInputs;

/// Extracts request metadata from a framework-specific request.
///
/// Implementations map framework types to [`RequestMeta`] and nothing more:
/// they do not resolve the credential, authorize, or sanitize.
///
/// # Examples
///
/// ```
/// use client_projects::web::ExtractMetadata;
/// use client_projects::{RequestMeta, Secret};
///
/// struct MyFrameworkRequest {
///     request_id: String,
///     api_key: Option<String>,
/// }
///
/// impl ExtractMetadata for MyFrameworkRequest {
///     fn extract_metadata(&self) -> RequestMeta {
///         RequestMeta {
///             request_id: self.request_id.clone(),
///             credential: self.api_key.clone().map(Secret::new),
///         }
///     }
/// }
/// ```
pub trait ExtractMetadata {
    /// Request id plus the presented credential, if any.
    fn extract_metadata(&self) -> RequestMeta;
}

/// Extracts every untrusted input from a framework-specific request.
///
/// All values come back wrapped in `Tainted<T>`.
pub trait ExtractTaintedInputs {
    /// Query, header, path and body inputs.
    fn extract_tainted_inputs(&self) -> TaintedInputs;
}
