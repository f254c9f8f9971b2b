//! Web integration surface.
//!
//! Framework-agnostic boundary between an HTTP layer and the API:
//! - [`RequestAdapter`] holds one request's id, credential and raw inputs
//! - [`extract_unauthed`]/[`extract_authed`] build `Ctx` values, introducing
//!   taint on every input but the credential, which they resolve
//! - [`Api`] holds the handlers; each returns a [`Response`] with a status
//!   code and JSON body
//!
//! No routing and no framework types live here. An integration maps its
//! request into a `RequestAdapter`, calls the handler for the matched route,
//! and writes the `Response` back.
//!
//! ```ignore
//! let adapter = RequestAdapter::from(http_request);
//! let response = match route {
//!     Route::ProjectsIndex => api.projects_index(&adapter),
//!     Route::ClientProjectShow => api.client_project_show(&adapter),
//!     // ...
//! };
//! ```

mod adapter;
mod extract;
mod handlers;
mod middleware;

pub use adapter::{RequestAdapter, TaintedInputs, TOKEN_PARAM};
pub use extract::{ExtractMetadata, ExtractTaintedInputs};
pub use handlers::{Api, Response};
pub use middleware::{
    extract_authed, extract_unauthed, AuthenticatedExtraction, UnauthenticatedExtraction,
};
