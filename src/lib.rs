//! Capability-checked, paginated, view-projected JSON API core for clients
//! and their projects.
//!
//! Every request goes through the same pipeline:
//! - **Resolve**: the bearer credential becomes a [`Principal`] through a
//!   fixed [`CredentialTable`], or the request stops with 401
//! - **Authorize**: [`PolicyGate`] checks each `(resource, action)` the
//!   operation needs against the principal's [`PermissionSet`], or stops
//!   with 403, before any data is read
//! - **Paginate**: the [`Paginator`](pagination::Paginator) turns untrusted
//!   `page`/`per_page` into a bounded, creation-ordered slice
//! - **Project**: the [`Projector`](projection::Projector) renders entities
//!   through the view registered for the response root
//!
//! The principal travels in the request's [`Ctx`]; nothing is looked up from
//! ambient state.
//!
//! # Core Types
//!
//! - [`Secret<T>`]: redacts credential material in `Debug`/`Display`
//! - [`Tainted<T>`]: untrusted input that must pass a [`Sanitizer`]
//! - [`Ctx`]: per-request context, typed by authorization state
//! - [`PolicyGate`]: the only way to an authorized context
//! - [`ApiError`]: the error taxonomy and its HTTP mapping
//!
//! # Examples
//!
//! ```
//! use client_projects::web::{Api, RequestAdapter};
//! use client_projects::{Secret, Settings};
//!
//! let api = Api::new(&Settings {
//!     full_permission_token: Some(Secret::new("full".to_string())),
//!     no_permission_token: Some(Secret::new("none".to_string())),
//!     ..Settings::default()
//! });
//!
//! let mut request = RequestAdapter::new("req-1".to_string());
//! request.add_query_param("token".to_string(), "none".to_string());
//!
//! let response = api.clients_index(&request);
//! assert_eq!(response.status, 403);
//! assert_eq!(response.body["error"], "403 Forbidden");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod authorizer;
mod capability;
mod config;
mod context;
mod error;
mod gate;
mod logging;
mod model;
pub mod pagination;
mod policy;
pub mod projection;
mod request;
mod resolver;
mod sanitizer;
mod secret;
pub mod state;
mod status;
pub mod store;
mod tainted;
mod verified;
pub mod web;

pub use self::config::{Settings, SettingsError};
pub use authorizer::{authorize, Decision};
pub use capability::{Action, Grant, PermissionSet, Resource, UnknownName};
pub use context::Ctx;
pub use error::ApiError;
pub use gate::PolicyGate;
pub use logging::RequestLog;
pub use model::{Client, Entity, FieldValue, Project};
pub use policy::{Authorized, PolicyReq};
pub use request::{Principal, RequestMeta};
pub use resolver::{CredentialTable, Resolution};
pub use sanitizer::{
    IntegerSanitizer, NameSanitizer, SanitizationError, SanitizationErrorKind, Sanitizer,
};
pub use secret::Secret;
pub use status::{ProjectStatus, StatusSanitizer};
pub use tainted::Tainted;
pub use verified::Verified;
