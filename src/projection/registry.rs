use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;

use crate::error::ApiError;
use crate::model::{Entity, FieldValue};
use crate::status::ProjectStatus;

use super::view::{FieldExtractor, ViewDefinition};
use super::EXPOSE_CLIENT;

static STANDARD: OnceLock<ViewRegistry> = OnceLock::new();

/// Root name → view definition.
///
/// Read-only once built. The standard registry is built on first use and
/// shared by every request.
#[derive(Debug, Clone, Default)]
pub struct ViewRegistry {
    views: HashMap<&'static str, ViewDefinition>,
}

impl ViewRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `view` under its root, replacing any previous definition.
    pub fn register(mut self, view: ViewDefinition) -> Self {
        self.views.insert(view.root(), view);
        self
    }

    /// The `clients` and `projects` views.
    pub fn standard() -> &'static ViewRegistry {
        STANDARD.get_or_init(|| {
            ViewRegistry::new()
                .register(
                    ViewDefinition::new("clients")
                        .direct("name")
                        .direct("id")
                        .direct("created_at")
                        .direct("updated_at"),
                )
                .register(
                    ViewDefinition::new("projects")
                        .direct("name")
                        .direct("id")
                        .direct("project_status_id")
                        .computed("project_status", project_status_name)
                        .nested("client", "client", EXPOSE_CLIENT, "clients")
                        .direct("created_at")
                        .direct("updated_at"),
                )
                .checked()
        })
    }

    /// Runs [`ViewRegistry::validate`] once, at build time.
    ///
    /// A dangling reference is logged at `error`; requests that render the
    /// broken view still fail with a configuration fault.
    fn checked(self) -> Self {
        if let Err(err) = self.validate() {
            tracing::error!(error = %err, "view registry is inconsistent");
        }
        self
    }

    /// Looks up the view for `root`.
    ///
    /// # Errors
    ///
    /// [`ApiError::ConfigurationFault`] for an unregistered root.
    pub fn get(&self, root: &str) -> Result<&ViewDefinition, ApiError> {
        self.views
            .get(root)
            .ok_or_else(|| ApiError::ConfigurationFault(format!("unknown view root '{}'", root)))
    }

    /// Checks that every nested field points at a registered view.
    ///
    /// # Errors
    ///
    /// [`ApiError::ConfigurationFault`] naming the first dangling reference.
    pub fn validate(&self) -> Result<(), ApiError> {
        for view in self.views.values() {
            for field in view.fields() {
                if let FieldExtractor::Nested { name, view: nested, .. } = field {
                    if !self.views.contains_key(nested) {
                        return Err(ApiError::ConfigurationFault(format!(
                            "view '{}' field '{}' references unknown view '{}'",
                            view.root(),
                            name,
                            nested
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Display name of the project's status.
///
/// An id outside the registry is a data-integrity fault.
fn project_status_name(entity: &dyn Entity) -> Result<Value, ApiError> {
    match entity.read("project_status_id") {
        Some(FieldValue::Integer(id)) => ProjectStatus::find(id)
            .map(|status| Value::from(status.name()))
            .ok_or_else(|| {
                ApiError::ConfigurationFault(format!("unknown project status id {}", id))
            }),
        other => Err(ApiError::ConfigurationFault(format!(
            "project_status_id is not an integer: {:?}",
            other
        ))),
    }
}
