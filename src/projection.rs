//! Response projection.
//!
//! A [`Projector`] renders entities through the [`ViewDefinition`] registered
//! for a root name and wraps them in the `{ "<root>": [...] }` envelope.
//! Single entities go through the same path as one-element slices, so every
//! response has the same shape.
//!
//! ```text
//! root ──ViewRegistry::get──> ViewDefinition
//!                                 │ for each entity, for each extractor (declared order)
//!                                 ├─ Direct   → entity.read(field)
//!                                 ├─ Computed → compute(entity)
//!                                 └─ Nested   → flag set? → render related entity
//! ```

mod registry;
mod view;

use std::collections::BTreeMap;

use serde_json::{Map, Value};

pub use registry::ViewRegistry;
pub use view::{ComputeFn, FieldExtractor, ViewDefinition};

use crate::error::ApiError;
use crate::model::Entity;
use crate::pagination::{Page, PageWindow};

/// Flag gating the nested `client` on project views.
pub const EXPOSE_CLIENT: &str = "expose_client";

/// Named flags consulted by nested extractors. Unset flags read as false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFlags {
    flags: BTreeMap<String, bool>,
}

impl ViewFlags {
    /// No flags set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`.
    pub fn with(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.insert(name.into(), value);
        self
    }

    /// True only if `name` was explicitly set to true.
    pub fn is_set(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }
}

/// Projected entities plus optional pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    root: String,
    items: Vec<Value>,
    window: Option<PageWindow>,
}

impl Projection {
    /// Root key of the envelope.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Rendered entities, in input order.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Pagination used to produce the items, if any.
    pub fn window(&self) -> Option<PageWindow> {
        self.window
    }

    /// Builds the response body.
    ///
    /// `page`/`per_page` are string-encoded, matching how they arrive on the
    /// query string.
    pub fn into_json(self) -> Value {
        let mut body = Map::new();
        body.insert(self.root, Value::Array(self.items));

        if let Some(window) = self.window {
            body.insert("page".to_string(), Value::from(window.page().to_string()));
            body.insert(
                "per_page".to_string(),
                Value::from(window.per_page().to_string()),
            );
        }

        Value::Object(body)
    }
}

/// Renders entities through a [`ViewRegistry`].
///
/// # Examples
///
/// ```
/// use client_projects::projection::{Projector, ViewFlags};
/// use client_projects::Client;
/// use chrono::{TimeZone, Utc};
///
/// let created = Utc.with_ymd_and_hms(2020, 9, 24, 18, 29, 47).unwrap();
/// let client = Client {
///     id: 1,
///     name: "ACME".to_string(),
///     created_at: created,
///     updated_at: created,
/// };
///
/// let body = Projector::standard()
///     .project("clients", std::slice::from_ref(&client), &ViewFlags::new())
///     .unwrap()
///     .into_json();
///
/// assert_eq!(body["clients"][0]["name"], "ACME");
/// assert_eq!(body["clients"][0]["created_at"], "2020-09-24T18:29:47Z");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Projector<'r> {
    registry: &'r ViewRegistry,
}

impl Projector<'static> {
    /// Projector over [`ViewRegistry::standard`].
    pub fn standard() -> Self {
        Self::new(ViewRegistry::standard())
    }
}

impl<'r> Projector<'r> {
    /// Projector over a custom registry.
    pub fn new(registry: &'r ViewRegistry) -> Self {
        Self { registry }
    }

    /// Renders `entities` under `root`.
    ///
    /// # Errors
    ///
    /// [`ApiError::ConfigurationFault`] for an unknown root, a missing field
    /// or relation, or a computed field that cannot be derived.
    pub fn project<E: Entity>(
        &self,
        root: &str,
        entities: &[E],
        flags: &ViewFlags,
    ) -> Result<Projection, ApiError> {
        let view = self.registry.get(root)?;
        let items = entities
            .iter()
            .map(|entity| self.render(view, entity, flags))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Projection {
            root: root.to_string(),
            items,
            window: None,
        })
    }

    /// Renders a page and attaches its effective `page`/`per_page`.
    ///
    /// # Errors
    ///
    /// Same as [`Projector::project`].
    pub fn project_page<E: Entity>(
        &self,
        root: &str,
        page: &Page<E>,
        flags: &ViewFlags,
    ) -> Result<Projection, ApiError> {
        let mut projection = self.project(root, &page.items, flags)?;
        projection.window = Some(page.window);
        Ok(projection)
    }

    fn render(
        &self,
        view: &ViewDefinition,
        entity: &dyn Entity,
        flags: &ViewFlags,
    ) -> Result<Value, ApiError> {
        let mut out = Map::new();

        for field in view.fields() {
            match field {
                FieldExtractor::Direct { field } => {
                    let value = entity.read(field).ok_or_else(|| {
                        ApiError::ConfigurationFault(format!(
                            "view '{}' reads missing field '{}'",
                            view.root(),
                            field
                        ))
                    })?;
                    out.insert(field.to_string(), value.to_json());
                }
                FieldExtractor::Computed { name, compute } => {
                    out.insert(name.to_string(), compute(entity)?);
                }
                FieldExtractor::Nested {
                    name,
                    relation,
                    flag,
                    view: nested,
                } => {
                    if !flags.is_set(flag) {
                        continue;
                    }
                    let related = entity.related(relation).ok_or_else(|| {
                        ApiError::ConfigurationFault(format!(
                            "view '{}' follows missing relation '{}'",
                            view.root(),
                            relation
                        ))
                    })?;
                    let nested_view = self.registry.get(nested)?;
                    out.insert(name.to_string(), self.render(nested_view, related, flags)?);
                }
            }
        }

        Ok(Value::Object(out))
    }
}
