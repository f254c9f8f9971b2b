use serde_json::Value;

use crate::error::ApiError;
use crate::model::Entity;

/// Derives a value from an entity.
pub type ComputeFn = fn(&dyn Entity) -> Result<Value, ApiError>;

/// One output field of a view.
#[derive(Debug, Clone)]
pub enum FieldExtractor {
    /// Copies the named field verbatim.
    Direct {
        /// Field name, used both for reading and as output key
        field: &'static str,
    },
    /// Derives a value from the entity.
    Computed {
        /// Output key
        name: &'static str,
        /// Derivation
        compute: ComputeFn,
    },
    /// Renders a related entity with another view, only when `flag` is set.
    Nested {
        /// Output key
        name: &'static str,
        /// Relation followed on the entity
        relation: &'static str,
        /// Gating flag in [`ViewFlags`](super::ViewFlags)
        flag: &'static str,
        /// Root of the view used for the related entity
        view: &'static str,
    },
}

impl FieldExtractor {
    /// The key this extractor writes.
    pub fn output_key(&self) -> &'static str {
        match self {
            FieldExtractor::Direct { field } => *field,
            FieldExtractor::Computed { name, .. } | FieldExtractor::Nested { name, .. } => *name,
        }
    }
}

/// Ordered field extractors for one root.
///
/// # Examples
///
/// ```
/// use client_projects::projection::ViewDefinition;
///
/// let view = ViewDefinition::new("clients")
///     .direct("name")
///     .direct("id");
///
/// assert_eq!(view.root(), "clients");
/// assert_eq!(view.output_keys(), vec!["name", "id"]);
/// ```
#[derive(Debug, Clone)]
pub struct ViewDefinition {
    root: &'static str,
    fields: Vec<FieldExtractor>,
}

impl ViewDefinition {
    /// Starts an empty view for `root`.
    pub fn new(root: &'static str) -> Self {
        Self {
            root,
            fields: Vec::new(),
        }
    }

    /// Appends a direct field.
    pub fn direct(mut self, field: &'static str) -> Self {
        self.fields.push(FieldExtractor::Direct { field });
        self
    }

    /// Appends a computed field.
    pub fn computed(mut self, name: &'static str, compute: ComputeFn) -> Self {
        self.fields.push(FieldExtractor::Computed { name, compute });
        self
    }

    /// Appends a flag-gated nested field.
    pub fn nested(
        mut self,
        name: &'static str,
        relation: &'static str,
        flag: &'static str,
        view: &'static str,
    ) -> Self {
        self.fields.push(FieldExtractor::Nested {
            name,
            relation,
            flag,
            view,
        });
        self
    }

    /// Root name this view is registered under.
    pub fn root(&self) -> &'static str {
        self.root
    }

    /// Extractors in declared order.
    pub fn fields(&self) -> &[FieldExtractor] {
        &self.fields
    }

    /// Output keys in declared order, including gated ones.
    pub fn output_keys(&self) -> Vec<&'static str> {
        self.fields.iter().map(FieldExtractor::output_key).collect()
    }
}
