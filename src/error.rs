use serde_json::{json, Value};

/// Errors surfaced by the request pipeline.
///
/// Each variant maps to one HTTP status (see [`ApiError::status`]) and one
/// user-visible message (see [`ApiError::public_message`]). The resolver and
/// the authorizer never produce these directly; they return sentinels and the
/// gate translates them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Missing or unknown credential.
    #[error("401 Unauthorized")]
    Unauthenticated,

    /// The principal lacks the permission for the requested operation.
    ///
    /// The message never names the missing permission.
    #[error("403 Forbidden")]
    Forbidden,

    /// A referenced entity does not exist.
    #[error("Couldn't find {model} with 'id'={id}")]
    NotFound {
        /// Model name, e.g. `Client`
        model: &'static str,
        /// The identifier exactly as it was supplied
        id: String,
    },

    /// A write violated one or more domain invariants.
    #[error("{}", validation_message(.scope, .messages))]
    ValidationFailed {
        /// Set when the failing record is nested inside the request (e.g. `client`)
        scope: Option<&'static str>,
        /// Field messages in the order they were detected
        messages: Vec<String>,
    },

    /// Call-site bug: unknown view root, unresolvable computed field, broken
    /// relation. Never shown to the caller.
    #[error("configuration fault: {0}")]
    ConfigurationFault(String),
}

fn validation_message(scope: &Option<&'static str>, messages: &[String]) -> String {
    let joined = messages.join(", ");
    match scope {
        Some(scope) => format!("{}: {}", scope, joined),
        None => format!("Validation failed: {}", joined),
    }
}

impl ApiError {
    /// Builds a `NotFound` for the given model and raw identifier.
    pub fn not_found(model: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            model,
            id: id.into(),
        }
    }

    /// Builds an unscoped `ValidationFailed` from field messages.
    pub fn invalid(messages: Vec<String>) -> Self {
        Self::ValidationFailed {
            scope: None,
            messages,
        }
    }

    /// Re-labels a validation failure as belonging to a nested record.
    ///
    /// Other variants pass through unchanged.
    pub fn scoped(self, scope: &'static str) -> Self {
        match self {
            Self::ValidationFailed { messages, .. } => Self::ValidationFailed {
                scope: Some(scope),
                messages,
            },
            other => other,
        }
    }

    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::NotFound { .. } => 404,
            Self::ValidationFailed { .. } => 422,
            Self::ConfigurationFault(_) => 500,
        }
    }

    /// Message safe to return to the caller.
    pub fn public_message(&self) -> String {
        match self {
            Self::ConfigurationFault(_) => "500 Internal Server Error".to_string(),
            other => other.to_string(),
        }
    }

    /// The `{ "error": "<message>" }` response body.
    pub fn to_envelope(&self) -> Value {
        json!({ "error": self.public_message() })
    }

    /// Returns true for faults that indicate a programming error.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::ConfigurationFault(_))
    }
}
