//! Domain entities and the read contract the projector relies on.
//!
//! Entities are plain read-only records. The projector never touches their
//! concrete types; it reads named fields and follows named relations through
//! [`Entity`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// A single field value read from an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Missing value
    Null,
    /// Integer column (ids, foreign keys)
    Integer(i64),
    /// Text column
    Text(String),
    /// Point in time, rendered as RFC 3339
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Renders the value as JSON.
    ///
    /// Timestamps use second precision and a `Z` suffix, e.g.
    /// `2020-09-24T18:29:47Z`.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Integer(n) => Value::from(*n),
            FieldValue::Text(s) => Value::from(s.as_str()),
            FieldValue::Timestamp(ts) => Value::from(ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(ts: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(ts)
    }
}

/// Read-only access to an entity's named fields and relations.
///
/// Returning `None` means the entity has no such field or relation; the
/// projector treats that as a broken view definition.
pub trait Entity: std::fmt::Debug + Send + Sync {
    /// Reads a named field.
    fn read(&self, field: &str) -> Option<FieldValue>;

    /// Follows a named to-one relation.
    fn related(&self, relation: &str) -> Option<&dyn Entity> {
        let _ = relation;
        None
    }
}

/// A client organisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    /// Primary key
    pub id: i64,
    /// Unique display name
    pub name: String,
    /// Creation time; the pagination order key
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Entity for Client {
    fn read(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

/// A project owned by a client.
///
/// Carries a snapshot of its owning client so views can nest it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Primary key
    pub id: i64,
    /// Unique display name
    pub name: String,
    /// Id from the [`ProjectStatus`](crate::ProjectStatus) registry
    pub project_status_id: i64,
    /// Owning client's id
    pub client_id: i64,
    /// Owning client
    pub client: Client,
    /// Creation time; the pagination order key
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Entity for Project {
    fn read(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "project_status_id" => Some(self.project_status_id.into()),
            "client_id" => Some(self.client_id.into()),
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            _ => None,
        }
    }

    fn related(&self, relation: &str) -> Option<&dyn Entity> {
        match relation {
            "client" => Some(&self.client),
            _ => None,
        }
    }
}
