//! Request adapter for mapping HTTP requests to crate types.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::request::RequestMeta;
use crate::secret::Secret;
use crate::tainted::Tainted;

use super::{ExtractMetadata, ExtractTaintedInputs};

/// Query parameter carrying the credential when no header is sent.
pub const TOKEN_PARAM: &str = "token";

const AUTHORIZATION_HEADER: &str = "authorization";

/// Framework-agnostic view of one HTTP request.
///
/// Holds owned copies of the request id, query string, headers, path
/// parameters and body fields. Framework integrations build one per request
/// (typically via `From<FrameworkRequest>`) and hand it to the handlers.
///
/// Body fields are flat; nested JSON objects are flattened with dotted keys
/// (`client.name`).
///
/// The credential (`token` query parameter, `Authorization` header) only
/// leaves the adapter inside a [`Secret`]: it is redacted from `Debug` and
/// never copied into [`TaintedInputs`].
///
/// # Examples
///
/// ```
/// use client_projects::web::{ExtractMetadata, ExtractTaintedInputs, RequestAdapter};
///
/// let mut adapter = RequestAdapter::new("req-12345".to_string());
/// adapter.add_query_param("page".to_string(), "2".to_string());
/// adapter.add_header("Authorization".to_string(), "Bearer s3cr3t".to_string());
///
/// let meta = adapter.extract_metadata();
/// assert_eq!(meta.request_id, "req-12345");
/// assert!(meta.credential.is_some());
///
/// let inputs = adapter.extract_tainted_inputs();
/// assert!(inputs.get_query("page").is_some());
/// ```
#[derive(Clone)]
pub struct RequestAdapter {
    request_id: String,
    query_params: HashMap<String, String>,
    headers: HashMap<String, String>,
    path_params: HashMap<String, String>,
    body_params: HashMap<String, String>,
}

impl RequestAdapter {
    /// Creates an empty adapter with the given request ID.
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            query_params: HashMap::new(),
            headers: HashMap::new(),
            path_params: HashMap::new(),
            body_params: HashMap::new(),
        }
    }

    /// Adds a query parameter.
    pub fn add_query_param(&mut self, key: String, value: String) {
        self.query_params.insert(key, value);
    }

    /// Adds a header. Names are matched case-insensitively on lookup.
    pub fn add_header(&mut self, key: String, value: String) {
        self.headers.insert(key.to_ascii_lowercase(), value);
    }

    /// Adds a path parameter.
    pub fn add_path_param(&mut self, key: String, value: String) {
        self.path_params.insert(key, value);
    }

    /// Adds a flat body field.
    pub fn add_body_param(&mut self, key: String, value: String) {
        self.body_params.insert(key, value);
    }

    /// Adds every scalar in a JSON body, flattening nested objects.
    ///
    /// Strings are taken as is, numbers and booleans in their JSON spelling.
    /// Nulls and arrays are skipped.
    pub fn set_json_body(&mut self, body: &Value) {
        flatten(None, body, &mut self.body_params);
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The presented credential: `Authorization: Bearer` wins over `?token=`.
    fn credential(&self) -> Option<String> {
        let bearer = self
            .headers
            .get(AUTHORIZATION_HEADER)
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());

        bearer
            .or_else(|| self.query_params.get(TOKEN_PARAM).map(String::as_str))
            .map(str::to_string)
    }
}

fn flatten(prefix: Option<&str>, value: &Value, out: &mut HashMap<String, String>) {
    let key = |name: &str| match prefix {
        Some(prefix) => format!("{}.{}", prefix, name),
        None => name.to_string(),
    };

    match value {
        Value::Object(map) => {
            for (name, child) in map {
                match child {
                    Value::Object(_) => flatten(Some(key(name).as_str()), child, out),
                    Value::String(s) => {
                        out.insert(key(name), s.clone());
                    }
                    Value::Number(n) => {
                        out.insert(key(name), n.to_string());
                    }
                    Value::Bool(b) => {
                        out.insert(key(name), b.to_string());
                    }
                    Value::Null | Value::Array(_) => {}
                }
            }
        }
        _ => tracing::debug!("ignoring non-object request body"),
    }
}

fn taint(
    map: &HashMap<String, String>,
    credential_key: Option<&str>,
) -> HashMap<String, Tainted<String>> {
    map.iter()
        .filter(|(k, _)| Some(k.as_str()) != credential_key)
        .map(|(k, v)| (k.clone(), Tainted::new(v.clone())))
        .collect()
}

/// Copy of `map` with the credential entry masked, for `Debug` output.
fn redacted<'a>(
    map: &'a HashMap<String, String>,
    credential_key: &str,
) -> HashMap<&'a str, &'a str> {
    map.iter()
        .map(|(k, v)| {
            let shown = if k.as_str() == credential_key {
                "[REDACTED]"
            } else {
                v.as_str()
            };
            (k.as_str(), shown)
        })
        .collect()
}

impl fmt::Debug for RequestAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestAdapter")
            .field("request_id", &self.request_id)
            .field("query_params", &redacted(&self.query_params, TOKEN_PARAM))
            .field("headers", &redacted(&self.headers, AUTHORIZATION_HEADER))
            .field("path_params", &self.path_params)
            .field("body_params", &self.body_params)
            .finish()
    }
}

impl ExtractMetadata for RequestAdapter {
    fn extract_metadata(&self) -> RequestMeta {
        RequestMeta {
            request_id: self.request_id.clone(),
            credential: self.credential().map(Secret::new),
        }
    }
}

impl ExtractTaintedInputs for RequestAdapter {
    fn extract_tainted_inputs(&self) -> TaintedInputs {
        TaintedInputs {
            query_params: taint(&self.query_params, Some(TOKEN_PARAM)),
            headers: taint(&self.headers, Some(AUTHORIZATION_HEADER)),
            path_params: taint(&self.path_params, None),
            body_params: taint(&self.body_params, None),
        }
    }
}

/// Every untrusted input of a request, wrapped in `Tainted<T>`.
///
/// The credential is not among them; it travels in
/// [`RequestMeta`](crate::RequestMeta) as a [`Secret`].
///
/// Read-only. Getters return owned copies so each can be handed to a
/// sanitizer.
#[derive(Debug, Clone, Default)]
pub struct TaintedInputs {
    query_params: HashMap<String, Tainted<String>>,
    headers: HashMap<String, Tainted<String>>,
    path_params: HashMap<String, Tainted<String>>,
    body_params: HashMap<String, Tainted<String>>,
}

impl TaintedInputs {
    /// All query parameters.
    pub fn query_params(&self) -> &HashMap<String, Tainted<String>> {
        &self.query_params
    }

    /// All headers, keyed by lowercase name.
    pub fn headers(&self) -> &HashMap<String, Tainted<String>> {
        &self.headers
    }

    /// All path parameters.
    pub fn path_params(&self) -> &HashMap<String, Tainted<String>> {
        &self.path_params
    }

    /// All body fields.
    pub fn body_params(&self) -> &HashMap<String, Tainted<String>> {
        &self.body_params
    }

    /// A query parameter.
    pub fn get_query(&self, key: &str) -> Option<Tainted<String>> {
        self.query_params.get(key).cloned()
    }

    /// A header, by case-insensitive name.
    pub fn get_header(&self, key: &str) -> Option<Tainted<String>> {
        self.headers.get(&key.to_ascii_lowercase()).cloned()
    }

    /// A path parameter.
    pub fn get_path(&self, key: &str) -> Option<Tainted<String>> {
        self.path_params.get(key).cloned()
    }

    /// A body field; nested fields use dotted keys.
    pub fn get_body(&self, key: &str) -> Option<Tainted<String>> {
        self.body_params.get(key).cloned()
    }
}
