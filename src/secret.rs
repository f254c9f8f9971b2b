use std::fmt;

use serde::{Deserialize, Deserializer};

/// Wrapper for credential material that must never reach logs.
///
/// `Secret<T>` prevents accidental exposure through `Debug` or `Display`;
/// both print `[REDACTED]`. Bearer tokens, both the configured ones and the
/// ones presented by callers, are held in this type.
///
/// Access to the inner value requires an explicit call to `expose_secret()`.
///
/// # Examples
///
/// ```
/// use client_projects::Secret;
///
/// let token = Secret::new("full-access-token".to_string());
/// assert_eq!(format!("{:?}", token), "[REDACTED]");
/// assert_eq!(token.expose_secret(), "full-access-token");
/// ```
// Do NOT derive Clone or Default; duplicating a secret must be explicit.
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Secret<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Secret::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_redacts_debug() {
        let token = Secret::new("hunter2".to_string());
        let debug_output = format!("{:?}", token);

        assert_eq!(debug_output, "[REDACTED]");
        assert!(!debug_output.contains("hunter2"));
        assert!(!debug_output.contains("String"));
    }

    #[test]
    fn secret_redacts_display() {
        let token = Secret::new("sk-1234567890");
        assert_eq!(format!("{}", token), "[REDACTED]");
    }

    #[test]
    fn secret_redacts_inside_containers() {
        let token = Some(Secret::new("abc123".to_string()));
        assert_eq!(format!("{:?}", token), "Some([REDACTED])");
    }

    #[test]
    fn secret_deserializes_transparently() {
        let token: Secret<String> = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(token.expose_secret(), "abc");
    }
}
