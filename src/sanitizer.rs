use std::fmt;

use crate::error::ApiError;
use crate::{Tainted, Verified};

/// Error returned when a tainted value cannot be promoted.
///
/// The message is phrased for the API caller (`"Name can't be blank"`), so it
/// can be surfaced directly inside a `ValidationFailed` response.
///
/// # Examples
///
/// ```
/// use client_projects::{SanitizationError, SanitizationErrorKind};
///
/// let error = SanitizationError::new(SanitizationErrorKind::Empty, "Name can't be blank");
/// assert_eq!(error.kind(), SanitizationErrorKind::Empty);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizationError {
    kind: SanitizationErrorKind,
    message: String,
}

impl SanitizationError {
    /// Creates a new sanitization error.
    pub fn new(kind: SanitizationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> SanitizationErrorKind {
        self.kind
    }

    /// Returns the caller-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SanitizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sanitization failed ({}): {}", self.kind, self.message)
    }
}

impl std::error::Error for SanitizationError {}

impl From<SanitizationError> for ApiError {
    fn from(err: SanitizationError) -> Self {
        ApiError::invalid(vec![err.message])
    }
}

/// Kind of sanitization error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizationErrorKind {
    /// Input is not one of the accepted values.
    NotIncluded,
    /// Input format is malformed (e.g. not an integer).
    MalformedInput,
    /// Input is empty or contains only whitespace.
    Empty,
    /// Input exceeds maximum allowed length.
    TooLong,
}

impl fmt::Display for SanitizationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotIncluded => write!(f, "not included"),
            Self::MalformedInput => write!(f, "malformed input"),
            Self::Empty => write!(f, "empty input"),
            Self::TooLong => write!(f, "input too long"),
        }
    }
}

/// Promotes `Tainted<T>` into `Verified<U>`.
///
/// Implementations validate (and possibly parse) the input and only call
/// `Verified::new_unchecked` once every rule has passed.
pub trait Sanitizer<T, U = T> {
    /// Validates the input, returning the verified value or why it was rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`SanitizationError`] when the input breaks a rule.
    fn sanitize(&self, input: Tainted<T>) -> Result<Verified<U>, SanitizationError>;
}

/// Validates a human-entered name: present, not blank, bounded length.
///
/// The value is kept as entered (no trimming). Length is counted in
/// characters.
///
/// # Examples
///
/// ```
/// use client_projects::{NameSanitizer, Sanitizer, Tainted};
///
/// let sanitizer = NameSanitizer::new("Name", 10);
/// assert!(sanitizer.sanitize(Tainted::new("ACME".to_string())).is_ok());
///
/// let err = sanitizer.sanitize(Tainted::new("   ".to_string())).unwrap_err();
/// assert_eq!(err.message(), "Name can't be blank");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NameSanitizer {
    label: &'static str,
    max_len: usize,
}

impl NameSanitizer {
    /// Creates a sanitizer; `label` prefixes every message.
    pub fn new(label: &'static str, max_len: usize) -> Self {
        Self { label, max_len }
    }

    /// Message used when the field was not supplied at all.
    pub fn blank_message(&self) -> String {
        format!("{} can't be blank", self.label)
    }
}

impl Sanitizer<String> for NameSanitizer {
    fn sanitize(&self, input: Tainted<String>) -> Result<Verified<String>, SanitizationError> {
        let value = input.into_inner();

        if value.trim().is_empty() {
            return Err(SanitizationError::new(
                SanitizationErrorKind::Empty,
                self.blank_message(),
            ));
        }

        if value.chars().count() > self.max_len {
            return Err(SanitizationError::new(
                SanitizationErrorKind::TooLong,
                format!(
                    "{} is too long (maximum is {} characters)",
                    self.label, self.max_len
                ),
            ));
        }

        Ok(Verified::new_unchecked(value))
    }
}

/// Parses a decimal integer, tolerating surrounding whitespace.
///
/// Signs are accepted; range checks are the caller's business.
#[derive(Debug, Clone, Copy)]
pub struct IntegerSanitizer {
    label: &'static str,
}

impl IntegerSanitizer {
    /// Creates a sanitizer; `label` is used in the rejection message.
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

impl Sanitizer<String, i64> for IntegerSanitizer {
    fn sanitize(&self, input: Tainted<String>) -> Result<Verified<i64>, SanitizationError> {
        let raw = input.into_inner();
        raw.trim()
            .parse::<i64>()
            .map(Verified::new_unchecked)
            .map_err(|_| {
                SanitizationError::new(
                    SanitizationErrorKind::MalformedInput,
                    format!("{} is not a number", self.label),
                )
            })
    }
}
