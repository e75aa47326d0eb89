//! Validation error types and handling

use crate::value::PropertyPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Boxed cause carried by faults raised inside property readers
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, ValidatorError>;

/// Faults raised by the engine itself.
///
/// These indicate a programming or configuration problem and are never
/// reported as [`ValidationError`]s. Ordinary validation failures are data.
#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Found null in '{segment}' while trying to read '{path}'")]
    BrokenAssociation { segment: String, path: String },

    #[error("Failed to read property '{property}' of '{type_name}': {source}")]
    AccessorFailure {
        property: String,
        type_name: String,
        #[source]
        source: BoxError,
    },

    #[error("Illegal state: {message}")]
    IllegalState { message: String },

    #[error("Type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl ValidatorError {
    /// Create a new invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// A null object was met at `segment` while reading `path`
    pub fn broken_association(segment: impl Into<String>, path: impl Into<String>) -> Self {
        Self::BrokenAssociation {
            segment: segment.into(),
            path: path.into(),
        }
    }

    /// Create a new accessor failure wrapping the reader's error
    pub fn accessor_failure(
        property: impl Into<String>,
        type_name: impl Into<String>,
        source: BoxError,
    ) -> Self {
        Self::AccessorFailure {
            property: property.into(),
            type_name: type_name.into(),
            source,
        }
    }

    /// Create a new illegal state error
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    /// The resolved value cannot be coerced to the chain's kind
    pub fn type_mismatch(
        path: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected,
            found,
        }
    }

    /// Missing properties and kind mismatches are both configuration problems
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::TypeMismatch { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    pub fn is_broken_association(&self) -> bool {
        matches!(self, Self::BrokenAssociation { .. })
    }

    pub fn is_accessor_failure(&self) -> bool {
        matches!(self, Self::AccessorFailure { .. })
    }

    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Self::IllegalState { .. })
    }
}

/// A failed rule, reported against the property path it guards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationError {
    field: PropertyPath,
    code: String,
    message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    args: Vec<serde_json::Value>,
}

impl ValidationError {
    /// Create a new validation error without message arguments
    pub fn new(field: PropertyPath, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            code: code.into(),
            message: message.into(),
            args: Vec::new(),
        }
    }

    /// Attach positional message arguments
    pub fn with_args(mut self, args: Vec<serde_json::Value>) -> Self {
        self.args = args;
        self
    }

    /// The property path that failed validation
    pub fn field(&self) -> &PropertyPath {
        &self.field
    }

    /// Lookup key for localized messages
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Message used when no localized message can be resolved
    pub fn default_message(&self) -> &str {
        &self.message
    }

    /// Positional arguments for `{0}`, `{1}`, ... placeholders
    pub fn args(&self) -> &[serde_json::Value] {
        &self.args
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Failed rules grouped by property path, for adapters that answer with JSON.
///
/// Paths are kept in sorted order so rendering is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Error)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<ValidationError>>,
}

impl ValidationErrors {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// File `error` under its property path
    pub fn add(&mut self, error: ValidationError) {
        self.fields
            .entry(error.field.to_string())
            .or_default()
            .push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of distinct paths with at least one error
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Number of failed rules across all paths
    pub fn total_errors(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// Errors reported against `path`, in evaluation order
    pub fn for_path(&self, path: &str) -> &[ValidationError] {
        self.fields.get(path).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has_errors_for(&self, path: &str) -> bool {
        !self.for_path(path).is_empty()
    }

    /// Failing paths with their errors, sorted by path
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ValidationError])> {
        self.fields
            .iter()
            .map(|(path, errors)| (path.as_str(), errors.as_slice()))
    }

    /// Response body listing `code`, `message` and `args` per failing path
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(path, errors)| {
                let entries = errors
                    .iter()
                    .map(|error| {
                        serde_json::json!({
                            "code": error.code,
                            "message": error.message,
                            "args": error.args,
                        })
                    })
                    .collect();
                (path.to_string(), serde_json::Value::Array(entries))
            })
            .collect();

        serde_json::json!({
            "error": {
                "code": "validation_failed",
                "message": "Validation failed",
                "fields": fields
            }
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed for {} path(s)", self.fields.len())?;
        for (path, errors) in self.iter() {
            for error in errors {
                write!(f, "\n  {} [{}]: {}", path, error.code, error.message)?;
            }
        }
        Ok(())
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        std::iter::once(error).collect()
    }
}

impl FromIterator<ValidationError> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        let mut errors = Self::new();
        iter.into_iter().for_each(|error| errors.add(error));
        errors
    }
}
