//! Field errors and engine faults.
//!
//! Two kinds of failure come out of a validation call. A [`FieldError`] says
//! the data broke a declared constraint; it is returned as data and many of
//! them can be reported at once. An [`EngineError`] says the declarations
//! themselves are broken (bad tag, unknown rule, ...) and aborts the call.

use crate::core::Kind;
use crate::registry::ErrorKind;
use crate::tag::TagError;
use serde::{Deserialize, Serialize};
use std::fmt;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// One violated constraint, attributed to a location in the value graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path prefixed with the root type name, e.g. `User.addresses[1].city`.
    pub namespace: String,

    /// Path from the root value, e.g. `addresses[1].city`.
    pub path: String,

    /// Leaf field name, e.g. `city`, `schools[SD]` or `schools{SD}`.
    pub field: String,

    /// Rule that failed (after alias expansion).
    pub tag: String,

    /// Parameter of the failed rule, empty when it has none.
    pub param: String,

    pub kind: ErrorKind,

    /// The offending value when it is a scalar.
    pub value: Option<String>,

    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key: '{}' Error:{}", self.namespace, self.message)
    }
}

impl std::error::Error for FieldError {}

/// Ordered collection of field errors from one call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn from_failures(failures: &NonEmptyVec<FieldError>) -> Self {
        Self::new(failures.iter().cloned().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    /// Errors whose path is exactly `path`.
    pub fn for_field(&self, path: &str) -> Vec<&FieldError> {
        self.errors.iter().filter(|e| e.path == path).collect()
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "errors": self.errors })
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl From<Vec<FieldError>> for FieldErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self::new(errors)
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Faults in the rule declarations or traversal that abort a validation call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("malformed tag on '{field}': {source}")]
    MalformedTag {
        field: String,
        #[source]
        source: TagError,
    },

    #[error("unknown rule '{rule}' on '{field}'")]
    UnknownRule { field: String, rule: String },

    #[error("rule '{rule}' on '{field}' references unknown field '{reference}'")]
    UnknownFieldReference {
        field: String,
        rule: String,
        reference: String,
    },

    #[error("rule '{rule}' on '{field}' has invalid parameter '{param}': {reason}")]
    InvalidParam {
        field: String,
        rule: String,
        param: String,
        reason: String,
    },

    #[error("rule '{rule}' cannot be applied to the {kind} value at '{field}'")]
    UnsupportedKind {
        field: String,
        rule: String,
        kind: Kind,
    },

    #[error("cannot dive into the {kind} value at '{field}'")]
    DiveOnNonCollection { field: String, kind: Kind },

    #[error("maximum depth {limit} exceeded at '{field}'")]
    MaxDepthExceeded { field: String, limit: usize },

    #[error("expected a struct to validate, got {kind}")]
    InvalidRoot { kind: Kind },
}
