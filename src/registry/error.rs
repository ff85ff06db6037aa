//! Registration and rule evaluation errors.

use crate::core::Kind;
use crate::tag::TagError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while registering rules and aliases.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("rule name must not be empty")]
    EmptyName,

    #[error("rule '{name}' is already registered; use override_rule to replace it")]
    DuplicateRule { name: String },

    #[error("unknown rule '{name}'")]
    UnknownRule { name: String },

    #[error("'{name}' is a reserved structural marker")]
    ReservedName { name: String },

    #[error("alias '{name}' is cyclic: {}", .chain.join(" -> "))]
    CyclicAlias { name: String, chain: Vec<String> },

    #[error("alias '{name}' has a malformed expansion: {source}")]
    MalformedAlias {
        name: String,
        #[source]
        source: TagError,
    },
}

/// Misconfiguration reported by a rule function.
///
/// Returning one of these aborts the whole validation call; a rule that
/// simply does not hold returns `Ok(false)` instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("rule '{rule}' has invalid parameter '{param}': {reason}")]
    InvalidParam {
        rule: String,
        param: String,
        reason: String,
    },

    #[error("rule '{rule}' cannot be applied to a {kind} value")]
    UnsupportedKind { rule: String, kind: Kind },

    #[error("rule '{rule}' references unknown field '{reference}'")]
    UnknownFieldReference { rule: String, reference: String },
}

/// Category of the rule that produced a field error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Presence checks such as `required`.
    Required,
    /// Size and value comparisons such as `min` or `lte`.
    Bounds,
    /// String format checks such as `email` or `numeric`.
    Format,
    /// Comparisons against a sibling field such as `eqfield`.
    CrossField,
    /// User registered rules.
    Custom,
}
