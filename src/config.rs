//! Validator configuration.
//!
//! A [`ValidatorConfig`] can be built in code or loaded from JSON. Every
//! field has a default, so a partial document is enough:
//!
//! ```rust
//! use tagcheck::config::ValidatorConfig;
//!
//! let config = ValidatorConfig::from_json(r#"{ "fail_fast": true }"#).unwrap();
//! assert!(config.fail_fast);
//! assert_eq!(config.max_depth, 64);
//! ```

use crate::registry::RegistryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings that shape how a [`Validator`](crate::engine::Validator) walks values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Nesting limit (struct fields, elements, pointer hops) before a call
    /// aborts with `MaxDepthExceeded`.
    pub max_depth: usize,

    /// Stop checking a field after its first failing rule.
    pub fail_fast: bool,

    /// Keep parsed tags for reuse across calls.
    pub cache_tags: bool,

    /// Aliases registered when the validator is built.
    pub aliases: BTreeMap<String, String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            fail_fast: false,
            cache_tags: true,
            aliases: BTreeMap::new(),
        }
    }
}

impl ValidatorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub(crate) fn check(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid validator configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("cannot register {aliases} configured aliases on an already frozen registry")]
    FrozenRegistry { aliases: usize },

    #[error("max_depth must be at least 1")]
    ZeroDepth,
}
