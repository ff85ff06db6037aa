//! Validation engine.
//!
//! The [`Validator`] combines a frozen rule [`Registry`] with a
//! [`ValidatorConfig`] and a cache of parsed tags. It is immutable once built
//! and can be shared across threads; each call owns its own
//! [`ValidationContext`].
//!
//! Every entry point returns two levels of result:
//!
//! - `Err(EngineError)` when the declarations are broken (malformed tag,
//!   unknown rule, bad parameter, depth limit). No field errors are returned.
//! - `Ok(outcome)` otherwise, where `outcome` is a
//!   `Validation<(), NonEmptyVec<FieldError>>` holding every violated
//!   constraint in traversal order.
//!
//! # Example
//!
//! ```rust
//! use tagcheck::prelude::*;
//!
//! let validator = Validator::new();
//!
//! let outcome = validator.validate_var(&"", "required").unwrap();
//! assert!(outcome.is_failure());
//!
//! let outcome = validator.validate_var(&7, "min=5,max=10").unwrap();
//! assert!(outcome.is_success());
//! ```

mod context;
mod error;
mod walker;

pub use context::ValidationContext;
pub use error::{EngineError, FieldError, FieldErrors};

use crate::config::{ConfigError, ValidatorConfig};
use crate::core::{resolve, FieldPath, Shape, Validatable};
use crate::registry::{Registry, RegistryBuilder, Scope};
use crate::tag::{parse_tag, FieldTag, TagError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use walker::{FieldFilter, Walker};

/// Result of a validation call that ran to completion.
pub type Outcome = Validation<(), NonEmptyVec<FieldError>>;

/// Validates values against the rules declared in their tags.
pub struct Validator {
    registry: Arc<Registry>,
    config: ValidatorConfig,
    cache: RwLock<HashMap<String, Arc<FieldTag>>>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// A validator with the built-in rules and default configuration.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(Registry::default()))
    }

    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self::from_parts(registry, ValidatorConfig::default())
    }

    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    fn from_parts(registry: Arc<Registry>, config: ValidatorConfig) -> Self {
        tracing::debug!(
            rules = registry.rule_names().len(),
            aliases = registry.alias_count(),
            max_depth = config.max_depth,
            fail_fast = config.fail_fast,
            "validator ready"
        );
        Self {
            registry,
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Parse a tag against this validator's registry, reusing a cached parse
    /// when tag caching is enabled.
    ///
    /// The cache is keyed by the tag text and never evicts, so it is meant
    /// for the static tags of struct fields. Tags passed to
    /// [`validate_var`](Self::validate_var) are parsed on every call and
    /// only read the cache.
    pub fn field_tag(&self, tag: &str) -> Result<Arc<FieldTag>, TagError> {
        self.lookup_tag(tag, true)
    }

    fn lookup_tag(&self, tag: &str, store: bool) -> Result<Arc<FieldTag>, TagError> {
        if self.config.cache_tags {
            if let Some(parsed) = self.cache.read().get(tag) {
                return Ok(Arc::clone(parsed));
            }
        }

        let parsed = Arc::new(parse_tag(tag, self.registry.as_ref())?);
        if store && self.config.cache_tags {
            tracing::trace!(tag, "caching parsed tag");
            self.cache
                .write()
                .insert(tag.to_string(), Arc::clone(&parsed));
        }
        Ok(parsed)
    }

    /// Number of distinct tags parsed and cached so far.
    pub fn cached_tags(&self) -> usize {
        self.cache.read().len()
    }

    /// Validate every tagged field of a struct, recursing into nested
    /// structs and into collections marked with `dive`.
    ///
    /// Tags are parsed when the walk reaches their field, so a malformed tag
    /// behind a `None` or on the elements of an empty collection goes
    /// unreported.
    pub fn validate<T>(&self, value: &T) -> Result<Outcome, EngineError>
    where
        T: Validatable + ?Sized,
    {
        self.validate_filtered(value.shape(), FieldFilter::All)
    }

    /// Like [`validate`](Self::validate), but only the named top-level
    /// fields are checked.
    pub fn validate_fields<T>(&self, value: &T, fields: &[&str]) -> Result<Outcome, EngineError>
    where
        T: Validatable + ?Sized,
    {
        self.validate_filtered(value.shape(), FieldFilter::Only(fields))
    }

    /// Like [`validate`](Self::validate), but the named top-level fields are
    /// left out.
    pub fn validate_except<T>(&self, value: &T, fields: &[&str]) -> Result<Outcome, EngineError>
    where
        T: Validatable + ?Sized,
    {
        self.validate_filtered(value.shape(), FieldFilter::Except(fields))
    }

    /// Validate a single value against a tag. Errors carry an empty path.
    pub fn validate_var<T>(&self, value: &T, tag: &str) -> Result<Outcome, EngineError>
    where
        T: Validatable + ?Sized,
    {
        self.validate_single(value.shape(), tag, Scope::Detached)
    }

    /// Validate a single value against a tag whose cross-field rules compare
    /// against `other`.
    pub fn validate_var_with_value<T, U>(
        &self,
        value: &T,
        other: &U,
        tag: &str,
    ) -> Result<Outcome, EngineError>
    where
        T: Validatable + ?Sized,
        U: Validatable,
    {
        self.validate_single(value.shape(), tag, Scope::Value(other))
    }

    fn validate_filtered(
        &self,
        shape: Shape<'_>,
        filter: FieldFilter<'_>,
    ) -> Result<Outcome, EngineError> {
        let shape = resolve(shape, self.config.max_depth);
        let Shape::Struct(root) = &shape else {
            return Err(EngineError::InvalidRoot { kind: shape.kind() });
        };

        let mut walker = Walker::new(self, root.name());
        walker.walk_struct(root, &FieldPath::root(), 0, filter)?;
        Ok(walker.finish())
    }

    fn validate_single(
        &self,
        shape: Shape<'_>,
        tag: &str,
        scope: Scope<'_>,
    ) -> Result<Outcome, EngineError> {
        let parsed = self
            .lookup_tag(tag, false)
            .map_err(|source| EngineError::MalformedTag {
                field: String::new(),
                source,
            })?;

        let mut walker = Walker::new(self, "");
        if !parsed.is_skip() {
            walker.walk_shape(shape, &parsed, scope, &FieldPath::root(), 0)?;
        }
        Ok(walker.finish())
    }
}

enum RegistrySource {
    Open(RegistryBuilder),
    Frozen(Arc<Registry>),
}

/// Fluent builder for [`Validator`].
///
/// Rules and aliases can be supplied as an open [`RegistryBuilder`], which is
/// frozen when the validator is built, or as an already frozen registry
/// shared with other validators.
pub struct ValidatorBuilder {
    registry: RegistrySource,
    config: ValidatorConfig,
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorBuilder {
    pub fn new() -> Self {
        Self {
            registry: RegistrySource::Open(RegistryBuilder::new()),
            config: ValidatorConfig::default(),
        }
    }

    /// Use the rules and aliases collected by `builder`.
    pub fn rules(mut self, builder: RegistryBuilder) -> Self {
        self.registry = RegistrySource::Open(builder);
        self
    }

    /// Share an already frozen registry.
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = RegistrySource::Frozen(registry);
        self
    }

    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.fail_fast = fail_fast;
        self
    }

    pub fn cache_tags(mut self, cache_tags: bool) -> Self {
        self.config.cache_tags = cache_tags;
        self
    }

    pub fn alias(mut self, name: impl Into<String>, expansion: impl Into<String>) -> Self {
        self.config.aliases.insert(name.into(), expansion.into());
        self
    }

    pub fn build(self) -> Result<Validator, ConfigError> {
        self.config.check()?;

        let registry = match self.registry {
            RegistrySource::Open(builder) => {
                Arc::new(builder.register_aliases(&self.config.aliases)?.build())
            }
            RegistrySource::Frozen(registry) => {
                if !self.config.aliases.is_empty() {
                    return Err(ConfigError::FrozenRegistry {
                        aliases: self.config.aliases.len(),
                    });
                }
                registry
            }
        };

        Ok(Validator::from_parts(registry, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Kind, StructShape};
    use crate::registry::ErrorKind;

    struct Account {
        email: String,
        age: u32,
        nickname: Option<String>,
        tags: Vec<String>,
    }

    impl Validatable for Account {
        fn shape(&self) -> Shape<'_> {
            Shape::Struct(
                StructShape::new("Account")
                    .field("email", "required,email", &self.email)
                    .field("age", "gte=18,lte=130", &self.age)
                    .field("nickname", "omitempty,min=3", &self.nickname)
                    .field("tags", "max=3,dive,required", &self.tags),
            )
        }
    }

    fn account() -> Account {
        Account {
            email: "someone@example.com".to_string(),
            age: 30,
            nickname: None,
            tags: vec!["a".to_string()],
        }
    }

    fn failures(outcome: Outcome) -> Vec<FieldError> {
        match outcome {
            Validation::Failure(errors) => FieldErrors::from_failures(&errors).into_vec(),
            Validation::Success(_) => Vec::new(),
        }
    }

    #[test]
    fn valid_struct_passes() {
        let validator = Validator::new();
        assert!(validator.validate(&account()).unwrap().is_success());
    }

    #[test]
    fn reports_every_failure_in_field_order() {
        let validator = Validator::new();
        let mut value = account();
        value.email = "nope".to_string();
        value.age = 12;
        value.nickname = Some("ab".to_string());
        value.tags = vec!["x".to_string(), String::new()];

        let errors = failures(validator.validate(&value).unwrap());
        let seen: Vec<_> = errors
            .iter()
            .map(|e| (e.path.as_str(), e.tag.as_str()))
            .collect();
        assert_eq!(
            seen,
            vec![
                ("email", "email"),
                ("age", "gte"),
                ("nickname", "min"),
                ("tags[1]", "required"),
            ]
        );
        assert_eq!(errors[0].namespace, "Account.email");
        assert_eq!(errors[1].param, "18");
        assert_eq!(errors[1].value.as_deref(), Some("12"));
        assert_eq!(errors[3].kind, ErrorKind::Required);
    }

    #[test]
    fn fail_fast_stops_at_first_failure_of_a_field() {
        let validator = Validator::builder().fail_fast(true).build().unwrap();
        let outcome = validator.validate_var(&"ab", "min=3,email").unwrap();
        assert_eq!(failures(outcome).len(), 1);

        let validator = Validator::new();
        let outcome = validator.validate_var(&"ab", "min=3,email").unwrap();
        assert_eq!(failures(outcome).len(), 2);
    }

    #[test]
    fn non_struct_root_is_rejected() {
        let validator = Validator::new();
        let err = validator
            .validate(&5)
            .err()
            .expect("expected a terminal error");
        assert_eq!(err, EngineError::InvalidRoot { kind: Kind::Int });

        let missing: Option<Account> = None;
        let err = validator
            .validate(&missing)
            .err()
            .expect("expected a terminal error");
        assert_eq!(err, EngineError::InvalidRoot { kind: Kind::Ptr });
    }

    #[test]
    fn root_behind_pointer_is_dereferenced() {
        let validator = Validator::new();
        let boxed = Some(Box::new(account()));
        assert!(validator.validate(&boxed).unwrap().is_success());
    }

    #[test]
    fn tags_are_cached_once() {
        let validator = Validator::new();
        validator.validate(&account()).unwrap();
        let cached = validator.cached_tags();
        validator.validate(&account()).unwrap();
        assert_eq!(validator.cached_tags(), cached);
        assert!(cached >= 4);

        let uncached = Validator::builder().cache_tags(false).build().unwrap();
        uncached.validate(&account()).unwrap();
        assert_eq!(uncached.cached_tags(), 0);
    }

    #[test]
    fn single_value_tags_are_not_cached() {
        let validator = Validator::new();
        for n in 0..16 {
            let tag = format!("min={n}");
            validator.validate_var(&"value", &tag).unwrap();
        }
        assert_eq!(validator.cached_tags(), 0);

        validator.validate(&account()).unwrap();
        let cached = validator.cached_tags();
        validator.validate_var(&"value", "required").unwrap();
        assert_eq!(validator.cached_tags(), cached);
    }

    #[test]
    fn field_filters() {
        let validator = Validator::new();
        let mut value = account();
        value.email = String::new();
        value.age = 1;

        let only = failures(validator.validate_fields(&value, &["age"]).unwrap());
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].path, "age");

        let except = failures(validator.validate_except(&value, &["age"]).unwrap());
        assert_eq!(except.len(), 1);
        assert_eq!(except[0].path, "email");
    }

    #[test]
    fn builder_registers_config_aliases() {
        let validator = Validator::builder()
            .alias("adult", "gte=18")
            .build()
            .unwrap();
        assert_eq!(validator.registry().alias("adult"), Some("gte=18"));

        let errors = failures(validator.validate_var(&3, "adult").unwrap());
        assert_eq!(errors[0].tag, "gte");
    }

    #[test]
    fn builder_rejects_aliases_for_frozen_registry() {
        let shared = Arc::new(Registry::default());
        let result = Validator::builder()
            .registry(Arc::clone(&shared))
            .alias("adult", "gte=18")
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::FrozenRegistry { aliases: 1 })
        ));

        let validator = Validator::builder().registry(shared).build().unwrap();
        assert!(validator.registry().contains("required"));
    }

    #[test]
    fn skip_tag_on_single_value_checks_nothing() {
        let validator = Validator::new();
        assert!(validator.validate_var(&"", "-").unwrap().is_success());
        assert!(validator.validate_var(&"", "").unwrap().is_success());
    }
}
