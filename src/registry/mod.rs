//! Rule and alias registry.
//!
//! A [`RegistryBuilder`] is the single writer: rules and aliases are added
//! during initialization and the builder is then frozen into an immutable
//! [`Registry`] that any number of validators and threads can share.
//!
//! # Example
//!
//! ```rust
//! use tagcheck::registry::Registry;
//!
//! let registry = Registry::builder()
//!     .register_rule("username", |fl| {
//!         fl.as_str()
//!             .map(|s| s == s.to_uppercase() && s.len() >= 5)
//!             .unwrap_or(true)
//!     })
//!     .unwrap()
//!     .register_alias("varchar", "required,max=255")
//!     .unwrap()
//!     .build();
//!
//! assert!(registry.contains("username"));
//! assert_eq!(registry.alias("varchar"), Some("required,max=255"));
//! ```

mod builtin;
mod error;
mod level;

pub use error::{ErrorKind, RegistryError, RuleError};
pub use level::FieldLevel;

pub(crate) use level::Scope;

use crate::tag::{is_structural, parse_tag, tokenize, AliasLookup, SKIP};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Shared rule function.
pub type RuleFn = Arc<dyn Fn(&FieldLevel<'_>) -> Result<bool, RuleError> + Send + Sync>;

/// A named rule together with its error category.
#[derive(Clone)]
pub struct RuleDef {
    name: String,
    kind: ErrorKind,
    check: RuleFn,
    builtin: bool,
}

impl RuleDef {
    pub(crate) fn new(name: &str, kind: ErrorKind, check: RuleFn, builtin: bool) -> Self {
        Self {
            name: name.to_string(),
            kind,
            check,
            builtin,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Evaluate the rule against a field.
    pub fn check(&self, field: &FieldLevel<'_>) -> Result<bool, RuleError> {
        (self.check)(field)
    }
}

impl fmt::Debug for RuleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("builtin", &self.builtin)
            .finish()
    }
}

/// Frozen rule and alias table.
#[derive(Clone, Debug)]
pub struct Registry {
    rules: HashMap<String, RuleDef>,
    aliases: HashMap<String, String>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Look up a rule by name.
    pub fn resolve(&self, name: &str) -> Result<&RuleDef, RegistryError> {
        self.rules
            .get(name)
            .ok_or_else(|| RegistryError::UnknownRule {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    /// Rule names in sorted order.
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}

impl Default for Registry {
    fn default() -> Self {
        RegistryBuilder::new().build()
    }
}

impl AliasLookup for Registry {
    fn alias(&self, name: &str) -> Option<&str> {
        Registry::alias(self, name)
    }
}

/// Builder for a [`Registry`].
pub struct RegistryBuilder {
    rules: HashMap<String, RuleDef>,
    aliases: HashMap<String, String>,
}

impl RegistryBuilder {
    /// Start from the built-in rules.
    pub fn new() -> Self {
        let rules = builtin::BUILTINS
            .iter()
            .map(|def| (def.name.clone(), def.clone()))
            .collect();
        Self {
            rules,
            aliases: HashMap::new(),
        }
    }

    /// Start with no rules at all.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Register a custom predicate. Errors are reported with [`ErrorKind::Custom`].
    pub fn register_rule<F>(self, name: &str, rule: F) -> Result<Self, RegistryError>
    where
        F: Fn(&FieldLevel<'_>) -> bool + Send + Sync + 'static,
    {
        self.register_rule_with_kind(name, ErrorKind::Custom, rule)
    }

    pub fn register_rule_with_kind<F>(
        self,
        name: &str,
        kind: ErrorKind,
        rule: F,
    ) -> Result<Self, RegistryError>
    where
        F: Fn(&FieldLevel<'_>) -> bool + Send + Sync + 'static,
    {
        self.register_fallible_rule(name, kind, move |fl| Ok(rule(fl)))
    }

    /// Register a rule that can report misconfiguration through [`RuleError`].
    pub fn register_fallible_rule<F>(
        mut self,
        name: &str,
        kind: ErrorKind,
        rule: F,
    ) -> Result<Self, RegistryError>
    where
        F: Fn(&FieldLevel<'_>) -> Result<bool, RuleError> + Send + Sync + 'static,
    {
        check_name(name)?;
        if self.rules.contains_key(name) || self.aliases.contains_key(name) {
            return Err(RegistryError::DuplicateRule {
                name: name.to_string(),
            });
        }
        self.rules.insert(
            name.to_string(),
            RuleDef::new(name, kind, Arc::new(rule), false),
        );
        Ok(self)
    }

    /// Replace an existing rule, or add it if absent.
    ///
    /// A replaced rule keeps its error category.
    pub fn override_rule<F>(mut self, name: &str, rule: F) -> Result<Self, RegistryError>
    where
        F: Fn(&FieldLevel<'_>) -> bool + Send + Sync + 'static,
    {
        check_name(name)?;
        if self.aliases.contains_key(name) {
            return Err(RegistryError::DuplicateRule {
                name: name.to_string(),
            });
        }

        let kind = match self.rules.get(name) {
            Some(existing) => {
                if existing.builtin {
                    tracing::warn!(rule = name, "overriding built-in rule");
                }
                existing.kind
            }
            None => ErrorKind::Custom,
        };

        self.rules.insert(
            name.to_string(),
            RuleDef::new(
                name,
                kind,
                Arc::new(move |fl: &FieldLevel<'_>| Ok::<bool, RuleError>(rule(fl))),
                false,
            ),
        );
        Ok(self)
    }

    /// Register `name` as shorthand for `expansion`.
    ///
    /// Fails if the expansion, resolved through the aliases registered so
    /// far, leads back to `name`.
    pub fn register_alias(mut self, name: &str, expansion: &str) -> Result<Self, RegistryError> {
        check_name(name)?;
        if self.rules.contains_key(name) {
            return Err(RegistryError::DuplicateRule {
                name: name.to_string(),
            });
        }

        let malformed = |source| RegistryError::MalformedAlias {
            name: name.to_string(),
            source,
        };
        let tokens = tokenize(expansion).map_err(malformed)?;

        let mut chain = vec![name.to_string()];
        if self.leads_back(name, &tokens, &mut chain) {
            return Err(RegistryError::CyclicAlias {
                name: name.to_string(),
                chain,
            });
        }

        self.aliases
            .insert(name.to_string(), expansion.to_string());
        if let Err(source) = parse_tag(name, &self.aliases) {
            self.aliases.remove(name);
            return Err(malformed(source));
        }

        Ok(self)
    }

    /// Register several aliases in order.
    pub fn register_aliases<I, K, V>(self, aliases: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        aliases.into_iter().try_fold(self, |builder, (name, expansion)| {
            builder.register_alias(name.as_ref(), expansion.as_ref())
        })
    }

    /// Depth-first search for `name` through the alias graph. On success
    /// `chain` holds the cycle.
    fn leads_back(&self, name: &str, tokens: &[String], chain: &mut Vec<String>) -> bool {
        for token in tokens {
            if token == name {
                chain.push(token.clone());
                return true;
            }
            if chain.contains(token) {
                continue;
            }
            let Some(expansion) = self.aliases.get(token) else {
                continue;
            };
            let Ok(inner) = tokenize(expansion) else {
                continue;
            };
            chain.push(token.clone());
            if self.leads_back(name, &inner, chain) {
                return true;
            }
            chain.pop();
        }
        false
    }

    /// Freeze the registry.
    pub fn build(self) -> Registry {
        tracing::debug!(
            rules = self.rules.len(),
            aliases = self.aliases.len(),
            "rule registry frozen"
        );
        Registry {
            rules: self.rules,
            aliases: self.aliases,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn check_name(name: &str) -> Result<(), RegistryError> {
    if name.trim().is_empty() {
        return Err(RegistryError::EmptyName);
    }
    if is_structural(name) || name == SKIP {
        return Err(RegistryError::ReservedName {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_seeded() {
        let registry = Registry::default();
        for name in ["required", "min", "max", "numeric", "email", "eqfield"] {
            assert!(registry.contains(name), "missing {name}");
        }
        assert!(registry.resolve("required").unwrap().is_builtin());
        assert_eq!(
            registry.resolve("required").unwrap().kind(),
            ErrorKind::Required
        );
    }

    #[test]
    fn empty_builder_has_no_rules() {
        let registry = RegistryBuilder::empty().build();
        assert!(registry.rule_names().is_empty());
    }

    #[test]
    fn unknown_rule_fails_to_resolve() {
        let registry = Registry::default();
        assert_eq!(
            registry.resolve("nope").unwrap_err(),
            RegistryError::UnknownRule {
                name: "nope".to_string()
            }
        );
    }

    #[test]
    fn registering_over_builtin_is_rejected() {
        let result = RegistryBuilder::new().register_rule("required", |_| true);
        assert!(matches!(result, Err(RegistryError::DuplicateRule { .. })));
    }

    #[test]
    fn structural_names_are_reserved() {
        for name in ["dive", "keys", "endkeys", "omitempty", "-"] {
            let result = RegistryBuilder::new().register_rule(name, |_| true);
            assert!(
                matches!(result, Err(RegistryError::ReservedName { .. })),
                "{name} accepted"
            );
        }
        assert!(matches!(
            RegistryBuilder::new().register_rule(" ", |_| true),
            Err(RegistryError::EmptyName)
        ));
    }

    #[test]
    fn override_replaces_and_keeps_kind() {
        let registry = RegistryBuilder::new()
            .override_rule("email", |_| true)
            .unwrap()
            .build();

        let def = registry.resolve("email").unwrap();
        assert!(!def.is_builtin());
        assert_eq!(def.kind(), ErrorKind::Format);
    }

    #[test]
    fn custom_rule_is_resolvable() {
        let registry = RegistryBuilder::new()
            .register_rule("even", |fl| {
                matches!(fl.shape(), crate::core::Shape::Int(n) if n % 2 == 0)
            })
            .unwrap()
            .build();

        let def = registry.resolve("even").unwrap();
        assert_eq!(def.kind(), ErrorKind::Custom);
    }

    #[test]
    fn alias_is_stored() {
        let registry = RegistryBuilder::new()
            .register_alias("varchar", "required,max=255")
            .unwrap()
            .build();
        assert_eq!(registry.alias("varchar"), Some("required,max=255"));
        assert_eq!(registry.alias_count(), 1);
    }

    #[test]
    fn direct_self_reference_is_cyclic() {
        let result = RegistryBuilder::new().register_alias("loop", "required,loop");
        assert!(matches!(result, Err(RegistryError::CyclicAlias { .. })));
    }

    #[test]
    fn indirect_cycle_reports_chain() {
        let result = RegistryBuilder::new()
            .register_alias("a", "b,required")
            .unwrap()
            .register_alias("b", "a");

        match result {
            Err(RegistryError::CyclicAlias { name, chain }) => {
                assert_eq!(name, "b");
                assert_eq!(chain, vec!["b", "a", "b"]);
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("expected a cycle"),
        }
    }

    #[test]
    fn alias_cannot_shadow_rule() {
        let result = RegistryBuilder::new().register_alias("min", "max=3");
        assert!(matches!(result, Err(RegistryError::DuplicateRule { .. })));
    }

    #[test]
    fn malformed_alias_is_rejected() {
        let result = RegistryBuilder::new().register_alias("broken", "required,,min=1");
        assert!(matches!(result, Err(RegistryError::MalformedAlias { .. })));

        let result = RegistryBuilder::new().register_alias("dangling", "dive,keys,min=1");
        assert!(matches!(result, Err(RegistryError::MalformedAlias { .. })));
    }

    #[test]
    fn bulk_aliases_register_in_order() {
        let registry = RegistryBuilder::new()
            .register_aliases([("short", "max=10"), ("name", "required,short")])
            .unwrap()
            .build();
        assert_eq!(registry.alias("name"), Some("required,short"));
    }
}
