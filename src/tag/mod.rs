//! Tag parsing.
//!
//! Turns a tag string such as `required,dive,keys,min=2,endkeys` into a
//! [`FieldTag`]: the ordered checks that apply to the value itself, plus an
//! optional [`DiveTag`] describing the rules for the elements (and keys) of a
//! collection.

mod error;
mod parser;

pub use error::TagError;
pub use parser::{is_structural, parse_tag, tokenize, DIVE, END_KEYS, KEYS, OMIT_EMPTY, SKIP};

pub(crate) use parser::{split_params, unquote};

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Source of alias definitions consulted while parsing.
pub trait AliasLookup {
    fn alias(&self, name: &str) -> Option<&str>;
}

impl AliasLookup for () {
    fn alias(&self, _name: &str) -> Option<&str> {
        None
    }
}

impl<S: BuildHasher> AliasLookup for HashMap<String, String, S> {
    fn alias(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl AliasLookup for BTreeMap<String, String> {
    fn alias(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// One parsed rule invocation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RuleSpec {
    name: String,
    param: String,
}

impl RuleSpec {
    pub fn new(name: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param: param.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw parameter text after `=`, empty when absent.
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Space separated sub-parameters; single quotes group words.
    pub fn params(&self) -> Vec<&str> {
        split_params(&self.param)
    }

    /// Rendered as it would appear in a tag.
    pub fn text(&self) -> String {
        if self.param.is_empty() {
            self.name.clone()
        } else {
            format!("{}={}", self.name, self.param)
        }
    }
}

/// One comma separated position of a tag.
///
/// Usually a single rule; `a|b` yields a group that passes when any
/// alternative passes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Check {
    alternatives: Vec<RuleSpec>,
}

impl Check {
    pub(crate) fn new(alternatives: Vec<RuleSpec>) -> Self {
        Self { alternatives }
    }

    pub fn alternatives(&self) -> &[RuleSpec] {
        &self.alternatives
    }

    pub fn is_group(&self) -> bool {
        self.alternatives.len() > 1
    }

    pub fn is_required(&self) -> bool {
        matches!(self.alternatives.as_slice(), [only] if only.name == "required")
    }

    /// The tag text reported when this check fails.
    pub fn label(&self) -> String {
        match self.alternatives.as_slice() {
            [only] => only.name.clone(),
            many => many
                .iter()
                .map(RuleSpec::text)
                .collect::<Vec<_>>()
                .join("|"),
        }
    }

    /// The parameter reported when this check fails.
    pub fn param(&self) -> &str {
        match self.alternatives.as_slice() {
            [only] => &only.param,
            _ => "",
        }
    }
}

/// Parsed rules attached to one field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldTag {
    pub(crate) skip: bool,
    pub(crate) omit_empty: bool,
    pub(crate) checks: Vec<Check>,
    pub(crate) dive: Option<Box<DiveTag>>,
}

impl FieldTag {
    pub(crate) fn skipped() -> Self {
        Self {
            skip: true,
            ..Self::default()
        }
    }

    /// `-`: the field is ignored entirely.
    pub fn is_skip(&self) -> bool {
        self.skip
    }

    pub fn omits_empty(&self) -> bool {
        self.omit_empty
    }

    /// Checks that apply to the value itself, in declaration order.
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Every rule before `dive`, flattening OR groups.
    pub fn rules(&self) -> impl Iterator<Item = &RuleSpec> {
        self.checks.iter().flat_map(|check| check.alternatives.iter())
    }

    pub fn dive(&self) -> Option<&DiveTag> {
        self.dive.as_deref()
    }

    pub fn has_required(&self) -> bool {
        self.checks.iter().any(Check::is_required)
    }

    pub fn is_empty(&self) -> bool {
        !self.skip && !self.omit_empty && self.checks.is_empty() && self.dive.is_none()
    }
}

/// Rules applied to each element of a collection after `dive`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiveTag {
    pub(crate) keys: Option<FieldTag>,
    pub(crate) elements: FieldTag,
}

impl DiveTag {
    /// Rules between `keys` and `endkeys`, applied to map keys.
    pub fn keys(&self) -> Option<&FieldTag> {
        self.keys.as_ref()
    }

    /// Rules applied to sequence elements or map values.
    pub fn elements(&self) -> &FieldTag {
        &self.elements
    }
}
