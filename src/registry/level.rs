//! The view of a field handed to rule functions.

use super::error::RuleError;
use crate::core::{resolve, Kind, Shape, StructShape, Validatable};
use crate::tag::{split_params, unquote};

const MAX_DEREF: usize = 64;

/// Where sibling references of cross-field rules are resolved.
#[derive(Clone, Copy)]
pub(crate) enum Scope<'a> {
    /// No enclosing struct; cross-field rules cannot resolve anything.
    Detached,
    /// Fields of the struct that declares the current field.
    Struct(&'a StructShape<'a>),
    /// A single comparison value supplied by the caller.
    Value(&'a dyn Validatable),
}

/// Context provided to a rule function.
///
/// Gives access to the (dereferenced) value under test, the rule parameter,
/// and a resolver for sibling fields of the enclosing struct.
pub struct FieldLevel<'a> {
    shape: &'a Shape<'a>,
    field: &'a str,
    rule: &'a str,
    param: &'a str,
    through_pointer: bool,
    scope: Scope<'a>,
}

impl<'a> FieldLevel<'a> {
    pub(crate) fn new(
        shape: &'a Shape<'a>,
        field: &'a str,
        rule: &'a str,
        param: &'a str,
        through_pointer: bool,
        scope: Scope<'a>,
    ) -> Self {
        Self {
            shape,
            field,
            rule,
            param,
            through_pointer,
            scope,
        }
    }

    pub fn shape(&self) -> &Shape<'a> {
        self.shape
    }

    pub fn kind(&self) -> Kind {
        self.shape.kind()
    }

    /// The value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        self.shape.as_str()
    }

    /// Name of the field being validated, including any index or key.
    pub fn field_name(&self) -> &str {
        self.field
    }

    pub fn rule(&self) -> &str {
        self.rule
    }

    /// The parameter with one pair of surrounding quotes removed.
    pub fn param(&self) -> &str {
        unquote(self.param)
    }

    pub fn raw_param(&self) -> &str {
        self.param
    }

    pub fn params(&self) -> Vec<&str> {
        split_params(self.param)
    }

    /// Whether the value was reached through a non-nil pointer.
    pub fn through_pointer(&self) -> bool {
        self.through_pointer
    }

    /// Resolve a sibling field by name, dereferencing pointers.
    ///
    /// Dotted references (`inner.field`) descend into nested structs. When
    /// validating a single variable against a comparison value, the
    /// comparison value is returned whatever the reference says.
    pub fn sibling(&self, reference: &str) -> Result<Shape<'a>, RuleError> {
        let unknown = || RuleError::UnknownFieldReference {
            rule: self.rule.to_string(),
            reference: reference.to_string(),
        };

        match self.scope {
            Scope::Detached => Err(unknown()),
            Scope::Value(other) => Ok(resolve(other.shape(), MAX_DEREF)),
            Scope::Struct(parent) => {
                let mut segments = reference.split('.');
                let first = segments.next().unwrap_or_default();
                let value: &'a dyn Validatable = parent.get(first).ok_or_else(unknown)?.value;
                let mut current = resolve(value.shape(), MAX_DEREF);

                for segment in segments {
                    let Shape::Struct(inner) = current else {
                        return Err(unknown());
                    };
                    let value: &'a dyn Validatable = inner.get(segment).ok_or_else(unknown)?.value;
                    current = resolve(value.shape(), MAX_DEREF);
                }

                Ok(current)
            }
        }
    }

    pub fn invalid_param(&self, reason: impl Into<String>) -> RuleError {
        RuleError::InvalidParam {
            rule: self.rule.to_string(),
            param: self.param.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(&self) -> RuleError {
        RuleError::UnsupportedKind {
            rule: self.rule.to_string(),
            kind: self.kind(),
        }
    }
}
