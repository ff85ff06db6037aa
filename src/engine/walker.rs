//! Field walker.
//!
//! Descends through a value graph following its runtime shape and the parsed
//! tag of each field: pointers are dereferenced, struct fields are visited in
//! declaration order, and `dive` fans the element rules out over sequences and
//! maps. Failed checks are reported to the context; only faults in the rule
//! declarations or the depth guard stop the walk.

use super::context::ValidationContext;
use super::error::EngineError;
use super::{Outcome, Validator};
use crate::core::{resolve, FieldPath, Shape, StructShape, Validatable};
use crate::registry::{ErrorKind, FieldLevel, RuleError, Scope};
use crate::tag::{Check, FieldTag};

/// Selects which top-level fields of the root struct are visited.
#[derive(Clone, Copy)]
pub(crate) enum FieldFilter<'f> {
    All,
    Only(&'f [&'f str]),
    Except(&'f [&'f str]),
}

impl FieldFilter<'_> {
    fn allows(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(names) => names.contains(&name),
            Self::Except(names) => !names.contains(&name),
        }
    }
}

/// Whether the remaining rules of a field (and its children) still run.
enum Flow {
    Continue,
    Stop,
}

pub(crate) struct Walker<'v> {
    validator: &'v Validator,
    ctx: ValidationContext,
}

impl<'v> Walker<'v> {
    pub(crate) fn new(validator: &'v Validator, root: &str) -> Self {
        Self {
            validator,
            ctx: ValidationContext::new(root),
        }
    }

    pub(crate) fn finish(self) -> Outcome {
        self.ctx.finish()
    }

    pub(crate) fn walk_struct(
        &mut self,
        shape: &StructShape<'_>,
        path: &FieldPath,
        depth: usize,
        filter: FieldFilter<'_>,
    ) -> Result<(), EngineError> {
        for field in shape.fields() {
            if !filter.allows(field.name) {
                continue;
            }

            let child = path.field(field.name);
            let tag = self
                .validator
                .field_tag(field.tag)
                .map_err(|source| EngineError::MalformedTag {
                    field: child.to_string(),
                    source,
                })?;
            if tag.is_skip() {
                continue;
            }

            self.walk_field(field.value, &tag, Scope::Struct(shape), &child, depth + 1)?;
        }
        Ok(())
    }

    fn walk_field(
        &mut self,
        value: &dyn Validatable,
        tag: &FieldTag,
        scope: Scope<'_>,
        path: &FieldPath,
        depth: usize,
    ) -> Result<(), EngineError> {
        self.walk_shape(value.shape(), tag, scope, path, depth)
    }

    pub(crate) fn walk_shape(
        &mut self,
        mut shape: Shape<'_>,
        tag: &FieldTag,
        scope: Scope<'_>,
        path: &FieldPath,
        depth: usize,
    ) -> Result<(), EngineError> {
        let limit = self.validator.config().max_depth;
        let too_deep = || EngineError::MaxDepthExceeded {
            field: path.to_string(),
            limit,
        };
        if depth > limit {
            return Err(too_deep());
        }

        let mut hops = 0;
        let mut through_pointer = false;
        while let Shape::Ptr(target) = &shape {
            let Some(target) = *target else {
                if !tag.omits_empty() && tag.has_required() {
                    self.ctx.report(
                        path,
                        "required".to_string(),
                        String::new(),
                        ErrorKind::Required,
                        None,
                    );
                }
                return Ok(());
            };
            hops += 1;
            if depth + hops > limit {
                return Err(too_deep());
            }
            through_pointer = true;
            shape = target.shape();
        }

        if tag.omits_empty() && shape.is_zero() {
            return Ok(());
        }

        if let Flow::Stop = self.apply_checks(&shape, tag, scope, path, through_pointer)? {
            return Ok(());
        }

        match (tag.dive(), &shape) {
            (Some(dive), Shape::Seq(items)) => {
                for (i, item) in items.iter().enumerate() {
                    self.walk_field(*item, dive.elements(), scope, &path.index(i), depth + 1)?;
                }
                Ok(())
            }
            (Some(dive), Shape::Map(entries)) => {
                let mut entries: Vec<_> = entries
                    .iter()
                    .enumerate()
                    .map(|(i, (key, value))| (key_label(*key, i, limit), *key, *value))
                    .collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));

                for (label, key, value) in entries {
                    if let Some(keys) = dive.keys() {
                        let key_path = path.map_key(&label);
                        self.walk_field(key, keys, scope, &key_path, depth + 1)?;
                    }
                    let value_path = path.key(&label);
                    self.walk_field(value, dive.elements(), scope, &value_path, depth + 1)?;
                }
                Ok(())
            }
            (Some(_), other) => Err(EngineError::DiveOnNonCollection {
                field: path.to_string(),
                kind: other.kind(),
            }),
            (None, Shape::Struct(inner)) => self.walk_struct(inner, path, depth, FieldFilter::All),
            (None, _) => Ok(()),
        }
    }

    fn apply_checks(
        &mut self,
        shape: &Shape<'_>,
        tag: &FieldTag,
        scope: Scope<'_>,
        path: &FieldPath,
        through_pointer: bool,
    ) -> Result<Flow, EngineError> {
        let field = path.leaf();

        for check in tag.checks() {
            let (passed, kind) =
                self.evaluate(check, shape, scope, path, &field, through_pointer)?;
            if passed {
                continue;
            }

            self.ctx.report(
                path,
                check.label(),
                check.param().to_string(),
                kind,
                shape.render(),
            );
            if check.is_required() || self.validator.config().fail_fast {
                return Ok(Flow::Stop);
            }
        }

        Ok(Flow::Continue)
    }

    /// Run one check; an OR group passes as soon as one alternative does.
    /// The reported kind is that of the first alternative.
    fn evaluate(
        &self,
        check: &Check,
        shape: &Shape<'_>,
        scope: Scope<'_>,
        path: &FieldPath,
        field: &str,
        through_pointer: bool,
    ) -> Result<(bool, ErrorKind), EngineError> {
        let mut kind = ErrorKind::Custom;

        for (i, rule) in check.alternatives().iter().enumerate() {
            let def = self
                .validator
                .registry()
                .resolve(rule.name())
                .map_err(|_| EngineError::UnknownRule {
                    field: path.to_string(),
                    rule: rule.name().to_string(),
                })?;
            if i == 0 {
                kind = def.kind();
            }

            let level = FieldLevel::new(
                shape,
                field,
                rule.name(),
                rule.param(),
                through_pointer,
                scope,
            );
            if def.check(&level).map_err(|e| rule_fault(e, path))? {
                return Ok((true, kind));
            }
        }

        Ok((false, kind))
    }
}

/// Map keys are labelled by their rendered value; non-scalar keys fall back
/// to their position.
fn key_label(key: &dyn Validatable, index: usize, limit: usize) -> String {
    resolve(key.shape(), limit)
        .render()
        .unwrap_or_else(|| format!("#{index}"))
}

fn rule_fault(error: RuleError, path: &FieldPath) -> EngineError {
    let field = path.to_string();
    match error {
        RuleError::InvalidParam {
            rule,
            param,
            reason,
        } => EngineError::InvalidParam {
            field,
            rule,
            param,
            reason,
        },
        RuleError::UnsupportedKind { rule, kind } => {
            EngineError::UnsupportedKind { field, rule, kind }
        }
        RuleError::UnknownFieldReference { rule, reference } => {
            EngineError::UnknownFieldReference {
                field,
                rule,
                reference,
            }
        }
    }
}
