//! Per-call validation state.

use super::error::FieldError;
use super::Outcome;
use crate::core::FieldPath;
use crate::registry::ErrorKind;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// State owned by a single validation call.
///
/// Carries the root type name used to build namespaces and the failures
/// collected so far. Never shared between calls.
pub struct ValidationContext {
    root: String,
    failures: Vec<Validation<(), NonEmptyVec<FieldError>>>,
}

impl ValidationContext {
    pub(crate) fn new(root: &str) -> Self {
        Self {
            root: root.to_string(),
            failures: Vec::new(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn error_count(&self) -> usize {
        self.failures.len()
    }

    pub(crate) fn namespace(&self, path: &FieldPath) -> String {
        match (self.root.is_empty(), path.is_root()) {
            (true, _) => path.to_string(),
            (false, true) => self.root.clone(),
            (false, false) => format!("{}.{}", self.root, path),
        }
    }

    /// Record a failed check at `path`.
    pub(crate) fn report(
        &mut self,
        path: &FieldPath,
        tag: String,
        param: String,
        kind: ErrorKind,
        value: Option<String>,
    ) {
        let field = path.leaf();
        let message = format!("Field validation for '{field}' failed on the '{tag}' tag");
        tracing::trace!(path = %path, tag = %tag, "rule failed");

        self.failures.push(Validation::fail(FieldError {
            namespace: self.namespace(path),
            path: path.to_string(),
            field,
            tag,
            param,
            kind,
            value,
            message,
        }));
    }

    /// Combine everything reported into one outcome, in report order.
    pub(crate) fn finish(self) -> Outcome {
        if self.failures.is_empty() {
            return Validation::success(());
        }
        tracing::debug!(
            root = %self.root,
            errors = self.failures.len(),
            "validation finished with failures"
        );
        Validation::all_vec(self.failures).map(|_| ())
    }
}
