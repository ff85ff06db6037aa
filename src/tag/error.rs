//! Malformed tag errors.

use thiserror::Error;

/// Errors raised while parsing a tag string.
///
/// These describe a broken rule declaration, not invalid data, and abort the
/// validation call that encountered them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TagError {
    #[error("empty rule at position {position} in tag '{tag}'")]
    EmptyToken { tag: String, position: usize },

    #[error("missing rule name in '{token}'")]
    EmptyRuleName { token: String },

    #[error("unterminated quote in tag '{tag}'")]
    UnclosedQuote { tag: String },

    #[error("'keys' must directly follow 'dive' in tag '{tag}'")]
    KeysWithoutDive { tag: String },

    #[error("'keys' without matching 'endkeys' in tag '{tag}'")]
    UnclosedKeys { tag: String },

    #[error("'endkeys' without opening 'keys' in tag '{tag}'")]
    UnexpectedEndKeys { tag: String },

    #[error("no key rules between 'keys' and 'endkeys' in tag '{tag}'")]
    EmptyKeys { tag: String },

    #[error("structural marker '{name}' cannot appear in '{token}'")]
    StructuralInGroup { name: String, token: String },

    #[error("alias '{alias}' expands too deeply")]
    AliasTooDeep { alias: String },
}
