//! Built-in rules.
//!
//! Size rules (`min`, `max`, `len`, `gt`, ...) read their parameter in one of
//! three modes depending on the value: strings are measured in characters,
//! numbers by value and collections by element count.

use super::error::{ErrorKind, RuleError};
use super::level::FieldLevel;
use super::RuleDef;
use crate::core::Shape;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

type Builtin = fn(&FieldLevel<'_>) -> Result<bool, RuleError>;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@",
        r"[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
        r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    ))
    .expect("email pattern compiles")
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/?#]+[^\s]*$").expect("url pattern compiles")
});

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("uuid pattern compiles")
});

static NUMERIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?$").expect("numeric pattern compiles"));

static NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("number pattern compiles"));

static ALPHA_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").expect("alpha pattern compiles"));

static ALPHANUMERIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("alphanum pattern compiles"));

/// The built-in rule table, built once per process.
pub(crate) static BUILTINS: Lazy<Vec<RuleDef>> = Lazy::new(|| {
    let table: [(&str, ErrorKind, Builtin); 34] = [
        ("required", ErrorKind::Required, required),
        ("isdefault", ErrorKind::Required, is_default),
        ("min", ErrorKind::Bounds, min),
        ("max", ErrorKind::Bounds, max),
        ("len", ErrorKind::Bounds, len),
        ("eq", ErrorKind::Bounds, eq),
        ("ne", ErrorKind::Bounds, ne),
        ("gt", ErrorKind::Bounds, gt),
        ("gte", ErrorKind::Bounds, gte),
        ("lt", ErrorKind::Bounds, lt),
        ("lte", ErrorKind::Bounds, lte),
        ("oneof", ErrorKind::Bounds, one_of),
        ("email", ErrorKind::Format, email),
        ("url", ErrorKind::Format, url),
        ("uuid", ErrorKind::Format, uuid),
        ("numeric", ErrorKind::Format, numeric),
        ("number", ErrorKind::Format, number),
        ("alpha", ErrorKind::Format, alpha),
        ("alphanum", ErrorKind::Format, alphanumeric),
        ("lowercase", ErrorKind::Format, lowercase),
        ("uppercase", ErrorKind::Format, uppercase),
        ("contains", ErrorKind::Format, contains),
        ("excludes", ErrorKind::Format, excludes),
        ("startswith", ErrorKind::Format, starts_with),
        ("endswith", ErrorKind::Format, ends_with),
        ("boolean", ErrorKind::Format, boolean),
        ("eqfield", ErrorKind::CrossField, eq_field),
        ("nefield", ErrorKind::CrossField, ne_field),
        ("gtfield", ErrorKind::CrossField, gt_field),
        ("gtefield", ErrorKind::CrossField, gte_field),
        ("ltfield", ErrorKind::CrossField, lt_field),
        ("ltefield", ErrorKind::CrossField, lte_field),
        ("ascii", ErrorKind::Format, ascii),
        ("printascii", ErrorKind::Format, print_ascii),
    ];

    table
        .into_iter()
        .map(|(name, kind, check)| RuleDef::new(name, kind, Arc::new(check), true))
        .collect()
});

// Presence

/// Collections must be non-empty even behind a pointer; any other value
/// reached through a non-nil pointer is present.
fn required(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    match fl.shape() {
        Shape::Seq(_) | Shape::Map(_) => Ok(!fl.shape().is_zero()),
        shape => Ok(fl.through_pointer() || !shape.is_zero()),
    }
}

fn is_default(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(!fl.through_pointer() && fl.shape().is_zero())
}

// Tri-mode comparisons

fn parse_param<T>(fl: &FieldLevel<'_>, raw: &str) -> Result<T, RuleError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| fl.invalid_param(e.to_string()))
}

/// Order the value against the rule parameter.
fn against_param(fl: &FieldLevel<'_>) -> Result<Option<Ordering>, RuleError> {
    let param = fl.param();
    match fl.shape() {
        Shape::Str(_) | Shape::Seq(_) | Shape::Map(_) => {
            let count = fl.shape().len().unwrap_or_default();
            Ok(Some(count.cmp(&parse_param::<usize>(fl, param)?)))
        }
        Shape::Int(n) => Ok(Some(i128::from(*n).cmp(&parse_param::<i128>(fl, param)?))),
        Shape::Uint(n) => Ok(Some(i128::from(*n).cmp(&parse_param::<i128>(fl, param)?))),
        Shape::Float(n) => Ok(n.partial_cmp(&parse_param::<f64>(fl, param)?)),
        _ => Err(fl.unsupported()),
    }
}

fn min(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    gte(fl)
}

fn max(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    lte(fl)
}

fn len(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(against_param(fl)? == Some(Ordering::Equal))
}

fn gt(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(against_param(fl)? == Some(Ordering::Greater))
}

fn gte(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(matches!(
        against_param(fl)?,
        Some(Ordering::Greater | Ordering::Equal)
    ))
}

fn lt(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(against_param(fl)? == Some(Ordering::Less))
}

fn lte(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(matches!(
        against_param(fl)?,
        Some(Ordering::Less | Ordering::Equal)
    ))
}

/// Strings and booleans compare by value; everything else like `len`.
fn eq(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    match fl.shape() {
        Shape::Str(s) => Ok(s.as_ref() == fl.param()),
        Shape::Bool(b) => Ok(*b == parse_param::<bool>(fl, fl.param())?),
        _ => len(fl),
    }
}

fn ne(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    eq(fl).map(|equal| !equal)
}

fn one_of(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    let options = fl.params();
    match fl.shape() {
        Shape::Str(s) => Ok(options.iter().any(|option| *option == s.as_ref())),
        Shape::Int(n) => {
            for option in &options {
                if parse_param::<i64>(fl, option)? == *n {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Shape::Uint(n) => {
            for option in &options {
                if parse_param::<u64>(fl, option)? == *n {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Err(fl.unsupported()),
    }
}

// String formats

fn text<'f>(fl: &'f FieldLevel<'_>) -> Result<&'f str, RuleError> {
    fl.as_str().ok_or_else(|| fl.unsupported())
}

fn email(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(EMAIL_REGEX.is_match(text(fl)?))
}

fn url(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(URL_REGEX.is_match(text(fl)?))
}

fn uuid(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(UUID_REGEX.is_match(text(fl)?))
}

/// Numbers always pass; strings must look like a decimal number.
fn numeric(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    match fl.shape() {
        Shape::Int(_) | Shape::Uint(_) | Shape::Float(_) => Ok(true),
        Shape::Str(s) => Ok(NUMERIC_REGEX.is_match(s)),
        _ => Err(fl.unsupported()),
    }
}

/// Numbers always pass; strings must be unsigned digits only.
fn number(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    match fl.shape() {
        Shape::Int(_) | Shape::Uint(_) | Shape::Float(_) => Ok(true),
        Shape::Str(s) => Ok(NUMBER_REGEX.is_match(s)),
        _ => Err(fl.unsupported()),
    }
}

fn alpha(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(ALPHA_REGEX.is_match(text(fl)?))
}

fn alphanumeric(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(ALPHANUMERIC_REGEX.is_match(text(fl)?))
}

fn lowercase(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    let s = text(fl)?;
    Ok(s == s.to_lowercase())
}

fn uppercase(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    let s = text(fl)?;
    Ok(s == s.to_uppercase())
}

fn contains(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(text(fl)?.contains(fl.param()))
}

fn excludes(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(!text(fl)?.contains(fl.param()))
}

fn starts_with(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(text(fl)?.starts_with(fl.param()))
}

fn ends_with(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(text(fl)?.ends_with(fl.param()))
}

fn ascii(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(text(fl)?.is_ascii())
}

fn print_ascii(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(text(fl)?.chars().all(|c| (' '..='~').contains(&c)))
}

fn boolean(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    match fl.shape() {
        Shape::Bool(_) => Ok(true),
        Shape::Str(s) => Ok(matches!(
            s.as_ref(),
            "1" | "0" | "t" | "f" | "T" | "F" | "true" | "false" | "TRUE" | "FALSE" | "True"
                | "False"
        )),
        _ => Err(fl.unsupported()),
    }
}

// Cross-field

fn as_f64(shape: &Shape<'_>) -> Option<f64> {
    match shape {
        Shape::Int(n) => Some(*n as f64),
        Shape::Uint(n) => Some(*n as f64),
        Shape::Float(n) => Some(*n),
        _ => None,
    }
}

fn numeric_order(a: &Shape<'_>, b: &Shape<'_>) -> Option<Ordering> {
    match (a, b) {
        (Shape::Int(x), Shape::Int(y)) => Some(x.cmp(y)),
        (Shape::Uint(x), Shape::Uint(y)) => Some(x.cmp(y)),
        (Shape::Int(x), Shape::Uint(y)) => Some(i128::from(*x).cmp(&i128::from(*y))),
        (Shape::Uint(x), Shape::Int(y)) => Some(i128::from(*x).cmp(&i128::from(*y))),
        _ => as_f64(a)?.partial_cmp(&as_f64(b)?),
    }
}

/// Equality used by `eqfield`/`nefield`: strings by content, collections by
/// length.
fn same_value(a: &Shape<'_>, b: &Shape<'_>) -> bool {
    match (a, b) {
        (Shape::Str(x), Shape::Str(y)) => x == y,
        (Shape::Bool(x), Shape::Bool(y)) => x == y,
        (Shape::Seq(x), Shape::Seq(y)) => x.len() == y.len(),
        (Shape::Map(x), Shape::Map(y)) => x.len() == y.len(),
        (Shape::Ptr(None), Shape::Ptr(None)) => true,
        _ => numeric_order(a, b) == Some(Ordering::Equal),
    }
}

/// Ordering used by `gtfield` and friends: strings and collections by length.
fn field_order(a: &Shape<'_>, b: &Shape<'_>) -> Option<Ordering> {
    match (a.len(), b.len()) {
        (Some(x), Some(y)) if a.kind() == b.kind() => Some(x.cmp(&y)),
        _ => numeric_order(a, b),
    }
}

fn eq_field(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    let other = fl.sibling(fl.param())?;
    Ok(same_value(fl.shape(), &other))
}

fn ne_field(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    eq_field(fl).map(|equal| !equal)
}

fn field_ordering(fl: &FieldLevel<'_>) -> Result<Option<Ordering>, RuleError> {
    let other = fl.sibling(fl.param())?;
    Ok(field_order(fl.shape(), &other))
}

fn gt_field(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(field_ordering(fl)? == Some(Ordering::Greater))
}

fn gte_field(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(matches!(
        field_ordering(fl)?,
        Some(Ordering::Greater | Ordering::Equal)
    ))
}

fn lt_field(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(field_ordering(fl)? == Some(Ordering::Less))
}

fn lte_field(fl: &FieldLevel<'_>) -> Result<bool, RuleError> {
    Ok(matches!(
        field_ordering(fl)?,
        Some(Ordering::Less | Ordering::Equal)
    ))
}
