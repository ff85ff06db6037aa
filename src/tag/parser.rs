//! Tag string parsing.
//!
//! A tag is a comma separated list of tokens. Each token is a rule name with
//! an optional `=param`, or several such rules joined by `|`. Aliases are
//! expanded in place before the structural markers are interpreted, so an
//! alias behaves exactly like the tokens it stands for.

use super::error::TagError;
use super::{AliasLookup, Check, DiveTag, FieldTag, RuleSpec};

pub const DIVE: &str = "dive";
pub const KEYS: &str = "keys";
pub const END_KEYS: &str = "endkeys";
pub const OMIT_EMPTY: &str = "omitempty";
pub const SKIP: &str = "-";

/// Names interpreted by the walker rather than dispatched to rule functions.
pub const STRUCTURAL: [&str; 4] = [DIVE, KEYS, END_KEYS, OMIT_EMPTY];

const MAX_ALIAS_DEPTH: usize = 32;

pub fn is_structural(name: &str) -> bool {
    STRUCTURAL.contains(&name)
}

/// Parse a tag string, expanding aliases known to `aliases`.
///
/// Unknown rule names are accepted here and only rejected when a value is
/// evaluated against them.
///
/// # Example
///
/// ```rust
/// use tagcheck::tag::parse_tag;
/// use std::collections::HashMap;
///
/// let mut aliases = HashMap::new();
/// aliases.insert("varchar".to_string(), "required,max=255".to_string());
///
/// let aliased = parse_tag("varchar", &aliases).unwrap();
/// let literal = parse_tag("required,max=255", &()).unwrap();
/// assert_eq!(aliased, literal);
/// ```
pub fn parse_tag<A>(tag: &str, aliases: &A) -> Result<FieldTag, TagError>
where
    A: AliasLookup + ?Sized,
{
    let trimmed = tag.trim();
    if trimmed == SKIP {
        return Ok(FieldTag::skipped());
    }
    if trimmed.is_empty() {
        return Ok(FieldTag::default());
    }

    let tokens = expand(tokenize(trimmed)?, aliases, 0)?;
    build(&tokens, trimmed)
}

/// Split a tag into trimmed top-level tokens.
pub fn tokenize(tag: &str) -> Result<Vec<String>, TagError> {
    let pieces = split_outside_quotes(tag, ',').ok_or_else(|| TagError::UnclosedQuote {
        tag: tag.to_string(),
    })?;

    pieces
        .into_iter()
        .enumerate()
        .map(|(position, piece)| {
            let token = piece.trim();
            if token.is_empty() {
                Err(TagError::EmptyToken {
                    tag: tag.to_string(),
                    position,
                })
            } else {
                Ok(token.to_string())
            }
        })
        .collect()
}

fn expand<A>(tokens: Vec<String>, aliases: &A, depth: usize) -> Result<Vec<String>, TagError>
where
    A: AliasLookup + ?Sized,
{
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        match aliases.alias(&token) {
            Some(expansion) => {
                if depth >= MAX_ALIAS_DEPTH {
                    return Err(TagError::AliasTooDeep { alias: token });
                }
                out.extend(expand(tokenize(expansion)?, aliases, depth + 1)?);
            }
            None => out.push(token),
        }
    }
    Ok(out)
}

fn build(tokens: &[String], raw: &str) -> Result<FieldTag, TagError> {
    let mut tag = FieldTag::default();

    for (i, token) in tokens.iter().enumerate() {
        match token.as_str() {
            OMIT_EMPTY => tag.omit_empty = true,
            DIVE => {
                tag.dive = Some(Box::new(build_dive(&tokens[i + 1..], raw)?));
                return Ok(tag);
            }
            KEYS => {
                return Err(TagError::KeysWithoutDive {
                    tag: raw.to_string(),
                })
            }
            END_KEYS => {
                return Err(TagError::UnexpectedEndKeys {
                    tag: raw.to_string(),
                })
            }
            other => tag.checks.push(parse_check(other)?),
        }
    }

    Ok(tag)
}

fn build_dive(rest: &[String], raw: &str) -> Result<DiveTag, TagError> {
    if rest.first().map(String::as_str) != Some(KEYS) {
        return Ok(DiveTag {
            keys: None,
            elements: build(rest, raw)?,
        });
    }

    let mut depth = 0usize;
    let mut close = None;
    for (i, token) in rest.iter().enumerate() {
        match token.as_str() {
            KEYS => depth += 1,
            END_KEYS => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }

    let close = close.ok_or_else(|| TagError::UnclosedKeys {
        tag: raw.to_string(),
    })?;
    let region = &rest[1..close];
    if region.is_empty() {
        return Err(TagError::EmptyKeys {
            tag: raw.to_string(),
        });
    }

    Ok(DiveTag {
        keys: Some(build(region, raw)?),
        elements: build(&rest[close + 1..], raw)?,
    })
}

fn parse_check(token: &str) -> Result<Check, TagError> {
    let alternatives = split_outside_quotes(token, '|').ok_or_else(|| TagError::UnclosedQuote {
        tag: token.to_string(),
    })?;
    let grouped = alternatives.len() > 1;

    let mut rules = Vec::with_capacity(alternatives.len());
    for alternative in alternatives {
        let alternative = alternative.trim();
        let (name, param) = alternative.split_once('=').unwrap_or((alternative, ""));
        let name = name.trim();
        if name.is_empty() {
            return Err(TagError::EmptyRuleName {
                token: token.to_string(),
            });
        }
        if grouped && is_structural(name) {
            return Err(TagError::StructuralInGroup {
                name: name.to_string(),
                token: token.to_string(),
            });
        }
        rules.push(RuleSpec::new(name, unescape(param)));
    }

    Ok(Check::new(rules))
}

/// Split on `sep` except inside single quotes. `None` on an unterminated quote.
fn split_outside_quotes(input: &str, sep: char) -> Option<Vec<&str>> {
    let mut pieces = Vec::new();
    let mut quoted = false;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        if c == '\'' {
            quoted = !quoted;
        } else if c == sep && !quoted {
            pieces.push(&input[start..i]);
            start = i + c.len_utf8();
        }
    }

    if quoted {
        return None;
    }
    pieces.push(&input[start..]);
    Some(pieces)
}

fn unescape(param: &str) -> String {
    param.replace("0x2C", ",").replace("0x7C", "|")
}

/// Split a parameter into space separated sub-parameters, honouring quotes.
pub(crate) fn split_params(param: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = param.trim_start();

    while !rest.is_empty() {
        if let Some(body) = rest.strip_prefix('\'') {
            let end = body.find('\'').unwrap_or(body.len());
            out.push(&body[..end]);
            rest = body.get(end + 1..).unwrap_or("").trim_start();
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            out.push(&rest[..end]);
            rest = rest[end..].trim_start();
        }
    }

    out
}

/// Strip one pair of surrounding single quotes from a parameter.
pub(crate) fn unquote(param: &str) -> &str {
    match param.strip_prefix('\'').and_then(|p| p.strip_suffix('\'')) {
        Some(inner) if !inner.contains('\'') => inner,
        _ => param,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn aliases(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_rules_in_declaration_order() {
        let tag = parse_tag("required,numeric,min=5,max=10", &()).unwrap();
        let names: Vec<_> = tag.rules().map(RuleSpec::name).collect();
        let params: Vec<_> = tag.rules().map(RuleSpec::param).collect();

        assert_eq!(names, vec!["required", "numeric", "min", "max"]);
        assert_eq!(params, vec!["", "", "5", "10"]);
        assert!(tag.dive().is_none());
    }

    #[test]
    fn empty_tag_has_no_rules() {
        let tag = parse_tag("  ", &()).unwrap();
        assert!(tag.is_empty());
        assert!(!tag.is_skip());
    }

    #[test]
    fn dash_skips_field() {
        assert!(parse_tag("-", &()).unwrap().is_skip());
    }

    #[test]
    fn empty_token_is_malformed() {
        let err = parse_tag("required,,min=3", &()).unwrap_err();
        assert_eq!(
            err,
            TagError::EmptyToken {
                tag: "required,,min=3".to_string(),
                position: 1
            }
        );
        assert!(matches!(
            parse_tag("required,", &()),
            Err(TagError::EmptyToken { position: 1, .. })
        ));
    }

    #[test]
    fn missing_rule_name_is_malformed() {
        assert!(matches!(
            parse_tag("=5", &()),
            Err(TagError::EmptyRuleName { .. })
        ));
    }

    #[test]
    fn dive_splits_container_and_element_rules() {
        let tag = parse_tag("required,dive,required,min=3", &()).unwrap();

        let outer: Vec<_> = tag.rules().map(RuleSpec::name).collect();
        assert_eq!(outer, vec!["required"]);

        let dive = tag.dive().unwrap();
        assert!(dive.keys().is_none());
        let inner: Vec<_> = dive.elements().rules().map(RuleSpec::name).collect();
        assert_eq!(inner, vec!["required", "min"]);
    }

    #[test]
    fn bare_dive_has_empty_element_tag() {
        let tag = parse_tag("required,dive", &()).unwrap();
        assert!(tag.dive().unwrap().elements().is_empty());
    }

    #[test]
    fn keys_group_is_separated_from_values() {
        let tag = parse_tag("dive,keys,required,min=2,endkeys,required", &()).unwrap();
        let dive = tag.dive().unwrap();

        let keys: Vec<_> = dive.keys().unwrap().rules().map(RuleSpec::name).collect();
        let values: Vec<_> = dive.elements().rules().map(RuleSpec::name).collect();
        assert_eq!(keys, vec!["required", "min"]);
        assert_eq!(values, vec!["required"]);
    }

    #[test]
    fn keys_without_endkeys_is_malformed() {
        assert!(matches!(
            parse_tag("dive,keys,min=2", &()),
            Err(TagError::UnclosedKeys { .. })
        ));
    }

    #[test]
    fn keys_outside_dive_is_malformed() {
        assert!(matches!(
            parse_tag("keys,min=2,endkeys", &()),
            Err(TagError::KeysWithoutDive { .. })
        ));
        assert!(matches!(
            parse_tag("required,endkeys", &()),
            Err(TagError::UnexpectedEndKeys { .. })
        ));
        assert!(matches!(
            parse_tag("dive,keys,endkeys", &()),
            Err(TagError::EmptyKeys { .. })
        ));
    }

    #[test]
    fn nested_dive_is_supported() {
        let tag = parse_tag("dive,dive,min=1", &()).unwrap();
        let inner = tag.dive().unwrap().elements().dive().unwrap();
        assert_eq!(inner.elements().rules().count(), 1);
    }

    #[test]
    fn aliases_expand_recursively_in_place() {
        let table = aliases(&[
            ("varchar", "required,max=255"),
            ("name", "varchar,alpha"),
        ]);

        let tag = parse_tag("omitempty,name", &table).unwrap();
        let names: Vec<_> = tag.rules().map(RuleSpec::name).collect();
        assert_eq!(names, vec!["required", "max", "alpha"]);
        assert!(tag.omits_empty());
    }

    #[test]
    fn alias_may_carry_structural_markers() {
        let table = aliases(&[("shortkeys", "dive,keys,max=3,endkeys")]);
        let tag = parse_tag("shortkeys", &table).unwrap();
        assert!(tag.dive().unwrap().keys().is_some());
    }

    #[test]
    fn self_referencing_alias_table_is_bounded() {
        let table = aliases(&[("loop", "loop")]);
        assert!(matches!(
            parse_tag("loop", &table),
            Err(TagError::AliasTooDeep { .. })
        ));
    }

    #[test]
    fn or_groups_keep_alternatives() {
        let tag = parse_tag("numeric|alpha,min=1", &()).unwrap();
        let first = &tag.checks()[0];
        assert!(first.is_group());
        assert_eq!(first.label(), "numeric|alpha");
        assert!(matches!(
            parse_tag("dive|alpha", &()),
            Err(TagError::StructuralInGroup { .. })
        ));
    }

    #[test]
    fn quoted_parameters_are_not_split() {
        let tag = parse_tag("oneof='a,b' c,required", &()).unwrap();
        let rules: Vec<_> = tag.rules().collect();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].params(), vec!["a,b", "c"]);
        assert!(matches!(
            parse_tag("oneof='a", &()),
            Err(TagError::UnclosedQuote { .. })
        ));
    }

    #[test]
    fn escaped_separators_are_restored() {
        let tag = parse_tag("contains=0x2C,excludes=0x7C", &()).unwrap();
        let params: Vec<_> = tag.rules().map(RuleSpec::param).collect();
        assert_eq!(params, vec![",", "|"]);
    }

    #[test]
    fn split_params_handles_spacing() {
        assert_eq!(split_params("  red  green "), vec!["red", "green"]);
        assert!(split_params("").is_empty());
        assert_eq!(unquote("'a b'"), "a b");
        assert_eq!(unquote("'a' 'b'"), "'a' 'b'");
    }
}
