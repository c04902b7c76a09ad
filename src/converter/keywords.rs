//! Typed access to schema keywords and the per-type keyword contract.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::error::{ConversionError, Result};
use crate::form::Choice;

/// Keywords every converter accepts and ignores during extraction.
pub const IGNORED: &[&str] = &["type", "title", "description", "$schema", "$id", "$comment"];

/// Keys of `node` that are neither ignored nor in `allowed`.
pub fn illegal_keywords(node: &Map<String, Value>, allowed: &[&str]) -> BTreeSet<String> {
    node.keys()
        .filter(|key| !IGNORED.contains(&key.as_str()) && !allowed.contains(&key.as_str()))
        .cloned()
        .collect()
}

pub fn string<'a>(
    node: &'a Map<String, Value>,
    keyword: &'static str,
) -> Result<Option<&'a str>> {
    match node.get(keyword) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(invalid(keyword, "expected a string")),
    }
}

pub fn number(node: &Map<String, Value>, keyword: &'static str) -> Result<Option<f64>> {
    match node.get(keyword) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid(keyword, "expected a number")),
    }
}

pub fn count(node: &Map<String, Value>, keyword: &'static str) -> Result<Option<usize>> {
    match node.get(keyword) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| invalid(keyword, "expected a non-negative integer")),
    }
}

pub fn string_list<'a>(
    node: &'a Map<String, Value>,
    keyword: &'static str,
) -> Result<Vec<&'a str>> {
    match node.get(keyword) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| invalid(keyword, "expected a list of strings"))
            })
            .collect(),
        Some(_) => Err(invalid(keyword, "expected a list of strings")),
    }
}

/// Choices from an `enum` keyword, labelled with their own values.
pub fn enum_choices(node: &Map<String, Value>) -> Result<Option<Vec<Choice>>> {
    match node.get("enum") {
        None => Ok(None),
        Some(Value::Array(values)) => Ok(Some(
            values.iter().cloned().map(Choice::from_value).collect(),
        )),
        Some(_) => Err(invalid("enum", "expected an array")),
    }
}

/// Choices from a `oneOf` list of `{const, title}` alternatives.
pub fn one_of_choices(node: &Map<String, Value>) -> Result<Option<Vec<Choice>>> {
    let Some(one_of) = node.get("oneOf") else {
        return Ok(None);
    };
    let alternatives = one_of
        .as_array()
        .ok_or_else(|| invalid("oneOf", "expected an array"))?;
    alternatives
        .iter()
        .map(|alternative| {
            let value = alternative
                .get("const")
                .ok_or_else(|| invalid("oneOf", "every alternative needs a 'const'"))?;
            Ok(match alternative.get("title").and_then(Value::as_str) {
                Some(title) => Choice::new(value.clone(), title),
                None => Choice::from_value(value.clone()),
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

pub fn invalid(keyword: &'static str, reason: impl Into<String>) -> ConversionError {
    ConversionError::InvalidKeyword {
        keyword,
        reason: reason.into(),
    }
}
