//! Settings value module.
//!
//! This module contains the coercion of textual input into typed
//! settings values, and the `key = value` assignments built on top of
//! it.

use serde_json::Value;
use std::str::FromStr;

use super::{Error, Result, SettingsPath, SettingsTree};

/// Represents the way a textual value should be interpreted.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ValueKind {
    /// Booleans or plain strings.
    Text,
    /// Booleans or comma-separated lists of strings.
    List,
}

impl Default for ValueKind {
    fn default() -> Self {
        Self::Text
    }
}

impl FromStr for ValueKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "string" | "text" => Ok(Self::Text),
            "list" => Ok(Self::List),
            kind => Err(Error::InvalidChoice(kind.to_owned(), "string, list".into())),
        }
    }
}

/// Converts raw input into a settings value.
///
/// `true` and `false` (case insensitive) always become booleans. In
/// list mode the trimmed input is split on commas, items being kept
/// as they are. Otherwise the trimmed input is kept as a string.
/// Numbers are never inferred.
pub fn coerce(input: &str, kind: ValueKind) -> Value {
    let input = input.trim();

    if input.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if input.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    match kind {
        ValueKind::List => Value::Array(
            input
                .split(',')
                .map(|item| Value::String(item.to_owned()))
                .collect(),
        ),
        ValueKind::Text => Value::String(input.to_owned()),
    }
}

/// Parses an integer value.
pub fn parse_int(input: &str) -> Result<i64> {
    input
        .trim()
        .parse()
        .map_err(|err| Error::InvalidValue(err, input.to_owned()))
}

/// Parses an integer value and checks it stands within the given
/// inclusive bounds.
pub fn parse_int_in_range(input: &str, min: i64, max: i64) -> Result<i64> {
    let value = parse_int(input)?;
    if value < min || value > max {
        return Err(Error::OutOfRange { value, min, max });
    }
    Ok(value)
}

/// Represents a `path = value` assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub path: SettingsPath,
    pub value: Value,
}

impl Assignment {
    pub fn new<V: Into<Value>>(path: SettingsPath, value: V) -> Self {
        Self {
            path,
            value: value.into(),
        }
    }

    /// Parses an assignment expression like
    /// `settings.zarafa.v1.main.active_theme = dark`.
    ///
    /// The expression is split on the first `=`, so values may
    /// contain equal signs.
    pub fn parse(expr: &str, kind: ValueKind) -> Result<Self> {
        let (path, value) = expr
            .split_once('=')
            .ok_or_else(|| Error::ParseInjectExprError(expr.to_owned()))?;
        let path = SettingsPath::parse(path)?;
        Ok(Self::new(path, coerce(value, kind)))
    }

    /// Builds a tree containing only this assignment.
    pub fn to_overlay(&self) -> SettingsTree {
        let mut overlay = SettingsTree::empty();
        overlay.set(&self.path, self.value.clone());
        overlay
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn coerce_booleans() {
        assert_eq!(json!(true), coerce("true", ValueKind::Text));
        assert_eq!(json!(true), coerce(" TRUE ", ValueKind::Text));
        assert_eq!(json!(false), coerce("False", ValueKind::List));
    }

    #[test]
    fn coerce_lists_and_strings() {
        assert_eq!(
            json!(["a.com", " b.com"]),
            coerce(" a.com, b.com ", ValueKind::List)
        );
        assert_eq!(json!(["a.com", "b.com"]), coerce("a.com,b.com", ValueKind::List));
        assert_eq!(json!(["a.com"]), coerce("a.com", ValueKind::List));
        assert_eq!(json!("dark"), coerce("  dark ", ValueKind::Text));
        // numbers stay strings
        assert_eq!(json!("42"), coerce("42", ValueKind::Text));
    }

    #[test]
    fn parse_value_kind() {
        assert_eq!(ValueKind::Text, "string".parse().unwrap());
        assert_eq!(ValueKind::List, "LIST".parse().unwrap());
        assert!("number".parse::<ValueKind>().is_err());
    }

    #[test]
    fn parse_integers() {
        assert_eq!(12, parse_int(" 12 ").unwrap());
        assert!(matches!(
            parse_int("twelve"),
            Err(Error::InvalidValue(_, input)) if input == "twelve"
        ));
        assert_eq!(5, parse_int_in_range("5", 5, 60).unwrap());
        assert!(matches!(
            parse_int_in_range("61", 5, 60),
            Err(Error::OutOfRange { value: 61, min: 5, max: 60 })
        ));
    }

    #[test]
    fn parse_assignments() {
        let assignment = Assignment::parse("settings.zarafa.v1.main.active_theme = dark", ValueKind::Text).unwrap();
        assert_eq!("settings.zarafa.v1.main.active_theme", assignment.path.to_string());
        assert_eq!(json!("dark"), assignment.value);

        let assignment = Assignment::parse("a.b=x=y", ValueKind::Text).unwrap();
        assert_eq!(json!("x=y"), assignment.value);

        assert!(matches!(
            Assignment::parse("a.b", ValueKind::Text),
            Err(Error::ParseInjectExprError(_))
        ));
        assert!(matches!(
            Assignment::parse(" = x", ValueKind::Text),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn assignment_overlay() {
        let overlay = Assignment::parse("a.b.c = false", ValueKind::Text)
            .unwrap()
            .to_overlay();
        assert_eq!(
            Some(&json!(false)),
            overlay.get(&SettingsPath::parse("a.b.c").unwrap())
        );
    }
}
