//! ops::value
//!
//! Dynamically typed option values and their declared types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::schema::OptionError;

/// Declared type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    String,
    Bool,
    Int,
    StringList,
    /// A string restricted to a fixed set of values.
    Choice(&'static [&'static str]),
}

impl OptionType {
    /// Check `value` against this type and convert it to the stored form.
    ///
    /// A `Str` is promoted to a one-element list for `StringList`.
    pub fn coerce(&self, option: &str, value: OptionValue) -> Result<OptionValue, OptionError> {
        match (self, value) {
            (OptionType::String, v @ OptionValue::Str(_))
            | (OptionType::Bool, v @ OptionValue::Bool(_))
            | (OptionType::Int, v @ OptionValue::Int(_))
            | (OptionType::StringList, v @ OptionValue::List(_)) => Ok(v),
            (OptionType::StringList, OptionValue::Str(s)) => Ok(OptionValue::List(vec![s])),
            (OptionType::Choice(allowed), OptionValue::Str(s)) if allowed.contains(&s.as_str()) => {
                Ok(OptionValue::Str(s))
            }
            (ty, v) => Err(OptionError::mismatch(option, ty, &v)),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::String => write!(f, "string"),
            OptionType::Bool => write!(f, "bool"),
            OptionType::Int => write!(f, "int"),
            OptionType::StringList => write!(f, "list"),
            OptionType::Choice(allowed) => write!(f, "one of {}", allowed.join("|")),
        }
    }
}

/// A value supplied for an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

impl OptionValue {
    /// Short description of the runtime type, for error messages.
    pub fn describe(&self) -> String {
        match self {
            OptionValue::Str(s) => format!("string '{}'", s),
            OptionValue::Bool(b) => format!("bool {}", b),
            OptionValue::Int(n) => format!("int {}", n),
            OptionValue::List(_) => "list".to_string(),
        }
    }

    pub fn into_string(self, option: &str) -> Result<String, OptionError> {
        match self {
            OptionValue::Str(s) => Ok(s),
            other => Err(OptionError::mismatch(option, &OptionType::String, &other)),
        }
    }

    pub fn into_bool(self, option: &str) -> Result<bool, OptionError> {
        match self {
            OptionValue::Bool(b) => Ok(b),
            other => Err(OptionError::mismatch(option, &OptionType::Bool, &other)),
        }
    }

    pub fn into_int(self, option: &str) -> Result<i64, OptionError> {
        match self {
            OptionValue::Int(n) => Ok(n),
            other => Err(OptionError::mismatch(option, &OptionType::Int, &other)),
        }
    }

    pub fn into_list(self, option: &str) -> Result<Vec<String>, OptionError> {
        match self {
            OptionValue::List(items) => Ok(items),
            OptionValue::Str(s) => Ok(vec![s]),
            other => Err(OptionError::mismatch(option, &OptionType::StringList, &other)),
        }
    }

    /// Parse a string value into a choice enum.
    pub fn into_choice<T>(self, option: &str, allowed: &'static [&'static str]) -> Result<T, OptionError>
    where
        T: FromStr,
    {
        let ty = OptionType::Choice(allowed);
        match self {
            OptionValue::Str(s) => s
                .parse()
                .map_err(|_| OptionError::mismatch(option, &ty, &OptionValue::Str(s))),
            other => Err(OptionError::mismatch(option, &ty, &other)),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Str(s) => write!(f, "{}", s),
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Int(n) => write!(f, "{}", n),
            OptionValue::List(items) => write!(f, "{}", items.join(",")),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Int(n)
    }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self {
        OptionValue::Int(n.into())
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(items: Vec<String>) -> Self {
        OptionValue::List(items)
    }
}

impl From<Vec<&str>> for OptionValue {
    fn from(items: Vec<&str>) -> Self {
        OptionValue::List(items.into_iter().map(String::from).collect())
    }
}

/// `Some(List)` for a non-empty list, `None` when nothing was set.
pub(crate) fn list_value(items: &[String]) -> Option<OptionValue> {
    if items.is_empty() {
        None
    } else {
        Some(OptionValue::List(items.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod coerce {
        use super::*;

        #[test]
        fn exact_types_pass_through() {
            assert_eq!(
                OptionType::Bool.coerce("bare", true.into()).unwrap(),
                OptionValue::Bool(true)
            );
            assert_eq!(
                OptionType::Int.coerce("skip", 3.into()).unwrap(),
                OptionValue::Int(3)
            );
        }

        #[test]
        fn string_promotes_to_list() {
            assert_eq!(
                OptionType::StringList.coerce("patterns", ".".into()).unwrap(),
                OptionValue::List(vec![".".into()])
            );
        }

        #[test]
        fn list_does_not_demote_to_string() {
            let err = OptionType::String
                .coerce("message", vec!["a"].into())
                .unwrap_err();
            assert!(matches!(err, OptionError::TypeMismatch { .. }));
        }

        #[test]
        fn choice_accepts_only_allowed() {
            let ty = OptionType::Choice(&["soft", "hard"]);
            assert!(ty.coerce("mode", "soft".into()).is_ok());
            let err = ty.coerce("mode", "medium".into()).unwrap_err();
            assert_eq!(
                err.to_string(),
                "option 'mode' expects one of soft|hard, got string 'medium'"
            );
        }

        #[test]
        fn int_is_not_a_bool() {
            assert!(OptionType::Bool.coerce("bare", 1.into()).is_err());
        }
    }

    mod conversions {
        use super::*;

        #[test]
        fn into_list_accepts_single_string() {
            assert_eq!(
                OptionValue::from("a").into_list("paths").unwrap(),
                vec!["a".to_string()]
            );
        }

        #[test]
        fn into_choice_parses() {
            use crate::git::ResetMode;
            let mode: ResetMode = OptionValue::from("hard")
                .into_choice("mode", ResetMode::NAMES)
                .unwrap();
            assert_eq!(mode, ResetMode::Hard);
        }

        #[test]
        fn display_joins_lists() {
            assert_eq!(OptionValue::from(vec!["a", "b"]).to_string(), "a,b");
        }

        #[test]
        fn deserializes_untagged() {
            let v: OptionValue = serde_json::from_str("[\"x\"]").unwrap();
            assert_eq!(v, OptionValue::List(vec!["x".into()]));
            let v: OptionValue = serde_json::from_str("false").unwrap();
            assert_eq!(v, OptionValue::Bool(false));
        }

        #[test]
        fn empty_list_reads_as_unset() {
            assert_eq!(list_value(&[]), None);
        }
    }
}
