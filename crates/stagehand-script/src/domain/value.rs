//! Variable values and their coercion rules.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Runtime variable table, keyed by variable id.
pub type Variables = BTreeMap<String, VariableValue>;

/// Declared type of a project variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    #[default]
    String,
    Number,
    Boolean,
}

/// A variable value as authored or as held at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Default for VariableValue {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl VariableValue {
    /// The zero value of a declared type.
    #[must_use]
    pub fn zero_of(variable_type: VariableType) -> Self {
        match variable_type {
            VariableType::String => Self::Text(String::new()),
            VariableType::Number => Self::Number(0.0),
            VariableType::Boolean => Self::Bool(false),
        }
    }

    /// Numeric reading of the value, if it has one.
    ///
    /// Text is parsed after trimming; booleans have no numeric reading.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Self::Number(_) | Self::Bool(_) => None,
        }
    }

    /// Numeric reading, with anything non-numeric treated as 0.
    #[must_use]
    pub fn number_or_zero(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// Converts the value to a declared type.
    ///
    /// Numbers parse from text (falling back to 0), booleans parse from the
    /// usual truthy/falsy tokens (falling back to `false`), and strings take
    /// the display form.
    #[must_use]
    pub fn coerce_to(&self, variable_type: VariableType) -> Self {
        match variable_type {
            VariableType::Number => match self {
                Self::Bool(b) => Self::Number(if *b { 1.0 } else { 0.0 }),
                other => Self::Number(other.number_or_zero()),
            },
            VariableType::Boolean => match self {
                Self::Bool(b) => Self::Bool(*b),
                Self::Number(n) => Self::Bool(*n != 0.0),
                Self::Text(text) => Self::Bool(parse_bool_token(text).unwrap_or(false)),
            },
            VariableType::String => Self::Text(self.to_string()),
        }
    }

    /// Whether the value already has the shape of the declared type.
    #[must_use]
    pub fn matches_type(&self, variable_type: VariableType) -> bool {
        matches!(
            (self, variable_type),
            (Self::Bool(_), VariableType::Boolean)
                | (Self::Number(_), VariableType::Number)
                | (Self::Text(_), VariableType::String)
        )
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            #[allow(clippy::cast_possible_truncation)]
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for VariableValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for VariableValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Parses a boolean from common truthy/falsy tokens, case-insensitively.
#[must_use]
pub fn parse_bool_token(token: &str) -> Option<bool> {
    match token.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" | "t" => Some(true),
        "false" | "no" | "n" | "off" | "0" | "f" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_text_to_number_parses_or_falls_back_to_zero() {
        assert_eq!(
            VariableValue::from(" 12.5 ").coerce_to(VariableType::Number),
            VariableValue::Number(12.5)
        );
        assert_eq!(
            VariableValue::from("lots").coerce_to(VariableType::Number),
            VariableValue::Number(0.0)
        );
    }

    #[test]
    fn test_coerce_text_to_boolean_is_case_insensitive() {
        for token in ["TRUE", "Yes", "on", "1"] {
            assert_eq!(
                VariableValue::from(token).coerce_to(VariableType::Boolean),
                VariableValue::Bool(true),
                "{token}"
            );
        }
        for token in ["False", "NO", "off", "0", "banana"] {
            assert_eq!(
                VariableValue::from(token).coerce_to(VariableType::Boolean),
                VariableValue::Bool(false),
                "{token}"
            );
        }
    }

    #[test]
    fn test_coerce_number_to_string_drops_integral_fraction() {
        assert_eq!(
            VariableValue::Number(5.0).coerce_to(VariableType::String),
            VariableValue::Text("5".to_owned())
        );
        assert_eq!(VariableValue::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_number_or_zero_treats_booleans_and_words_as_zero() {
        assert!(VariableValue::Bool(true).number_or_zero().abs() < f64::EPSILON);
        assert!(VariableValue::from("abc").number_or_zero().abs() < f64::EPSILON);
        assert!((VariableValue::from("3").number_or_zero() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_untagged_deserialization_picks_matching_shape() {
        let values: Vec<VariableValue> = serde_json::from_str(r#"[true, 4, "four"]"#).unwrap();

        assert_eq!(
            values,
            vec![
                VariableValue::Bool(true),
                VariableValue::Number(4.0),
                VariableValue::Text("four".to_owned()),
            ]
        );
    }
}
