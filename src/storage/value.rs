//! Scalar values
//!
//! This module defines how cell values are represented in memory.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A scalar stored in a relation cell: an integer or a piece of text.
///
/// Columns carry no declared type. Values are persisted as bare text and
/// the type is re-inferred from content on load (see [`Value::from_field`]),
/// so a text value consisting solely of digits is indistinguishable from an
/// integer after a save/reload cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Value {
    /// Integer value (64-bit)
    Integer(i64),
    /// Text value
    Text(String),
}

impl Value {
    /// Parse a persisted field back into a value.
    ///
    /// A field consisting solely of ASCII digits is read as an integer,
    /// anything else as text. A digit run too large for `i64` stays text.
    pub fn from_field(field: &str) -> Value {
        if !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(number) = field.parse::<i64>() {
                return Value::Integer(number);
            }
        }
        Value::Text(field.to_string())
    }

    /// True for text with no characters; integers are never empty
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Text(text) if text.is_empty())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(number) => write!(f, "{}", number),
            Value::Text(text) => write!(f, "{}", text),
        }
    }
}

impl Ord for Value {
    /// Natural ordering for ORDER BY: integers numerically, text
    /// lexicographically. A mixed column stays sortable because every
    /// integer orders before any text.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Integer(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Integer(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_field_heuristic() {
        assert_eq!(Value::from_field("42"), Value::Integer(42));
        assert_eq!(Value::from_field("007"), Value::Integer(7));
        assert_eq!(Value::from_field("42a"), Value::Text("42a".to_string()));
        assert_eq!(Value::from_field("-42"), Value::Text("-42".to_string()));
        assert_eq!(Value::from_field(""), Value::Text(String::new()));
        // Too large for i64: kept as text rather than failing the load.
        assert_eq!(
            Value::from_field("99999999999999999999"),
            Value::Text("99999999999999999999".to_string())
        );
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(Value::Integer(100500).to_string(), "100500");
        assert_eq!(Value::Text("hello".to_string()).to_string(), "hello");
    }

    #[test]
    fn test_is_empty() {
        assert!(Value::Text(String::new()).is_empty());
        assert!(!Value::Text(" ".to_string()).is_empty());
        assert!(!Value::Integer(0).is_empty());
    }

    #[test]
    fn test_equality_never_crosses_types() {
        assert_ne!(Value::Integer(42), Value::Text("42".to_string()));
    }

    #[test]
    fn test_ordering() {
        assert!(Value::Integer(2) < Value::Integer(10));
        assert!(Value::Text("a".to_string()) < Value::Text("b".to_string()));
        // Integers sort before text.
        assert!(Value::Integer(100500) < Value::Text("a".to_string()));
    }
}
