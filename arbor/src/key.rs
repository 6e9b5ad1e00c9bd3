//! Node identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a tree node, taken from the configured key field.
///
/// Numbers and strings are distinct: `NodeKey::Int(1)` never equals
/// `NodeKey::Str("1")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeKey {
    /// Integer key.
    Int(i64),
    /// String key.
    Str(String),
}

impl NodeKey {
    /// Extract a key from a JSON value.
    ///
    /// Returns `None` for anything that is not an integer or a string.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Int),
            Value::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }

    /// Convert back into a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Str(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for NodeKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for NodeKey {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for NodeKey {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for NodeKey {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_and_strings_are_distinct() {
        assert_ne!(NodeKey::from(1), NodeKey::from("1"));
    }

    #[test]
    fn test_from_value() {
        assert_eq!(NodeKey::from_value(&json!(7)), Some(NodeKey::Int(7)));
        assert_eq!(
            NodeKey::from_value(&json!("Foobar")),
            Some(NodeKey::Str("Foobar".to_string()))
        );
        assert_eq!(NodeKey::from_value(&json!(1.5)), None);
        assert_eq!(NodeKey::from_value(&json!(null)), None);
    }

    #[test]
    fn test_serializes_untagged() {
        let keys = vec![NodeKey::from(0), NodeKey::from("a")];
        assert_eq!(serde_json::to_string(&keys).unwrap(), r#"[0,"a"]"#);
    }
}
