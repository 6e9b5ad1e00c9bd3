//! Field access on opaque input records.
//!
//! Records are plain JSON objects. The engine only reads the configured
//! key, children and text fields; everything else passes through to the
//! loader and the rendering layer untouched.

use serde_json::{Map, Value};

use crate::key::NodeKey;

/// The field names used to read records.
///
/// Each name may be a dotted path (`meta.id`) into nested objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    /// Field holding the node identifier.
    pub key: String,
    /// Field holding the ordered child records.
    pub children: String,
    /// Field holding the display text.
    pub text: String,
}

impl Default for ItemFields {
    fn default() -> Self {
        Self {
            key: "id".to_string(),
            children: "children".to_string(),
            text: "name".to_string(),
        }
    }
}

impl ItemFields {
    /// Read the identifier of a record.
    pub fn key_of(&self, item: &Value) -> Option<NodeKey> {
        lookup(item, &self.key).and_then(NodeKey::from_value)
    }

    /// Read the child records.
    ///
    /// `None` means the record has no children field at all, which is
    /// different from an empty list.
    pub fn children_of<'a>(&self, item: &'a Value) -> Option<&'a [Value]> {
        lookup(item, &self.children)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// Read the display text.
    pub fn text_of<'a>(&self, item: &'a Value) -> Option<&'a str> {
        lookup(item, &self.text).and_then(Value::as_str)
    }

    /// Copy a record without its top-level children field.
    pub fn strip_children(&self, item: &Value) -> Value {
        match item {
            Value::Object(map) => Value::Object(
                map.iter()
                    .filter(|(name, _)| name.as_str() != self.children)
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect::<Map<String, Value>>(),
            ),
            other => other.clone(),
        }
    }
}

/// Walk a dotted path through nested objects.
fn lookup<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(value) = item.get(path) {
        return Some(value);
    }
    path.split('.')
        .try_fold(item, |current, segment| current.get(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_children_field_absent_vs_empty() {
        let fields = ItemFields::default();
        assert!(fields.children_of(&json!({ "id": 0 })).is_none());
        assert_eq!(
            fields.children_of(&json!({ "id": 0, "children": [] })),
            Some(&[][..])
        );
    }

    #[test]
    fn test_dotted_paths() {
        let fields = ItemFields {
            key: "meta.id".to_string(),
            ..Default::default()
        };
        let item = json!({ "meta": { "id": "a" } });
        assert_eq!(fields.key_of(&item), Some(NodeKey::from("a")));
    }

    #[test]
    fn test_strip_children_keeps_other_fields() {
        let fields = ItemFields::default();
        let item = json!({ "id": 1, "name": "Root", "children": [{ "id": 2 }] });
        assert_eq!(
            fields.strip_children(&item),
            json!({ "id": 1, "name": "Root" })
        );
    }
}
