//! Search filtering over materialized nodes.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::key::NodeKey;
use crate::record::ItemFields;
use crate::registry::NodeRegistry;

/// Decides whether a record matches a search query.
pub type ItemFilter = Arc<dyn Fn(&Value, &str, &ItemFields) -> bool + Send + Sync>;

/// Case-insensitive substring match on the text field.
pub fn default_filter(item: &Value, search: &str, fields: &ItemFields) -> bool {
    fields
        .text_of(item)
        .is_some_and(|text| text.to_lowercase().contains(&search.to_lowercase()))
}

/// Keys hidden by `search`.
///
/// A node is kept if it matches or any descendant matches; a match keeps
/// its whole subtree.
pub fn excluded(
    registry: &NodeRegistry,
    search: &str,
    filter: Option<&ItemFilter>,
) -> HashSet<NodeKey> {
    let mut out = HashSet::new();
    let mut seen = HashSet::new();
    for root in registry.roots() {
        visit(registry, root, search, filter, &mut seen, &mut out);
    }
    out
}

fn visit(
    registry: &NodeRegistry,
    key: &NodeKey,
    search: &str,
    filter: Option<&ItemFilter>,
    seen: &mut HashSet<NodeKey>,
    out: &mut HashSet<NodeKey>,
) -> bool {
    if !seen.insert(key.clone()) {
        return false;
    }
    let Some(node) = registry.get(key) else {
        return false;
    };
    let fields = registry.fields();
    let matched = match filter {
        Some(filter) => filter(&node.item, search, fields),
        None => default_filter(&node.item, search, fields),
    };
    if matched {
        return true;
    }

    let mut any = false;
    for child in &node.children {
        any |= visit(registry, child, search, filter, seen, out);
    }
    if !any {
        out.insert(key.clone());
    }
    any
}
