//! Flattened rows for the rendering layer.

use std::collections::HashSet;

use crate::key::NodeKey;
use crate::registry::NodeRegistry;

/// A visible node in the flattened tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleNode {
    pub key: NodeKey,
    /// Depth in tree (0 = root).
    pub depth: u16,
    /// Whether an expander is shown.
    pub has_children: bool,
    pub is_open: bool,
    pub is_selected: bool,
    pub is_indeterminate: bool,
    pub is_active: bool,
    /// Whether a load is in flight for this node.
    pub is_loading: bool,
}

/// Collect the rows currently on screen: roots, plus the children of
/// open nodes, minus anything in `excluded`.
pub fn rows(registry: &NodeRegistry, excluded: &HashSet<NodeKey>) -> Vec<VisibleNode> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    collect(registry, registry.roots(), excluded, 0, &mut seen, &mut out);
    out
}

fn collect(
    registry: &NodeRegistry,
    keys: &[NodeKey],
    excluded: &HashSet<NodeKey>,
    depth: u16,
    seen: &mut HashSet<NodeKey>,
    out: &mut Vec<VisibleNode>,
) {
    for key in keys {
        if excluded.contains(key) || !seen.insert(key.clone()) {
            continue;
        }
        let Some(node) = registry.get(key) else {
            continue;
        };

        out.push(VisibleNode {
            key: key.clone(),
            depth,
            has_children: node.has_children(),
            is_open: node.open,
            is_selected: node.selected,
            is_indeterminate: node.indeterminate,
            is_active: node.active,
            is_loading: node.load.is_pending(),
        });

        if node.open && !node.children.is_empty() {
            collect(registry, &node.children, excluded, depth + 1, seen, out);
        }
    }
}
