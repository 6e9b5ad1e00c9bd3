//! Selection cascade and indeterminate state.
//!
//! Leaf (and unloaded) nodes own their selected flag. An interior node's
//! flags are derived from its children: selected when every child is
//! selected, indeterminate when some but not all are.

use std::collections::HashSet;

use crate::key::NodeKey;
use crate::node::LoadState;
use crate::registry::NodeRegistry;

/// Flip the effective selected state of `key` and cascade it.
///
/// Returns false if the key is unknown.
pub fn toggle(registry: &mut NodeRegistry, key: &NodeKey) -> bool {
    let Some(selected) = registry.get(key).map(|node| node.selected) else {
        return false;
    };
    cascade(registry, key, !selected);
    refresh_ancestors(registry, key);
    true
}

/// Make `keys` the selection: each known key and its descendants become
/// selected, everything else unselected. Unknown keys are ignored.
pub fn set(registry: &mut NodeRegistry, keys: &[NodeKey]) {
    for node in registry.nodes_mut() {
        node.selected = false;
        node.indeterminate = false;
        drop_select_intent(&mut node.load);
    }
    for key in keys {
        if registry.contains(key) {
            cascade(registry, key, true);
        }
    }
    recompute_all(registry);
}

/// Derive interior state for the whole tree, bottom-up.
pub fn recompute_all(registry: &mut NodeRegistry) {
    for key in registry.preorder().iter().rev() {
        derive(registry, key);
    }
}

/// Re-derive the ancestors of `key`, nearest first.
pub fn refresh_ancestors(registry: &mut NodeRegistry, key: &NodeKey) {
    for ancestor in registry.ancestors(key) {
        derive(registry, &ancestor);
    }
}

/// All selected keys across the whole tree, in pre-order.
pub fn selected_keys(registry: &NodeRegistry) -> Vec<NodeKey> {
    registry
        .preorder()
        .into_iter()
        .filter(|key| registry.get(key).is_some_and(|node| node.selected))
        .collect()
}

/// Whether two reported selections contain the same keys.
pub(crate) fn same_selection(a: &[NodeKey], b: &[NodeKey]) -> bool {
    a.len() == b.len() && a.iter().collect::<HashSet<_>>() == b.iter().collect::<HashSet<_>>()
}

/// Set `key` and every materialized descendant to `selected`.
pub(crate) fn cascade(registry: &mut NodeRegistry, key: &NodeKey, selected: bool) {
    let mut targets = registry.descendants(key);
    targets.push(key.clone());
    for target in &targets {
        if let Some(node) = registry.get_mut(target) {
            node.selected = selected;
            node.indeterminate = false;
            drop_select_intent(&mut node.load);
        }
    }
}

/// A select request recorded during a load is superseded by any later
/// write to the node's selected flag.
fn drop_select_intent(load: &mut LoadState) {
    if let LoadState::Pending(intent) = load {
        intent.select = None;
    }
}

fn derive(registry: &mut NodeRegistry, key: &NodeKey) {
    let Some(node) = registry.get(key) else {
        return;
    };
    if node.children.is_empty() {
        return;
    }

    let mut all = true;
    let mut any = false;
    for child in &node.children {
        if let Some(child) = registry.get(child) {
            all &= child.selected;
            any |= child.selected || child.indeterminate;
        }
    }

    if let Some(node) = registry.get_mut(key) {
        node.selected = all;
        node.indeterminate = !all && any;
    }
}
