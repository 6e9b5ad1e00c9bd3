//! Active (highlighted) nodes.

use indexmap::IndexSet;

use crate::key::NodeKey;
use crate::registry::NodeRegistry;

/// Toggle `key` in the active set.
///
/// In single mode activating a node deactivates the previous one, and
/// toggling the sole active node empties the set. In multiple mode each
/// node toggles on its own and the set keeps click order. Returns false
/// if the key is unknown.
pub fn toggle(
    registry: &mut NodeRegistry,
    active: &mut IndexSet<NodeKey>,
    key: &NodeKey,
    multiple: bool,
) -> bool {
    let Some(next) = registry.get(key).map(|node| !node.active) else {
        return false;
    };
    if next && !multiple {
        clear(registry, active);
    }
    mark(registry, active, key, next);
    true
}

/// Make `keys` the active set, dropping unknown keys.
///
/// In single mode the last known key wins.
pub fn set(
    registry: &mut NodeRegistry,
    active: &mut IndexSet<NodeKey>,
    keys: &[NodeKey],
    multiple: bool,
) {
    clear(registry, active);
    for key in keys {
        if !registry.contains(key) {
            continue;
        }
        if !multiple {
            clear(registry, active);
        }
        mark(registry, active, key, true);
    }
}

fn clear(registry: &mut NodeRegistry, active: &mut IndexSet<NodeKey>) {
    for key in active.drain(..) {
        if let Some(node) = registry.get_mut(&key) {
            node.active = false;
        }
    }
}

fn mark(registry: &mut NodeRegistry, active: &mut IndexSet<NodeKey>, key: &NodeKey, value: bool) {
    if let Some(node) = registry.get_mut(key) {
        node.active = value;
        if value {
            active.insert(key.clone());
        } else {
            active.shift_remove(key);
        }
    }
}
