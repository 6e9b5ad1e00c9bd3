//! Open/closed state and the load state machine.
//!
//! ```text
//! Closed(unloaded) --open--> Pending --ok--> Open(loaded) | Closed(loaded)
//!                               |
//!                               +--err--> Closed(unloaded)
//! ```
//!
//! A node only shows as open once its children are loaded. Toggles that
//! arrive while a load is pending flip the recorded intent instead of
//! starting another load.

use indexmap::IndexSet;

use crate::key::NodeKey;
use crate::loader::LoadTicket;
use crate::node::{LoadState, PendingLoad};
use crate::registry::NodeRegistry;

/// Flip the open state of `key`.
///
/// Leaves and unknown keys are ignored. Returns a ticket when the node
/// must be loaded first.
pub fn toggle(
    registry: &mut NodeRegistry,
    open: &mut IndexSet<NodeKey>,
    key: &NodeKey,
) -> Option<LoadTicket> {
    let node = registry.get_mut(key)?;
    if node.leaf {
        return None;
    }
    match node.load {
        LoadState::Unloaded => {
            return request_load(
                registry,
                key,
                PendingLoad {
                    open: true,
                    select: None,
                },
            );
        }
        LoadState::Pending(mut intent) => {
            intent.open = !intent.open;
            node.load = LoadState::Pending(intent);
            return None;
        }
        LoadState::Loaded => {}
    }
    let next = !node.open;
    mark(registry, open, key, next);
    None
}

/// Open exactly `keys`, closing everything else.
///
/// Unknown keys are dropped. Unloaded nodes are loaded first and open
/// once their children arrive.
pub fn set(
    registry: &mut NodeRegistry,
    open: &mut IndexSet<NodeKey>,
    keys: &[NodeKey],
) -> Vec<LoadTicket> {
    close_all(registry, open);
    let mut tickets = Vec::new();
    for key in keys {
        let Some(node) = registry.get_mut(key) else {
            continue;
        };
        match node.load {
            LoadState::Unloaded => tickets.extend(request_load(
                registry,
                key,
                PendingLoad {
                    open: true,
                    select: None,
                },
            )),
            LoadState::Pending(mut intent) => {
                intent.open = true;
                node.load = LoadState::Pending(intent);
            }
            LoadState::Loaded => mark(registry, open, key, true),
        }
    }
    tickets
}

/// Open every node whose children are already materialized.
pub fn open_all(registry: &mut NodeRegistry, open: &mut IndexSet<NodeKey>) {
    for key in registry.preorder() {
        let expandable = registry
            .get(&key)
            .is_some_and(|node| !node.children.is_empty());
        if expandable {
            mark(registry, open, &key, true);
        }
    }
}

/// Close every node.
pub fn close_all(registry: &mut NodeRegistry, open: &mut IndexSet<NodeKey>) {
    for node in registry.nodes_mut() {
        node.open = false;
        if let LoadState::Pending(intent) = &mut node.load {
            intent.open = false;
        }
    }
    open.clear();
}

/// Move an unloaded node to pending with the given intent.
pub(crate) fn request_load(
    registry: &mut NodeRegistry,
    key: &NodeKey,
    intent: PendingLoad,
) -> Option<LoadTicket> {
    let node = registry.get_mut(key)?;
    if !node.load.is_unloaded() {
        return None;
    }
    node.load = LoadState::Pending(intent);
    Some(LoadTicket::new(key.clone(), node.item.clone()))
}

/// Return a pending node to unloaded so the next toggle retries.
pub(crate) fn abandon_load(registry: &mut NodeRegistry, key: &NodeKey) {
    if let Some(node) = registry.get_mut(key)
        && node.load.is_pending()
    {
        node.load = LoadState::Unloaded;
    }
}

/// Set the open flag and keep the ordered cache in step.
pub(crate) fn mark(
    registry: &mut NodeRegistry,
    open: &mut IndexSet<NodeKey>,
    key: &NodeKey,
    value: bool,
) {
    if let Some(node) = registry.get_mut(key) {
        node.open = value;
        if value {
            open.insert(key.clone());
        } else {
            open.shift_remove(key);
        }
    }
}
