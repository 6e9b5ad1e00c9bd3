//! Flat node arena built from nested records.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::{debug, trace, warn};
use serde_json::Value;

use crate::key::NodeKey;
use crate::node::{LoadState, TreeNode};
use crate::record::ItemFields;

/// What a rebuild changed in the node set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    /// Keys seen for the first time.
    pub added: Vec<NodeKey>,
    /// Keys that no longer exist.
    pub removed: Vec<NodeKey>,
}

/// Mapping from node key to node record.
///
/// Nodes are stored in pre-order of the input. Per-node state survives
/// [`rebuild`](Self::rebuild) for keys that are still present.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    fields: ItemFields,
    /// Whether a loader is configured; empty children arrays are then lazy.
    lazy: bool,
    nodes: IndexMap<NodeKey, TreeNode>,
    roots: Vec<NodeKey>,
    /// Loader results, replayed when a rebuild meets the same lazy record.
    fetched: HashMap<NodeKey, Vec<Value>>,
}

impl NodeRegistry {
    /// Create an empty registry.
    pub fn new(fields: ItemFields, lazy: bool) -> Self {
        Self {
            fields,
            lazy,
            ..Default::default()
        }
    }

    /// Field names used to read records.
    pub fn fields(&self) -> &ItemFields {
        &self.fields
    }

    /// Whether empty children arrays mark lazy nodes.
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    pub(crate) fn set_lazy(&mut self, lazy: bool) {
        self.lazy = lazy;
    }

    // -------------------------------------------------------------------------
    // Building
    // -------------------------------------------------------------------------

    /// Replace the node set with the given records.
    ///
    /// Selected, open, active and load state carry over for keys that are
    /// still present; a node stays open only while its children are
    /// materialized. New nodes under an already-known selected parent
    /// start selected. Identical input yields an identical registry.
    pub fn rebuild(&mut self, items: &[Value]) -> RebuildSummary {
        let previous = std::mem::take(&mut self.nodes);
        let fetched = std::mem::take(&mut self.fetched);

        let mut builder = Builder {
            fields: &self.fields,
            lazy: self.lazy,
            previous: &previous,
            fetched: &fetched,
            nodes: &mut self.nodes,
            kept_fetched: HashMap::new(),
        };
        self.roots = builder.build_level(items, None, false);
        self.fetched = builder.kept_fetched;

        let summary = RebuildSummary {
            added: self
                .nodes
                .keys()
                .filter(|key| !previous.contains_key(*key))
                .cloned()
                .collect(),
            removed: previous
                .keys()
                .filter(|key| !self.nodes.contains_key(*key))
                .cloned()
                .collect(),
        };
        debug!(
            "Rebuilt tree: {} nodes ({} added, {} removed)",
            self.nodes.len(),
            summary.added.len(),
            summary.removed.len()
        );
        summary
    }

    /// Insert the loader's result as the children of `key`.
    ///
    /// Marks the node loaded; zero children turn it into a leaf. New
    /// nodes inherit the node's selected state. Returns false if the key
    /// is unknown.
    pub fn merge_loaded_children(&mut self, key: &NodeKey, records: Vec<Value>) -> bool {
        let Some(selected) = self.nodes.get(key).map(|node| node.selected) else {
            debug!("Dropping loaded children for unknown node {key}");
            return false;
        };

        let empty = IndexMap::new();
        let no_fetched = HashMap::new();
        let mut builder = Builder {
            fields: &self.fields,
            lazy: self.lazy,
            previous: &empty,
            fetched: &no_fetched,
            nodes: &mut self.nodes,
            kept_fetched: HashMap::new(),
        };
        let children = builder.build_level(&records, Some(key), selected);

        if let Some(node) = self.nodes.get_mut(key) {
            node.leaf = children.is_empty();
            node.children = children;
            node.load = LoadState::Loaded;
        }
        trace!("Merged {} loaded children into {key}", records.len());
        self.fetched.insert(key.clone(), records);
        true
    }

    // -------------------------------------------------------------------------
    // Access
    // -------------------------------------------------------------------------

    /// Look up a node by key.
    pub fn get(&self, key: &NodeKey) -> Option<&TreeNode> {
        self.nodes.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &NodeKey) -> Option<&mut TreeNode> {
        self.nodes.get_mut(key)
    }

    /// Check if a node with `key` exists.
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of materialized nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the registry holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root keys in input order.
    pub fn roots(&self) -> &[NodeKey] {
        &self.roots
    }

    /// The whole key-to-node mapping.
    pub fn nodes(&self) -> &IndexMap<NodeKey, TreeNode> {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut TreeNode> {
        self.nodes.values_mut()
    }

    /// All keys reachable from the roots, parents before children.
    pub fn preorder(&self) -> Vec<NodeKey> {
        self.walk(&self.roots)
    }

    /// Materialized descendants of `key` in pre-order, excluding `key`.
    pub fn descendants(&self, key: &NodeKey) -> Vec<NodeKey> {
        self.nodes
            .get(key)
            .map(|node| self.walk(&node.children))
            .unwrap_or_default()
    }

    /// Ancestors of `key`, nearest first.
    pub fn ancestors(&self, key: &NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.nodes.get(key).and_then(|n| n.parent.clone());
        while let Some(parent) = current {
            if !seen.insert(parent.clone()) {
                break;
            }
            current = self.nodes.get(&parent).and_then(|n| n.parent.clone());
            out.push(parent);
        }
        out
    }

    fn walk(&self, start: &[NodeKey]) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<&NodeKey> = start.iter().rev().collect();
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            if !seen.insert(key) {
                continue;
            }
            out.push(key.clone());
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

/// One build pass over nested records.
struct Builder<'a> {
    fields: &'a ItemFields,
    lazy: bool,
    previous: &'a IndexMap<NodeKey, TreeNode>,
    fetched: &'a HashMap<NodeKey, Vec<Value>>,
    nodes: &'a mut IndexMap<NodeKey, TreeNode>,
    kept_fetched: HashMap<NodeKey, Vec<Value>>,
}

impl Builder<'_> {
    fn build_level(
        &mut self,
        items: &[Value],
        parent: Option<&NodeKey>,
        parent_selected: bool,
    ) -> Vec<NodeKey> {
        let previous = self.previous;
        let fetched = self.fetched;
        let mut keys = Vec::with_capacity(items.len());

        for item in items {
            let Some(key) = self.fields.key_of(item) else {
                warn!(
                    "Skipping record without a usable '{}' field",
                    self.fields.key
                );
                continue;
            };
            let old = previous.get(&key);

            let (children, leaf, load): (&[Value], bool, LoadState) =
                match self.fields.children_of(item) {
                    None => (&[], true, LoadState::Loaded),
                    Some(list) if !list.is_empty() => (list, false, LoadState::Loaded),
                    Some(_) if self.lazy => match fetched.get(&key) {
                        Some(loaded) => {
                            self.kept_fetched.insert(key.clone(), loaded.clone());
                            (loaded.as_slice(), loaded.is_empty(), LoadState::Loaded)
                        }
                        None => match old.map(|node| node.load) {
                            Some(pending @ LoadState::Pending(_)) => (&[], false, pending),
                            _ => (&[], false, LoadState::Unloaded),
                        },
                    },
                    Some(_) => (&[], true, LoadState::Loaded),
                };

            let mut node = TreeNode::new(
                self.fields.strip_children(item),
                parent.cloned(),
                leaf,
                load,
            );
            match old {
                Some(old) => {
                    node.selected = old.selected;
                    // Only materialized children can be shown.
                    node.open = old.open && !node.leaf && node.load.is_loaded();
                    node.active = old.active;
                }
                None => node.selected = parent_selected,
            }
            let selected = node.selected;

            // Insert before recursing so the arena stays in pre-order.
            self.nodes.insert(key.clone(), node);
            let child_keys = self.build_level(children, Some(&key), selected);
            if let Some(node) = self.nodes.get_mut(&key) {
                node.children = child_keys;
            }

            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}
