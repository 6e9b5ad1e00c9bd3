//! Node records stored in the registry.

use serde_json::Value;

use crate::key::NodeKey;

/// Intents recorded while a node's children are being loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingLoad {
    /// Open the node once its children arrive.
    pub open: bool,
    /// Selected state to apply once its children arrive.
    pub select: Option<bool>,
}

/// Load status of a node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Lazy node whose loader has not run (or failed).
    Unloaded,
    /// Loader is running; further toggles only update the intents.
    Pending(PendingLoad),
    /// Children are materialized, or the node was never lazy.
    #[default]
    Loaded,
}

impl LoadState {
    /// Check if the loader has not run yet
    pub fn is_unloaded(&self) -> bool {
        matches!(self, Self::Unloaded)
    }

    /// Check if a load is in flight
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Check if children are materialized
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }
}

/// One node of the tree.
///
/// Links are stored as keys into the registry, never as references.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Source record without its children field.
    pub(crate) item: Value,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) leaf: bool,
    pub(crate) load: LoadState,
    pub(crate) selected: bool,
    pub(crate) indeterminate: bool,
    pub(crate) open: bool,
    pub(crate) active: bool,
}

impl TreeNode {
    pub(crate) fn new(item: Value, parent: Option<NodeKey>, leaf: bool, load: LoadState) -> Self {
        Self {
            item,
            parent,
            children: Vec::new(),
            leaf,
            load,
            selected: false,
            indeterminate: false,
            open: false,
            active: false,
        }
    }

    /// The source record, without its children field.
    pub fn item(&self) -> &Value {
        &self.item
    }

    /// Key of the owning node; `None` for roots.
    pub fn parent(&self) -> Option<&NodeKey> {
        self.parent.as_ref()
    }

    /// Child keys in rendering order.
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Whether the node can never have children.
    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    /// Whether the node shows an expander: it has children, or may get
    /// some from the loader.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty() || !self.load.is_loaded()
    }

    /// Current load status of the children.
    pub fn load_state(&self) -> LoadState {
        self.load
    }

    /// Whether the children are materialized.
    pub fn is_loaded(&self) -> bool {
        self.load.is_loaded()
    }

    /// Whether the checkbox is checked.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether only some descendants are selected.
    pub fn is_indeterminate(&self) -> bool {
        self.indeterminate
    }

    /// Whether the children are shown.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the node is highlighted.
    pub fn is_active(&self) -> bool {
        self.active
    }
}
