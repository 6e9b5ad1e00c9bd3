//! The tree view state engine.
//!
//! [`TreeView`] owns the node registry and the ordered open/active caches,
//! and runs one settle per input: a new [`TreeProps`] value, a user
//! intent such as [`toggle_select`](TreeView::toggle_select), or a
//! finished load. Every settle returns a [`Settle`] holding the facets
//! whose value changed since they were last reported.
//!
//! # Example
//!
//! ```
//! use arbor::{NodeKey, TreeConfig, TreeProps, TreeView};
//! use serde_json::json;
//!
//! let mut view = TreeView::new(TreeConfig::default().with_selectable(true));
//! let _ = view.sync(TreeProps::new(vec![json!({
//!     "id": 0, "name": "Root",
//!     "children": [{ "id": 1, "name": "Child" }, { "id": 2, "name": "Child 2" }]
//! })]));
//!
//! let settle = view.toggle_select(&NodeKey::from(0));
//! assert_eq!(
//!     settle.selected(),
//!     Some(&[NodeKey::from(0), NodeKey::from(1), NodeKey::from(2)][..])
//! );
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace, warn};
use serde_json::Value;

use crate::active;
use crate::config::TreeConfig;
use crate::error::TreeError;
use crate::expansion;
use crate::key::NodeKey;
use crate::loader::{ChildLoader, LoadOutcome, LoadTicket};
use crate::node::{LoadState, PendingLoad, TreeNode};
use crate::record::ItemFields;
use crate::registry::NodeRegistry;
use crate::search::{self, ItemFilter};
use crate::selection;
use crate::settle::{Change, Facet, Settle};
use crate::visible::{self, VisibleNode};

/// Everything the host supplies.
///
/// A `None` list leaves that facet free-running; `Some` makes it
/// controlled. Lists are applied when they change, never re-applied on an
/// unrelated rebuild.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeProps {
    /// Root records.
    pub items: Vec<Value>,
    /// Controlled selection.
    pub selected: Option<Vec<NodeKey>>,
    /// Controlled open nodes.
    pub open: Option<Vec<NodeKey>>,
    /// Controlled active nodes.
    pub active: Option<Vec<NodeKey>>,
}

impl TreeProps {
    /// Props with the given items and no controlled facets.
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    /// Control the selection.
    pub fn with_selected(mut self, keys: Vec<NodeKey>) -> Self {
        self.selected = Some(keys);
        self
    }

    /// Control the open nodes.
    pub fn with_open(mut self, keys: Vec<NodeKey>) -> Self {
        self.open = Some(keys);
        self
    }

    /// Control the active nodes.
    pub fn with_active(mut self, keys: Vec<NodeKey>) -> Self {
        self.active = Some(keys);
        self
    }
}

/// The facet values the host has been told about.
#[derive(Debug, Clone, Default)]
struct Reported {
    selected: Vec<NodeKey>,
    open: Vec<NodeKey>,
    active: Vec<NodeKey>,
    /// Facets whose last change never reached the host.
    stale: HashSet<Facet>,
}

impl Reported {
    fn needs(&self, facet: Facet, differs: bool) -> bool {
        differs || self.stale.contains(&facet)
    }
}

/// Tree state engine: selection, expansion, activation and lazy loading.
pub struct TreeView {
    config: TreeConfig,
    loader: Option<Arc<dyn ChildLoader>>,
    filter: Option<ItemFilter>,
    search: Option<String>,
    registry: NodeRegistry,
    open: IndexSet<NodeKey>,
    active: IndexSet<NodeKey>,
    props: TreeProps,
    mounted: bool,
    reported: Reported,
}

impl fmt::Debug for TreeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeView")
            .field("config", &self.config)
            .field("has_loader", &self.loader.is_some())
            .field("search", &self.search)
            .field("nodes", &self.registry.len())
            .field("open", &self.open)
            .field("active", &self.active)
            .field("mounted", &self.mounted)
            .finish_non_exhaustive()
    }
}

impl Default for TreeView {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

impl TreeView {
    /// Create an empty, unmounted view.
    pub fn new(config: TreeConfig) -> Self {
        Self {
            registry: NodeRegistry::new(config.fields(), false),
            config,
            loader: None,
            filter: None,
            search: None,
            open: IndexSet::new(),
            active: IndexSet::new(),
            props: TreeProps::default(),
            mounted: false,
            reported: Reported::default(),
        }
    }

    /// Configure a loader. Records with an empty children list become lazy.
    pub fn with_loader(self, loader: impl ChildLoader + 'static) -> Self {
        self.with_shared_loader(Arc::new(loader))
    }

    /// Configure a shared loader.
    pub fn with_shared_loader(mut self, loader: Arc<dyn ChildLoader>) -> Self {
        self.loader = Some(loader);
        self.registry.set_lazy(true);
        self
    }

    /// Replace the default search filter.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Value, &str, &ItemFields) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    // -------------------------------------------------------------------------
    // Host input
    // -------------------------------------------------------------------------

    /// Reconcile with a new set of props.
    ///
    /// The first call mounts the view. Items are rebuilt when they
    /// changed; each controlled list is applied when it changed, with
    /// unknown keys dropped.
    pub fn sync(&mut self, props: TreeProps) -> Settle {
        let first = !self.mounted;
        let mut loads = Vec::new();

        if first || props.items != self.props.items {
            self.registry.rebuild(&props.items);
            let registry = &self.registry;
            self.open
                .retain(|key| registry.get(key).is_some_and(|node| node.open));
            self.active.retain(|key| registry.contains(key));
        }

        if (first || props.selected != self.props.selected)
            && let Some(keys) = &props.selected
        {
            self.apply_selected(keys);
        }
        if (first || props.open != self.props.open)
            && let Some(keys) = &props.open
        {
            loads.extend(expansion::set(&mut self.registry, &mut self.open, keys));
        }
        if (first || props.active != self.props.active)
            && let Some(keys) = &props.active
        {
            active::set(
                &mut self.registry,
                &mut self.active,
                keys,
                self.config.multiple_active,
            );
        }

        if first {
            self.mounted = true;
            if self.config.open_all {
                expansion::open_all(&mut self.registry, &mut self.open);
            }
        }

        selection::recompute_all(&mut self.registry);
        self.props = props;
        self.publish(loads)
    }

    /// Replace the items, keeping the controlled lists as they are.
    pub fn set_items(&mut self, items: Vec<Value>) -> Settle {
        let props = TreeProps {
            items,
            ..self.props.clone()
        };
        self.sync(props)
    }

    /// Control (or release, with `None`) the selection.
    pub fn set_selected_value(&mut self, keys: Option<Vec<NodeKey>>) -> Settle {
        let props = TreeProps {
            selected: keys,
            ..self.props.clone()
        };
        self.sync(props)
    }

    /// Control (or release, with `None`) the open nodes.
    pub fn set_open_value(&mut self, keys: Option<Vec<NodeKey>>) -> Settle {
        let props = TreeProps {
            open: keys,
            ..self.props.clone()
        };
        self.sync(props)
    }

    /// Control (or release, with `None`) the active nodes.
    pub fn set_active_value(&mut self, keys: Option<Vec<NodeKey>>) -> Settle {
        let props = TreeProps {
            active: keys,
            ..self.props.clone()
        };
        self.sync(props)
    }

    fn apply_selected(&mut self, keys: &[NodeKey]) {
        let known: Vec<NodeKey> = keys
            .iter()
            .filter(|key| self.registry.contains(key))
            .cloned()
            .collect();
        if known.is_empty() && !keys.is_empty() {
            debug!("Ignoring controlled selection: none of {keys:?} is in the tree");
            return;
        }
        selection::set(&mut self.registry, &known);
    }

    // -------------------------------------------------------------------------
    // User intents
    // -------------------------------------------------------------------------

    /// Toggle the checkbox of `key`.
    ///
    /// An unloaded node is loaded first; the toggle is applied when its
    /// children arrive, so they are included in the one notification.
    pub fn toggle_select(&mut self, key: &NodeKey) -> Settle {
        if !self.config.selectable {
            debug!("Ignoring select toggle on {key}: selection is disabled");
            return Settle::default();
        }
        let Some((load, selected)) = self.registry.get(key).map(|n| (n.load, n.selected)) else {
            debug!("Ignoring select toggle on unknown node {key}");
            return Settle::default();
        };

        match load {
            LoadState::Unloaded => {
                let intent = PendingLoad {
                    open: false,
                    select: Some(!selected),
                };
                let loads = expansion::request_load(&mut self.registry, key, intent);
                return Settle {
                    changes: Vec::new(),
                    loads: loads.into_iter().collect(),
                };
            }
            LoadState::Pending(mut intent) => {
                intent.select = Some(!intent.select.unwrap_or(selected));
                if let Some(node) = self.registry.get_mut(key) {
                    node.load = LoadState::Pending(intent);
                }
                return Settle::default();
            }
            LoadState::Loaded => {}
        }

        selection::toggle(&mut self.registry, key);
        self.publish(Vec::new())
    }

    /// Toggle the expander of `key`.
    pub fn toggle_open(&mut self, key: &NodeKey) -> Settle {
        let ticket = expansion::toggle(&mut self.registry, &mut self.open, key);
        self.publish(ticket.into_iter().collect())
    }

    /// Toggle whether `key` is active.
    pub fn toggle_active(&mut self, key: &NodeKey) -> Settle {
        if !self.config.activatable {
            debug!("Ignoring active toggle on {key}: activation is disabled");
            return Settle::default();
        }
        active::toggle(
            &mut self.registry,
            &mut self.active,
            key,
            self.config.multiple_active,
        );
        self.publish(Vec::new())
    }

    /// Open every node whose children are materialized.
    pub fn open_all(&mut self) -> Settle {
        expansion::open_all(&mut self.registry, &mut self.open);
        self.publish(Vec::new())
    }

    /// Close every node.
    pub fn close_all(&mut self) -> Settle {
        expansion::close_all(&mut self.registry, &mut self.open);
        self.publish(Vec::new())
    }

    /// Set or clear the search query.
    pub fn set_search(&mut self, search: Option<&str>) {
        self.search = search.filter(|s| !s.is_empty()).map(str::to_string);
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Merge a finished load.
    ///
    /// Applies the open/select intents recorded while the load was
    /// pending. Results for nodes that are no longer pending (for example
    /// after a rebuild removed them) are discarded. A failed load returns
    /// the node to unloaded so the next toggle retries.
    pub fn finish_load(&mut self, outcome: LoadOutcome) -> Result<Settle, TreeError> {
        let LoadOutcome { key, result } = outcome;
        let intent = match self.registry.get(&key).map(|node| node.load) {
            Some(LoadState::Pending(intent)) => intent,
            _ => {
                debug!("Discarding load result for {key}: node is not pending");
                return Ok(Settle::default());
            }
        };

        match result {
            Ok(children) => {
                self.registry.merge_loaded_children(&key, children);
                let selected = self.registry.get(&key).is_some_and(|n| n.selected);
                match intent.select {
                    Some(target) if target != selected => {
                        selection::toggle(&mut self.registry, &key);
                    }
                    _ => selection::refresh_ancestors(&mut self.registry, &key),
                }
                let expandable = self.registry.get(&key).is_some_and(|n| !n.leaf);
                if intent.open && expandable {
                    expansion::mark(&mut self.registry, &mut self.open, &key, true);
                }
                Ok(self.publish(Vec::new()))
            }
            Err(source) => {
                expansion::abandon_load(&mut self.registry, &key);
                warn!("Loading children of {key} failed: {source}");
                Err(TreeError::Loader { key, source })
            }
        }
    }

    /// Run every load in `settle` with the configured loader and merge
    /// the results into one settle.
    ///
    /// Loads run concurrently. If one fails, its error is returned and
    /// every facet carried by `settle` or changed by the loads that
    /// succeeded is reported again by the next settle.
    pub async fn resolve(&mut self, mut settle: Settle) -> Result<Settle, TreeError> {
        let Some(loader) = self.loader.clone() else {
            return Ok(settle);
        };
        let tickets = std::mem::take(&mut settle.loads);
        if tickets.is_empty() {
            return Ok(settle);
        }

        let outcomes = futures::future::join_all(
            tickets
                .into_iter()
                .map(|ticket| ticket.run(loader.as_ref())),
        )
        .await;

        let mut failure = None;
        for outcome in outcomes {
            match self.finish_load(outcome) {
                Ok(later) => settle.merge(later),
                Err(err) => {
                    failure.get_or_insert(err);
                }
            }
        }

        match failure {
            Some(err) => {
                self.reported
                    .stale
                    .extend(settle.changes.iter().map(|change| change.facet));
                Err(err)
            }
            None => Ok(settle),
        }
    }

    // -------------------------------------------------------------------------
    // Snapshots
    // -------------------------------------------------------------------------

    /// The configuration the view was created with.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// The props from the last sync.
    pub fn props(&self) -> &TreeProps {
        &self.props
    }

    /// The underlying node registry.
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Key-to-node mapping.
    pub fn nodes(&self) -> &IndexMap<NodeKey, TreeNode> {
        self.registry.nodes()
    }

    /// Look up a node by key.
    pub fn node(&self, key: &NodeKey) -> Option<&TreeNode> {
        self.registry.get(key)
    }

    /// Selected keys across the whole tree, in tree order.
    pub fn selected(&self) -> Vec<NodeKey> {
        selection::selected_keys(&self.registry)
    }

    /// Open keys, in the order they were opened.
    pub fn open(&self) -> Vec<NodeKey> {
        self.open.iter().cloned().collect()
    }

    /// Active keys, in the order they were activated.
    pub fn active(&self) -> Vec<NodeKey> {
        self.active.iter().cloned().collect()
    }

    /// The current search query, if any.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Keys hidden by the current search.
    pub fn excluded(&self) -> HashSet<NodeKey> {
        match &self.search {
            Some(query) => search::excluded(&self.registry, query, self.filter.as_ref()),
            None => HashSet::new(),
        }
    }

    /// Rows currently on screen.
    pub fn visible(&self) -> Vec<VisibleNode> {
        visible::rows(&self.registry, &self.excluded())
    }

    /// Whether a load for `key` is in flight.
    pub fn is_loading(&self, key: &NodeKey) -> bool {
        self.registry
            .get(key)
            .is_some_and(|node| node.load.is_pending())
    }

    // -------------------------------------------------------------------------
    // Publishing
    // -------------------------------------------------------------------------

    /// Compare every facet with what was last reported.
    fn publish(&mut self, loads: Vec<LoadTicket>) -> Settle {
        let mut changes = Vec::new();

        let selected = self.selected();
        let differs = !selection::same_selection(&selected, &self.reported.selected);
        if self.reported.needs(Facet::Selected, differs) {
            self.reported.selected = selected.clone();
            changes.push(Change {
                facet: Facet::Selected,
                keys: selected,
            });
        }

        let open = self.open();
        if self.reported.needs(Facet::Open, open != self.reported.open) {
            self.reported.open = open.clone();
            changes.push(Change {
                facet: Facet::Open,
                keys: open,
            });
        }

        let active = self.active();
        if self.reported.needs(Facet::Active, active != self.reported.active) {
            self.reported.active = active.clone();
            changes.push(Change {
                facet: Facet::Active,
                keys: active,
            });
        }

        self.reported.stale.clear();
        for change in &changes {
            trace!("{:?} changed: {:?}", change.facet, change.keys);
        }
        Settle { changes, loads }
    }
}
