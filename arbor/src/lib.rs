//! Tree state engine for hierarchical list widgets.
//!
//! Builds a flat, keyed arena from nested JSON records and tracks, per
//! node, selection (with cascade and indeterminate state), expansion
//! (with lazily loaded children) and activation. Host-controlled value
//! lists are reconciled against the internal caches on every change.
//!
//! Rendering, input handling and I/O stay with the host: the engine
//! takes decoded intents such as [`TreeView::toggle_select`], hands out
//! [`LoadTicket`]s for the host to run, and reports complete value lists
//! through [`Settle`].

pub mod active;
pub mod config;
pub mod error;
pub mod expansion;
pub mod key;
pub mod loader;
pub mod node;
pub mod record;
pub mod registry;
pub mod search;
pub mod selection;
pub mod settle;
pub mod visible;

mod view;

pub use config::TreeConfig;
pub use error::{LoadError, TreeError};
pub use key::NodeKey;
pub use loader::{ChildLoader, FnLoader, LoadOutcome, LoadTicket};
pub use node::{LoadState, PendingLoad, TreeNode};
pub use record::ItemFields;
pub use registry::{NodeRegistry, RebuildSummary};
pub use search::ItemFilter;
pub use settle::{Change, Facet, Settle};
pub use view::*;
pub use visible::VisibleNode;
