//! Lazy loading of children.
//!
//! The engine never runs a loader itself. Opening (or selecting) an
//! unloaded node yields a [`LoadTicket`]; the host runs it whenever it
//! likes and hands the [`LoadOutcome`] back to
//! [`TreeView::finish_load`](crate::TreeView::finish_load). Other nodes
//! stay fully usable while a ticket is outstanding.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::LoadError;
use crate::key::NodeKey;

/// Produces the children of a lazy node.
///
/// # Example
///
/// ```ignore
/// struct DirLoader;
///
/// #[async_trait]
/// impl ChildLoader for DirLoader {
///     async fn load_children(&self, item: &Value) -> Result<Vec<Value>, LoadError> {
///         let path = item["path"].as_str().ok_or("record has no path")?;
///         list_dir(path).await.map_err(LoadError::from)
///     }
/// }
/// ```
#[async_trait]
pub trait ChildLoader: Send + Sync {
    /// Load the child records of `item`.
    async fn load_children(&self, item: &Value) -> Result<Vec<Value>, LoadError>;
}

/// Adapter for synchronous loader closures.
pub struct FnLoader<F>(pub F);

impl<F> fmt::Debug for FnLoader<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnLoader")
    }
}

#[async_trait]
impl<F> ChildLoader for FnLoader<F>
where
    F: Fn(&Value) -> Result<Vec<Value>, LoadError> + Send + Sync,
{
    async fn load_children(&self, item: &Value) -> Result<Vec<Value>, LoadError> {
        (self.0)(item)
    }
}

/// A load the engine asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTicket {
    key: NodeKey,
    item: Value,
}

impl LoadTicket {
    pub(crate) fn new(key: NodeKey, item: Value) -> Self {
        Self { key, item }
    }

    /// The node to load.
    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    /// The node's source record, as handed to the loader.
    pub fn item(&self) -> &Value {
        &self.item
    }

    /// Run the loader for this ticket.
    pub async fn run(self, loader: &dyn ChildLoader) -> LoadOutcome {
        let result = loader.load_children(&self.item).await;
        LoadOutcome {
            key: self.key,
            result,
        }
    }

    /// Pair this ticket with an externally produced result.
    pub fn complete(self, result: Result<Vec<Value>, LoadError>) -> LoadOutcome {
        LoadOutcome {
            key: self.key,
            result,
        }
    }
}

/// The result of running a [`LoadTicket`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub key: NodeKey,
    pub result: Result<Vec<Value>, LoadError>,
}
