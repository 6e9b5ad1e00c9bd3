//! Error types

use crate::key::NodeKey;

/// Error returned by a child loader.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LoadError {
    /// Error message
    pub message: String,
}

impl LoadError {
    /// Create a new load error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<String> for LoadError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for LoadError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Errors surfaced by the tree engine.
///
/// Unknown identifiers, duplicate identifiers and intents disabled by
/// configuration are not errors; they are ignored and logged.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The loader failed for a node. The node is back to unloaded and
    /// the next toggle retries.
    #[error("Loading children of node {key} failed: {source}")]
    Loader {
        key: NodeKey,
        #[source]
        source: LoadError,
    },

    /// A configuration document could not be parsed.
    #[error("Invalid tree configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl TreeError {
    /// Creates a new loader error.
    pub fn loader(key: NodeKey, source: impl Into<LoadError>) -> Self {
        Self::Loader {
            key,
            source: source.into(),
        }
    }
}
