//! Tree configuration

use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::record::ItemFields;

/// Behaviour flags and record field names for a [`TreeView`](crate::TreeView).
///
/// # Example
///
/// ```
/// use arbor::TreeConfig;
///
/// let config = TreeConfig::default()
///     .with_selectable(true)
///     .with_item_key("name");
/// assert_eq!(config.item_key, "name");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Whether user toggles may change the selection.
    ///
    /// Default: false
    pub selectable: bool,

    /// Whether user toggles may change the active set.
    ///
    /// Default: false
    pub activatable: bool,

    /// Whether several nodes may be active at once.
    ///
    /// Default: false
    pub multiple_active: bool,

    /// Whether every materialized interior node opens on mount.
    ///
    /// Default: false
    pub open_all: bool,

    /// Record field holding the node identifier.
    ///
    /// Default: `id`
    pub item_key: String,

    /// Record field holding the child records.
    ///
    /// Default: `children`
    pub item_children: String,

    /// Record field holding the display text, used by search.
    ///
    /// Default: `name`
    pub item_text: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        let fields = ItemFields::default();
        Self {
            selectable: false,
            activatable: false,
            multiple_active: false,
            open_all: false,
            item_key: fields.key,
            item_children: fields.children,
            item_text: fields.text,
        }
    }
}

impl TreeConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a config from a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Enables or disables user selection.
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Enables or disables user activation.
    pub fn with_activatable(mut self, activatable: bool) -> Self {
        self.activatable = activatable;
        self
    }

    /// Allows several active nodes at once.
    pub fn with_multiple_active(mut self, multiple_active: bool) -> Self {
        self.multiple_active = multiple_active;
        self
    }

    /// Opens every materialized interior node on mount.
    pub fn with_open_all(mut self, open_all: bool) -> Self {
        self.open_all = open_all;
        self
    }

    /// Sets the key field.
    pub fn with_item_key(mut self, field: impl Into<String>) -> Self {
        self.item_key = field.into();
        self
    }

    /// Sets the children field.
    pub fn with_item_children(mut self, field: impl Into<String>) -> Self {
        self.item_children = field.into();
        self
    }

    /// Sets the display text field.
    pub fn with_item_text(mut self, field: impl Into<String>) -> Self {
        self.item_text = field.into();
        self
    }

    /// The field names as used by the registry.
    pub fn fields(&self) -> ItemFields {
        ItemFields {
            key: self.item_key.clone(),
            children: self.item_children.clone(),
            text: self.item_text.clone(),
        }
    }
}
