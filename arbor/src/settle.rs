//! Change notifications produced by one settle.

use serde::Serialize;

use crate::key::NodeKey;
use crate::loader::LoadTicket;

/// One of the externally visible value lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Selected,
    Open,
    Active,
}

/// The complete new value of one facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub facet: Facet,
    pub keys: Vec<NodeKey>,
}

/// Result of processing one input.
///
/// Holds at most one [`Change`] per facet, and only for facets whose
/// value differs from what was last reported. `loads` lists the loads
/// the host must run and hand back via
/// [`TreeView::finish_load`](crate::TreeView::finish_load).
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use = "a settle carries change notifications and pending loads"]
pub struct Settle {
    pub changes: Vec<Change>,
    pub loads: Vec<LoadTicket>,
}

impl Settle {
    /// The new value of `facet`, if it changed.
    pub fn changed(&self, facet: Facet) -> Option<&[NodeKey]> {
        self.changes
            .iter()
            .find(|change| change.facet == facet)
            .map(|change| change.keys.as_slice())
    }

    /// Shorthand for `changed(Facet::Selected)`.
    pub fn selected(&self) -> Option<&[NodeKey]> {
        self.changed(Facet::Selected)
    }

    /// Shorthand for `changed(Facet::Open)`.
    pub fn open(&self) -> Option<&[NodeKey]> {
        self.changed(Facet::Open)
    }

    /// Shorthand for `changed(Facet::Active)`.
    pub fn active(&self) -> Option<&[NodeKey]> {
        self.changed(Facet::Active)
    }

    /// True when nothing changed and nothing needs loading.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.loads.is_empty()
    }

    /// Fold a later settle into this one; later values win per facet.
    pub fn merge(&mut self, later: Settle) {
        for change in later.changes {
            match self.changes.iter_mut().find(|c| c.facet == change.facet) {
                Some(existing) => existing.keys = change.keys,
                None => self.changes.push(change),
            }
        }
        self.loads.extend(later.loads);
    }
}
