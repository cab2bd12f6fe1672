pub mod composer;
pub mod dialogs;
pub mod rail;
pub mod sidebar;

use crate::tui::dom::{Document, NodeId};
use anyhow::Result;

/// Base trait for the shell's view components
///
/// A component owns a subtree of the document: it builds it on mount, and
/// removes it together with any listeners it attached on unmount.
pub trait Component {
    /// Build the component under `parent` and return its root element
    fn mount(&mut self, doc: &mut Document, parent: NodeId) -> Result<NodeId>;

    /// Remove the component's elements and listeners
    fn unmount(&mut self, doc: &mut Document) -> Result<()>;

    /// Root element while mounted
    fn root(&self) -> Option<NodeId>;

    fn is_mounted(&self) -> bool {
        self.root().is_some()
    }
}

/// Parsed `data-action` attribute of an activatable element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    OpenDialog(String),
    CloseDialog(String),
}

impl Action {
    /// Parse `open:<dialog>` / `close:<dialog>`
    pub fn parse(value: &str) -> Option<Self> {
        let (verb, target) = value.split_once(':')?;
        let target = target.trim();
        if target.is_empty() {
            return None;
        }
        match verb.trim() {
            "open" => Some(Self::OpenDialog(target.to_string())),
            "close" => Some(Self::CloseDialog(target.to_string())),
            _ => None,
        }
    }

    pub fn to_attribute(&self) -> String {
        match self {
            Self::OpenDialog(id) => format!("open:{}", id),
            Self::CloseDialog(id) => format!("close:{}", id),
        }
    }
}
