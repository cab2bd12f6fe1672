//! Chat composer: message input, mode picker and actions.
//! Only the focusable surface matters here; text editing is native.

use super::dialogs::dialog_ids;
use super::{Action, Component};
use crate::tui::dom::{attrs, Document, Element, NodeId, Tag};
use anyhow::{Context, Result};

pub mod ids {
    pub const COMPOSER: &str = "composer";
    pub const INPUT: &str = "composer-input";
    pub const MODE: &str = "composer-mode";
    pub const PROJECT_SETTINGS: &str = "composer-project-settings";
    pub const SEND: &str = "composer-send";
}

#[derive(Debug, Default)]
pub struct Composer {
    root: Option<NodeId>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Composer {
    fn mount(&mut self, doc: &mut Document, parent: NodeId) -> Result<NodeId> {
        if let Some(root) = self.root {
            return Ok(root);
        }

        let root = doc
            .append(parent, Element::new(Tag::Div).with_id(ids::COMPOSER))
            .context("Failed to mount composer")?;
        doc.append(
            root,
            Element::new(Tag::Textarea)
                .with_id(ids::INPUT)
                .with_attr("placeholder", "How can I help you today?"),
        )?;
        doc.append(root, Element::new(Tag::Select).with_id(ids::MODE).with_attr("value", "chat"))?;
        doc.append(
            root,
            Element::new(Tag::Button)
                .with_id(ids::PROJECT_SETTINGS)
                .with_attr(
                    attrs::ACTION,
                    Action::OpenDialog(dialog_ids::PROJECT_SETTINGS.to_string()).to_attribute(),
                )
                .with_text("Project settings"),
        )?;
        doc.append(root, Element::new(Tag::Button).with_id(ids::SEND).with_text("Send"))?;

        self.root = Some(root);
        Ok(root)
    }

    fn unmount(&mut self, doc: &mut Document) -> Result<()> {
        if let Some(root) = self.root.take() {
            doc.remove(root).context("Failed to unmount composer")?;
        }
        Ok(())
    }

    fn root(&self) -> Option<NodeId> {
        self.root
    }
}
