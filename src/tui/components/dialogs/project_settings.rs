//! Project settings dialog
//!
//! Name and custom instructions for the current project. Cancel and Save
//! both close the dialog; Delete is left for the owner to wire up.

use super::types::{dialog_ids, DialogConfig, DialogContent, DialogOptions};
use crate::tui::components::Action;
use crate::tui::dom::{attrs, Document, DomResult, Element, NodeId, Tag};

pub mod ids {
    pub const NAME: &str = "project-name";
    pub const INSTRUCTIONS: &str = "project-instructions";
    pub const DELETE: &str = "project-delete";
    pub const CANCEL: &str = "project-cancel";
    pub const SAVE: &str = "project-save";
}

#[derive(Debug)]
pub struct ProjectSettingsDialog {
    config: DialogConfig,
}

impl ProjectSettingsDialog {
    pub fn new(options: DialogOptions) -> Self {
        let mut config = DialogConfig::new(dialog_ids::PROJECT_SETTINGS).with_title("Project settings");
        config.options = options;
        Self { config }
    }
}

impl DialogContent for ProjectSettingsDialog {
    fn config(&self) -> &DialogConfig {
        &self.config
    }

    fn build(&self, doc: &mut Document, container: NodeId) -> DomResult<()> {
        let close = Action::CloseDialog(dialog_ids::PROJECT_SETTINGS.to_string()).to_attribute();

        let name = doc.append(container, Element::new(Tag::Label).with_text("Name"))?;
        doc.append(name, Element::new(Tag::Input).with_id(ids::NAME).with_attr("type", "text"))?;

        let instructions = doc.append(container, Element::new(Tag::Label).with_text("Instructions"))?;
        doc.append(
            instructions,
            Element::new(Tag::Textarea)
                .with_id(ids::INSTRUCTIONS)
                .with_attr("placeholder", "How should the assistant behave in this project?"),
        )?;

        let footer = doc.append(container, Element::new(Tag::Div))?;
        doc.append(
            footer,
            Element::new(Tag::Button)
                .with_id(ids::DELETE)
                .with_attr("data-variant", "danger")
                .with_text("Delete project"),
        )?;
        doc.append(
            footer,
            Element::new(Tag::Button)
                .with_id(ids::CANCEL)
                .with_attr(attrs::ACTION, close.as_str())
                .with_text("Cancel"),
        )?;
        doc.append(
            footer,
            Element::new(Tag::Button)
                .with_id(ids::SAVE)
                .with_attr(attrs::ACTION, close)
                .with_text("Save"),
        )?;
        Ok(())
    }
}
