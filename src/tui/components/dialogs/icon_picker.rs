//! Icon picker dialog
//!
//! A search field followed by one button per configured icon. The search
//! field takes initial focus so typing can start right away.

use super::types::{dialog_ids, DialogConfig, DialogContent, DialogOptions, InitialFocus};
use crate::tui::components::Action;
use crate::tui::dom::{attrs, Document, DomResult, Element, NodeId, Tag};

pub mod ids {
    pub const SEARCH: &str = "icon-search";
    pub const GRID: &str = "icon-grid";
    pub const CLOSE: &str = "icon-picker-close";

    pub fn icon(name: &str) -> String {
        format!("icon-{}", name)
    }
}

#[derive(Debug)]
pub struct IconPickerDialog {
    config: DialogConfig,
    icons: Vec<String>,
}

impl IconPickerDialog {
    pub fn new(options: DialogOptions, icons: Vec<String>) -> Self {
        let config = DialogConfig {
            options,
            ..DialogConfig::new(dialog_ids::ICON_PICKER).with_title("Choose an icon")
        }
        .with_initial_focus(InitialFocus::ElementId(ids::SEARCH.to_string()));
        Self { config, icons }
    }
}

impl DialogContent for IconPickerDialog {
    fn config(&self) -> &DialogConfig {
        &self.config
    }

    fn build(&self, doc: &mut Document, container: NodeId) -> DomResult<()> {
        doc.append(
            container,
            Element::new(Tag::Input)
                .with_id(ids::SEARCH)
                .with_attr("type", "search")
                .with_attr("placeholder", "Search icons"),
        )?;

        let grid = doc.append(
            container,
            Element::new(Tag::Div).with_id(ids::GRID).with_attr("role", "listbox"),
        )?;
        for icon in &self.icons {
            doc.append(
                grid,
                Element::new(Tag::Button)
                    .with_id(ids::icon(icon))
                    .with_attr("aria-label", icon.as_str())
                    .with_text(icon.as_str()),
            )?;
        }

        doc.append(
            container,
            Element::new(Tag::Button)
                .with_id(ids::CLOSE)
                .with_attr(
                    attrs::ACTION,
                    Action::CloseDialog(dialog_ids::ICON_PICKER.to_string()).to_attribute(),
                )
                .with_text("Close"),
        )?;
        Ok(())
    }
}
