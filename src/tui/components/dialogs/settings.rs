//! Settings dialog
//!
//! Preference toggles and a theme picker. Values are not persisted; the
//! dialog only provides the focusable surface.

use super::types::{dialog_ids, DialogConfig, DialogContent, DialogOptions};
use crate::tui::components::Action;
use crate::tui::dom::{attrs, Document, DomResult, Element, NodeId, Tag};

pub mod ids {
    pub const SEND_ON_ENTER: &str = "settings-send-on-enter";
    pub const SHOW_TIMESTAMPS: &str = "settings-show-timestamps";
    pub const THEME: &str = "settings-theme";
    pub const CLOSE: &str = "settings-close";
}

const THEMES: &[&str] = &["system", "light", "dark"];

#[derive(Debug)]
pub struct SettingsDialog {
    config: DialogConfig,
}

impl SettingsDialog {
    pub fn new(options: DialogOptions) -> Self {
        let mut config = DialogConfig::new(dialog_ids::SETTINGS).with_title("Settings");
        config.options = options;
        Self { config }
    }
}

impl DialogContent for SettingsDialog {
    fn config(&self) -> &DialogConfig {
        &self.config
    }

    fn build(&self, doc: &mut Document, container: NodeId) -> DomResult<()> {
        doc.append(container, Element::new(Tag::Span).with_text("Settings"))?;

        for (id, label) in [
            (ids::SEND_ON_ENTER, "Send message on Enter"),
            (ids::SHOW_TIMESTAMPS, "Show timestamps"),
        ] {
            let row = doc.append(container, Element::new(Tag::Label).with_text(label))?;
            doc.append(
                row,
                Element::new(Tag::Input)
                    .with_id(id)
                    .with_attr("type", "checkbox")
                    .with_attr("aria-label", label),
            )?;
        }

        doc.append(
            container,
            Element::new(Tag::Select)
                .with_id(ids::THEME)
                .with_attr("aria-label", "Theme")
                .with_attr("data-options", THEMES.join(","))
                .with_attr("value", THEMES[0]),
        )?;

        doc.append(
            container,
            Element::new(Tag::Button)
                .with_id(ids::CLOSE)
                .with_attr(attrs::ACTION, Action::CloseDialog(dialog_ids::SETTINGS.to_string()).to_attribute())
                .with_text("Done"),
        )?;
        Ok(())
    }
}
