//! Collapsed sidebar: a vertical rail of icon buttons
//!
//! Every entry carries the rail marker so ArrowUp/ArrowDown rove between
//! them. The projects entry has a popover trigger nested next to it which is
//! deliberately left unmarked.

use super::dialogs::dialog_ids;
use super::rail::NavigationRail;
use super::{Action, Component};
use crate::tui::dom::{attrs, Document, Element, NodeId, Tag};
use anyhow::{Context, Result};
use tracing::debug;

/// Element ids of the sidebar
pub mod ids {
    pub const RAIL: &str = "sidebar-rail";
    pub const NEW_CHAT: &str = "rail-new-chat";
    pub const SEARCH: &str = "rail-search";
    pub const PROJECTS: &str = "rail-projects";
    pub const PROJECTS_MENU: &str = "rail-projects-menu";
    pub const ICONS: &str = "rail-icons";
    pub const SETTINGS: &str = "rail-settings";
}

struct RailEntry {
    id: &'static str,
    label: &'static str,
    action: Option<Action>,
}

fn entries() -> Vec<RailEntry> {
    vec![
        RailEntry { id: ids::NEW_CHAT, label: "New chat", action: None },
        RailEntry { id: ids::SEARCH, label: "Search chats", action: None },
        RailEntry { id: ids::PROJECTS, label: "Projects", action: None },
        RailEntry {
            id: ids::ICONS,
            label: "Choose icon",
            action: Some(Action::OpenDialog(dialog_ids::ICON_PICKER.to_string())),
        },
        RailEntry {
            id: ids::SETTINGS,
            label: "Settings",
            action: Some(Action::OpenDialog(dialog_ids::SETTINGS.to_string())),
        },
    ]
}

/// Collapsed navigation sidebar
#[derive(Debug)]
pub struct Sidebar {
    marker: String,
    root: Option<NodeId>,
    rail: Option<NavigationRail>,
}

impl Sidebar {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            root: None,
            rail: None,
        }
    }
}

impl Component for Sidebar {
    fn mount(&mut self, doc: &mut Document, parent: NodeId) -> Result<NodeId> {
        if let Some(root) = self.root {
            return Ok(root);
        }

        let nav = doc
            .append(parent, Element::new(Tag::Nav).with_id(ids::RAIL).with_attr("aria-label", "Sidebar"))
            .context("Failed to mount sidebar")?;

        for entry in entries() {
            let mut button = Element::new(Tag::Button)
                .with_id(entry.id)
                .with_attr(self.marker.as_str(), "")
                .with_attr("aria-label", entry.label)
                .with_text(entry.label);
            if let Some(action) = &entry.action {
                button = button.with_attr(attrs::ACTION, action.to_attribute());
            }
            doc.append(nav, button)?;

            if entry.id == ids::PROJECTS {
                let popover = doc.append(nav, Element::new(Tag::Div).with_attr("role", "menu"))?;
                doc.append(
                    popover,
                    Element::new(Tag::Button)
                        .with_id(ids::PROJECTS_MENU)
                        .with_attr("aria-haspopup", "menu")
                        .with_text("More"),
                )?;
            }
        }

        self.rail = Some(NavigationRail::attach(doc, nav, self.marker.clone()));
        self.root = Some(nav);
        debug!("Sidebar mounted");
        Ok(nav)
    }

    fn unmount(&mut self, doc: &mut Document) -> Result<()> {
        if let Some(rail) = self.rail.take() {
            rail.detach(doc);
        }
        if let Some(root) = self.root.take() {
            doc.remove(root).context("Failed to unmount sidebar")?;
        }
        Ok(())
    }

    fn root(&self) -> Option<NodeId> {
        self.root
    }
}
