//! Roving focus for compact navigation rails
//!
//! A rail is a container whose marked children form a vertical strip of
//! controls (the collapsed sidebar, small menus). ArrowDown and ArrowUp move
//! focus to the next or previous marked item, wrapping at both ends.
//!
//! The rail stores no selected index. Every key press recomputes the item set
//! and looks up the focused element in it, so items can come and go between
//! key presses without anything going stale.

use crate::tui::dom::query::rail_items;
use crate::tui::dom::{Document, KeyListener, ListenerTarget, NodeId};
use crate::tui::events::{KeyboardEvent, ListenerId};
use crate::tui::keys::FocusKey;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace};

/// Default attribute that flags an element as a rail item
pub const DEFAULT_RAIL_MARKER: &str = "data-rail-item";

/// Move focus `delta` steps along the rail, wrapping around
///
/// Returns false (and changes nothing) when the focused element is not one of
/// the rail's items: the rail never guesses where focus should start.
pub fn move_rail_focus(doc: &mut Document, container: NodeId, marker: &str, delta: isize) -> bool {
    let items = rail_items(doc, Some(container), marker);
    let active = doc.active_element();

    let Some(index) = items.iter().position(|&item| item == active) else {
        trace!("Focus {} is not a rail item, arrow key ignored", doc.describe(active));
        return false;
    };

    let count = items.len() as isize;
    let next = (index as isize + delta + count).rem_euclid(count) as usize;
    doc.focus(items[next])
}

/// A rail wired to its container with one key listener
#[derive(Debug)]
pub struct NavigationRail {
    container: NodeId,
    listener: ListenerId,
}

impl NavigationRail {
    /// Attach the rail's key listener to `container`
    pub fn attach(doc: &mut Document, container: NodeId, marker: impl Into<String>) -> Self {
        let handler = RailKeys {
            container,
            marker: marker.into(),
        };
        let listener = doc.add_key_listener(ListenerTarget::Node(container), Rc::new(RefCell::new(handler)));
        debug!("Navigation rail attached to {}", doc.describe(container));
        Self { container, listener }
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Remove the rail's key listener
    pub fn detach(self, doc: &mut Document) {
        doc.remove_key_listener(self.listener);
        debug!("Navigation rail detached from {}", doc.describe(self.container));
    }
}

struct RailKeys {
    container: NodeId,
    marker: String,
}

impl KeyListener for RailKeys {
    fn on_key(&mut self, doc: &mut Document, event: &mut KeyboardEvent) {
        let delta = match FocusKey::classify(event.key()) {
            FocusKey::ArrowDown => 1,
            FocusKey::ArrowUp => -1,
            _ => return,
        };

        if move_rail_focus(doc, self.container, &self.marker, delta) {
            event.prevent_default();
        }
    }
}
