//! Focus-trap controller for modal dialogs
//!
//! One [`ModalDialog`] drives the Closed → Open → Closed lifecycle of one
//! dialog surface:
//!
//! - on open it remembers the element that had focus, attaches a single
//!   document-level key listener and schedules initial focus for the next tick;
//! - while open, Tab and Shift+Tab wrap around the dialog's focusable set and
//!   Escape is reported to the owner through `on_close`;
//! - on close it removes the listener and hands focus back to the trigger if
//!   the trigger is still in the document.
//!
//! The controller never flips its own open state in response to a key. The
//! owner decides, and calls [`ModalDialog::close`] (or `set_open(false)`).

use super::types::{DialogOptions, InitialFocus};
use crate::tui::dom::query::focusable_elements;
use crate::tui::dom::{attrs, Document, KeyListener, ListenerTarget, NodeId};
use crate::tui::events::{KeyboardEvent, ListenerId};
use crate::tui::keys::FocusKey;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

type CloseCallback = Rc<RefCell<dyn FnMut()>>;

/// One open lifecycle of a dialog
#[derive(Debug)]
pub struct DialogSession {
    id: Uuid,
    trigger: NodeId,
    container: NodeId,
    listener: ListenerId,
    alive: Rc<Cell<bool>>,
}

impl DialogSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Element that owned focus when the dialog opened (may be `body`)
    pub fn trigger(&self) -> NodeId {
        self.trigger
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn listener(&self) -> ListenerId {
        self.listener
    }
}

/// Modal dialog focus-trap controller
pub struct ModalDialog {
    options: DialogOptions,
    on_close: CloseCallback,
    session: Option<DialogSession>,
}

impl fmt::Debug for ModalDialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalDialog")
            .field("options", &self.options)
            .field("session", &self.session)
            .finish()
    }
}

impl ModalDialog {
    pub fn new(options: DialogOptions, on_close: impl FnMut() + 'static) -> Self {
        Self {
            options,
            on_close: Rc::new(RefCell::new(on_close)),
            session: None,
        }
    }

    pub fn options(&self) -> &DialogOptions {
        &self.options
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DialogSession> {
        self.session.as_ref()
    }

    /// Drive the controller from an `is_open` flag; only transitions act
    pub fn set_open(&mut self, doc: &mut Document, open: bool, container: NodeId) {
        if open {
            self.open(doc, container);
        } else {
            self.close(doc);
        }
    }

    /// Closed → Open. Opening an open dialog does nothing.
    pub fn open(&mut self, doc: &mut Document, container: NodeId) {
        if let Some(session) = &self.session {
            trace!("Dialog session {} already open", session.id);
            return;
        }

        let id = Uuid::new_v4();
        let trigger = doc.active_element();

        // The container has to accept programmatic focus for the initial
        // placement and the empty-set case.
        if doc.attribute(container, attrs::TABINDEX).is_none() {
            if let Err(e) = doc.set_attribute(container, attrs::TABINDEX, "-1") {
                warn!("Dialog container {} unavailable: {}", container, e);
            }
        }

        let trap = FocusTrap {
            container,
            on_close: self.on_close.clone(),
        };
        let listener = doc.add_key_listener(ListenerTarget::Document, Rc::new(RefCell::new(trap)));

        let alive = Rc::new(Cell::new(true));
        let pending = alive.clone();
        let initial = self.options.initial_focus.clone();
        doc.defer(move |doc| {
            if pending.get() {
                place_initial_focus(doc, container, &initial);
            } else {
                trace!("Dialog session {} closed before initial focus, skipped", id);
            }
        });

        debug!(
            "Dialog session {} opened on {} (trigger {})",
            id,
            doc.describe(container),
            doc.describe(trigger)
        );

        self.session = Some(DialogSession {
            id,
            trigger,
            container,
            listener,
            alive,
        });
    }

    /// Open → Closed, also used when the dialog unmounts. Closing a closed
    /// dialog does nothing.
    pub fn close(&mut self, doc: &mut Document) {
        let Some(session) = self.session.take() else {
            return;
        };

        session.alive.set(false);
        if !doc.remove_key_listener(session.listener) {
            warn!("Dialog session {} listener was already detached", session.id);
        }

        if self.options.restore_focus {
            restore_focus(doc, session.trigger);
        }

        debug!("Dialog session {} closed", session.id);
    }
}

fn place_initial_focus(doc: &mut Document, container: NodeId, initial: &InitialFocus) {
    let target = match initial {
        InitialFocus::Container => None,
        InitialFocus::FirstFocusable => focusable_elements(doc, Some(container)).first().copied(),
        InitialFocus::ElementId(id) => doc
            .element_by_id(id)
            .filter(|&node| node != container && doc.contains(container, node)),
    };

    let placed = target.is_some_and(|node| doc.focus(node));
    if !placed && !doc.focus(container) {
        trace!("Dialog container {} is gone, initial focus skipped", container);
    }
}

fn restore_focus(doc: &mut Document, trigger: NodeId) {
    if !doc.is_connected(trigger) {
        trace!("Focus trigger {} left the document, restoration skipped", trigger);
        return;
    }
    if trigger == doc.body() {
        doc.blur();
    } else if !doc.focus(trigger) {
        trace!("Focus trigger {} no longer focusable", doc.describe(trigger));
    }
}

/// Key listener attached for the lifetime of one dialog session
struct FocusTrap {
    container: NodeId,
    on_close: CloseCallback,
}

impl KeyListener for FocusTrap {
    fn on_key(&mut self, doc: &mut Document, event: &mut KeyboardEvent) {
        match FocusKey::classify(event.key()) {
            FocusKey::Escape => {
                event.prevent_default();
                match self.on_close.try_borrow_mut() {
                    Ok(mut on_close) => (&mut *on_close)(),
                    Err(_) => warn!("Dialog close callback re-entered, ignored"),
                }
            }
            FocusKey::Tab => self.trap_tab(doc, event, true),
            FocusKey::BackTab => self.trap_tab(doc, event, false),
            _ => {}
        }
    }
}

impl FocusTrap {
    /// Wrap Tab / Shift+Tab inside the container
    ///
    /// Focus on the last element (Tab) or the first (Shift+Tab) wraps to the
    /// other end. More generally, whenever native traversal would leave the
    /// container (focus on the container itself going backwards, or on a
    /// non-tabbable element past either end) the same wrap applies, and focus
    /// found outside the container is pulled back in. With nothing focusable
    /// inside, the key is swallowed and focus stays on the container.
    fn trap_tab(&self, doc: &mut Document, event: &mut KeyboardEvent, forward: bool) {
        let set = focusable_elements(doc, Some(self.container));
        let active = doc.active_element();
        let inside = doc.contains(self.container, active);

        let (Some(&first), Some(&last)) = (set.first(), set.last()) else {
            event.prevent_default();
            if !inside {
                doc.focus(self.container);
            }
            trace!("Dialog has no focusable elements, Tab kept on container");
            return;
        };

        let wrap_to = if forward { first } else { last };
        if !inside {
            event.prevent_default();
            doc.focus(wrap_to);
            return;
        }

        // Positions relative to the container; the container itself sorts
        // before every descendant.
        let order = doc.descendants(self.container);
        let position = |node: NodeId| order.iter().position(|&n| n == node);
        let at = if active == self.container { None } else { position(active) };

        let has_neighbour = if forward {
            set.iter().any(|&n| position(n) > at)
        } else {
            set.iter().any(|&n| position(n) < at)
        };

        if !has_neighbour {
            event.prevent_default();
            doc.focus(wrap_to);
            trace!(
                "Focus trap wrapped {} to {}",
                if forward { "forward" } else { "backward" },
                doc.describe(wrap_to)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::dom::{Element, Tag};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn tab() -> KeyEvent {
        KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)
    }

    fn shift_tab() -> KeyEvent {
        KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)
    }

    fn esc() -> KeyEvent {
        KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)
    }

    struct Fixture {
        doc: Document,
        opener: NodeId,
        outside: NodeId,
        container: NodeId,
        a: NodeId,
        b: NodeId,
        c: NodeId,
        closes: Rc<Cell<usize>>,
        dialog: ModalDialog,
    }

    /// body > [opener, dialog > [a, b, c], outside]
    fn fixture(options: DialogOptions) -> Fixture {
        let mut doc = Document::new();
        let body = doc.body();
        let opener = doc.append(body, Element::new(Tag::Button).with_id("opener")).unwrap();
        let container = doc.append(body, Element::new(Tag::Dialog).with_id("dialog")).unwrap();
        let a = doc.append(container, Element::new(Tag::Input).with_id("a")).unwrap();
        let b = doc.append(container, Element::new(Tag::Button).with_id("b")).unwrap();
        let c = doc.append(container, Element::new(Tag::Button).with_id("c")).unwrap();
        let outside = doc.append(body, Element::new(Tag::Button).with_id("outside")).unwrap();

        let closes = Rc::new(Cell::new(0));
        let counter = closes.clone();
        let dialog = ModalDialog::new(options, move || counter.set(counter.get() + 1));

        Fixture { doc, opener, outside, container, a, b, c, closes, dialog }
    }

    fn opened(options: DialogOptions) -> Fixture {
        let mut f = fixture(options);
        f.doc.focus(f.opener);
        f.dialog.open(&mut f.doc, f.container);
        f.doc.run_pending_tasks();
        f
    }

    #[test]
    fn test_open_focuses_container_next_tick() {
        let mut f = fixture(DialogOptions::default());
        f.doc.focus(f.opener);

        f.dialog.open(&mut f.doc, f.container);
        assert!(f.dialog.is_open());
        assert_eq!(f.doc.focused(), Some(f.opener));
        assert_eq!(f.dialog.session().unwrap().trigger(), f.opener);
        assert_eq!(f.doc.attribute(f.container, attrs::TABINDEX), Some("-1"));

        f.doc.run_pending_tasks();
        assert_eq!(f.doc.focused(), Some(f.container));
    }

    #[test]
    fn test_restores_focus_to_trigger() {
        let mut f = opened(DialogOptions::default());
        f.doc.focus(f.b);

        f.dialog.close(&mut f.doc);

        assert!(!f.dialog.is_open());
        assert_eq!(f.doc.focused(), Some(f.opener));
    }

    #[test]
    fn test_restore_skipped_when_trigger_removed() {
        let mut f = opened(DialogOptions::default());
        f.doc.focus(f.b);
        f.doc.remove(f.opener).unwrap();

        f.dialog.close(&mut f.doc);

        assert_eq!(f.doc.focused(), Some(f.b));
    }

    #[test]
    fn test_restore_disabled() {
        let mut f = opened(DialogOptions {
            restore_focus: false,
            ..DialogOptions::default()
        });
        f.doc.focus(f.c);

        f.dialog.close(&mut f.doc);

        assert_eq!(f.doc.focused(), Some(f.c));
    }

    #[test]
    fn test_restore_to_body_when_nothing_was_focused() {
        let mut f = fixture(DialogOptions::default());
        f.dialog.open(&mut f.doc, f.container);
        f.doc.run_pending_tasks();
        assert_eq!(f.doc.focused(), Some(f.container));

        f.dialog.close(&mut f.doc);
        assert_eq!(f.doc.focused(), None);
    }

    #[test]
    fn test_tab_wraps_forward() {
        let mut f = opened(DialogOptions::default());
        f.doc.focus(f.c);

        let event = f.doc.dispatch_key(tab());

        assert!(event.is_default_prevented());
        assert_eq!(f.doc.focused(), Some(f.a));
    }

    #[test]
    fn test_shift_tab_wraps_backward() {
        let mut f = opened(DialogOptions::default());
        f.doc.focus(f.a);

        let event = f.doc.dispatch_key(shift_tab());

        assert!(event.is_default_prevented());
        assert_eq!(f.doc.focused(), Some(f.c));
    }

    #[test]
    fn test_tab_inside_moves_natively() {
        let mut f = opened(DialogOptions::default());

        // Container → first element, then along the set
        let event = f.doc.dispatch_key(tab());
        assert!(!event.is_default_prevented());
        assert_eq!(f.doc.focused(), Some(f.a));

        f.doc.dispatch_key(tab());
        assert_eq!(f.doc.focused(), Some(f.b));

        f.doc.dispatch_key(shift_tab());
        assert_eq!(f.doc.focused(), Some(f.a));
    }

    #[test]
    fn test_shift_tab_from_container_stays_inside() {
        let mut f = opened(DialogOptions::default());
        assert_eq!(f.doc.focused(), Some(f.container));

        f.doc.dispatch_key(shift_tab());

        assert_eq!(f.doc.focused(), Some(f.c));
    }

    #[test]
    fn test_focus_outside_is_pulled_back() {
        let mut f = opened(DialogOptions::default());
        f.doc.focus(f.outside);

        f.doc.dispatch_key(tab());
        assert_eq!(f.doc.focused(), Some(f.a));

        f.doc.focus(f.opener);
        f.doc.dispatch_key(shift_tab());
        assert_eq!(f.doc.focused(), Some(f.c));
    }

    #[test]
    fn test_set_is_recomputed_per_key() {
        let mut f = opened(DialogOptions::default());
        let d = f
            .doc
            .append(f.container, Element::new(Tag::Button).with_id("d"))
            .unwrap();

        f.doc.focus(f.c);
        f.doc.dispatch_key(tab());
        assert_eq!(f.doc.focused(), Some(d));

        f.doc.dispatch_key(tab());
        assert_eq!(f.doc.focused(), Some(f.a));
    }

    #[test]
    fn test_empty_dialog_keeps_focus_on_container() {
        let mut doc = Document::new();
        let body = doc.body();
        let opener = doc.append(body, Element::new(Tag::Button)).unwrap();
        let container = doc.append(body, Element::new(Tag::Dialog)).unwrap();
        doc.append(container, Element::new(Tag::Span).with_text("Nothing to do")).unwrap();
        doc.append(body, Element::new(Tag::Button)).unwrap();

        let mut dialog = ModalDialog::new(DialogOptions::default(), || {});
        doc.focus(opener);
        dialog.open(&mut doc, container);
        doc.run_pending_tasks();

        for key in [tab(), shift_tab(), tab()] {
            let event = doc.dispatch_key(key);
            assert!(event.is_default_prevented());
            assert_eq!(doc.focused(), Some(container));
        }
    }

    #[test]
    fn test_escape_delegates_without_closing() {
        let mut f = opened(DialogOptions::default());

        let event = f.doc.dispatch_key(esc());

        assert!(event.is_default_prevented());
        assert_eq!(f.closes.get(), 1);
        assert!(f.dialog.is_open());
        assert_eq!(f.doc.focused(), Some(f.container));
    }

    #[test]
    fn test_other_keys_pass_through() {
        let mut f = opened(DialogOptions::default());
        f.doc.focus(f.a);

        let event = f.doc.dispatch_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));

        assert!(!event.is_default_prevented());
        assert_eq!(f.closes.get(), 0);
        assert_eq!(f.doc.focused(), Some(f.a));
    }

    #[test]
    fn test_close_before_tick_skips_initial_focus() {
        let mut f = fixture(DialogOptions::default());
        f.doc.focus(f.opener);

        f.dialog.open(&mut f.doc, f.container);
        f.doc.focus(f.b);
        f.dialog.close(&mut f.doc);
        f.doc.run_pending_tasks();

        assert_eq!(f.doc.focused(), Some(f.opener));
    }

    #[test]
    fn test_initial_focus_overrides() {
        let f = opened(DialogOptions {
            initial_focus: InitialFocus::FirstFocusable,
            ..DialogOptions::default()
        });
        assert_eq!(f.doc.focused(), Some(f.a));

        let f = opened(DialogOptions {
            initial_focus: InitialFocus::ElementId("b".to_string()),
            ..DialogOptions::default()
        });
        assert_eq!(f.doc.focused(), Some(f.b));

        // An id outside the dialog falls back to the container
        let f = opened(DialogOptions {
            initial_focus: InitialFocus::ElementId("outside".to_string()),
            ..DialogOptions::default()
        });
        assert_eq!(f.doc.focused(), Some(f.container));
    }

    #[test]
    fn test_open_twice_keeps_one_session() {
        let mut f = opened(DialogOptions::default());
        let first = f.dialog.session().unwrap().id();
        let listeners = f.doc.listener_count();

        f.dialog.open(&mut f.doc, f.container);

        assert_eq!(f.dialog.session().unwrap().id(), first);
        assert_eq!(f.doc.listener_count(), listeners);
        assert_eq!(f.doc.pending_tasks(), 0);
    }

    #[test]
    fn test_listener_hygiene_over_cycles() {
        let mut f = fixture(DialogOptions::default());
        let baseline = f.doc.listener_count();
        let cycles = 25;

        for _ in 0..cycles {
            f.doc.focus(f.opener);
            f.dialog.set_open(&mut f.doc, true, f.container);
            assert_eq!(f.doc.listener_count(), baseline + 1);
            f.doc.run_pending_tasks();
            f.dialog.set_open(&mut f.doc, false, f.container);
            assert_eq!(f.doc.listener_count(), baseline);
        }

        let stats = f.doc.listener_stats();
        assert_eq!(stats.attached, cycles);
        assert_eq!(stats.detached, cycles);

        // Redundant closes detach nothing further
        f.dialog.close(&mut f.doc);
        assert_eq!(f.doc.listener_stats().detached, cycles);
    }

    #[test]
    fn test_keys_ignored_after_close() {
        let mut f = opened(DialogOptions::default());
        f.dialog.close(&mut f.doc);

        f.doc.dispatch_key(esc());
        assert_eq!(f.closes.get(), 0);
    }
}
