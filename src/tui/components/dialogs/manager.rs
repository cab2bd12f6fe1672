//! Dialog manager for handling dialog lifecycle
//!
//! The dialog manager is responsible for:
//! - Owning each registered dialog's open state
//! - Mounting a container per open dialog under the dialog root
//! - Driving the shared focus-trap controller through open and close
//! - Turning close requests from the controller back into state changes

use super::modal::ModalDialog;
use super::types::*;
use crate::tui::dom::{Document, Element, NodeId, Tag};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Queue shared between the manager and the callbacks it hands out
pub type RequestQueue = Rc<RefCell<VecDeque<DialogEvent>>>;

struct DialogSlot {
    content: Box<dyn DialogContent>,
    modal: ModalDialog,
    container: Option<NodeId>,
}

/// Dialog manager handles the registered dialogs and their lifecycle
pub struct DialogManager {
    /// Element dialog containers are mounted under
    mount_point: NodeId,

    /// Registered dialogs by id
    dialogs: HashMap<DialogId, DialogSlot>,

    /// Registration order, used for deterministic shutdown
    order: Vec<DialogId>,

    /// Currently open dialog
    open: Option<DialogId>,

    /// Requests raised by dialogs and activations, drained by `process_requests`
    requests: RequestQueue,

    /// Lifecycle notifications for the owner
    events: Vec<DialogEvent>,
}

impl std::fmt::Debug for DialogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogManager")
            .field("mount_point", &self.mount_point)
            .field("dialogs", &self.order)
            .field("open", &self.open)
            .finish()
    }
}

impl DialogManager {
    /// Create a manager mounting dialogs under `mount_point`
    pub fn new(mount_point: NodeId) -> Self {
        Self {
            mount_point,
            dialogs: HashMap::new(),
            order: Vec::new(),
            open: None,
            requests: Rc::new(RefCell::new(VecDeque::new())),
            events: Vec::new(),
        }
    }

    /// Create a manager on the element with id `mount_id`
    pub fn with_mount_id(doc: &Document, mount_id: &str) -> DialogResult<Self> {
        let mount_point = doc
            .element_by_id(mount_id)
            .ok_or_else(|| DialogError::MissingMountPoint(mount_id.to_string()))?;
        Ok(Self::new(mount_point))
    }

    pub fn mount_point(&self) -> NodeId {
        self.mount_point
    }

    /// Register a dialog. Its Escape handling is wired to a close request.
    pub fn register(&mut self, content: Box<dyn DialogContent>) -> DialogResult<()> {
        let id = content.id().clone();
        if self.dialogs.contains_key(&id) {
            return Err(DialogError::AlreadyExists(id));
        }

        let requests = self.requests.clone();
        let request_id = id.clone();
        let modal = ModalDialog::new(content.config().options.clone(), move || {
            requests
                .borrow_mut()
                .push_back(DialogEvent::RequestClose(request_id.clone()));
        });

        debug!("Registered dialog {}", id);
        self.order.push(id.clone());
        self.dialogs.insert(
            id,
            DialogSlot {
                content,
                modal,
                container: None,
            },
        );
        Ok(())
    }

    pub fn request(&self, event: DialogEvent) {
        self.requests.borrow_mut().push_back(event);
    }

    /// Open a registered dialog
    ///
    /// Only one dialog is open at a time: a request while another dialog is
    /// open is ignored. Returns whether the dialog was opened.
    pub fn open_dialog(&mut self, doc: &mut Document, id: &DialogId) -> DialogResult<bool> {
        let slot = self
            .dialogs
            .get_mut(id)
            .ok_or_else(|| DialogError::NotFound(id.clone()))?;

        if let Some(open) = &self.open {
            if open != id {
                debug!("Ignoring open of dialog {} while {} is open", id, open);
            }
            return Ok(false);
        }

        let config = slot.content.config();
        let mut element = Element::new(Tag::Dialog)
            .with_id(format!("{}-dialog", id))
            .with_attr("role", "dialog")
            .with_attr("aria-modal", "true");
        if let Some(title) = &config.title {
            element = element.with_attr("aria-label", title.as_str());
        }

        let container = doc.append(self.mount_point, element)?;
        if let Err(e) = slot.content.build(doc, container) {
            doc.remove(container)?;
            return Err(e.into());
        }

        slot.modal.open(doc, container);
        slot.container = Some(container);
        self.open = Some(id.clone());
        self.events.push(DialogEvent::Opened(id.clone()));
        info!("Opened dialog {}", id);
        Ok(true)
    }

    /// Close a dialog; closing a closed dialog does nothing
    ///
    /// The controller restores focus before the container leaves the
    /// document. Returns whether the dialog was open.
    pub fn close_dialog(&mut self, doc: &mut Document, id: &DialogId) -> DialogResult<bool> {
        let slot = self
            .dialogs
            .get_mut(id)
            .ok_or_else(|| DialogError::NotFound(id.clone()))?;

        let Some(container) = slot.container.take() else {
            return Ok(false);
        };

        slot.modal.close(doc);
        doc.remove(container)?;

        if self.open.as_ref() == Some(id) {
            self.open = None;
        }
        self.events.push(DialogEvent::Closed(id.clone()));
        info!("Closed dialog {}", id);
        Ok(true)
    }

    /// Close every open dialog
    pub fn close_all(&mut self, doc: &mut Document) -> DialogResult<()> {
        for id in self.order.clone() {
            self.close_dialog(doc, &id)?;
        }
        Ok(())
    }

    /// Apply queued open/close requests; returns how many were handled
    pub fn process_requests(&mut self, doc: &mut Document) -> DialogResult<usize> {
        let mut handled = 0;
        loop {
            // Release the borrow before acting: closing may queue more work
            let next = self.requests.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };

            match event {
                DialogEvent::RequestOpen(id) => match self.open_dialog(doc, &id) {
                    Err(DialogError::NotFound(id)) => warn!("Open requested for unknown dialog {}", id),
                    other => {
                        other?;
                    }
                },
                DialogEvent::RequestClose(id) => match self.close_dialog(doc, &id) {
                    Err(DialogError::NotFound(id)) => warn!("Close requested for unknown dialog {}", id),
                    other => {
                        other?;
                    }
                },
                other => warn!("Unexpected dialog request {:?}", other),
            }
            handled += 1;
        }
        Ok(handled)
    }

    pub fn is_open(&self, id: &DialogId) -> bool {
        self.open.as_ref() == Some(id)
    }

    pub fn open_dialog_id(&self) -> Option<&DialogId> {
        self.open.as_ref()
    }

    pub fn has_open_dialog(&self) -> bool {
        self.open.is_some()
    }

    pub fn is_registered(&self, id: &DialogId) -> bool {
        self.dialogs.contains_key(id)
    }

    /// Registered dialog ids in registration order
    pub fn dialog_ids(&self) -> &[DialogId] {
        &self.order
    }

    /// Container element of an open dialog
    pub fn container(&self, id: &DialogId) -> Option<NodeId> {
        self.dialogs.get(id).and_then(|slot| slot.container)
    }

    /// Drain lifecycle notifications
    pub fn take_events(&mut self) -> Vec<DialogEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::dom::DomResult;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    struct TestDialog {
        config: DialogConfig,
        buttons: usize,
    }

    impl TestDialog {
        fn boxed(id: &str, buttons: usize) -> Box<dyn DialogContent> {
            Box::new(Self {
                config: DialogConfig::new(id).with_title(format!("{} dialog", id)),
                buttons,
            })
        }
    }

    impl DialogContent for TestDialog {
        fn config(&self) -> &DialogConfig {
            &self.config
        }

        fn build(&self, doc: &mut Document, container: NodeId) -> DomResult<()> {
            for i in 0..self.buttons {
                doc.append(
                    container,
                    Element::new(Tag::Button).with_id(format!("{}-{}", self.config.id, i)),
                )?;
            }
            Ok(())
        }
    }

    fn setup() -> (Document, DialogManager, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let opener = doc.append(body, Element::new(Tag::Button).with_id("opener")).unwrap();
        doc.append(body, Element::new(Tag::Div).with_id("dialog-root")).unwrap();

        let mut manager = DialogManager::with_mount_id(&doc, "dialog-root").unwrap();
        manager.register(TestDialog::boxed("alpha", 2)).unwrap();
        manager.register(TestDialog::boxed("beta", 1)).unwrap();
        (doc, manager, opener)
    }

    #[test]
    fn test_missing_mount_point() {
        let doc = Document::new();
        let result = DialogManager::with_mount_id(&doc, "dialog-root");
        assert!(matches!(result, Err(DialogError::MissingMountPoint(_))));
    }

    #[test]
    fn test_register_duplicate() {
        let (_doc, mut manager, _) = setup();
        let result = manager.register(TestDialog::boxed("alpha", 0));
        assert!(matches!(result, Err(DialogError::AlreadyExists(_))));
        assert_eq!(manager.dialog_ids().len(), 2);
    }

    #[test]
    fn test_open_mounts_container() {
        let (mut doc, mut manager, opener) = setup();
        let alpha = DialogId::from("alpha");
        doc.focus(opener);

        assert!(manager.open_dialog(&mut doc, &alpha).unwrap());
        let container = manager.container(&alpha).unwrap();

        assert!(manager.is_open(&alpha));
        assert_eq!(doc.element_by_id("alpha-dialog"), Some(container));
        assert_eq!(doc.attribute(container, "aria-modal"), Some("true"));
        assert_eq!(doc.attribute(container, "aria-label"), Some("alpha dialog"));
        assert_eq!(doc.children(container).len(), 2);
        assert_eq!(manager.take_events(), vec![DialogEvent::Opened(alpha)]);

        doc.run_pending_tasks();
        assert_eq!(doc.focused(), Some(container));
    }

    #[test]
    fn test_escape_round_trip_restores_focus() {
        let (mut doc, mut manager, opener) = setup();
        let alpha = DialogId::from("alpha");
        doc.focus(opener);
        manager.open_dialog(&mut doc, &alpha).unwrap();
        doc.run_pending_tasks();

        doc.dispatch_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        // Escape only asks; the manager decides
        assert!(manager.is_open(&alpha));

        assert_eq!(manager.process_requests(&mut doc).unwrap(), 1);
        assert!(!manager.has_open_dialog());
        assert!(doc.element_by_id("alpha-dialog").is_none());
        assert_eq!(doc.focused(), Some(opener));
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_second_dialog_ignored_while_open() {
        let (mut doc, mut manager, _) = setup();
        let alpha = DialogId::from("alpha");
        let beta = DialogId::from("beta");

        manager.open_dialog(&mut doc, &alpha).unwrap();
        assert!(!manager.open_dialog(&mut doc, &beta).unwrap());
        assert!(!manager.open_dialog(&mut doc, &alpha).unwrap());

        assert_eq!(manager.open_dialog_id(), Some(&alpha));
        assert!(manager.container(&beta).is_none());
        assert_eq!(doc.listener_count(), 1);
    }

    #[test]
    fn test_close_unknown_and_closed() {
        let (mut doc, mut manager, _) = setup();
        assert!(!manager.close_dialog(&mut doc, &DialogId::from("alpha")).unwrap());
        assert!(matches!(
            manager.close_dialog(&mut doc, &DialogId::from("gamma")),
            Err(DialogError::NotFound(_))
        ));
    }

    #[test]
    fn test_requests_for_unknown_dialogs_are_skipped() {
        let (mut doc, mut manager, _) = setup();
        manager.request(DialogEvent::RequestOpen("gamma".into()));
        manager.request(DialogEvent::RequestOpen("beta".into()));

        assert_eq!(manager.process_requests(&mut doc).unwrap(), 2);
        assert!(manager.is_open(&DialogId::from("beta")));
    }

    #[test]
    fn test_close_all_releases_listeners() {
        let (mut doc, mut manager, _) = setup();
        for _ in 0..10 {
            manager.open_dialog(&mut doc, &DialogId::from("alpha")).unwrap();
            manager.close_all(&mut doc).unwrap();
            manager.open_dialog(&mut doc, &DialogId::from("beta")).unwrap();
            manager.close_dialog(&mut doc, &DialogId::from("beta")).unwrap();
        }
        doc.run_pending_tasks();

        assert_eq!(doc.listener_count(), 0);
        let stats = doc.listener_stats();
        assert_eq!(stats.attached, stats.detached);
        assert!(doc.children(manager.mount_point()).is_empty());
    }
}
