//! Element tree standing in for the browser document
//!
//! The shell never renders anything, but the focus controllers need the same
//! things a DOM gives them: an ordered tree of elements, attachment, a single
//! focus pointer, keyboard listeners with bubbling, and a way to defer work to
//! the next tick. This module provides exactly that and nothing visual.

pub mod query;

use crate::tui::events::{KeyboardEvent, ListenerId};
use crate::tui::keys::FocusKey;
use crossterm::event::KeyEvent;
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Attribute names the focus layer understands
pub mod attrs {
    pub const ID: &str = "id";
    pub const HREF: &str = "href";
    pub const TABINDEX: &str = "tabindex";
    pub const DISABLED: &str = "disabled";
    pub const ACTION: &str = "data-action";
}

/// Handle to an element in a [`Document`]
///
/// Ids are never reused, so a stale handle can only ever point at the element
/// it was created for. Whether that element is still part of the document is
/// a separate question answered by [`Document::is_connected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Element kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Body,
    Div,
    Nav,
    Section,
    Span,
    Label,
    Dialog,
    Button,
    Anchor,
    Input,
    Select,
    Textarea,
}

impl Tag {
    /// Form controls that are focusable without any tabindex
    pub fn is_native_interactive(self) -> bool {
        matches!(self, Tag::Button | Tag::Input | Tag::Select | Tag::Textarea)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Body => "body",
            Tag::Div => "div",
            Tag::Nav => "nav",
            Tag::Section => "section",
            Tag::Span => "span",
            Tag::Label => "label",
            Tag::Dialog => "dialog",
            Tag::Button => "button",
            Tag::Anchor => "a",
            Tag::Input => "input",
            Tag::Select => "select",
            Tag::Textarea => "textarea",
        }
    }
}

/// A single element and its place in the tree
#[derive(Debug, Clone)]
pub struct Element {
    tag: Tag,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: BTreeMap::new(),
            text: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attr(attrs::ID, id)
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute(attrs::ID)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Parsed `tabindex`; an unparseable value counts as absent
    pub fn tab_index(&self) -> Option<i32> {
        self.attribute(attrs::TABINDEX)
            .and_then(|value| value.trim().parse().ok())
    }

    pub fn is_disabled(&self) -> bool {
        self.has_attribute(attrs::DISABLED)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// DOM operation errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomError {
    #[error("Element {0} does not exist")]
    NotFound(NodeId),

    #[error("Element {0} already has a parent")]
    AlreadyAttached(NodeId),

    #[error("Appending {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("The document body cannot be removed")]
    RemoveBody,
}

pub type DomResult<T> = std::result::Result<T, DomError>;

/// Where a key listener is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTarget {
    /// Fires for every key event after it bubbled through the element path
    Document,
    /// Fires when the event target is this element or one of its descendants
    Node(NodeId),
}

/// Receiver of dispatched key events
pub trait KeyListener {
    fn on_key(&mut self, doc: &mut Document, event: &mut KeyboardEvent);
}

impl<F> KeyListener for F
where
    F: FnMut(&mut Document, &mut KeyboardEvent),
{
    fn on_key(&mut self, doc: &mut Document, event: &mut KeyboardEvent) {
        self(doc, event)
    }
}

pub type SharedListener = Rc<RefCell<dyn KeyListener>>;

struct ListenerEntry {
    id: ListenerId,
    target: ListenerTarget,
    handler: SharedListener,
}

/// Attach/detach totals since the document was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    pub attached: usize,
    pub detached: usize,
}

type Task = Box<dyn FnOnce(&mut Document)>;

/// The element tree plus focus pointer, listener table and task queue
pub struct Document {
    nodes: Vec<Element>,
    body: NodeId,
    focused: Option<NodeId>,
    listeners: Vec<ListenerEntry>,
    next_listener_id: u64,
    stats: ListenerStats,
    tasks: VecDeque<Task>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("focused", &self.focused)
            .field("listeners", &self.listeners.len())
            .field("pending_tasks", &self.tasks.len())
            .finish()
    }
}

impl Document {
    /// Create an empty document containing only `body`
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new(Tag::Body)],
            body: NodeId(0),
            focused: None,
            listeners: Vec::new(),
            next_listener_id: 1,
            stats: ListenerStats::default(),
            tasks: VecDeque::new(),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0)
    }

    fn get_mut(&mut self, node: NodeId) -> DomResult<&mut Element> {
        self.nodes.get_mut(node.0).ok_or(DomError::NotFound(node))
    }

    /// Create a detached element
    pub fn create_element(&mut self, element: Element) -> NodeId {
        let mut element = element;
        element.parent = None;
        element.children.clear();
        let id = NodeId(self.nodes.len());
        self.nodes.push(element);
        id
    }

    /// Append a detached element as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.get(parent).ok_or(DomError::NotFound(parent))?;
        let child_el = self.get(child).ok_or(DomError::NotFound(child))?;
        if child_el.parent.is_some() || child == self.body {
            return Err(DomError::AlreadyAttached(child));
        }
        if self.contains(child, parent) {
            return Err(DomError::Cycle { parent, child });
        }

        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Create `element` and append it under `parent` in one step
    pub fn append(&mut self, parent: NodeId, element: Element) -> DomResult<NodeId> {
        self.get(parent).ok_or(DomError::NotFound(parent))?;
        let id = self.create_element(element);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Detach `node` (and its subtree) from its parent
    ///
    /// If focus was inside the removed subtree it falls back to `body`, the
    /// way a browser blurs an element that leaves the document.
    pub fn remove(&mut self, node: NodeId) -> DomResult<()> {
        if node == self.body {
            return Err(DomError::RemoveBody);
        }
        let parent = self.get(node).ok_or(DomError::NotFound(node))?.parent;
        let Some(parent) = parent else {
            return Ok(());
        };

        if let Some(focused) = self.focused {
            if self.contains(node, focused) {
                debug!("Focused element {} removed, focus falls back to body", focused);
                self.focused = None;
            }
        }

        self.get_mut(parent)?.children.retain(|&c| c != node);
        self.get_mut(node)?.parent = None;
        Ok(())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node).and_then(|el| el.attribute(name))
    }

    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> DomResult<()> {
        self.get_mut(node)?.attributes.insert(name.into(), value.into());
        Ok(())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|el| el.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node).map(|el| el.children()).unwrap_or(&[])
    }

    /// Whether `node` is reachable from `body`
    pub fn is_connected(&self, node: NodeId) -> bool {
        if self.get(node).is_none() {
            return false;
        }
        let mut current = node;
        loop {
            if current == self.body {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Inclusive ancestry check: a node contains itself
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Descendants of `node` in pre-order (document order), excluding `node`
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Look up a connected element by its `id` attribute
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .find(|&node| self.get(node).and_then(Element::id) == Some(id))
    }

    /// Short human-readable label, `#id` when the element has one
    pub fn describe(&self, node: NodeId) -> String {
        match self.get(node) {
            Some(el) => match el.id() {
                Some(id) => format!("#{}", id),
                None if node == self.body => "body".to_string(),
                None => format!("{}({})", el.tag().as_str(), node.0),
            },
            None => node.to_string(),
        }
    }

    /// Whether `focus()` would succeed on this element
    ///
    /// Native controls, anchors with `href` and anything carrying a tabindex
    /// (including negative ones) can take focus programmatically, provided the
    /// element is attached and not disabled.
    pub fn is_focusable(&self, node: NodeId) -> bool {
        let Some(el) = self.get(node) else {
            return false;
        };
        if el.is_disabled() || !self.is_connected(node) {
            return false;
        }
        el.tag().is_native_interactive()
            || (el.tag() == Tag::Anchor && el.has_attribute(attrs::HREF))
            || el.tab_index().is_some()
    }

    /// Move focus to `node`; returns false (and leaves focus alone) when the
    /// element cannot take focus
    pub fn focus(&mut self, node: NodeId) -> bool {
        if !self.is_focusable(node) {
            trace!("focus({}) ignored: element is not focusable", self.describe(node));
            return false;
        }
        if self.focused != Some(node) {
            trace!("Focus moved to {}", self.describe(node));
        }
        self.focused = Some(node);
        true
    }

    /// Drop focus back to `body`
    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// The focused element, or `body` when nothing is focused
    pub fn active_element(&self) -> NodeId {
        self.focused.unwrap_or(self.body)
    }

    /// The focused element, `None` when focus rests on `body`
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Register a key listener and return its id for later removal
    pub fn add_key_listener(
        &mut self,
        target: ListenerTarget,
        handler: SharedListener,
    ) -> ListenerId {
        let id = ListenerId::new(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push(ListenerEntry { id, target, handler });
        self.stats.attached += 1;
        trace!("Key listener {} attached to {:?}", id, target);
        id
    }

    /// Remove a listener; returns false when it was not registered
    pub fn remove_key_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|entry| entry.id != id);
        let removed = self.listeners.len() != before;
        if removed {
            self.stats.detached += 1;
            trace!("Key listener {} detached", id);
        }
        removed
    }

    pub fn has_key_listener(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|entry| entry.id == id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listener_stats(&self) -> ListenerStats {
        self.stats
    }

    /// Dispatch a key press to the focused element
    ///
    /// Listeners run target-first up through the ancestors, then document
    /// listeners. Listeners registered during dispatch do not see the event;
    /// listeners removed during dispatch are skipped. When no listener
    /// prevented the default action, Tab and Shift+Tab perform sequential
    /// focus navigation over the whole document.
    pub fn dispatch_key(&mut self, key: KeyEvent) -> KeyboardEvent {
        let target = self.active_element();
        let mut event = KeyboardEvent::new(key, target);

        for (id, handler) in self.propagation_path(target) {
            if event.is_propagation_stopped() {
                break;
            }
            if !self.has_key_listener(id) {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut listener) => listener.on_key(self, &mut event),
                Err(_) => warn!("Key listener {} re-entered during dispatch, skipped", id),
            }
        }

        if !event.is_default_prevented() {
            self.default_action(&event);
        }
        event
    }

    fn propagation_path(&self, target: NodeId) -> Vec<(ListenerId, SharedListener)> {
        let mut path = Vec::new();
        let mut current = Some(target);
        while let Some(node) = current {
            path.extend(
                self.listeners
                    .iter()
                    .filter(|entry| entry.target == ListenerTarget::Node(node))
                    .map(|entry| (entry.id, entry.handler.clone())),
            );
            current = self.parent(node);
        }
        path.extend(
            self.listeners
                .iter()
                .filter(|entry| entry.target == ListenerTarget::Document)
                .map(|entry| (entry.id, entry.handler.clone())),
        );
        path
    }

    fn default_action(&mut self, event: &KeyboardEvent) {
        match FocusKey::classify(event.key()) {
            FocusKey::Tab => self.sequential_focus(true),
            FocusKey::BackTab => self.sequential_focus(false),
            _ => {}
        }
    }

    /// Native Tab traversal: next (or previous) tabbable element in document
    /// order. At either end of the document focus stays where it is.
    fn sequential_focus(&mut self, forward: bool) {
        let order = self.descendants(self.body);
        let tabbable = query::focusable_elements(self, Some(self.body));
        let position = |node: NodeId| order.iter().position(|&n| n == node);
        let current = self.focused.and_then(position);

        let next = match (forward, current) {
            (true, Some(at)) => tabbable
                .iter()
                .copied()
                .find(|&n| position(n).is_some_and(|p| p > at)),
            (false, Some(at)) => tabbable
                .iter()
                .rev()
                .copied()
                .find(|&n| position(n).is_some_and(|p| p < at)),
            (true, None) => tabbable.first().copied(),
            (false, None) => tabbable.last().copied(),
        };

        if let Some(next) = next {
            self.focus(next);
        }
    }

    /// Queue work for the next tick
    pub fn defer(&mut self, task: impl FnOnce(&mut Document) + 'static) {
        self.tasks.push_back(Box::new(task));
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Run every task queued before this call; tasks queued while running
    /// wait for the next tick. Returns how many ran.
    pub fn run_pending_tasks(&mut self) -> usize {
        let batch: Vec<Task> = self.tasks.drain(..).collect();
        let count = batch.len();
        for task in batch {
            task(self);
        }
        count
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
