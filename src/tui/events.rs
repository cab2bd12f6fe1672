use crate::tui::dom::NodeId;
use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

/// Application events
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Terminal resize event
    Resize(u16, u16),

    /// Periodic tick event
    Tick,
}

/// Identifier handed out by the document when a key listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// A key press travelling through the document
#[derive(Debug, Clone)]
pub struct KeyboardEvent {
    key: KeyEvent,
    target: NodeId,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl KeyboardEvent {
    pub fn new(key: KeyEvent, target: NodeId) -> Self {
        Self {
            key,
            target,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn key(&self) -> &KeyEvent {
        &self.key
    }

    /// Element that had focus when the key was pressed
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Suppress the document's default action (Tab traversal, scrolling)
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Event handler for terminal input
pub struct EventHandler {
    /// Event receiver channel
    receiver: mpsc::UnboundedReceiver<Event>,

    /// Event sender channel
    sender: mpsc::UnboundedSender<Event>,

    /// How long one poll for terminal input may block
    poll_interval: Duration,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            receiver,
            sender,
            poll_interval: Duration::from_millis(100),
        }
    }

    /// Get the next event
    ///
    /// Internal events queued with [`EventHandler::send`] win over terminal
    /// input; when nothing arrives within the poll interval a tick is returned.
    pub async fn next(&mut self) -> Result<Event> {
        if let Ok(event) = self.receiver.try_recv() {
            return Ok(event);
        }

        let interval = self.poll_interval;
        let polled = tokio::task::spawn_blocking(move || -> std::io::Result<Option<CrosstermEvent>> {
            if crossterm::event::poll(interval)? {
                crossterm::event::read().map(Some)
            } else {
                Ok(None)
            }
        })
        .await??;

        Ok(polled.and_then(Self::convert_crossterm_event).unwrap_or(Event::Tick))
    }

    /// Convert crossterm events to application events
    ///
    /// Key releases and repeats are dropped so one press moves focus once.
    fn convert_crossterm_event(event: CrosstermEvent) -> Option<Event> {
        match event {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
            CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
            _ => None,
        }
    }

    /// Send an internal event
    pub fn send(&self, event: Event) -> Result<()> {
        self.sender.send(event)?;
        Ok(())
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
