//! Core dialog types and traits
//!
//! Shared vocabulary between the focus-trap controller, the dialog manager
//! and the dialog content components.

use crate::tui::dom::{Document, DomError, DomResult, NodeId};
use serde::{Deserialize, Serialize};

/// Unique identifier for dialog instances
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialogId(pub String);

impl DialogId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DialogId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DialogId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for DialogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where focus lands once an opened dialog has mounted
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialFocus {
    /// The dialog container itself
    #[default]
    Container,
    /// First element of the dialog's focusable set, else the container
    FirstFocusable,
    /// Element with this id inside the dialog, else the container
    ElementId(String),
}

/// Options of one focus-trap controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogOptions {
    /// Return focus to the trigger element on close
    pub restore_focus: bool,
    pub initial_focus: InitialFocus,
}

impl Default for DialogOptions {
    fn default() -> Self {
        Self {
            restore_focus: true,
            initial_focus: InitialFocus::Container,
        }
    }
}

/// Dialog configuration options
#[derive(Debug, Clone)]
pub struct DialogConfig {
    /// Dialog identifier
    pub id: DialogId,
    /// Dialog title, rendered as the container label
    pub title: Option<String>,
    /// Focus-trap behaviour
    pub options: DialogOptions,
}

impl DialogConfig {
    pub fn new(id: impl Into<DialogId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            options: DialogOptions::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_initial_focus(mut self, initial_focus: InitialFocus) -> Self {
        self.options.initial_focus = initial_focus;
        self
    }
}

/// Messages between dialogs and their owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    /// Dialog was opened
    Opened(DialogId),
    /// Dialog was closed
    Closed(DialogId),
    /// Request to close dialog
    RequestClose(DialogId),
    /// Request to open dialog
    RequestOpen(DialogId),
}

/// Result type for dialog operations
pub type DialogResult<T> = std::result::Result<T, DialogError>;

/// Dialog-specific error types
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("Dialog with ID '{0}' not found")]
    NotFound(DialogId),

    #[error("Dialog with ID '{0}' already exists")]
    AlreadyExists(DialogId),

    #[error("Dialog mount point '{0}' is missing from the document")]
    MissingMountPoint(String),

    #[error("Dialog document operation failed: {0}")]
    Dom(#[from] DomError),
}

/// Content of a dialog: builds the elements shown inside the container
///
/// Content components know nothing about focus. The dialog manager mounts
/// the container, asks the content to fill it, and hands the container to
/// the shared focus-trap controller.
pub trait DialogContent {
    /// Get the dialog's configuration
    fn config(&self) -> &DialogConfig;

    /// Get the dialog's ID
    fn id(&self) -> &DialogId {
        &self.config().id
    }

    /// Build the dialog body under `container`
    fn build(&self, doc: &mut Document, container: NodeId) -> DomResult<()>;
}

/// Predefined dialog IDs
pub mod dialog_ids {
    pub const SETTINGS: &str = "settings";
    pub const ICON_PICKER: &str = "icon-picker";
    pub const PROJECT_SETTINGS: &str = "project-settings";
}
