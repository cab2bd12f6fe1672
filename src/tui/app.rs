use crate::config::Config;
use crate::tui::components::composer::Composer;
use crate::tui::components::dialogs::{
    DialogEvent, DialogId, DialogManager, IconPickerDialog, ProjectSettingsDialog, SettingsDialog,
};
use crate::tui::components::sidebar::Sidebar;
use crate::tui::components::{Action, Component};
use crate::tui::dom::{attrs, Document, Element, Tag};
use crate::tui::events::{Event, KeyboardEvent};
use crate::tui::keys::{FocusKey, KeyMap};
use anyhow::{Context, Result};
use crossterm::event::KeyEvent;
use tracing::{debug, info, trace};

/// Element ids of the shell layout
pub mod ids {
    pub const SHELL: &str = "app-shell";
    pub const MAIN: &str = "main";
    pub const DIALOG_ROOT: &str = "dialog-root";
}

/// Main application state and controller
pub struct App {
    /// Element tree, focus pointer and listeners
    document: Document,

    /// Key mappings for the application
    key_map: KeyMap,

    /// Application configuration
    config: Config,

    sidebar: Sidebar,
    composer: Composer,

    /// Owner of every dialog's open state
    dialogs: DialogManager,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("document", &self.document)
            .field("dialogs", &self.dialogs)
            .finish()
    }
}

impl App {
    /// Build the shell: sidebar rail, composer and the dialog root
    pub fn new(config: Config) -> Result<Self> {
        let mut document = Document::new();
        let body = document.body();

        let shell = document.append(body, Element::new(Tag::Div).with_id(ids::SHELL))?;
        let mut sidebar = Sidebar::new(config.rail_marker.clone());
        sidebar.mount(&mut document, shell)?;

        let main = document.append(shell, Element::new(Tag::Section).with_id(ids::MAIN))?;
        let mut composer = Composer::new();
        composer.mount(&mut document, main)?;

        document.append(body, Element::new(Tag::Div).with_id(ids::DIALOG_ROOT))?;
        let mut dialogs = DialogManager::with_mount_id(&document, ids::DIALOG_ROOT)?;

        let options = config.dialog_options();
        dialogs.register(Box::new(SettingsDialog::new(options.clone())))?;
        dialogs.register(Box::new(IconPickerDialog::new(options.clone(), config.icons.clone())))?;
        dialogs.register(Box::new(ProjectSettingsDialog::new(options)))?;

        info!("Shell ready with {} dialogs", dialogs.dialog_ids().len());

        Ok(Self {
            document,
            key_map: KeyMap::default(),
            config,
            sidebar,
            composer,
            dialogs,
        })
    }

    /// Handle a terminal event; returns true when the app should quit
    pub fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key) => {
                if self.key_map.should_quit(&key) {
                    info!("Quit requested");
                    return Ok(true);
                }
                self.handle_key(key)?;
            }
            Event::Resize(width, height) => {
                trace!("Terminal resized to {}x{}", width, height);
            }
            Event::Tick => {
                self.tick();
            }
        }
        Ok(false)
    }

    /// Route one key press through the document
    ///
    /// Listeners run first (rail, focus trap). Enter then activates the
    /// focused element's action unless a listener prevented it. Dialog
    /// requests raised along the way are applied, and one tick runs.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<KeyboardEvent> {
        let event = self.document.dispatch_key(key);

        if !event.is_default_prevented() && FocusKey::classify(&key) == FocusKey::Enter {
            self.activate();
        }

        self.dialogs
            .process_requests(&mut self.document)
            .context("Failed to apply dialog requests")?;
        for change in self.dialogs.take_events() {
            debug!("Dialog event: {:?}", change);
        }

        self.tick();
        Ok(event)
    }

    fn activate(&mut self) {
        let active = self.document.active_element();
        let Some(value) = self.document.attribute(active, attrs::ACTION) else {
            return;
        };

        match Action::parse(value) {
            Some(Action::OpenDialog(id)) => self.dialogs.request(DialogEvent::RequestOpen(id.into())),
            Some(Action::CloseDialog(id)) => self.dialogs.request(DialogEvent::RequestClose(id.into())),
            None => debug!("Ignoring unknown action '{}' on {}", value, self.document.describe(active)),
        }
    }

    /// Open a dialog by id; false when another dialog is already open
    pub fn open_dialog(&mut self, id: &str) -> Result<bool> {
        let opened = self
            .dialogs
            .open_dialog(&mut self.document, &DialogId::from(id))
            .with_context(|| format!("Failed to open dialog {}", id))?;
        Ok(opened)
    }

    /// Close a dialog by id; false when it was not open
    pub fn close_dialog(&mut self, id: &str) -> Result<bool> {
        let closed = self
            .dialogs
            .close_dialog(&mut self.document, &DialogId::from(id))
            .with_context(|| format!("Failed to close dialog {}", id))?;
        Ok(closed)
    }

    /// Programmatically focus the element with `id`
    pub fn focus_element(&mut self, id: &str) -> Result<bool> {
        let node = self
            .document
            .element_by_id(id)
            .with_context(|| format!("No element with id '{}'", id))?;
        Ok(self.document.focus(node))
    }

    /// Detach the element with `id` from the document
    pub fn remove_element(&mut self, id: &str) -> Result<()> {
        let node = self
            .document
            .element_by_id(id)
            .with_context(|| format!("No element with id '{}'", id))?;
        self.document.remove(node)?;
        Ok(())
    }

    /// Run deferred work queued so far
    pub fn tick(&mut self) -> usize {
        self.document.run_pending_tasks()
    }

    /// Id of the focused element, `None` when focus is on body or the
    /// focused element has no id
    pub fn focused_id(&self) -> Option<&str> {
        let node = self.document.focused()?;
        self.document.get(node).and_then(Element::id)
    }

    /// Human readable owner of focus
    pub fn focus_label(&self) -> String {
        self.document.describe(self.document.active_element())
    }

    pub fn is_dialog_open(&self, id: &str) -> bool {
        self.dialogs.is_open(&DialogId::from(id))
    }

    pub fn open_dialog_id(&self) -> Option<&DialogId> {
        self.dialogs.open_dialog_id()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Close every dialog and unmount the shell components
    pub fn shutdown(&mut self) -> Result<()> {
        self.dialogs.close_all(&mut self.document)?;
        self.sidebar.unmount(&mut self.document)?;
        self.composer.unmount(&mut self.document)?;
        debug!("Shell shut down, {} listeners left", self.document.listener_count());
        Ok(())
    }
}
