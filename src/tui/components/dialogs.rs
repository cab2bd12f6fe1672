//! Dialog system for modal UI components
//!
//! Every dialog in the shell goes through one focus-trap controller
//! ([`ModalDialog`]). Content components only build their elements; the
//! [`DialogManager`] owns each dialog's open state, mounts containers and
//! reacts to close requests coming back from the controller.

pub mod icon_picker;
pub mod manager;
pub mod modal;
pub mod project_settings;
pub mod settings;
pub mod types;

pub use icon_picker::IconPickerDialog;
pub use manager::DialogManager;
pub use modal::{DialogSession, ModalDialog};
pub use project_settings::ProjectSettingsDialog;
pub use settings::SettingsDialog;
pub use types::*;
