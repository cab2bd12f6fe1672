//! chatshell: the keyboard focus core of a chat-assistant shell
//!
//! Modal dialogs trap Tab and Shift+Tab, report Escape to their owner and
//! hand focus back to whatever opened them. A collapsed sidebar rail moves
//! focus with the arrow keys. Everything runs against an in-memory element
//! tree so the behaviour can be driven from tests, scenario files or a
//! terminal.

pub mod config;
pub mod tui;
