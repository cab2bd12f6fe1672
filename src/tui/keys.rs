use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key binding configuration
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub description: String,
}

impl KeyBinding {
    pub fn new(key: KeyCode, modifiers: KeyModifiers, description: &str) -> Self {
        Self {
            key,
            modifiers,
            description: description.to_string(),
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.key == event.code && self.modifiers == event.modifiers
    }
}

/// Application key mappings
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Quit the interactive session
    pub quit: KeyBinding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            quit: KeyBinding::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
                "Quit",
            ),
        }
    }
}

impl KeyMap {
    /// Check if the event should quit the application
    pub fn should_quit(&self, event: &KeyEvent) -> bool {
        self.quit.matches(event)
    }

    /// Get help text for all key bindings
    pub fn help_text(&self) -> String {
        [
            format!("{}: {}", format_key(&KeyEvent::new(self.quit.key, self.quit.modifiers)), self.quit.description),
            "Tab / Shift+Tab: move focus".to_string(),
            "Up / Down: move along the sidebar rail".to_string(),
            "Enter: activate".to_string(),
            "Esc: close dialog".to_string(),
        ]
        .join("\n")
    }
}

/// The keys the focus layer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusKey {
    Escape,
    /// Tab with no modifiers
    Tab,
    /// Shift+Tab, reported by terminals either as BackTab or as Tab+Shift
    BackTab,
    ArrowUp,
    ArrowDown,
    Enter,
    Other,
}

impl FocusKey {
    pub fn classify(event: &KeyEvent) -> Self {
        match event.code {
            KeyCode::Esc => Self::Escape,
            KeyCode::Tab if event.modifiers.is_empty() => Self::Tab,
            KeyCode::Tab if event.modifiers == KeyModifiers::SHIFT => Self::BackTab,
            KeyCode::BackTab if !event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                Self::BackTab
            }
            KeyCode::Up => Self::ArrowUp,
            KeyCode::Down => Self::ArrowDown,
            KeyCode::Enter => Self::Enter,
            _ => Self::Other,
        }
    }
}

/// Errors from parsing key notation such as `Shift+Tab`
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("Empty key notation")]
    Empty,

    #[error("Unknown modifier '{0}'")]
    UnknownModifier(String),

    #[error("Unknown key '{0}'")]
    UnknownKey(String),
}

/// Parse key notation: an optional `Ctrl+`/`Alt+`/`Shift+` chain followed by
/// a key name (`Tab`, `Esc`, `Up`, `F5`, `a`, ...). `Shift+Tab` becomes
/// `BackTab` the way terminals report it.
pub fn parse_key(notation: &str) -> Result<KeyEvent, KeyParseError> {
    let notation = notation.trim();
    if notation.is_empty() {
        return Err(KeyParseError::Empty);
    }

    // A lone "+" is the plus key, not a separator
    let (modifier_part, key_part) = match notation.rsplit_once('+') {
        Some((mods, "")) => (mods.strip_suffix('+').unwrap_or(mods), "+"),
        Some((mods, key)) => (mods, key),
        None => ("", notation),
    };

    let mut modifiers = KeyModifiers::NONE;
    for name in modifier_part.split('+').filter(|part| !part.is_empty()) {
        modifiers |= match name.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "alt" | "option" => KeyModifiers::ALT,
            "shift" => KeyModifiers::SHIFT,
            _ => return Err(KeyParseError::UnknownModifier(name.to_string())),
        };
    }

    let code = match key_part.to_ascii_lowercase().as_str() {
        "tab" if modifiers.contains(KeyModifiers::SHIFT) => KeyCode::BackTab,
        "tab" => KeyCode::Tab,
        "backtab" => {
            modifiers |= KeyModifiers::SHIFT;
            KeyCode::BackTab
        }
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "space" => KeyCode::Char(' '),
        "up" | "arrowup" => KeyCode::Up,
        "down" | "arrowdown" => KeyCode::Down,
        "left" | "arrowleft" => KeyCode::Left,
        "right" | "arrowright" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        lower if lower.len() > 1 && lower.starts_with('f') => match lower[1..].parse::<u8>() {
            Ok(n) if (1..=24).contains(&n) => KeyCode::F(n),
            _ => return Err(KeyParseError::UnknownKey(key_part.to_string())),
        },
        _ => {
            let mut chars = key_part.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return Err(KeyParseError::UnknownKey(key_part.to_string())),
            }
        }
    };

    Ok(KeyEvent::new(code, modifiers))
}

/// Format a key event for display, the inverse of [`parse_key`]
pub fn format_key(event: &KeyEvent) -> String {
    let mut parts = Vec::new();

    if event.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl".to_string());
    }
    if event.modifiers.contains(KeyModifiers::ALT) {
        parts.push("Alt".to_string());
    }
    if event.modifiers.contains(KeyModifiers::SHIFT) && event.code != KeyCode::BackTab {
        parts.push("Shift".to_string());
    }

    let key_name = match event.code {
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Shift+Tab".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PgUp".to_string(),
        KeyCode::PageDown => "PgDn".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        _ => "Unknown".to_string(),
    };

    parts.push(key_name);
    parts.join("+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let key = |code, mods| FocusKey::classify(&KeyEvent::new(code, mods));

        assert_eq!(key(KeyCode::Tab, KeyModifiers::NONE), FocusKey::Tab);
        assert_eq!(key(KeyCode::Tab, KeyModifiers::SHIFT), FocusKey::BackTab);
        assert_eq!(key(KeyCode::BackTab, KeyModifiers::SHIFT), FocusKey::BackTab);
        assert_eq!(key(KeyCode::Tab, KeyModifiers::CONTROL), FocusKey::Other);
        assert_eq!(key(KeyCode::Esc, KeyModifiers::NONE), FocusKey::Escape);
        assert_eq!(key(KeyCode::Down, KeyModifiers::NONE), FocusKey::ArrowDown);
        assert_eq!(key(KeyCode::Up, KeyModifiers::NONE), FocusKey::ArrowUp);
        assert_eq!(key(KeyCode::Char('j'), KeyModifiers::NONE), FocusKey::Other);
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("Tab").unwrap(), KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(
            parse_key("Shift+Tab").unwrap(),
            KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)
        );
        assert_eq!(parse_key("esc").unwrap().code, KeyCode::Esc);
        assert_eq!(parse_key("Down").unwrap().code, KeyCode::Down);
        assert_eq!(
            parse_key("Ctrl+c").unwrap(),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
        );
        assert_eq!(parse_key("F5").unwrap().code, KeyCode::F(5));
        assert_eq!(parse_key("+").unwrap().code, KeyCode::Char('+'));
        assert_eq!(
            parse_key("Ctrl++").unwrap(),
            KeyEvent::new(KeyCode::Char('+'), KeyModifiers::CONTROL)
        );
    }

    #[test]
    fn test_parse_key_errors() {
        assert_eq!(parse_key("  "), Err(KeyParseError::Empty));
        assert_eq!(
            parse_key("Hyper+Tab"),
            Err(KeyParseError::UnknownModifier("Hyper".to_string()))
        );
        assert_eq!(parse_key("Tabby"), Err(KeyParseError::UnknownKey("Tabby".to_string())));
        assert_eq!(parse_key("F99"), Err(KeyParseError::UnknownKey("F99".to_string())));
    }

    #[test]
    fn test_format_key() {
        for notation in ["Tab", "Shift+Tab", "Esc", "Ctrl+c", "Up", "F5", "Space"] {
            assert_eq!(format_key(&parse_key(notation).unwrap()), notation);
        }
    }

    #[test]
    fn test_quit_binding() {
        let keys = KeyMap::default();
        assert!(keys.should_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!keys.should_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(keys.help_text().starts_with("Ctrl+c: Quit"));
    }
}
