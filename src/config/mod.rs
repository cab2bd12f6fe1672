use crate::tui::components::dialogs::{DialogOptions, InitialFocus};
use crate::tui::components::rail::DEFAULT_RAIL_MARKER;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Return focus to the triggering element when a dialog closes
    pub restore_focus: bool,

    /// Where focus lands when a dialog opens
    pub initial_focus: InitialFocus,

    /// Attribute that marks navigation rail items
    pub rail_marker: String,

    /// Entries offered by the icon picker
    pub icons: Vec<String>,

    /// Log filter directive, overridden by `RUST_LOG`
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            restore_focus: true,
            initial_focus: InitialFocus::Container,
            rail_marker: DEFAULT_RAIL_MARKER.to_string(),
            icons: ["chat", "code", "book", "star", "globe", "flask"]
                .iter()
                .map(|icon| icon.to_string())
                .collect(),
            log_filter: None,
        }
    }
}

impl Config {
    /// Initialize configuration from various sources
    ///
    /// An explicit file wins over the search path; environment variables
    /// are applied last.
    pub async fn init(explicit: Option<&Path>) -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = match explicit {
            Some(path) => Self::load_from_path(path).await?,
            None => match Self::find_config_file() {
                Some(path) => Self::load_from_path(&path).await?,
                None => Self::default(),
            },
        };

        config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Candidate configuration files, in priority order
    ///
    /// 1. ./.chatshell.json
    /// 2. ./chatshell.json
    /// 3. $CONFIG_DIR/chatshell/chatshell.json
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./.chatshell.json"), PathBuf::from("./chatshell.json")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("chatshell").join("chatshell.json"));
        }
        paths
    }

    fn find_config_file() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|path| path.exists())
    }

    /// Load a configuration file; `.yaml`/`.yml` are read as YAML, anything
    /// else as JSON
    pub async fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        // Enum values such as `initial_focus: {element_id: ..}` are single-key maps
        let config: Self = if is_yaml {
            serde_yaml::with::singleton_map_recursive::deserialize(serde_yaml::Deserializer::from_str(&content))
                .with_context(|| format!("Invalid YAML in {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON in {}", path.display()))?
        };
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Apply `CHATSHELL_*` overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("CHATSHELL_RESTORE_FOCUS") {
            match value.to_lowercase().as_str() {
                "true" | "1" | "yes" => self.restore_focus = true,
                "false" | "0" | "no" => self.restore_focus = false,
                other => warn!("Ignoring CHATSHELL_RESTORE_FOCUS={}", other),
            }
        }

        if let Some(value) = lookup("CHATSHELL_INITIAL_FOCUS") {
            match value.to_lowercase().as_str() {
                "container" => self.initial_focus = InitialFocus::Container,
                "first_focusable" | "first-focusable" => self.initial_focus = InitialFocus::FirstFocusable,
                other => warn!("Ignoring CHATSHELL_INITIAL_FOCUS={}", other),
            }
        }

        if let Some(marker) = lookup("CHATSHELL_RAIL_MARKER") {
            self.rail_marker = marker;
        }

        if let Some(filter) = lookup("CHATSHELL_LOG") {
            self.log_filter = Some(filter);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.rail_marker.trim().is_empty() {
            return Err(anyhow::anyhow!("rail_marker must not be empty"));
        }

        if !self.rail_marker.starts_with("data-") || self.rail_marker.len() == "data-".len() {
            return Err(anyhow::anyhow!(
                "rail_marker must be a data attribute such as data-rail-item, got '{}'",
                self.rail_marker
            ));
        }

        if self.icons.is_empty() {
            return Err(anyhow::anyhow!("icons must list at least one icon"));
        }

        Ok(())
    }

    /// Focus-trap options shared by every dialog
    pub fn dialog_options(&self) -> DialogOptions {
        DialogOptions {
            restore_focus: self.restore_focus,
            initial_focus: self.initial_focus.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_config(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rail_marker, "data-rail-item");
        assert_eq!(config.dialog_options(), DialogOptions::default());
    }

    #[tokio::test]
    async fn test_load_json_with_defaults() {
        let file = temp_config(".json", r#"{ "restore_focus": false, "initial_focus": "first_focusable" }"#);

        let config = Config::load_from_path(file.path()).await.unwrap();

        assert!(!config.restore_focus);
        assert_eq!(config.initial_focus, InitialFocus::FirstFocusable);
        assert_eq!(config.rail_marker, DEFAULT_RAIL_MARKER);
        assert!(!config.icons.is_empty());
    }

    #[tokio::test]
    async fn test_load_yaml() {
        let file = temp_config(".yaml", "rail_marker: data-nav\nicons:\n  - rocket\n");

        let config = Config::load_from_path(file.path()).await.unwrap();

        assert_eq!(config.rail_marker, "data-nav");
        assert_eq!(config.icons, vec!["rocket".to_string()]);
    }

    #[tokio::test]
    async fn test_load_yaml_initial_focus_element() {
        let file = temp_config(".yml", "restore_focus: false
initial_focus:
  element_id: icon-search
");

        let config = Config::load_from_path(file.path()).await.unwrap();

        assert!(!config.restore_focus);
        assert_eq!(config.initial_focus, InitialFocus::ElementId("icon-search".to_string()));

        let file = temp_config(".yaml", "initial_focus: first_focusable
");
        let config = Config::load_from_path(file.path()).await.unwrap();
        assert_eq!(config.initial_focus, InitialFocus::FirstFocusable);
    }

    #[tokio::test]
    async fn test_init_with_explicit_file() {
        let file = temp_config(".json", r#"{ "icons": ["leaf"] }"#);

        let config = Config::init(Some(file.path())).await.unwrap();

        assert_eq!(config.icons, vec!["leaf".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_file_is_an_error() {
        let file = temp_config(".json", "{ not json");
        assert!(Config::load_from_path(file.path()).await.is_err());

        let file = temp_config(".json", r#"{ "icons": [] }"#);
        assert!(Config::init(Some(file.path())).await.is_err());

        let missing = std::path::PathBuf::from("/definitely/not/here.json");
        assert!(Config::init(Some(missing.as_path())).await.is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CHATSHELL_RESTORE_FOCUS", "false"),
            ("CHATSHELL_INITIAL_FOCUS", "first_focusable"),
            ("CHATSHELL_RAIL_MARKER", "data-strip"),
            ("CHATSHELL_LOG", "chatshell=trace"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert!(!config.restore_focus);
        assert_eq!(config.initial_focus, InitialFocus::FirstFocusable);
        assert_eq!(config.rail_marker, "data-strip");
        assert_eq!(config.log_filter.as_deref(), Some("chatshell=trace"));
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            "CHATSHELL_RESTORE_FOCUS" => Some("maybe".to_string()),
            "CHATSHELL_INITIAL_FOCUS" => Some("somewhere".to_string()),
            _ => None,
        });
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_rail_marker() {
        for marker in ["", "   ", "rail-item", "data-"] {
            let config = Config {
                rail_marker: marker.to_string(),
                ..Config::default()
            };
            assert!(config.validate().is_err(), "marker {:?} accepted", marker);
        }
    }
}
