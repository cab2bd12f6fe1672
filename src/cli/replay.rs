use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use chatshell::config::Config;
use chatshell::tui::keys::parse_key;
use chatshell::tui::App;

/// Replay a scenario file against the shell
#[derive(Args)]
pub struct ReplayCommand {
    /// Scenario file (.json, .yaml or .yml); `-` reads JSON from stdin
    pub file: PathBuf,

    /// Only print failures
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl ReplayCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        debug!("Executing replay command");

        let scenario = if self.file.as_os_str() == "-" {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| anyhow!("Failed to read from stdin: {}", e))?;
            Scenario::from_json(&buffer)?
        } else {
            Scenario::load(&self.file).await?
        };

        let config = match &scenario.config {
            Some(overrides) => {
                overrides.validate()?;
                overrides.clone()
            }
            None => config.clone(),
        };

        info!(
            "Replaying {} ({} steps)",
            scenario.name.as_deref().unwrap_or("scenario"),
            scenario.steps.len()
        );

        let mut replayer = Replayer::new(config)?;
        let outcome = replayer.run(&scenario.steps);

        if !self.quiet {
            for line in replayer.trace() {
                println!("{}", line);
            }
        }
        outcome
    }
}

/// A scripted sequence of steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,

    /// Configuration for this scenario, replacing the loaded one
    #[serde(default)]
    pub config: Option<Config>,

    pub steps: Vec<Step>,
}

/// One scenario step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Focus the element with this id
    Focus(String),
    /// Press a key, e.g. `Tab`, `Shift+Tab`, `Esc`
    Key(String),
    /// Open a dialog programmatically
    Open(String),
    /// Close a dialog programmatically
    Close(String),
    /// Detach the element with this id
    Remove(String),
    /// Run deferred work
    Tick,
    /// Element id expected to own focus; `body` when nothing is focused
    ExpectFocus(String),
    ExpectOpen(String),
    ExpectClosed(String),
}

impl Scenario {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            // Steps are written as single-key maps (`- key: Tab`)
            Some("yaml") | Some("yml") => {
                serde_yaml::with::singleton_map_recursive::deserialize(serde_yaml::Deserializer::from_str(&content))
                    .with_context(|| format!("Invalid YAML scenario {}", path.display()))
            }
            _ => Self::from_json(&content).with_context(|| format!("In {}", path.display())),
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Invalid JSON scenario")
    }
}

/// Failed expectation during a replay
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("step {step}: expected {expected}, found {actual}")]
pub struct ExpectationFailed {
    pub step: usize,
    pub expected: String,
    pub actual: String,
}

/// Runs steps against a fresh shell and records one trace line per step
pub struct Replayer {
    app: App,
    trace: Vec<String>,
}

impl Replayer {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            app: App::new(config)?,
            trace: Vec::new(),
        })
    }

    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Run all steps; stops at the first failing step
    pub fn run(&mut self, steps: &[Step]) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            let number = index + 1;
            let result = self.apply(number, step);
            let line = match &result {
                Ok(()) => format!("{:>3} {:<28} -> {}", number, describe(step), self.app.focus_label()),
                Err(e) => format!("{:>3} {:<28} !! {}", number, describe(step), e),
            };
            self.trace.push(line);
            result?;
        }
        Ok(())
    }

    fn apply(&mut self, number: usize, step: &Step) -> Result<()> {
        match step {
            Step::Focus(id) => {
                if !self.app.focus_element(id)? {
                    debug!("#{} refused focus", id);
                }
            }
            Step::Key(notation) => {
                let key = parse_key(notation).with_context(|| format!("step {}", number))?;
                self.app.handle_key(key)?;
            }
            Step::Open(id) => {
                self.app.open_dialog(id)?;
            }
            Step::Close(id) => {
                self.app.close_dialog(id)?;
            }
            Step::Remove(id) => self.app.remove_element(id)?,
            Step::Tick => {
                self.app.tick();
            }
            Step::ExpectFocus(expected) => {
                let actual = self.app.focused_id().unwrap_or("body");
                if actual != expected {
                    return Err(ExpectationFailed {
                        step: number,
                        expected: format!("focus on {}", expected),
                        actual: format!("focus on {}", actual),
                    }
                    .into());
                }
            }
            Step::ExpectOpen(id) => {
                if !self.app.is_dialog_open(id) {
                    return Err(self.dialog_mismatch(number, format!("dialog {} open", id)).into());
                }
            }
            Step::ExpectClosed(id) => {
                if self.app.is_dialog_open(id) {
                    return Err(self.dialog_mismatch(number, format!("dialog {} closed", id)).into());
                }
            }
        }
        Ok(())
    }

    fn dialog_mismatch(&self, step: usize, expected: String) -> ExpectationFailed {
        let actual = match self.app.open_dialog_id() {
            Some(open) => format!("dialog {} open", open),
            None => "no dialog open".to_string(),
        };
        ExpectationFailed { step, expected, actual }
    }
}

fn describe(step: &Step) -> String {
    match step {
        Step::Focus(id) => format!("focus #{}", id),
        Step::Key(key) => format!("key {}", key),
        Step::Open(id) => format!("open {}", id),
        Step::Close(id) => format!("close {}", id),
        Step::Remove(id) => format!("remove #{}", id),
        Step::Tick => "tick".to_string(),
        Step::ExpectFocus(id) => format!("expect focus {}", id),
        Step::ExpectOpen(id) => format!("expect open {}", id),
        Step::ExpectClosed(id) => format!("expect closed {}", id),
    }
}
