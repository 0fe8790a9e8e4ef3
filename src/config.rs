//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `--config <path>` on the command line
//! 2. `$MATHLENS_CONFIG` environment variable
//! 3. `<config dir>/mathlens/config.toml`
//! 4. Built-in defaults (everything is optional)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::ai::{DEFAULT_API_KEY_ENV, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use crate::ui::ErrorFeedback;

const CONFIG_ENV: &str = "MATHLENS_CONFIG";
const APP_DIR: &str = "mathlens";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ai: AiConfig,
    pub ui: UiConfig,
    pub history: HistoryConfig,
}

/// Gemini request settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub model: String,
    pub timeout_secs: u64,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub error_feedback: ErrorFeedback,
}

/// History persistence. Off unless `persist = true`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub persist: bool,
    /// JSON file path. Default: platform data dir.
    pub path: Option<PathBuf>,
}

// --- Defaults ---

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            api_key_env: DEFAULT_API_KEY_ENV.into(),
        }
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        self.timeout_or(None)
    }

    /// Timeout with an optional command-line override, never below one second.
    pub fn timeout_or(&self, secs: Option<u64>) -> Duration {
        Duration::from_secs(secs.unwrap_or(self.timeout_secs).max(1))
    }
}

impl HistoryConfig {
    /// Where history is stored when persistence is enabled.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(|| {
            dirs::data_dir().map(|dir| dir.join(APP_DIR).join("history.json"))
        })
    }
}

/// Load config from disk. Returns defaults if no config file exists.
///
/// An explicitly given path must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("config file {} does not exist", path.display());
        }
        return read_config(path);
    }

    match config_path() {
        Some(path) if path.exists() => read_config(&path),
        _ => Ok(Config::default()),
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_config(&content).with_context(|| format!("parsing {}", path.display()))
}

fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(p));
    }

    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}
