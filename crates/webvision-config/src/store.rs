//! Persistent user configuration (`~/.webvision/config.json`).
//!
//! The store never fails on load: a missing or unreadable file yields the
//! defaults. Write failures are logged and the in-memory copy stays
//! authoritative for the rest of the process.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Theme used when nothing else has been chosen.
pub const DEFAULT_THEME: &str = "default";

const CONFIG_FILE: &str = "config.json";

/// The persisted fields, in the on-disk JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(default = "default_first_time")]
    pub first_time: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            theme: default_theme(),
            first_time: default_first_time(),
        }
    }
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

fn default_first_time() -> bool {
    true
}

/// Owner of the user configuration file.
pub struct ConfigStore {
    path: PathBuf,
    state: RwLock<UserConfig>,
}

impl ConfigStore {
    /// Open the store inside `dir`, creating the directory if absent.
    pub fn load_in(dir: &Path) -> Self {
        if let Err(e) = fs::create_dir_all(dir) {
            warn!("Failed to create config directory {}: {}", dir.display(), e);
        }
        Self::load_from(dir.join(CONFIG_FILE))
    }

    /// Open the store backed by an explicit file.
    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match Self::read(&path) {
            Ok(Some(config)) => config,
            Ok(None) => {
                debug!("No config at {}, using defaults", path.display());
                UserConfig::default()
            }
            Err(e) => {
                warn!("Ignoring unreadable config {}: {}", path.display(), e);
                UserConfig::default()
            }
        };
        Self {
            path,
            state: RwLock::new(state),
        }
    }

    fn read(path: &Path) -> Result<Option<UserConfig>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write(&self, config: &UserConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut UserConfig)) {
        let mut state = self.state.write();
        f(&mut state);
        if let Err(e) = self.write(&state) {
            warn!("Failed to save configuration to {}: {}", self.path.display(), e);
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> UserConfig {
        self.state.read().clone()
    }

    pub fn api_key(&self) -> Option<String> {
        self.state.read().api_key.clone()
    }

    pub fn set_api_key(&self, api_key: impl Into<String>) {
        let api_key = api_key.into();
        self.update(|c| c.api_key = Some(api_key));
    }

    pub fn theme(&self) -> String {
        let theme = &self.state.read().theme;
        if theme.is_empty() {
            default_theme()
        } else {
            theme.clone()
        }
    }

    pub fn set_theme(&self, theme: impl Into<String>) {
        let theme = theme.into();
        self.update(|c| c.theme = theme);
    }

    pub fn is_first_run(&self) -> bool {
        self.state.read().first_time
    }

    pub fn set_first_run(&self, first_run: bool) {
        self.update(|c| c.first_time = first_run);
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
