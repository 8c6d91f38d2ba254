//! # WebVision Config
//!
//! Two layers of configuration:
//!
//! - [`ConfigStore`] - the per-user JSON file holding the API key, theme and
//!   first-run flag. Every setter persists immediately.
//! - [`Settings`] - optional TOML runtime knobs (model, browser flags, retry
//!   policy), loaded through [`SettingsLoader`].

mod error;
mod loader;
mod schema;
mod store;
mod validator;

pub use error::ConfigError;
pub use loader::SettingsLoader;
pub use schema::*;
pub use store::{ConfigStore, UserConfig, DEFAULT_THEME};
pub use validator::{SettingsValidator, ValidationResult, ValidationWarning};

/// Directory holding all per-user WebVision state (`~/.webvision`).
pub fn webvision_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".webvision")
}
