//! Errors and launch settings for [`BrowserManager`](super::BrowserManager).

use std::path::PathBuf;

use thiserror::Error;

use crate::cdp::CdpError;

/// Failures surfaced by the manager and the page actions built on it.
///
/// The orchestrator turns every one of these into a failure result, so the
/// display strings end up in front of the model.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// The debug endpoint or its WebSocket could not be reached.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Catch-all for page-level failures, including script exceptions.
    #[error("Action failed: {0}")]
    ActionFailed(String),

    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// No page is attached, or the connection dropped mid-command.
    #[error("Browser not connected")]
    NotConnected,

    #[error("Chrome not found. Please install Google Chrome.")]
    ChromeNotFound,

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),
}

impl From<CdpError> for BrowserError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::ConnectionFailed(msg) | CdpError::ChromeNotAvailable(msg) => {
                Self::ConnectionFailed(msg)
            }
            CdpError::NavigationFailed(msg) => Self::NavigationFailed(msg),
            CdpError::Timeout(msg) => Self::Timeout(msg),
            CdpError::SessionClosed => Self::NotConnected,
            CdpError::JavaScript(msg) => Self::ActionFailed(format!("JS error: {msg}")),
            other => Self::ActionFailed(other.to_string()),
        }
    }
}

/// How Chrome is started and what every new page looks like.
#[derive(Debug, Clone)]
pub struct BrowserManagerConfig {
    pub debug_port: u16,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// `--user-data-dir`; `~/.webvision/browser-profile` when unset.
    pub profile_dir: Option<PathBuf>,
    /// Skips the executable search when set.
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
}

impl Default for BrowserManagerConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            viewport_width: 1920,
            viewport_height: 1080,
            profile_dir: None,
            chrome_path: None,
            headless: false,
        }
    }
}

impl BrowserManagerConfig {
    pub fn resolved_profile_dir(&self) -> PathBuf {
        match &self.profile_dir {
            Some(dir) => dir.clone(),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".webvision")
                .join("browser-profile"),
        }
    }

    /// Base URL of the DevTools HTTP endpoint.
    pub fn devtools_url(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }
}
