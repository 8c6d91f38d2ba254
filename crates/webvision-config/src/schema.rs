//! Settings schema definitions.

use serde::{Deserialize, Serialize};

/// Root runtime settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub agent: AgentSettings,

    #[serde(default)]
    pub browser: BrowserSettings,

    #[serde(default)]
    pub orchestrator: OrchestratorSettings,
}

/// Agent (LLM loop) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_turns: default_max_turns(),
            api_url: default_api_url(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_turns() -> u32 {
    50
}

fn default_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

/// Browser process and page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    #[serde(default)]
    pub headless: bool,

    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Chrome profile directory; `~` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_dir: Option<String>,

    /// Explicit Chrome executable; auto-detected when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: false,
            debug_port: default_debug_port(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            profile_dir: None,
            chrome_path: None,
        }
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_viewport_width() -> u32 {
    1920
}

fn default_viewport_height() -> u32 {
    1080
}

/// Retry and verification policy for browser actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorSettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_load_attempts")]
    pub load_attempts: u32,

    /// Treat a form value that does not read back as written as a failure.
    #[serde(default)]
    pub strict_verification: bool,

    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            load_attempts: default_load_attempts(),
            strict_verification: false,
            screenshot_dir: default_screenshot_dir(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_load_attempts() -> u32 {
    3
}

fn default_screenshot_dir() -> String {
    "./screenshots".to_string()
}
