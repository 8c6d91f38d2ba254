//! Browser actions for WebVision.
//!
//! Drives Chrome over the DevTools Protocol and exposes the result as a
//! fixed palette of agent tools.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────────┐   ┌────────────────┐   WebSocket   ┌────────────┐
//! │ BrowserTool  │──►│ ActionOrchestrator  │──►│ BrowserManager │◄────────────►│   Chrome   │
//! │ (13 actions) │   │ retry / fallbacks   │   │ PageSession    │      CDP      │            │
//! └──────────────┘   └─────────────────────┘   └────────────────┘               └────────────┘
//! ```
//!
//! ## Lazy start
//!
//! Chrome is not launched when the tools are built. The first action that
//! needs a page starts it (or attaches to one already listening on the debug
//! port), and [`ActionOrchestrator::shutdown`] releases it.

mod actions;
pub mod cdp;
mod driver;
pub mod manager;
mod orchestrator;

pub use actions::{ActionKind, BrowserAction, BrowserTool, browser_tools};
pub use cdp::{CdpClient, CdpError, LoadStrategy, PageProfile, PageSession};
pub use driver::{
    BrowserBackend, CaptureMode, ElementInfo, FillOutcome, Locator, PageDriver, ScrollBehavior,
};
pub use manager::{BrowserError, BrowserManager, BrowserManagerConfig};
pub use orchestrator::{
    ActionOrchestrator, LoadReport, OrchestratorConfig, RetryPolicy, click_with_fallback,
    find_element, load_fallback, load_robustly, normalize_url, wait_for_content, with_retry,
};
