//! Chrome DevTools Protocol (CDP) client implementation.
//!
//! Connects to Chrome/Chromium over WebSocket and speaks the CDP JSON-RPC
//! protocol. Events are routed per session so a [`PageSession`] can wait on
//! its own navigation lifecycle.
//!
//! ```rust,ignore
//! let client = CdpClient::connect("http://localhost:9222").await?;
//! let page = client.new_page().await?;
//! let status = page.goto("https://example.com", LoadStrategy::Load, Duration::from_secs(45)).await?;
//! ```

mod client;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::{PageProfile, PageSession};
