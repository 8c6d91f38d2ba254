//! Core session struct and CDP command dispatch.

use base64::Engine;
use serde_json::{Value, json};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;
use tracing::debug;

use crate::cdp::client::Transport;
use crate::cdp::error::CdpError;
use crate::cdp::protocol::{CdpResponse, ScreenshotFormat, Viewport};

/// A session attached to a single page/target.
pub struct PageSession {
    /// Target ID.
    pub(super) target_id: String,
    /// Session ID for this target.
    pub(super) session_id: String,
    /// Command channel (shared with client).
    pub(super) transport: Transport,
    /// Navigation events for this session, consumed by `goto`.
    pub(super) events: Mutex<mpsc::Receiver<CdpResponse>>,
}

impl PageSession {
    /// Create a new page session.
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        transport: Transport,
        events: mpsc::Receiver<CdpResponse>,
    ) -> Self {
        Self {
            target_id,
            session_id,
            transport,
            events: Mutex::new(events),
        }
    }

    /// Get target ID.
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Get session ID.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport
            .call(method, params, Some(&self.session_id))
            .await
    }

    /// Enable required CDP domains.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        self.call("Network.enable", None).await?;
        self.call(
            "Page.setLifecycleEventsEnabled",
            Some(json!({"enabled": true})),
        )
        .await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Discard events queued before a new navigation starts.
    pub(super) async fn drain_events(&self) {
        let mut events = self.events.lock().await;
        while events.try_recv().is_ok() {}
    }

    /// Wait for the next event, or `None` once `deadline` passes.
    pub(super) async fn next_event(&self, deadline: Instant) -> Result<Option<CdpResponse>, CdpError> {
        let mut events = self.events.lock().await;
        match tokio::time::timeout_at(deadline, events.recv()).await {
            Ok(Some(event)) => Ok(Some(event)),
            Ok(None) => Err(CdpError::SessionClosed),
            Err(_) => Ok(None),
        }
    }

    /// Capture a PNG screenshot and return the decoded bytes.
    ///
    /// `full_page` clips to the whole document and captures beyond the viewport.
    pub async fn screenshot(&self, full_page: bool, with_options: bool) -> Result<Vec<u8>, CdpError> {
        let mut params = json!({ "format": ScreenshotFormat::Png });

        if with_options {
            params["captureBeyondViewport"] = json!(full_page);
            if full_page {
                params["clip"] = serde_json::to_value(self.content_clip().await?)?;
            }
        }

        let result = self.call("Page.captureScreenshot", Some(params)).await?;

        let data = result["data"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing screenshot data".to_string()))?;
        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| CdpError::InvalidResponse(format!("Bad screenshot data: {}", e)))
    }

    /// Rectangle covering the whole document.
    async fn content_clip(&self) -> Result<Viewport, CdpError> {
        let metrics = self.call("Page.getLayoutMetrics", None).await?;
        let size = if metrics.get("cssContentSize").is_some() {
            &metrics["cssContentSize"]
        } else {
            &metrics["contentSize"]
        };

        let width = size["width"].as_f64();
        let height = size["height"].as_f64();
        match (width, height) {
            (Some(width), Some(height)) if width > 0.0 && height > 0.0 => Ok(Viewport {
                x: 0.0,
                y: 0.0,
                width,
                height,
                scale: 1.0,
            }),
            _ => Err(CdpError::InvalidResponse(
                "Layout metrics missing content size".to_string(),
            )),
        }
    }
}
