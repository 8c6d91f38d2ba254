//! Navigation operations for CDP page session.

use std::time::Duration;

use serde_json::{Value, json};
use tokio::time::Instant;
use tracing::debug;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{CdpResponse, LoadStrategy};

use super::core::PageSession;

impl PageSession {
    /// Events [`goto`](Self::goto) reads. Everything else the enabled
    /// domains emit is dropped before it reaches the page's queue.
    pub(crate) fn is_navigation_event(event: &CdpResponse) -> bool {
        match event.method.as_deref() {
            Some("Page.lifecycleEvent" | "Page.frameNavigated") => true,
            Some("Network.responseReceived") => event
                .params
                .as_ref()
                .is_some_and(|params| params["type"] == "Document"),
            _ => false,
        }
    }

    /// Navigate to `url` and wait until `strategy` is satisfied.
    ///
    /// Returns the HTTP status of the main document, or `None` when the
    /// navigation produced no network response (same-document navigation,
    /// `about:` pages).
    pub async fn goto(
        &self,
        url: &str,
        strategy: LoadStrategy,
        timeout: Duration,
    ) -> Result<Option<u16>, CdpError> {
        let deadline = Instant::now() + timeout;
        let timed_out =
            || CdpError::Timeout(format!("Navigation to {} ({}) exceeded {:?}", url, strategy, timeout));

        self.drain_events().await;

        let result = tokio::time::timeout_at(
            deadline,
            self.call("Page.navigate", Some(json!({"url": url}))),
        )
        .await
        .map_err(|_| timed_out())??;

        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            if !error.is_empty() {
                return Err(CdpError::NavigationFailed(error.to_string()));
            }
        }

        let Some(loader_id) = result["loaderId"].as_str() else {
            debug!("Same-document navigation to {}", url);
            return Ok(None);
        };
        let frame_id = result["frameId"].as_str().unwrap_or_default();

        let mut status = None;
        loop {
            let Some(event) = self.next_event(deadline).await? else {
                return Err(timed_out());
            };
            let params = event.params.unwrap_or(Value::Null);

            match event.method.as_deref() {
                Some("Network.responseReceived")
                    if params["type"] == "Document" && params["loaderId"] == loader_id =>
                {
                    status = params["response"]["status"].as_u64().map(|s| s as u16);
                }
                Some("Page.frameNavigated")
                    if strategy == LoadStrategy::Commit && params["frame"]["id"] == frame_id =>
                {
                    break;
                }
                Some("Page.lifecycleEvent")
                    if params["loaderId"] == loader_id && params["frameId"] == frame_id =>
                {
                    if params["name"].as_str() == strategy.lifecycle_event() {
                        break;
                    }
                }
                _ => {}
            }
        }

        debug!("Navigated to {} ({}), status {:?}", url, strategy, status);
        Ok(status)
    }

    /// Get current URL.
    pub async fn get_url(&self) -> Result<String, CdpError> {
        let result = self.evaluate("window.location.href").await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    /// Get page title.
    pub async fn get_title(&self) -> Result<String, CdpError> {
        let result = self.evaluate("document.title").await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }
}
