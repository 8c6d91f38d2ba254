//! Page-level overrides applied to every new tab.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::debug;

use crate::cdp::error::CdpError;

use super::core::PageSession;

/// User agent, viewport and headers a page should present.
#[derive(Debug, Clone)]
pub struct PageProfile {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub extra_headers: BTreeMap<String, String>,
}

impl Default for PageProfile {
    fn default() -> Self {
        let extra_headers = [
            ("Accept-Language", "en-US,en;q=0.9"),
            ("Accept-Encoding", "gzip, deflate, br"),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            viewport_width: 1920,
            viewport_height: 1080,
            extra_headers,
        }
    }
}

impl PageSession {
    /// Apply user agent, viewport and extra headers.
    pub async fn apply_profile(&self, profile: &PageProfile) -> Result<(), CdpError> {
        self.call(
            "Network.setUserAgentOverride",
            Some(json!({"userAgent": profile.user_agent})),
        )
        .await?;

        self.call(
            "Emulation.setDeviceMetricsOverride",
            Some(json!({
                "width": profile.viewport_width,
                "height": profile.viewport_height,
                "deviceScaleFactor": 1,
                "mobile": false,
            })),
        )
        .await?;

        self.call(
            "Network.setExtraHTTPHeaders",
            Some(json!({"headers": profile.extra_headers})),
        )
        .await?;

        debug!(
            "Applied page profile {}x{} to {}",
            profile.viewport_width, profile.viewport_height, self.target_id
        );
        Ok(())
    }
}
