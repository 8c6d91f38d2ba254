//! Robust page loading: strategy ladder, outer attempts and a commit fallback.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cdp::LoadStrategy;
use crate::driver::PageDriver;
use crate::manager::BrowserError;

/// Strategies tried in order on each attempt, with their timeouts.
pub(crate) const LOAD_STRATEGIES: [(LoadStrategy, Duration); 3] = [
    (LoadStrategy::DomContentLoaded, Duration::from_secs(30)),
    (LoadStrategy::Load, Duration::from_secs(45)),
    (LoadStrategy::NetworkIdle, Duration::from_secs(60)),
];

const FALLBACK_TIMEOUT: Duration = Duration::from_secs(15);
const FALLBACK_SETTLE: Duration = Duration::from_secs(3);
const ATTEMPT_GAP: Duration = Duration::from_secs(3);
const LOAD_SETTLE: Duration = Duration::from_secs(2);
const CONTENT_SETTLE: Duration = Duration::from_secs(2);
const CONTENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

const UNKNOWN_TITLE: &str = "Unknown";

/// Default bound for the content-loaded wait after a navigation.
pub(crate) const CONTENT_TIMEOUT: Duration = Duration::from_secs(15);

/// Where a successful load ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub url: String,
    pub title: String,
    pub status: Option<u16>,
}

/// Navigate with every strategy, `attempts` times over, until one succeeds.
pub async fn load_robustly(
    page: &dyn PageDriver,
    url: &str,
    attempts: u32,
) -> Result<LoadReport, BrowserError> {
    let attempts = attempts.max(1);

    for attempt in 1..=attempts {
        info!("Loading {} (attempt {}/{})", url, attempt, attempts);

        for (strategy, timeout) in LOAD_STRATEGIES {
            let failure = match page.goto(url, strategy, timeout).await {
                Ok(Some(status)) if status < 400 => {
                    tokio::time::sleep(LOAD_SETTLE).await;
                    wait_for_content(page, CONTENT_TIMEOUT).await;
                    return Ok(describe(page, url, Some(status)).await);
                }
                Ok(Some(status)) => format!("HTTP {} error", status),
                Ok(None) => "No response received".to_string(),
                Err(e) => e.to_string(),
            };
            warn!("Strategy {} failed for {}: {}", strategy, url, failure);
        }

        if attempt < attempts {
            tokio::time::sleep(ATTEMPT_GAP).await;
        }
    }

    Err(BrowserError::NavigationFailed(format!(
        "Failed to load page after {} attempts with all strategies",
        attempts
    )))
}

/// Last resort: wait only for the navigation to commit.
pub async fn load_fallback(page: &dyn PageDriver, url: &str) -> Result<LoadReport, BrowserError> {
    let status = page.goto(url, LoadStrategy::Commit, FALLBACK_TIMEOUT).await?;
    tokio::time::sleep(FALLBACK_SETTLE).await;
    Ok(describe(page, url, status).await)
}

/// Report for a load that already succeeded. Lookup failures fall back to
/// the requested URL and an unknown title.
async fn describe(page: &dyn PageDriver, requested: &str, status: Option<u16>) -> LoadReport {
    let url = page.url().await.unwrap_or_else(|e| {
        warn!("Could not read URL after loading {}: {}", requested, e);
        requested.to_string()
    });
    let title = page.title().await.unwrap_or_else(|e| {
        warn!("Could not read title after loading {}: {}", requested, e);
        UNKNOWN_TITLE.to_string()
    });
    LoadReport { url, title, status }
}

/// Wait for `readyState` and a non-empty body, each bounded by a third of
/// `timeout`. Returns whether both were observed; a timeout is not an error.
pub async fn wait_for_content(page: &dyn PageDriver, timeout: Duration) -> bool {
    let stage = timeout / 3;

    let ready = poll_until(stage, || async {
        matches!(page.ready_state().await.as_deref(), Ok("interactive" | "complete"))
    })
    .await;
    if !ready {
        warn!("Content loading wait timed out: document not ready");
        return false;
    }

    let has_body = poll_until(stage, || async { page.body_has_content().await.unwrap_or(false) }).await;
    if !has_body {
        warn!("Content loading wait timed out: body is empty");
        return false;
    }

    tokio::time::sleep(CONTENT_SETTLE).await;
    debug!("Content loaded");
    true
}

async fn poll_until<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        if Instant::now() + CONTENT_POLL_INTERVAL > deadline {
            return false;
        }
        tokio::time::sleep(CONTENT_POLL_INTERVAL).await;
    }
}
