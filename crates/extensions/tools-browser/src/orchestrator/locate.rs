//! Element probing and the click fallback chain.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::driver::{Locator, PageDriver};
use crate::manager::BrowserError;

const PROBE_INTERVAL: Duration = Duration::from_millis(100);

/// How a click strategy decides its element is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    /// Full `find_element` check.
    Probe,
    /// Wait for a visible match.
    AwaitVisible,
    /// Single check.
    VisibleNow,
}

/// Element-found check: a visible match, then an attached match, then one
/// final immediate lookup. Never fails; lookup errors count as "not found".
pub async fn find_element(page: &dyn PageDriver, locator: &Locator, timeout: Duration) -> bool {
    if wait_for(page, locator, true, timeout).await {
        return true;
    }
    if wait_for(page, locator, false, timeout).await {
        return true;
    }
    matches!(page.locate(locator).await, Ok(Some(_)))
}

async fn wait_for(page: &dyn PageDriver, locator: &Locator, visible: bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(Some(info)) = page.locate(locator).await {
            if info.visible || !visible {
                return true;
            }
        }
        if Instant::now() + PROBE_INTERVAL > deadline {
            return false;
        }
        tokio::time::sleep(PROBE_INTERVAL).await;
    }
}

/// Ordered click strategies for a selector or visible text.
pub(crate) fn click_chain(selector: &str) -> Vec<(Locator, Lookup)> {
    let mut chain = vec![(Locator::Css(selector.to_string()), Lookup::Probe)];

    if !selector.contains(['[', '#', '.']) {
        chain.push((Locator::ExactText(selector.to_string()), Lookup::AwaitVisible));
    }

    chain.extend([
        (Locator::PartialText(selector.to_string()), Lookup::AwaitVisible),
        (Locator::AriaLabel(selector.to_string()), Lookup::Probe),
        (Locator::Title(selector.to_string()), Lookup::AwaitVisible),
        (Locator::XPath(text_xpath(selector)), Lookup::VisibleNow),
    ]);
    chain
}

fn text_xpath(text: &str) -> String {
    let quoted = if text.contains('\'') {
        format!("\"{}\"", text.replace('"', ""))
    } else {
        format!("'{}'", text)
    };
    ["button", "a", "span", "div"]
        .iter()
        .map(|tag| format!("//{}[contains(text(), {})]", tag, quoted))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Click the first visible, enabled element any strategy in the chain can
/// reach, scrolling it into view first.
pub async fn click_with_fallback(
    page: &dyn PageDriver,
    selector: &str,
    timeout: Duration,
) -> Result<Locator, BrowserError> {
    let mut last_error = None;

    for (locator, lookup) in click_chain(selector) {
        match try_click(page, &locator, lookup, timeout).await {
            Ok(()) => {
                debug!("Clicked {} via {}", selector, locator);
                return Ok(locator);
            }
            Err(e) => {
                debug!("Click strategy {} failed: {}", locator, e);
                last_error = Some(e);
            }
        }
    }

    let last = last_error.map(|e| e.to_string()).unwrap_or_default();
    Err(BrowserError::ActionFailed(format!(
        "Element not found or not clickable: {}. Last error: {}",
        selector, last
    )))
}

async fn try_click(
    page: &dyn PageDriver,
    locator: &Locator,
    lookup: Lookup,
    timeout: Duration,
) -> Result<(), BrowserError> {
    let found = match lookup {
        Lookup::Probe => find_element(page, locator, timeout).await,
        Lookup::AwaitVisible => wait_for(page, locator, true, timeout).await,
        Lookup::VisibleNow => true,
    };
    if !found {
        return Err(BrowserError::ElementNotFound(locator.to_string()));
    }

    let info = page
        .locate(locator)
        .await?
        .ok_or_else(|| BrowserError::ElementNotFound(locator.to_string()))?;
    // An attached but hidden match has a zero-size box at the page origin.
    if !info.visible {
        return Err(BrowserError::ElementNotFound(format!("{} (not visible)", locator)));
    }
    if !info.enabled {
        return Err(BrowserError::ActionFailed(format!("{} is disabled", locator)));
    }

    page.scroll_into_view(locator).await?;
    let info = page
        .locate(locator)
        .await?
        .ok_or_else(|| BrowserError::ElementNotFound(locator.to_string()))?;
    page.click_at(info.x, info.y).await
}
