//! Action orchestrator.
//!
//! Every browser operation the agent can request lives here. Each one
//! acquires the current page from the [`BrowserBackend`] (starting the browser
//! on first use), wraps flaky steps in [`with_retry`] and turns every failure
//! into a [`ToolResult`] error instead of propagating it.

mod load;
mod locate;
mod retry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use webvision_protocols::ToolResult;

use crate::driver::{BrowserBackend, CaptureMode, FillOutcome, Locator, PageDriver, ScrollBehavior};
use crate::manager::BrowserError;

pub use load::{LoadReport, load_fallback, load_robustly, wait_for_content};
pub use locate::{click_with_fallback, find_element};
pub use retry::{RetryPolicy, with_retry};

const CLICK_SETTLE: Duration = Duration::from_millis(500);
const KEY_SETTLE: Duration = Duration::from_millis(200);
const SCROLL_SETTLE: Duration = Duration::from_secs(1);
const ELEMENT_TIMEOUT: Duration = Duration::from_secs(3);
const FIELD_TIMEOUT: Duration = Duration::from_secs(10);
const TYPED_PREVIEW_CHARS: usize = 50;
const BODY_PREVIEW_CHARS: usize = 100;

/// Orchestrator tuning.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub retry: RetryPolicy,
    /// Outer attempts of the strategy ladder in [`load_robustly`].
    pub load_attempts: u32,
    pub screenshot_dir: PathBuf,
    /// Fail `fill_form` when the field does not read back the written text.
    pub strict_verification: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            load_attempts: 3,
            screenshot_dir: PathBuf::from("./screenshots"),
            strict_verification: false,
        }
    }
}

/// Browser operations exposed to the agent, over a single current page.
pub struct ActionOrchestrator {
    backend: Arc<dyn BrowserBackend>,
    config: OrchestratorConfig,
}

impl ActionOrchestrator {
    pub fn new(backend: Arc<dyn BrowserBackend>, config: OrchestratorConfig) -> Self {
        Self { backend, config }
    }

    async fn page(&self) -> Result<Arc<dyn PageDriver>, BrowserError> {
        self.backend.current_page().await
    }

    /// Release the browser. Safe to call when it never started.
    pub async fn shutdown(&self) -> Result<(), BrowserError> {
        self.backend.shutdown().await
    }

    /// Capture the page: full page, then viewport, then without options.
    pub async fn take_screenshot(&self) -> ToolResult {
        match self.try_screenshot().await {
            Ok(path) => {
                let locator = format!("file://{}", path.display());
                ToolResult::success_json(
                    format!("📸 Screenshot saved: {}", path.display()),
                    json!({"type": "image_url", "image_url": {"url": locator}}),
                )
            }
            Err(e) => ToolResult::error(format!("❌ Screenshot failed: {}", e)),
        }
    }

    async fn try_screenshot(&self) -> Result<PathBuf, BrowserError> {
        let page = self.page().await?;

        let mut last_error = None;
        let mut image = None;
        for mode in [CaptureMode::FullPage, CaptureMode::Viewport, CaptureMode::Plain] {
            match page.screenshot(mode).await {
                Ok(bytes) => {
                    image = Some(bytes);
                    break;
                }
                Err(e) => {
                    warn!("{} screenshot failed: {}", mode, e);
                    last_error = Some(e);
                }
            }
        }
        let Some(image) = image else {
            return Err(last_error.unwrap_or_else(|| {
                BrowserError::ScreenshotFailed("no capture mode succeeded".to_string())
            }));
        };

        let dir = &self.config.screenshot_dir;
        let io_err = |e: std::io::Error| BrowserError::ScreenshotFailed(e.to_string());
        tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
        let path = dir.join(format!(
            "screenshot-{}.png",
            chrono::Utc::now().timestamp_millis()
        ));
        tokio::fs::write(&path, &image).await.map_err(io_err)?;

        let path = tokio::fs::canonicalize(&path).await.unwrap_or(path);
        info!("Screenshot saved to {}", path.display());
        Ok(path)
    }

    /// Replace the current page with a fresh, configured tab.
    pub async fn open_new_tab(&self) -> ToolResult {
        match self.backend.open_new_page().await {
            Ok(_) => ToolResult::success("✅ New browser tab opened with optimal configuration"),
            Err(e) => ToolResult::error(format!("❌ Failed to open new tab: {}", e)),
        }
    }

    /// Load `url`, skipping the navigation when already there.
    pub async fn navigate(&self, url: &str, force_reload: bool) -> ToolResult {
        let url = normalize_url(url);
        let page = match self.page().await {
            Ok(page) => page,
            Err(e) => return ToolResult::error(format!("❌ Failed to load {}: {}", url, e)),
        };

        if !force_reload {
            if let Ok(current) = page.url().await {
                if same_url(&current, &url) {
                    return ToolResult::success(format!("🌍 Already on {}", url));
                }
            }
        }

        match load_robustly(page.as_ref(), &url, self.config.load_attempts).await {
            Ok(report) => ToolResult::success(format!(
                "🌍 Successfully loaded: {}\n📄 Title: {}\n✅ Status: {}",
                report.url,
                report.title,
                status_text(report.status)
            )),
            Err(e) => {
                warn!("Robust load of {} failed, trying fallback: {}", url, e);
                match load_fallback(page.as_ref(), &url).await {
                    Ok(report) => ToolResult::success(format!(
                        "🌍 Fallback load completed for: {}\n📄 Title: {}\n⚠️  Content may be partially loaded",
                        url, report.title
                    )),
                    Err(fallback) => ToolResult::error(format!(
                        "❌ Failed to load {} after all attempts.\nOriginal error: {}\nFallback error: {}",
                        url, e, fallback
                    )),
                }
            }
        }
    }

    /// Click at viewport coordinates.
    pub async fn click_at(&self, x: f64, y: f64) -> ToolResult {
        match self.try_click_at(x, y).await {
            Ok(()) => ToolResult::success(format!(
                "🖱️ Successfully clicked at coordinates ({}, {})",
                x, y
            )),
            Err(e) => ToolResult::error(format!("❌ Failed to click at ({}, {}): {}", x, y, e)),
        }
    }

    async fn try_click_at(&self, x: f64, y: f64) -> Result<(), BrowserError> {
        let page = self.page().await?;
        let (width, height) = page.viewport_size().await?;
        if !(0.0..=width as f64).contains(&x) || !(0.0..=height as f64).contains(&y) {
            return Err(BrowserError::ActionFailed(format!(
                "Coordinates ({}, {}) are outside viewport {}x{}",
                x, y, width, height
            )));
        }

        with_retry(&self.config.retry, "click_screen", || page.click_at(x, y)).await?;
        tokio::time::sleep(CLICK_SETTLE).await;
        debug!("Clicked at ({}, {})", x, y);
        Ok(())
    }

    /// Click an element by CSS selector or visible text.
    pub async fn click_element(&self, selector: &str) -> ToolResult {
        let result = async {
            let page = self.page().await?;
            with_retry(&self.config.retry, "click_element", || {
                click_with_fallback(page.as_ref(), selector, ELEMENT_TIMEOUT)
            })
            .await?;
            tokio::time::sleep(CLICK_SETTLE).await;
            Ok::<_, BrowserError>(())
        }
        .await;

        match result {
            Ok(()) => ToolResult::success(format!("🖱️ Successfully clicked element: {}", selector)),
            Err(e) => ToolResult::error(format!(
                "❌ Failed to click element \"{}\": {}",
                selector, e
            )),
        }
    }

    /// Type into the focused element, one keystroke at a time.
    pub async fn type_text(&self, text: &str, delay: Duration) -> ToolResult {
        let result = async {
            let page = self.page().await?;
            with_retry(&self.config.retry, "send_keys", || page.type_text(text, delay)).await
        }
        .await;

        match result {
            Ok(()) => {
                let (preview, truncated) = truncate_chars(text, TYPED_PREVIEW_CHARS);
                ToolResult::success(format!(
                    "⌨️ Successfully typed: \"{}{}\"",
                    preview,
                    if truncated { "..." } else { "" }
                ))
            }
            Err(e) => ToolResult::error(format!("❌ Failed to type text: {}", e)),
        }
    }

    /// Set a form field's value and check that it stuck.
    pub async fn fill_form(&self, selector: &str, text: &str, clear: bool) -> ToolResult {
        let result = with_retry(&self.config.retry, "fill_form", || {
            self.try_fill_form(selector, text, clear)
        })
        .await;

        match result {
            Ok(None) => ToolResult::success(format!(
                "📝 Successfully filled \"{}\" with \"{}\"",
                selector, text
            )),
            Ok(Some(warning)) => ToolResult::success(format!(
                "📝 Successfully filled \"{}\" with \"{}\"\n⚠️ {}",
                selector, text, warning
            )),
            Err(e) => ToolResult::error(format!(
                "❌ Failed to fill form field \"{}\": {}",
                selector, e
            )),
        }
    }

    /// Returns a verification warning when the value read back differs.
    async fn try_fill_form(
        &self,
        selector: &str,
        text: &str,
        clear: bool,
    ) -> Result<Option<String>, BrowserError> {
        let page = self.page().await?;
        let not_found = || BrowserError::ElementNotFound(selector.to_string());

        if !find_element(page.as_ref(), &Locator::Css(selector.to_string()), FIELD_TIMEOUT).await {
            return Err(not_found());
        }

        let (tag, value) = match page.fill_field(selector, text, clear).await? {
            FillOutcome::Filled { tag, value } => (tag, value),
            FillOutcome::NotFound => return Err(not_found()),
            FillOutcome::NotFormField { tag } => {
                return Err(BrowserError::ActionFailed(format!(
                    "Element is not a form field: {}",
                    tag
                )));
            }
            FillOutcome::Disabled => {
                return Err(BrowserError::ActionFailed(
                    "Element is disabled or readonly".to_string(),
                ));
            }
        };

        let verified = !matches!(tag.as_str(), "input" | "textarea") || value == text;
        if verified {
            return Ok(None);
        }

        let warning = format!("Warning: Expected \"{}\" but got \"{}\"", text, value);
        if self.config.strict_verification {
            return Err(BrowserError::ActionFailed(warning));
        }
        warn!("{} for {}", warning, selector);
        Ok(Some(warning))
    }

    /// Scroll vertically and report how far the page actually moved.
    pub async fn scroll(&self, pixels: i64, behavior: ScrollBehavior) -> ToolResult {
        let result = async {
            let page = self.page().await?;
            let before = page.scroll_offset().await?;
            page.scroll_by(pixels, behavior).await?;
            tokio::time::sleep(SCROLL_SETTLE).await;
            let after = page.scroll_offset().await?;
            Ok::<_, BrowserError>((before, after))
        }
        .await;

        match result {
            Ok((before, after)) => ToolResult::success(format!(
                "📜 Scrolled {}px (requested: {}px). Position: {}px",
                (after - before).round() as i64,
                pixels,
                after.round() as i64
            )),
            Err(e) => ToolResult::error(format!("❌ Failed to scroll: {}", e)),
        }
    }

    /// Press a single key or combination.
    pub async fn press_key(&self, key: &str) -> ToolResult {
        let result = async {
            let page = self.page().await?;
            with_retry(&self.config.retry, "press_key", || page.press_key(key)).await?;
            tokio::time::sleep(KEY_SETTLE).await;
            Ok::<_, BrowserError>(())
        }
        .await;

        match result {
            Ok(()) => ToolResult::success(format!("⌨️ Successfully pressed: {}", key)),
            Err(e) => ToolResult::error(format!("❌ Failed to press key {}: {}", key, e)),
        }
    }

    /// Wait for content, then report URL, title and a body preview.
    pub async fn wait_and_check(&self, timeout: Duration) -> ToolResult {
        let result = async {
            let page = self.page().await?;
            wait_for_content(page.as_ref(), timeout).await;
            let url = page.url().await?;
            let title = page.title().await?;
            let body = page.text_content("body").await?.unwrap_or_default();
            Ok::<_, BrowserError>((url, title, body))
        }
        .await;

        match result {
            Ok((url, title, body)) => {
                let (preview, truncated) = truncate_chars(body.trim(), BODY_PREVIEW_CHARS);
                ToolResult::success(format!(
                    "✅ Page ready!\n🌍 URL: {}\n📄 Title: {}\n📝 Content preview: {}{}",
                    url,
                    title,
                    preview,
                    if truncated { "..." } else { "" }
                ))
            }
            Err(e) => ToolResult::error(format!("❌ Page check failed: {}", e)),
        }
    }

    /// Reload the current URL through the robust loader.
    pub async fn refresh(&self) -> ToolResult {
        let result = async {
            let page = self.page().await?;
            let url = page.url().await?;
            load_robustly(page.as_ref(), &url, self.config.load_attempts).await
        }
        .await;

        match result {
            Ok(report) => ToolResult::success(format!(
                "🔄 Page refreshed successfully!\n📄 Title: {}\n✅ Status: {}",
                report.title,
                status_text(report.status)
            )),
            Err(e) => ToolResult::error(format!("❌ Failed to refresh page: {}", e)),
        }
    }

    /// Report whether an element exists; absence is a successful answer.
    pub async fn check_element(&self, selector: &str) -> ToolResult {
        let result = async {
            let page = self.page().await?;
            let locator = Locator::Css(selector.to_string());
            if !find_element(page.as_ref(), &locator, ELEMENT_TIMEOUT).await {
                return Ok(None);
            }
            page.locate(&locator).await
        }
        .await;

        match result {
            Ok(Some(info)) => ToolResult::success(format!(
                "✅ Element found: {}\n👁️ Visible: {}\n🖱️ Enabled: {}",
                selector, info.visible, info.enabled
            )),
            Ok(None) => ToolResult::success(format!("❌ Element not found: {}", selector)),
            Err(e) => ToolResult::error(format!("❌ Failed to check element: {}", e)),
        }
    }

    /// Trimmed `textContent` of the first match, cut to `max_length` characters.
    pub async fn extract_text(&self, selector: &str, max_length: usize) -> ToolResult {
        let result = async {
            let page = self.page().await?;
            page.text_content(selector).await
        }
        .await;

        match result {
            Ok(Some(text)) => {
                let (content, truncated) = truncate_chars(text.trim(), max_length);
                ToolResult::success(format!(
                    "📄 Content extracted from {}:\n{}{}",
                    selector,
                    content,
                    if truncated { "..." } else { "" }
                ))
            }
            Ok(None) => ToolResult::error(format!("❌ Element not found: {}", selector)),
            Err(e) => ToolResult::error(format!("❌ Failed to extract content: {}", e)),
        }
    }
}

/// Prefix `https://` unless the URL already carries an http(s) scheme.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

fn same_url(current: &str, requested: &str) -> bool {
    match (url::Url::parse(current), url::Url::parse(requested)) {
        (Ok(a), Ok(b)) => a == b,
        _ => current == requested,
    }
}

fn status_text(status: Option<u16>) -> String {
    status.map_or_else(|| "unknown".to_string(), |s| s.to_string())
}

fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
