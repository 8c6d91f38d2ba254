//! Page driver abstraction.
//!
//! The orchestrator talks to the browser only through [`PageDriver`] and
//! [`BrowserBackend`], so its retry and fallback logic can run against a
//! scripted page in tests. The DOM helpers have default implementations
//! built on [`PageDriver::evaluate`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::cdp::{LoadStrategy, PageSession};
use crate::manager::BrowserError;

/// How an element is looked up on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// CSS selector.
    Css(String),
    /// Smallest element whose trimmed text equals the value.
    ExactText(String),
    /// Smallest element whose text contains the value, case-insensitive.
    PartialText(String),
    /// `[aria-label*="value"]`.
    AriaLabel(String),
    /// `[title*="value"]`.
    Title(String),
    /// XPath expression; first node in document order.
    XPath(String),
}

impl Locator {
    /// JavaScript expression evaluating to the element or `null`.
    fn finder_js(&self) -> String {
        match self {
            Locator::Css(sel) => format!(
                "(() => {{ try {{ return document.querySelector({}); }} catch (e) {{ return null; }} }})()",
                js_string(sel)
            ),
            Locator::ExactText(text) => text_finder(
                &format!("(el) => (el.innerText || el.textContent || '').trim() === {}", js_string(text)),
            ),
            Locator::PartialText(text) => text_finder(&format!(
                "(el) => (el.innerText || el.textContent || '').toLowerCase().includes({})",
                js_string(&text.to_lowercase())
            )),
            Locator::AriaLabel(value) => attribute_finder("aria-label", value),
            Locator::Title(value) => attribute_finder("title", value),
            Locator::XPath(expr) => format!(
                "(() => {{ try {{ return document.evaluate({}, document, null, \
                 XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue; }} \
                 catch (e) {{ return null; }} }})()",
                js_string(expr)
            ),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "{}", s),
            Locator::ExactText(s) => write!(f, "text=\"{}\"", s),
            Locator::PartialText(s) => write!(f, "text={}", s),
            Locator::AriaLabel(s) => write!(f, "[aria-label*=\"{}\"]", s),
            Locator::Title(s) => write!(f, "[title*=\"{}\"]", s),
            Locator::XPath(s) => write!(f, "xpath={}", s),
        }
    }
}

fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

fn text_finder(predicate: &str) -> String {
    format!(
        "(() => {{ const match = {}; \
         const all = Array.from(document.querySelectorAll('body *')).filter(match); \
         return all.find((el) => !Array.from(el.children).some(match)) || null; }})()",
        predicate
    )
}

fn attribute_finder(attribute: &str, value: &str) -> String {
    format!(
        "(() => {{ try {{ return document.querySelector('[{}*=' + JSON.stringify({}) + ']'); }} \
         catch (e) {{ return null; }} }})()",
        attribute,
        js_string(value)
    )
}

/// Geometry and state of a located element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ElementInfo {
    /// Center point in viewport coordinates.
    pub x: f64,
    pub y: f64,
    pub visible: bool,
    pub enabled: bool,
    pub tag: String,
}

/// Screenshot variants, tried from most to least complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    FullPage,
    Viewport,
    /// No capture options at all.
    Plain,
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureMode::FullPage => f.write_str("full page"),
            CaptureMode::Viewport => f.write_str("viewport"),
            CaptureMode::Plain => f.write_str("plain"),
        }
    }
}

/// Scroll animation requested by the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Auto,
    #[default]
    Smooth,
}

impl ScrollBehavior {
    fn as_str(&self) -> &'static str {
        match self {
            ScrollBehavior::Auto => "auto",
            ScrollBehavior::Smooth => "smooth",
        }
    }
}

/// Result of writing a value into a form field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FillOutcome {
    NotFound,
    NotFormField { tag: String },
    Disabled,
    Filled { tag: String, value: String },
}

const FILL_SCRIPT: &str = r#"(() => {
  const el = (() => { try { return document.querySelector(__SELECTOR__); } catch (e) { return null; } })();
  if (!el) return { status: 'not_found' };
  const tag = el.tagName.toLowerCase();
  if (!['input', 'textarea', 'select'].includes(tag)) return { status: 'not_form_field', tag };
  if (el.disabled || el.readOnly) return { status: 'disabled' };
  el.focus();
  const proto = tag === 'textarea' ? HTMLTextAreaElement.prototype
    : tag === 'select' ? HTMLSelectElement.prototype : HTMLInputElement.prototype;
  const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
  if (__CLEAR__) {
    setter.call(el, '');
    el.dispatchEvent(new Event('input', { bubbles: true }));
  }
  setter.call(el, __TEXT__);
  for (const name of ['input', 'change', 'blur']) {
    el.dispatchEvent(new Event(name, { bubbles: true }));
  }
  return { status: 'filled', tag, value: String(el.value) };
})()"#;

/// A single browser page.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate and wait for `strategy`; returns the main document status.
    async fn goto(
        &self,
        url: &str,
        strategy: LoadStrategy,
        timeout: Duration,
    ) -> Result<Option<u16>, BrowserError>;

    async fn url(&self) -> Result<String, BrowserError>;

    async fn title(&self) -> Result<String, BrowserError>;

    /// Evaluate a JavaScript expression and return its JSON value.
    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError>;

    async fn click_at(&self, x: f64, y: f64) -> Result<(), BrowserError>;

    async fn type_text(&self, text: &str, delay: Duration) -> Result<(), BrowserError>;

    /// Press a key or combination such as `Control+a`.
    async fn press_key(&self, key: &str) -> Result<(), BrowserError>;

    /// Capture a PNG.
    async fn screenshot(&self, mode: CaptureMode) -> Result<Vec<u8>, BrowserError>;

    /// Current viewport size in CSS pixels.
    async fn viewport_size(&self) -> Result<(u32, u32), BrowserError> {
        let value = self
            .evaluate("({ width: window.innerWidth, height: window.innerHeight })")
            .await?;
        let width = value["width"].as_u64().unwrap_or(0) as u32;
        let height = value["height"].as_u64().unwrap_or(0) as u32;
        Ok((width, height))
    }

    /// Look up an element without touching the page. `None` when nothing matches.
    async fn locate(&self, locator: &Locator) -> Result<Option<ElementInfo>, BrowserError> {
        let script = format!(
            "(() => {{ const el = {}; if (!el || !el.getBoundingClientRect) return null; \
             const r = el.getBoundingClientRect(); const s = window.getComputedStyle(el); \
             const visible = r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; \
             return {{ x: r.left + r.width / 2, y: r.top + r.height / 2, visible, \
             enabled: !el.disabled, tag: el.tagName.toLowerCase() }}; }})()",
            locator.finder_js()
        );
        let value = self.evaluate(&script).await?;
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| BrowserError::ActionFailed(format!("Bad element info: {}", e)))
    }

    /// Center the first match in the viewport. `false` when nothing matches.
    async fn scroll_into_view(&self, locator: &Locator) -> Result<bool, BrowserError> {
        let script = format!(
            "(() => {{ const el = {}; if (!el || !el.scrollIntoView) return false; \
             el.scrollIntoView({{ block: 'center', inline: 'center' }}); return true; }})()",
            locator.finder_js()
        );
        let value = self.evaluate(&script).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// Set a form field's value to `text` and fire `input`, `change` and
    /// `blur`. With `clear` the field is emptied first, so listeners see the
    /// reset before the new value.
    async fn fill_field(
        &self,
        selector: &str,
        text: &str,
        clear: bool,
    ) -> Result<FillOutcome, BrowserError> {
        let script = FILL_SCRIPT
            .replace("__SELECTOR__", &js_string(selector))
            .replace("__CLEAR__", if clear { "true" } else { "false" })
            .replace("__TEXT__", &js_string(text));
        let value = self.evaluate(&script).await?;
        serde_json::from_value(value)
            .map_err(|e| BrowserError::ActionFailed(format!("Bad fill result: {}", e)))
    }

    /// Vertical scroll position (`window.pageYOffset`).
    async fn scroll_offset(&self) -> Result<f64, BrowserError> {
        let value = self.evaluate("window.pageYOffset").await?;
        Ok(value.as_f64().unwrap_or(0.0))
    }

    async fn scroll_by(&self, pixels: i64, behavior: ScrollBehavior) -> Result<(), BrowserError> {
        let script = format!(
            "window.scrollBy({{ top: {}, behavior: '{}' }})",
            pixels,
            behavior.as_str()
        );
        self.evaluate(&script).await?;
        Ok(())
    }

    /// `textContent` of the first match, or `None` when nothing matches.
    async fn text_content(&self, selector: &str) -> Result<Option<String>, BrowserError> {
        let script = format!(
            "(() => {{ try {{ const el = document.querySelector({}); \
             return el ? (el.textContent || '') : null; }} catch (e) {{ return null; }} }})()",
            js_string(selector)
        );
        let value = self.evaluate(&script).await?;
        Ok(value.as_str().map(str::to_string))
    }

    /// `document.readyState`.
    async fn ready_state(&self) -> Result<String, BrowserError> {
        let value = self.evaluate("document.readyState").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Whether the body has child elements or non-blank text.
    async fn body_has_content(&self) -> Result<bool, BrowserError> {
        let value = self
            .evaluate(
                "(() => { const b = document.body; \
                 return !!b && (b.children.length > 0 || (b.textContent || '').trim().length > 0); })()",
            )
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }
}

/// Owner of the browser process and its current page.
#[async_trait]
pub trait BrowserBackend: Send + Sync {
    /// The current page, starting the browser on first use.
    async fn current_page(&self) -> Result<Arc<dyn PageDriver>, BrowserError>;

    /// Replace the current page with a fresh tab.
    async fn open_new_page(&self) -> Result<Arc<dyn PageDriver>, BrowserError>;

    /// Close the connection and stop a browser this backend launched.
    async fn shutdown(&self) -> Result<(), BrowserError>;
}

#[async_trait]
impl PageDriver for PageSession {
    async fn goto(
        &self,
        url: &str,
        strategy: LoadStrategy,
        timeout: Duration,
    ) -> Result<Option<u16>, BrowserError> {
        Ok(PageSession::goto(self, url, strategy, timeout).await?)
    }

    async fn url(&self) -> Result<String, BrowserError> {
        Ok(self.get_url().await?)
    }

    async fn title(&self) -> Result<String, BrowserError> {
        Ok(self.get_title().await?)
    }

    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
        Ok(PageSession::evaluate(self, script).await?)
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<(), BrowserError> {
        Ok(self.click(x, y).await?)
    }

    async fn type_text(&self, text: &str, delay: Duration) -> Result<(), BrowserError> {
        Ok(PageSession::type_text(self, text, delay).await?)
    }

    async fn press_key(&self, key: &str) -> Result<(), BrowserError> {
        Ok(PageSession::press_key(self, key).await?)
    }

    async fn screenshot(&self, mode: CaptureMode) -> Result<Vec<u8>, BrowserError> {
        let (full_page, with_options) = match mode {
            CaptureMode::FullPage => (true, true),
            CaptureMode::Viewport => (false, true),
            CaptureMode::Plain => (false, false),
        };
        PageSession::screenshot(self, full_page, with_options)
            .await
            .map_err(|e| BrowserError::ScreenshotFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Records evaluated scripts and answers each with a fixed value.
    struct ScriptPage {
        scripts: Mutex<Vec<String>>,
        answer: Value,
    }

    impl ScriptPage {
        fn new(answer: Value) -> Self {
            Self {
                scripts: Mutex::new(Vec::new()),
                answer,
            }
        }

        fn last_script(&self) -> String {
            self.scripts.lock().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl PageDriver for ScriptPage {
        async fn goto(&self, _: &str, _: LoadStrategy, _: Duration) -> Result<Option<u16>, BrowserError> {
            Ok(Some(200))
        }

        async fn url(&self) -> Result<String, BrowserError> {
            Ok("about:blank".to_string())
        }

        async fn title(&self) -> Result<String, BrowserError> {
            Ok(String::new())
        }

        async fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
            self.scripts.lock().push(script.to_string());
            Ok(self.answer.clone())
        }

        async fn click_at(&self, _: f64, _: f64) -> Result<(), BrowserError> {
            Ok(())
        }

        async fn type_text(&self, _: &str, _: Duration) -> Result<(), BrowserError> {
            Ok(())
        }

        async fn press_key(&self, _: &str) -> Result<(), BrowserError> {
            Ok(())
        }

        async fn screenshot(&self, _: CaptureMode) -> Result<Vec<u8>, BrowserError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_fill_field_sets_exact_text_with_or_without_clear() {
        let page = ScriptPage::new(serde_json::json!({"status": "filled", "tag": "input", "value": "abc"}));

        page.fill_field("#q", "abc", false).await.unwrap();
        let keep = page.last_script();
        assert!(keep.contains(r#"setter.call(el, "abc");"#));
        assert!(keep.contains("if (false)"));
        assert!(!keep.contains("el.value ||"));

        page.fill_field("#q", "abc", true).await.unwrap();
        let cleared = page.last_script();
        assert!(cleared.contains("if (true)"));
        assert!(cleared.contains("setter.call(el, '');"));
        assert!(cleared.contains(r#"setter.call(el, "abc");"#));
    }

    #[tokio::test]
    async fn test_locate_does_not_scroll() {
        let page = ScriptPage::new(Value::Null);
        assert_eq!(page.locate(&Locator::Css("#q".into())).await.unwrap(), None);
        assert!(!page.last_script().contains("scrollIntoView"));

        page.scroll_into_view(&Locator::Css("#q".into())).await.unwrap();
        assert!(page.last_script().contains("scrollIntoView"));
    }

    #[test]
    fn test_locator_display() {
        assert_eq!(Locator::ExactText("Go".into()).to_string(), "text=\"Go\"");
        assert_eq!(Locator::AriaLabel("Search".into()).to_string(), "[aria-label*=\"Search\"]");
    }

    #[test]
    fn test_finder_quotes_user_input() {
        let js = Locator::Css("a[href=\"x\"]".into()).finder_js();
        assert!(js.contains(r#"document.querySelector("a[href=\"x\"]")"#));
    }

    #[test]
    fn test_partial_text_is_case_insensitive() {
        let js = Locator::PartialText("Sign In".into()).finder_js();
        assert!(js.contains("\"sign in\""));
        assert!(js.contains("toLowerCase()"));
    }

    #[test]
    fn test_fill_outcome_deserialize() {
        let filled: FillOutcome =
            serde_json::from_value(serde_json::json!({"status": "filled", "tag": "input", "value": "a"}))
                .unwrap();
        assert_eq!(
            filled,
            FillOutcome::Filled { tag: "input".into(), value: "a".into() }
        );

        let missing: FillOutcome =
            serde_json::from_value(serde_json::json!({"status": "not_found"})).unwrap();
        assert_eq!(missing, FillOutcome::NotFound);
    }

    #[test]
    fn test_scroll_behavior_default_is_smooth() {
        assert_eq!(ScrollBehavior::default(), ScrollBehavior::Smooth);
        let auto: ScrollBehavior = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(auto, ScrollBehavior::Auto);
    }
}
