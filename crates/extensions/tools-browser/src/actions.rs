//! Browser actions exposed to the model as tools.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use webvision_protocols::{Tool, ToolContext, ToolDefinition, ToolError, ToolResult};

use crate::driver::ScrollBehavior;
use crate::orchestrator::ActionOrchestrator;

/// Every action the model can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    TakeScreenshot,
    OpenBrowser,
    OpenUrl,
    ClickScreen,
    ClickElement,
    SendKeys,
    FillForm,
    ScrollPage,
    PressKey,
    WaitAndCheck,
    RefreshPage,
    CheckElement,
    GetPageContent,
}

impl ActionKind {
    pub const ALL: [ActionKind; 13] = [
        ActionKind::TakeScreenshot,
        ActionKind::OpenBrowser,
        ActionKind::OpenUrl,
        ActionKind::ClickScreen,
        ActionKind::ClickElement,
        ActionKind::SendKeys,
        ActionKind::FillForm,
        ActionKind::ScrollPage,
        ActionKind::PressKey,
        ActionKind::WaitAndCheck,
        ActionKind::RefreshPage,
        ActionKind::CheckElement,
        ActionKind::GetPageContent,
    ];

    /// Tool name seen by the model.
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::TakeScreenshot => "take_screenshot",
            ActionKind::OpenBrowser => "open_browser",
            ActionKind::OpenUrl => "open_url",
            ActionKind::ClickScreen => "click_screen",
            ActionKind::ClickElement => "click_element",
            ActionKind::SendKeys => "send_keys",
            ActionKind::FillForm => "fill_form",
            ActionKind::ScrollPage => "scroll_page",
            ActionKind::PressKey => "press_key",
            ActionKind::WaitAndCheck => "wait_and_check",
            ActionKind::RefreshPage => "refresh_page",
            ActionKind::CheckElement => "check_element",
            ActionKind::GetPageContent => "get_page_content",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ActionKind::TakeScreenshot => "Take Screenshot",
            ActionKind::OpenBrowser => "Open Browser Tab",
            ActionKind::OpenUrl => "Open URL",
            ActionKind::ClickScreen => "Click Screen",
            ActionKind::ClickElement => "Click Element",
            ActionKind::SendKeys => "Send Keys",
            ActionKind::FillForm => "Fill Form",
            ActionKind::ScrollPage => "Scroll Page",
            ActionKind::PressKey => "Press Key",
            ActionKind::WaitAndCheck => "Wait And Check",
            ActionKind::RefreshPage => "Refresh Page",
            ActionKind::CheckElement => "Check Element",
            ActionKind::GetPageContent => "Get Page Content",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActionKind::TakeScreenshot => "Capture a screenshot and return local file path.",
            ActionKind::OpenBrowser => "Open a new browser tab with optimal settings.",
            ActionKind::OpenUrl => {
                "Navigate to a URL with multiple fallback strategies for maximum reliability."
            }
            ActionKind::ClickScreen => "Click at screen coordinates with retry logic.",
            ActionKind::ClickElement => "Click an element using multiple selection strategies.",
            ActionKind::SendKeys => "Type text with human-like timing.",
            ActionKind::FillForm => {
                "Fill form fields with comprehensive error handling and validation."
            }
            ActionKind::ScrollPage => "Scroll the page with smooth animation and position tracking.",
            ActionKind::PressKey => "Press keyboard keys with retry logic.",
            ActionKind::WaitAndCheck => {
                "Wait for page to be ready and check if content loaded properly."
            }
            ActionKind::RefreshPage => "Refresh the current page with robust loading.",
            ActionKind::CheckElement => "Check if an element exists and is visible on the page.",
            ActionKind::GetPageContent => "Extract text content from the current page.",
        }
    }

    /// JSON schema of the parameters.
    pub fn parameters_schema(&self) -> Value {
        let (properties, required): (Value, &[&str]) = match self {
            ActionKind::TakeScreenshot | ActionKind::OpenBrowser | ActionKind::RefreshPage => {
                (json!({}), &[])
            }
            ActionKind::OpenUrl => (
                json!({
                    "url": {"type": "string", "description": "URL to navigate to"},
                    "forceReload": {"type": "boolean", "description": "Force reload if already on this URL"}
                }),
                &["url"],
            ),
            ActionKind::ClickScreen => (
                json!({
                    "x": {"type": "number", "description": "X coordinate in the viewport"},
                    "y": {"type": "number", "description": "Y coordinate in the viewport"}
                }),
                &["x", "y"],
            ),
            ActionKind::ClickElement => (
                json!({
                    "selector": {"type": "string", "description": "CSS selector or visible text of the element"}
                }),
                &["selector"],
            ),
            ActionKind::SendKeys => (
                json!({
                    "text": {"type": "string"},
                    "delay": {"type": "number", "description": "Delay between keystrokes in ms (default: 50)"}
                }),
                &["text"],
            ),
            ActionKind::FillForm => (
                json!({
                    "selector": {"type": "string"},
                    "text": {"type": "string"},
                    "clear": {"type": "boolean", "description": "Clear field first (default: true)"}
                }),
                &["selector", "text"],
            ),
            ActionKind::ScrollPage => (
                json!({
                    "pixels": {"type": "number"},
                    "behavior": {
                        "type": "string",
                        "enum": ["auto", "smooth"],
                        "description": "Scroll behavior (default: smooth)"
                    }
                }),
                &["pixels"],
            ),
            ActionKind::PressKey => (
                json!({
                    "key": {"type": "string", "description": "Key name such as Enter, Tab or Control+a"}
                }),
                &["key"],
            ),
            ActionKind::WaitAndCheck => (
                json!({
                    "timeout": {"type": "number", "description": "Timeout in ms (default: 10000)"}
                }),
                &[],
            ),
            ActionKind::CheckElement => (
                json!({
                    "selector": {"type": "string"}
                }),
                &["selector"],
            ),
            ActionKind::GetPageContent => (
                json!({
                    "selector": {"type": "string", "description": "CSS selector to extract content from (default: body)"},
                    "maxLength": {"type": "number", "description": "Maximum length of content (default: 1000)"}
                }),
                &[],
            ),
        };

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.title(), self.description())
            .with_parameters_schema(self.parameters_schema())
    }
}

impl FromStr for ActionKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ToolError::NotFound(s.to_string()))
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn default_true() -> bool {
    true
}

fn default_delay() -> f64 {
    50.0
}

fn default_wait_timeout() -> f64 {
    10_000.0
}

fn default_content_selector() -> String {
    "body".to_string()
}

fn default_max_length() -> f64 {
    1000.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenUrlParams {
    url: String,
    #[serde(default)]
    force_reload: bool,
}

#[derive(Debug, Deserialize)]
struct ClickScreenParams {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct SelectorParams {
    selector: String,
}

#[derive(Debug, Deserialize)]
struct SendKeysParams {
    text: String,
    #[serde(default = "default_delay")]
    delay: f64,
}

#[derive(Debug, Deserialize)]
struct FillFormParams {
    selector: String,
    text: String,
    #[serde(default = "default_true")]
    clear: bool,
}

#[derive(Debug, Deserialize)]
struct ScrollParams {
    pixels: f64,
    #[serde(default)]
    behavior: ScrollBehavior,
}

#[derive(Debug, Deserialize)]
struct PressKeyParams {
    key: String,
}

#[derive(Debug, Deserialize)]
struct WaitParams {
    #[serde(default = "default_wait_timeout")]
    timeout: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageContentParams {
    #[serde(default = "default_content_selector")]
    selector: String,
    #[serde(default = "default_max_length")]
    max_length: f64,
}

/// A fully parsed action request.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserAction {
    TakeScreenshot,
    OpenBrowser,
    OpenUrl { url: String, force_reload: bool },
    ClickScreen { x: f64, y: f64 },
    ClickElement { selector: String },
    SendKeys { text: String, delay: Duration },
    FillForm { selector: String, text: String, clear: bool },
    ScrollPage { pixels: i64, behavior: ScrollBehavior },
    PressKey { key: String },
    WaitAndCheck { timeout: Duration },
    RefreshPage,
    CheckElement { selector: String },
    GetPageContent { selector: String, max_length: usize },
}

/// Schema numbers arrive as floats (`50.0`); negatives clamp to zero.
fn whole(value: f64) -> u64 {
    value.max(0.0).round() as u64
}

fn parse<T: DeserializeOwned>(params: Value) -> Result<T, ToolError> {
    // Models send `null` or nothing at all for parameterless calls.
    let params = if params.is_null() { json!({}) } else { params };
    serde_json::from_value(params)
        .map_err(|e| ToolError::ExecutionFailed(format!("Invalid params: {}", e)))
}

impl BrowserAction {
    /// Parse the model's arguments for `kind`.
    pub fn parse(kind: ActionKind, params: Value) -> Result<Self, ToolError> {
        Ok(match kind {
            ActionKind::TakeScreenshot => BrowserAction::TakeScreenshot,
            ActionKind::OpenBrowser => BrowserAction::OpenBrowser,
            ActionKind::RefreshPage => BrowserAction::RefreshPage,
            ActionKind::OpenUrl => {
                let p: OpenUrlParams = parse(params)?;
                BrowserAction::OpenUrl {
                    url: p.url,
                    force_reload: p.force_reload,
                }
            }
            ActionKind::ClickScreen => {
                let p: ClickScreenParams = parse(params)?;
                BrowserAction::ClickScreen { x: p.x, y: p.y }
            }
            ActionKind::ClickElement => {
                let p: SelectorParams = parse(params)?;
                BrowserAction::ClickElement {
                    selector: p.selector,
                }
            }
            ActionKind::SendKeys => {
                let p: SendKeysParams = parse(params)?;
                BrowserAction::SendKeys {
                    text: p.text,
                    delay: Duration::from_millis(whole(p.delay)),
                }
            }
            ActionKind::FillForm => {
                let p: FillFormParams = parse(params)?;
                BrowserAction::FillForm {
                    selector: p.selector,
                    text: p.text,
                    clear: p.clear,
                }
            }
            ActionKind::ScrollPage => {
                let p: ScrollParams = parse(params)?;
                BrowserAction::ScrollPage {
                    pixels: p.pixels.round() as i64,
                    behavior: p.behavior,
                }
            }
            ActionKind::PressKey => {
                let p: PressKeyParams = parse(params)?;
                BrowserAction::PressKey { key: p.key }
            }
            ActionKind::WaitAndCheck => {
                let p: WaitParams = parse(params)?;
                BrowserAction::WaitAndCheck {
                    timeout: Duration::from_millis(whole(p.timeout)),
                }
            }
            ActionKind::CheckElement => {
                let p: SelectorParams = parse(params)?;
                BrowserAction::CheckElement {
                    selector: p.selector,
                }
            }
            ActionKind::GetPageContent => {
                let p: PageContentParams = parse(params)?;
                BrowserAction::GetPageContent {
                    selector: p.selector,
                    max_length: whole(p.max_length) as usize,
                }
            }
        })
    }
}

impl ActionOrchestrator {
    /// Run a parsed action against the current page.
    pub async fn perform(&self, action: BrowserAction) -> ToolResult {
        match action {
            BrowserAction::TakeScreenshot => self.take_screenshot().await,
            BrowserAction::OpenBrowser => self.open_new_tab().await,
            BrowserAction::OpenUrl { url, force_reload } => self.navigate(&url, force_reload).await,
            BrowserAction::ClickScreen { x, y } => self.click_at(x, y).await,
            BrowserAction::ClickElement { selector } => self.click_element(&selector).await,
            BrowserAction::SendKeys { text, delay } => self.type_text(&text, delay).await,
            BrowserAction::FillForm {
                selector,
                text,
                clear,
            } => self.fill_form(&selector, &text, clear).await,
            BrowserAction::ScrollPage { pixels, behavior } => self.scroll(pixels, behavior).await,
            BrowserAction::PressKey { key } => self.press_key(&key).await,
            BrowserAction::WaitAndCheck { timeout } => self.wait_and_check(timeout).await,
            BrowserAction::RefreshPage => self.refresh().await,
            BrowserAction::CheckElement { selector } => self.check_element(&selector).await,
            BrowserAction::GetPageContent {
                selector,
                max_length,
            } => self.extract_text(&selector, max_length).await,
        }
    }
}

/// One browser action as an agent tool.
pub struct BrowserTool {
    kind: ActionKind,
    definition: ToolDefinition,
    orchestrator: Arc<ActionOrchestrator>,
}

impl BrowserTool {
    pub fn new(kind: ActionKind, orchestrator: Arc<ActionOrchestrator>) -> Self {
        Self {
            kind,
            definition: kind.definition(),
            orchestrator,
        }
    }
}

#[async_trait]
impl Tool for BrowserTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: Value, ctx: ToolContext) -> Result<ToolResult, ToolError> {
        if ctx.is_aborted() {
            return Err(ToolError::Cancelled);
        }
        let action = BrowserAction::parse(self.kind, params)?;
        debug!("Executing {} for call {}: {:?}", self.kind, ctx.call_id, action);
        Ok(self.orchestrator.perform(action).await)
    }
}

/// The full tool palette over one orchestrator.
pub fn browser_tools(orchestrator: Arc<ActionOrchestrator>) -> Vec<Arc<dyn Tool>> {
    ActionKind::ALL
        .into_iter()
        .map(|kind| Arc::new(BrowserTool::new(kind, orchestrator.clone())) as Arc<dyn Tool>)
        .collect()
}
