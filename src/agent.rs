//! Wires the browser tools, the OpenAI provider and the agent loop together.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use webvision_config::{AgentSettings, Settings, SettingsLoader};
use webvision_protocols::{AbortSignal, LLMProvider, Tool};
use webvision_provider_openai::OpenAIProvider;
use webvision_runtime::{AgentConfig, AgentExecutor, RetryConfig, RetryProvider};
use webvision_tools_browser::{
    ActionOrchestrator, BrowserManager, BrowserManagerConfig, OrchestratorConfig, RetryPolicy,
    browser_tools,
};

use crate::session::TaskRunner;

/// Browser automation agent. Chrome starts on the first tool call and is
/// reused until [`TaskRunner::shutdown`].
pub struct BrowserAgent {
    settings: AgentSettings,
    orchestrator: Arc<ActionOrchestrator>,
    tools: Vec<Arc<dyn Tool>>,
    abort_signal: Arc<AbortSignal>,
}

impl BrowserAgent {
    pub fn new(settings: &Settings) -> Self {
        let orchestrator = Arc::new(ActionOrchestrator::new(
            Arc::new(BrowserManager::new(manager_config(settings))),
            orchestrator_config(settings),
        ));
        let tools = browser_tools(orchestrator.clone());
        Self {
            settings: settings.agent.clone(),
            orchestrator,
            tools,
            abort_signal: Arc::new(AbortSignal::new()),
        }
    }

    fn provider(&self, api_key: &str) -> Arc<dyn LLMProvider> {
        let openai = OpenAIProvider::with_url(api_key.to_string(), self.settings.api_url.clone());
        Arc::new(RetryProvider::new(Arc::new(openai), RetryConfig::default()))
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(SettingsLoader::expand_path(path))
}

pub fn manager_config(settings: &Settings) -> BrowserManagerConfig {
    let browser = &settings.browser;
    BrowserManagerConfig {
        debug_port: browser.debug_port,
        viewport_width: browser.viewport_width,
        viewport_height: browser.viewport_height,
        profile_dir: browser.profile_dir.as_deref().map(expand),
        chrome_path: browser.chrome_path.as_deref().map(expand),
        headless: browser.headless,
    }
}

pub fn orchestrator_config(settings: &Settings) -> OrchestratorConfig {
    let orchestrator = &settings.orchestrator;
    OrchestratorConfig {
        retry: RetryPolicy {
            max_attempts: orchestrator.max_retries,
            base_delay: Duration::from_millis(orchestrator.retry_delay_ms),
        },
        load_attempts: orchestrator.load_attempts,
        screenshot_dir: expand(&orchestrator.screenshot_dir),
        strict_verification: orchestrator.strict_verification,
    }
}

#[async_trait]
impl TaskRunner for BrowserAgent {
    async fn run(&self, task: &str, api_key: &str) -> anyhow::Result<String> {
        self.abort_signal.reset();
        let config = AgentConfig::new(self.settings.model.clone())
            .with_max_turns(self.settings.max_turns);
        let provider = self.provider(api_key);
        match provider.models().iter().find(|m| m.id == self.settings.model) {
            Some(model) if !model.supports_tools => {
                warn!("Model {} does not advertise tool calling", model.id)
            }
            Some(_) => {}
            None => warn!("Model {} is not in the known OpenAI catalog", self.settings.model),
        }
        let executor = AgentExecutor::new(
            config,
            provider,
            self.tools.clone(),
            self.abort_signal.clone(),
        );

        info!("Running task with model {}", self.settings.model);
        let response = executor.execute(task).await?;
        if !response.is_complete {
            warn!("Agent output was truncated at the token limit");
        }
        info!(
            "Task finished after {} turns and {} tool calls",
            response.turns,
            response.tool_calls.len()
        );
        Ok(response.text)
    }

    fn abort(&self) {
        self.abort_signal.abort();
    }

    async fn shutdown(&self) {
        if let Err(e) = self.orchestrator.shutdown().await {
            warn!("Failed to release browser: {}", e);
        }
    }
}
