//! The interactive read-eval loop.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;
use tracing::{error, info, warn};
use webvision_config::ConfigStore;

use crate::commands::{Dispatcher, Flow, THEME_PROMPT};
use crate::prompt::Prompter;
use crate::render::Renderer;
use crate::theme::ThemeRegistry;

pub const PROMPT: &str = "webvision>";

/// Ctrl-C delivery into a running [`Session`].
///
/// Only wakes a prompt or agent run that is waiting right now; a signal
/// that arrives between the two is not kept for the next task.
#[derive(Clone)]
pub struct InterruptHandle(Arc<Notify>);

impl InterruptHandle {
    pub fn interrupt(&self) {
        self.0.notify_waiters();
    }
}

/// Executes free-text tasks.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// Run one task to completion and return the final answer.
    async fn run(&self, task: &str, api_key: &str) -> anyhow::Result<String>;

    /// Ask an in-flight run to stop at its next checkpoint.
    fn abort(&self);

    /// Release resources held across runs.
    async fn shutdown(&self);
}

pub struct Session {
    store: Arc<ConfigStore>,
    themes: Arc<ThemeRegistry>,
    renderer: Arc<Renderer>,
    prompter: Arc<dyn Prompter>,
    dispatcher: Dispatcher,
    runner: Arc<dyn TaskRunner>,
    interrupt: Arc<Notify>,
    /// Used when the store holds no key.
    fallback_api_key: Option<String>,
}

impl Session {
    pub fn new(
        store: Arc<ConfigStore>,
        themes: Arc<ThemeRegistry>,
        renderer: Arc<Renderer>,
        prompter: Arc<dyn Prompter>,
        runner: Arc<dyn TaskRunner>,
    ) -> Self {
        let dispatcher = Dispatcher::new(
            store.clone(),
            themes.clone(),
            renderer.clone(),
            prompter.clone(),
        );
        Self {
            store,
            themes,
            renderer,
            prompter,
            dispatcher,
            runner,
            interrupt: Arc::new(Notify::new()),
            fallback_api_key: None,
        }
    }

    pub fn with_fallback_api_key(mut self, key: Option<String>) -> Self {
        self.fallback_api_key = key;
        self
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        InterruptHandle(self.interrupt.clone())
    }

    /// Run until `/exit`, Ctrl-C or end of input. The browser is released on
    /// every exit path.
    pub async fn run(&self) -> anyhow::Result<()> {
        let result = self.run_loop().await;
        self.runner.shutdown().await;
        result
    }

    async fn run_loop(&self) -> anyhow::Result<()> {
        self.renderer.clear_screen();
        self.renderer.welcome();

        if self.store.is_first_run() && self.first_time_setup()? == Flow::Exit {
            self.renderer.goodbye();
            return Ok(());
        }

        loop {
            let label = self.renderer.prompt_label(PROMPT);
            let line = tokio::select! {
                line = self.read_line(label) => line?,
                _ = self.interrupt.notified() => {
                    warn!("Interrupted at prompt");
                    break;
                }
            };
            let Some(line) = line else {
                break;
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            let flow = if input.starts_with('/') {
                self.dispatcher.execute(input)?
            } else {
                self.run_task(input).await
            };
            if flow == Flow::Exit {
                break;
            }
        }

        self.renderer.goodbye();
        Ok(())
    }

    /// Prompts block on the terminal, so they run off the async workers where
    /// an interrupt can still be observed.
    async fn read_line(&self, label: String) -> anyhow::Result<Option<String>> {
        let prompter = self.prompter.clone();
        tokio::task::spawn_blocking(move || prompter.line(&label)).await?
    }

    fn first_time_setup(&self) -> anyhow::Result<Flow> {
        self.renderer.first_time_setup();

        let Some(api_key) = self.prompter.api_key("Enter your OpenAI API key:")? else {
            return Ok(Flow::Exit);
        };
        let Some(theme) = self.prompter.theme(THEME_PROMPT)? else {
            return Ok(Flow::Exit);
        };

        self.store.set_api_key(api_key);
        self.store.set_theme(theme.key());
        self.store.set_first_run(false);
        self.themes.set_theme(theme.key());
        info!("First-run setup complete (theme {})", theme.key());

        self.renderer.setup_complete();
        self.prompter.pause()?;
        Ok(Flow::Continue)
    }

    fn api_key(&self) -> Option<String> {
        self.store
            .api_key()
            .filter(|k| !k.is_empty())
            .or_else(|| self.fallback_api_key.clone())
    }

    async fn run_task(&self, task: &str) -> Flow {
        let Some(api_key) = self.api_key() else {
            self.renderer
                .error("OpenAI API key is not set. Use /apikey to configure it.");
            return Flow::Continue;
        };

        self.renderer.agent_start(task);
        tokio::select! {
            result = self.runner.run(task, &api_key) => {
                match result {
                    Ok(answer) => self.renderer.agent_end(&answer),
                    Err(e) => {
                        error!("Agent run failed: {:#}", e);
                        self.renderer.error(&e.to_string());
                    }
                }
                Flow::Continue
            }
            _ = self.interrupt.notified() => {
                warn!("Interrupted during agent run");
                self.runner.abort();
                self.renderer.error("Interrupted");
                Flow::Exit
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
