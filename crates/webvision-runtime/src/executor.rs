//! Agent executor for the tool-calling loop.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use webvision_protocols::error::AgentError;
use webvision_protocols::provider::{CompletionRequest, LLMProvider};
use webvision_protocols::tool::{AbortSignal, Tool, ToolContext};
use webvision_protocols::types::{Message, StopReason, ToolCall};

use crate::instructions::SYSTEM_INSTRUCTIONS;

pub const DEFAULT_MAX_TURNS: u32 = 50;

/// Configuration for one agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub model: String,
    pub max_turns: u32,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
}

impl AgentConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_turns: DEFAULT_MAX_TURNS,
            system_prompt: Some(SYSTEM_INSTRUCTIONS.to_string()),
            max_tokens: None,
        }
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }
}

/// Result of an agent run.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// Final assistant text.
    pub text: String,
    /// False when generation stopped at the token limit.
    pub is_complete: bool,
    pub turns: u32,
    pub tool_calls: Vec<ToolCall>,
}

/// Executor for the agentic loop.
pub struct AgentExecutor {
    config: AgentConfig,
    provider: Arc<dyn LLMProvider>,
    tools: Vec<Arc<dyn Tool>>,
    abort_signal: Arc<AbortSignal>,
}

impl AgentExecutor {
    pub fn new(
        config: AgentConfig,
        provider: Arc<dyn LLMProvider>,
        tools: Vec<Arc<dyn Tool>>,
        abort_signal: Arc<AbortSignal>,
    ) -> Self {
        Self {
            config,
            provider,
            tools,
            abort_signal,
        }
    }

    pub fn abort_signal(&self) -> &Arc<AbortSignal> {
        &self.abort_signal
    }

    /// Run the loop for one task until the model stops asking for tools.
    pub async fn execute(&self, task: &str) -> Result<AgentResponse, AgentError> {
        let start_time = Instant::now();
        let mut messages = vec![Message::user(task)];
        let mut turns = 0;
        let mut all_tool_calls = Vec::new();

        info!("AgentExecutor starting with {} tools available", self.tools.len());

        loop {
            if self.abort_signal.is_aborted() {
                info!("Agent aborted after {} turns", turns);
                return Err(AgentError::Aborted);
            }

            if turns >= self.config.max_turns {
                warn!("Agent hit the turn limit ({})", self.config.max_turns);
                return Err(AgentError::MaxTurnsExceeded(self.config.max_turns));
            }

            turns += 1;
            debug!("Agent turn {}/{}", turns, self.config.max_turns);

            let request = self.build_request(&messages);
            let response = self.provider.complete(request).await?;
            messages.push(response.message.clone());

            match response.stop_reason {
                StopReason::EndTurn | StopReason::StopSequence => {
                    info!(
                        "Agent completed in {} turns ({:?})",
                        turns,
                        start_time.elapsed()
                    );
                    return Ok(AgentResponse {
                        text: response.message.content,
                        is_complete: true,
                        turns,
                        tool_calls: all_tool_calls,
                    });
                }
                StopReason::MaxTokens => {
                    warn!("Max tokens reached, returning partial output");
                    return Ok(AgentResponse {
                        text: response.message.content,
                        is_complete: false,
                        turns,
                        tool_calls: all_tool_calls,
                    });
                }
                StopReason::ToolUse => {
                    let calls = response.message.tool_calls;
                    if calls.is_empty() {
                        warn!("Model stopped for tool use without any tool calls");
                    }
                    for call in &calls {
                        let output = self.execute_tool(call).await;
                        messages.push(Message::tool(&call.id, output));
                    }
                    all_tool_calls.extend(calls);
                }
            }
        }
    }

    fn build_request(&self, messages: &[Message]) -> CompletionRequest {
        let tool_definitions = self
            .tools
            .iter()
            .map(|t| t.definition().clone())
            .collect();

        let mut request = CompletionRequest::new(self.config.model.clone(), messages.to_vec())
            .with_tools(tool_definitions);

        if let Some(ref system) = self.config.system_prompt {
            request = request.with_system(system.clone());
        }
        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        request
    }

    /// Run one tool call and render its outcome as text for the model.
    async fn execute_tool(&self, call: &ToolCall) -> String {
        debug!("Executing tool: {} ({})", call.name, call.id);

        let Some(tool) = self.tools.iter().find(|t| t.definition().id == call.name) else {
            warn!("Model requested unknown tool: {}", call.name);
            return format!("Error: Tool not found: {}", call.name);
        };

        if let Err(e) = tool.validate(&call.arguments) {
            warn!("Tool {} rejected parameters: {}", call.name, e);
            return format!("Error: {}", e);
        }

        let ctx = ToolContext::new(call.id.as_str(), self.abort_signal.clone());

        let start = Instant::now();
        match tool.execute(call.arguments.clone(), ctx).await {
            Ok(result) => {
                info!(
                    "Tool {} finished in {:?} (success: {})",
                    call.name,
                    start.elapsed(),
                    result.success
                );
                result.to_model_text()
            }
            Err(e) => {
                warn!("Tool {} failed: {}", call.name, e);
                format!("Error: {}", e)
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
