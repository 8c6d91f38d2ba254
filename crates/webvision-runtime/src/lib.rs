//! # WebVision Runtime
//!
//! The agent loop that turns a task into tool calls, plus a provider
//! wrapper that retries transient failures.

mod executor;
mod instructions;
mod retry;

pub use executor::{AgentConfig, AgentExecutor, AgentResponse, DEFAULT_MAX_TURNS};
pub use instructions::SYSTEM_INSTRUCTIONS;
pub use retry::{RetryConfig, RetryProvider, is_retryable};
