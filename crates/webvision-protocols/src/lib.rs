//! # WebVision Protocols
//!
//! Interface definitions shared by the WebVision crates.
//! Contains only traits and plain data types - no implementations.
//!
//! ## Core Traits
//!
//! - [`Tool`] - An operation the model may invoke
//! - [`LLMProvider`] - A chat-completion backend with tool calling

pub mod error;
pub mod provider;
pub mod tool;
pub mod types;

pub use error::{AgentError, ProviderError, ToolError};
pub use provider::{CompletionRequest, CompletionResponse, LLMProvider, ModelDefinition};
pub use tool::{AbortSignal, Tool, ToolContext, ToolDefinition, ToolResult};
pub use types::*;
