//! Agent errors.

use thiserror::Error;

use super::ProviderError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Max turns exceeded: {0}")]
    MaxTurnsExceeded(u32),

    #[error("Agent was aborted")]
    Aborted,

    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),
}
