//! Tool execution context.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-call context handed to a tool.
#[derive(Clone)]
pub struct ToolContext {
    /// Id of the model's tool call, for log correlation.
    pub call_id: String,
    /// Shared with the agent run that issued the call.
    pub abort_signal: Arc<AbortSignal>,
}

impl ToolContext {
    pub fn new(call_id: impl Into<String>, abort_signal: Arc<AbortSignal>) -> Self {
        Self {
            call_id: call_id.into(),
            abort_signal,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.abort_signal.is_aborted()
    }
}

/// Signal for aborting operations.
pub struct AbortSignal {
    aborted: AtomicBool,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self {
            aborted: AtomicBool::new(false),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }

    /// Clear a previous abort so the signal can be reused.
    pub fn reset(&self) {
        self.aborted.store(false, Ordering::Relaxed);
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}
