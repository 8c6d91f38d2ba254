//! Catalog entries describing what a provider's models can do.

use serde::{Deserialize, Serialize};

/// One model a provider can serve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Identifier sent in the `model` field of a request.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Context window in tokens.
    pub context_length: u32,
    #[serde(default)]
    pub supports_vision: bool,
    /// Browser tasks are useless without function calling.
    #[serde(default)]
    pub supports_tools: bool,
}

impl ModelDefinition {
    /// A tool-capable, text-only model with a 128k window.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            context_length: 128_000,
            supports_vision: false,
            supports_tools: true,
        }
    }

    pub fn with_context_length(self, context_length: u32) -> Self {
        Self { context_length, ..self }
    }

    pub fn with_vision(self) -> Self {
        Self { supports_vision: true, ..self }
    }
}
