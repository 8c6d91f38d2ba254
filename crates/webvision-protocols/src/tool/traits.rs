//! Tool trait definition.

use async_trait::async_trait;

use super::{ToolContext, ToolDefinition, ToolResult};
use crate::error::ToolError;

/// Core trait for tools.
///
/// Tools are executable units that the agent loop can invoke on behalf of the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool definition.
    fn definition(&self) -> &ToolDefinition;

    /// Execute the tool with the given parameters.
    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError>;

    /// Validate the parameters before execution.
    fn validate(&self, params: &serde_json::Value) -> Result<(), ToolError> {
        let definition = self.definition();
        if let Some(schema) = &definition.parameters_schema {
            if schema.get("type") == Some(&serde_json::json!("object")) && !params.is_object() {
                return Err(ToolError::ValidationFailed(
                    "Parameters must be an object".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    struct EchoTool {
        definition: ToolDefinition,
    }

    impl EchoTool {
        fn with_schema(schema: serde_json::Value) -> Self {
            Self {
                definition: ToolDefinition::new("echo", "Echo", "Echoes its input")
                    .with_parameters_schema(schema),
            }
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(
            &self,
            params: serde_json::Value,
            _ctx: ToolContext,
        ) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::success(params.to_string()))
        }
    }

    #[test]
    fn test_validate_object_schema_accepts_object() {
        let tool = EchoTool::with_schema(serde_json::json!({"type": "object"}));
        assert!(tool.validate(&serde_json::json!({"key": "value"})).is_ok());
        assert!(tool.validate(&serde_json::json!({})).is_ok());
    }

    #[test]
    fn test_validate_object_schema_rejects_non_object() {
        let tool = EchoTool::with_schema(serde_json::json!({"type": "object"}));
        for params in [
            serde_json::json!("text"),
            serde_json::json!([1, 2]),
            serde_json::json!(42),
            serde_json::Value::Null,
        ] {
            match tool.validate(&params) {
                Err(ToolError::ValidationFailed(msg)) => assert!(msg.contains("must be an object")),
                other => panic!("Expected ValidationFailed, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_tool_execute() {
        let tool = EchoTool::with_schema(serde_json::json!({"type": "object"}));
        let ctx = ToolContext::new("call_1", std::sync::Arc::new(crate::tool::AbortSignal::new()));
        let result = tool.execute(serde_json::json!({"a": 1}), ctx).await.unwrap();
        assert!(result.success);
        assert_eq!(result.content, r#"{"a":1}"#);
    }
}
