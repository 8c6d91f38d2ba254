//! Message and tool conversion for OpenAI API.

use webvision_protocols::ToolDefinition;
use webvision_protocols::provider::CompletionRequest;
use webvision_protocols::types::{Message, MessageRole};

use crate::api::{ApiMessage, ApiTool, FunctionCall, FunctionDef, ToolCall};

/// Convert the request conversation, system prompt first.
pub fn convert_messages(request: &CompletionRequest) -> Vec<ApiMessage> {
    let system = request.system.as_ref().map(|system| ApiMessage {
        role: "system".to_string(),
        content: Some(system.clone()),
        tool_calls: None,
        tool_call_id: None,
    });
    system
        .into_iter()
        .chain(request.messages.iter().map(convert_message))
        .collect()
}

fn convert_message(msg: &Message) -> ApiMessage {
    let role = match msg.role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::Tool => "tool",
    };

    if !msg.tool_calls.is_empty() {
        let tool_calls = msg
            .tool_calls
            .iter()
            .map(|tc| ToolCall {
                id: tc.id.clone(),
                call_type: "function".to_string(),
                function: FunctionCall {
                    name: tc.name.clone(),
                    arguments: tc.arguments.to_string(),
                },
            })
            .collect();

        return ApiMessage {
            role: role.to_string(),
            content: (!msg.content.is_empty()).then(|| msg.content.clone()),
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        };
    }

    ApiMessage {
        role: role.to_string(),
        content: Some(msg.content.clone()),
        tool_calls: None,
        tool_call_id: msg.tool_call_id.clone(),
    }
}

/// Convert tool definitions for OpenAI API.
pub fn convert_tools(request: &CompletionRequest) -> Vec<ApiTool> {
    request.tools.iter().map(convert_tool).collect()
}

fn convert_tool(tool: &ToolDefinition) -> ApiTool {
    let params = tool.parameters_schema.clone().unwrap_or_else(|| {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    });

    ApiTool {
        tool_type: "function".to_string(),
        function: FunctionDef {
            name: tool.id.clone(),
            description: tool.description.clone(),
            parameters: params,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webvision_protocols::types::ToolCall as ProtoToolCall;

    #[test]
    fn test_convert_text_message() {
        let api_msg = convert_message(&Message::user("Hello"));
        assert_eq!(api_msg.role, "user");
        assert_eq!(api_msg.content.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_system_prompt_comes_first() {
        let request = CompletionRequest::new("gpt-4o", vec![Message::user("Hello"), Message::assistant("Hi")])
            .with_system("You are a browser agent");
        let result = convert_messages(&request);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].role, "system");
        assert_eq!(result[0].content.as_deref(), Some("You are a browser agent"));
        assert_eq!(result[1].role, "user");
        assert_eq!(result[2].role, "assistant");
    }

    #[test]
    fn test_convert_tool_message() {
        let api_msg = convert_message(&Message::tool("call_123", "🖱️ Clicked"));
        assert_eq!(api_msg.role, "tool");
        assert_eq!(api_msg.tool_call_id, Some("call_123".to_string()));
    }

    #[test]
    fn test_convert_message_with_tool_calls() {
        let mut msg = Message::assistant("");
        msg.tool_calls = vec![ProtoToolCall {
            id: "call_123".to_string(),
            name: "open_url".to_string(),
            arguments: serde_json::json!({"url": "example.com"}),
        }];
        let api_msg = convert_message(&msg);
        assert!(api_msg.content.is_none());
        let tool_calls = api_msg.tool_calls.unwrap();
        assert_eq!(tool_calls.len(), 1);
        assert_eq!(tool_calls[0].id, "call_123");
        assert_eq!(tool_calls[0].function.name, "open_url");
        assert_eq!(tool_calls[0].function.arguments, r#"{"url":"example.com"}"#);
    }

    #[test]
    fn test_convert_tools() {
        let request = CompletionRequest::new("gpt-4o", vec![])
            .with_tools(vec![ToolDefinition::new("refresh_page", "Refresh Page", "Reload")]);
        let tools = convert_tools(&request);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].function.name, "refresh_page");
        assert_eq!(tools[0].function.parameters["type"], "object");
    }

    #[test]
    fn test_convert_tool_with_schema() {
        let tool = ToolDefinition::new("press_key", "Press Key", "desc").with_parameters_schema(
            serde_json::json!({
                "type": "object",
                "properties": {
                    "key": { "type": "string" }
                }
            }),
        );
        let api_tool = convert_tool(&tool);
        assert!(api_tool.function.parameters["properties"]["key"].is_object());
    }
}
