//! Response parsing for the chat completions API.

use tracing::warn;
use webvision_protocols::CompletionResponse;
use webvision_protocols::types::{Message, StopReason, ToolCall, Usage};

use crate::api::ApiResponse;

/// Convert an API response into the protocol format.
pub fn parse_response(response: ApiResponse) -> CompletionResponse {
    let choice = response.choices.first();

    let content = choice
        .and_then(|c| c.message.content.clone())
        .unwrap_or_default();

    let tool_calls: Vec<ToolCall> = choice
        .map(|c| {
            c.message
                .tool_calls
                .iter()
                .map(|tc| ToolCall {
                    id: tc.id.clone(),
                    name: tc.function.name.clone(),
                    arguments: parse_arguments(&tc.function.name, &tc.function.arguments),
                })
                .collect()
        })
        .unwrap_or_default();

    let stop_reason = choice
        .and_then(|c| c.finish_reason.as_deref())
        .map(parse_stop_reason)
        .unwrap_or(StopReason::EndTurn);

    let usage = response
        .usage
        .map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    let mut message = Message::assistant(content);
    message.tool_calls = tool_calls;

    CompletionResponse {
        id: response.id,
        model: response.model,
        message,
        stop_reason,
        usage,
    }
}

/// Empty or malformed arguments become an empty object so parameterless
/// tools still parse.
fn parse_arguments(tool: &str, raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Malformed arguments for {}: {}", tool, e);
        serde_json::json!({})
    })
}

fn parse_stop_reason(reason: &str) -> StopReason {
    match reason {
        "stop" => StopReason::EndTurn,
        "length" => StopReason::MaxTokens,
        "tool_calls" | "function_call" => StopReason::ToolUse,
        _ => StopReason::EndTurn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: serde_json::Value) -> ApiResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_parse_stop_reason() {
        assert_eq!(parse_stop_reason("stop"), StopReason::EndTurn);
        assert_eq!(parse_stop_reason("length"), StopReason::MaxTokens);
        assert_eq!(parse_stop_reason("tool_calls"), StopReason::ToolUse);
        assert_eq!(parse_stop_reason("content_filter"), StopReason::EndTurn);
    }

    #[test]
    fn test_parse_text_response() {
        let parsed = parse_response(response(serde_json::json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Done."}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
        })));
        assert_eq!(parsed.message.content, "Done.");
        assert_eq!(parsed.stop_reason, StopReason::EndTurn);
        assert_eq!(parsed.usage.total_tokens, 5);
    }

    #[test]
    fn test_parse_tool_calls() {
        let parsed = parse_response(response(serde_json::json!({
            "id": "chatcmpl-2",
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [
                        {"id": "a", "type": "function", "function": {"name": "open_url", "arguments": "{\"url\": \"google.com\"}"}},
                        {"id": "b", "type": "function", "function": {"name": "take_screenshot", "arguments": ""}}
                    ]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": null
        })));
        assert_eq!(parsed.stop_reason, StopReason::ToolUse);
        assert_eq!(parsed.message.content, "");
        assert_eq!(parsed.message.tool_calls.len(), 2);
        assert_eq!(parsed.message.tool_calls[0].arguments["url"], "google.com");
        assert_eq!(parsed.message.tool_calls[1].arguments, serde_json::json!({}));
    }

    #[test]
    fn test_parse_without_choices() {
        let parsed = parse_response(response(serde_json::json!({
            "id": "chatcmpl-3", "model": "gpt-4o", "choices": [], "usage": null
        })));
        assert_eq!(parsed.stop_reason, StopReason::EndTurn);
        assert!(parsed.message.tool_calls.is_empty());
    }
}
