use super::*;

#[test]
fn test_tool_result_success() {
    let result = ToolResult::success("OK");
    assert!(result.success);
    assert_eq!(result.content, "OK");
    assert!(result.error.is_none());
    assert!(result.structured_output.is_none());
}

#[test]
fn test_tool_result_error() {
    let result = ToolResult::error("Element not clickable");
    assert!(!result.success);
    assert!(result.content.is_empty());
    assert_eq!(result.error, Some("Element not clickable".to_string()));
}

#[test]
fn test_model_text_for_success() {
    assert_eq!(ToolResult::success("Clicked").to_model_text(), "Clicked");
}

#[test]
fn test_model_text_for_error() {
    let text = ToolResult::error("timeout").to_model_text();
    assert_eq!(text, "Error: timeout");
}

#[test]
fn test_model_text_includes_structured_output() {
    let output = serde_json::json!({"type": "image_url", "image_url": {"url": "file:///tmp/a.png"}});
    let text = ToolResult::success_json("Screenshot saved", output).to_model_text();
    assert!(text.starts_with("Screenshot saved\n"));
    assert!(text.contains("file:///tmp/a.png"));
}

#[test]
fn test_tool_result_serialization_skips_empty_fields() {
    let json = serde_json::to_string(&ToolResult::success("OK")).unwrap();
    assert!(json.contains("\"success\":true"));
    assert!(!json.contains("structured_output"));
    assert!(!json.contains("error"));
}
