use super::*;

#[test]
fn test_session_request_serializes_session_id() {
    let req = CdpRequest {
        id: 7,
        method: "Runtime.evaluate".to_string(),
        params: Some(serde_json::json!({"expression": "1 + 1"})),
        session_id: Some("SESSION".to_string()),
    };
    let json: serde_json::Value = serde_json::to_value(&req).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["sessionId"], "SESSION");
    assert_eq!(json["params"]["expression"], "1 + 1");
}

#[test]
fn test_browser_request_omits_empty_fields() {
    let req = CdpRequest {
        id: 1,
        method: "Target.getTargets".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(!json.contains("params"));
    assert!(!json.contains("sessionId"));
}

#[test]
fn test_lifecycle_event_deserialize() {
    let json = r#"{
        "method": "Page.lifecycleEvent",
        "params": {"frameId": "F1", "loaderId": "L1", "name": "DOMContentLoaded", "timestamp": 1.5},
        "sessionId": "S1"
    }"#;
    let event: CdpResponse = serde_json::from_str(json).unwrap();
    assert!(event.id.is_none());
    assert_eq!(event.method.as_deref(), Some("Page.lifecycleEvent"));
    assert_eq!(event.session_id.as_deref(), Some("S1"));
    assert_eq!(event.params.unwrap()["name"], "DOMContentLoaded");
}

#[test]
fn test_error_response_deserialize() {
    let json = r#"{"id": 3, "error": {"code": -32000, "message": "Cannot find context"}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    let error = resp.error.unwrap();
    assert_eq!(error.code, -32000);
    assert_eq!(error.message, "Cannot find context");
}

#[test]
fn test_browser_version_pascal_case() {
    let json = r#"{
        "Browser": "Chrome/120.0.6099.109",
        "Protocol-Version": "1.3",
        "User-Agent": "Mozilla/5.0",
        "V8-Version": "12.0",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/abc"
    }"#;
    let version: BrowserVersion = serde_json::from_str(json).unwrap();
    assert!(version.browser.starts_with("Chrome/"));
    assert_eq!(version.web_socket_debugger_url, "ws://localhost:9222/devtools/browser/abc");
}

#[test]
fn test_page_info_deserialize() {
    let json = r#"{
        "id": "T1",
        "type": "page",
        "title": "about:blank",
        "url": "about:blank",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/T1"
    }"#;
    let info: PageInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.id, "T1");
    assert_eq!(info.page_type, "page");
}

#[test]
fn test_input_enums_serialize() {
    assert_eq!(serde_json::to_string(&MouseButton::Left).unwrap(), "\"left\"");
    assert_eq!(
        serde_json::to_string(&MouseEventType::MousePressed).unwrap(),
        "\"mousePressed\""
    );
    assert_eq!(serde_json::to_string(&KeyEventType::RawKeyDown).unwrap(), "\"rawKeyDown\"");
    assert_eq!(serde_json::to_string(&ScreenshotFormat::Png).unwrap(), "\"png\"");
}

#[test]
fn test_load_strategy_lifecycle_events() {
    assert_eq!(LoadStrategy::Commit.lifecycle_event(), None);
    assert_eq!(LoadStrategy::DomContentLoaded.lifecycle_event(), Some("DOMContentLoaded"));
    assert_eq!(LoadStrategy::Load.lifecycle_event(), Some("load"));
    assert_eq!(LoadStrategy::NetworkIdle.lifecycle_event(), Some("networkIdle"));
    assert_eq!(LoadStrategy::NetworkIdle.to_string(), "networkidle");
}
