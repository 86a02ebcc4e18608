use super::*;
use serde_json::json;

#[test]
fn pending_call_has_neither_result_nor_error() {
    let call = McpCall::pending("c1", 1000, "server-echo", "Echo", "tools/call", "echo", json!({"x":1}));
    assert_eq!(call.status, McpCallStatus::Pending);
    assert!(call.is_consistent());
}

#[test]
fn success_requires_result_and_forbids_error() {
    let mut call = McpCall::pending("c1", 1000, "server-echo", "Echo", "tools/call", "echo", json!({}));
    call.status = McpCallStatus::Success;
    call.response_result = Some(json!({"ok": true}));
    assert!(call.is_consistent());

    call.response_error = Some(json!({"message": "oops"}));
    assert!(!call.is_consistent());
}

#[test]
fn error_and_timeout_require_response_error() {
    let mut call = McpCall::pending("c1", 1000, "server-echo", "Echo", "tools/call", "echo", json!({}));
    call.status = McpCallStatus::Error;
    assert!(!call.is_consistent());
    call.response_error = Some(json!({"message": "boom"}));
    assert!(call.is_consistent());

    call.status = McpCallStatus::Timeout;
    assert!(call.is_consistent());
}
