use std::time::Duration;

use serde_json::json;

use super::*;

fn empty_env() -> HashMap<String, String> {
    HashMap::new()
}

#[tokio::test]
async fn request_resolves_on_matching_response() {
    let script = r#"read line; printf '{"jsonrpc":"2.0","id":1,"result":{"ok":true}}\n'"#;
    let child = ChildProcess::spawn("sh", &["-c".to_string(), script.to_string()], &empty_env())
        .unwrap_or_else(|e| panic!("{e}"));

    let result = child
        .request("echo-server", "tools/call", json!({"x": 1}), Duration::from_secs(5))
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(result, json!({"ok": true}));
}

#[tokio::test]
async fn malformed_line_is_dropped_not_fatal() {
    let script = r#"
read line
printf 'not json at all\n'
printf '{"jsonrpc":"2.0","id":1,"result":"fine"}\n'
"#;
    let child = ChildProcess::spawn("sh", &["-c".to_string(), script.to_string()], &empty_env())
        .unwrap_or_else(|e| panic!("{e}"));

    let result = child
        .request("echo-server", "ping", json!({}), Duration::from_secs(5))
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(result, json!("fine"));
}

#[tokio::test]
async fn timeout_surfaces_without_killing_child() {
    let child = ChildProcess::spawn("sh", &["-c".to_string(), "cat > /dev/null".to_string()], &empty_env())
        .unwrap_or_else(|e| panic!("{e}"));

    let err = child
        .request("silent-server", "ping", json!({}), Duration::from_millis(50))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ToolCallTimeout { .. }));
}

#[tokio::test]
async fn error_response_is_surfaced_as_tool_server_crashed() {
    let script = r#"read line; printf '{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"boom"}}\n'"#;
    let child = ChildProcess::spawn("sh", &["-c".to_string(), script.to_string()], &empty_env())
        .unwrap_or_else(|e| panic!("{e}"));

    let err = child
        .request("echo-server", "tools/call", json!({}), Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ToolServerCrashed { .. }));
}
