use serde_json::json;
use tempfile::tempdir;

use super::*;
use octave_storage::Db;
use std::sync::Arc;

fn echo_server_script() -> String {
    r#"
while read -r line; do
  if echo "$line" | grep -q '"method":"initialize"'; then
    printf '{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2024-11-05"}}\n'
  elif echo "$line" | grep -q '"method":"tools/list"'; then
    printf '{"jsonrpc":"2.0","id":2,"result":{"tools":[{"name":"echo","description":"d","inputSchema":{}}]}}\n'
  elif echo "$line" | grep -q '"method":"tools/call"'; then
    printf '{"jsonrpc":"2.0","id":3,"result":{"content":[{"type":"text","text":"ok"}]}}\n'
  fi
done
"#
    .to_string()
}

async fn registry_with_running_echo_server() -> (tempfile::TempDir, ServerRegistry) {
    let dir = tempdir().unwrap_or_else(|e| panic!("{e}"));
    let db = Arc::new(Db::open(dir.path()).unwrap_or_else(|e| panic!("{e}")));
    let registry = ServerRegistry::new(db);

    let mut config = crate::server::ServerConfig::new(
        "echo",
        "sh",
        vec!["-c".to_string(), echo_server_script()],
    );
    config.call_timeout = std::time::Duration::from_secs(5);
    registry.install("echo-server".to_string(), config).await;
    registry.start("echo-server").await.unwrap_or_else(|e| panic!("{e}"));

    (dir, registry)
}

fn request(method: &str, id: Option<Value>, params: Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: Some("2.0".to_string()),
        id,
        method: method.to_string(),
        params,
    }
}

#[tokio::test]
async fn notifications_initialized_gets_no_response() {
    let (_dir, registry) = registry_with_running_echo_server().await;
    let resp = handle_request(&registry, request("notifications/initialized", None, Value::Null)).await;
    assert!(resp.is_none());
}

#[tokio::test]
async fn initialize_returns_protocol_version() {
    let (_dir, registry) = registry_with_running_echo_server().await;
    let resp = handle_request(&registry, request("initialize", Some(json!(1)), json!({})))
        .await
        .unwrap_or_else(|| panic!("expected a response"));
    assert_eq!(resp.result.unwrap_or_else(|| panic!("expected result"))["protocolVersion"], json!("2024-11-05"));
}

#[tokio::test]
async fn tools_list_tags_results_with_server_id() {
    let (_dir, registry) = registry_with_running_echo_server().await;
    let resp = handle_request(&registry, request("tools/list", Some(json!(1)), Value::Null))
        .await
        .unwrap_or_else(|| panic!("expected a response"));
    let result = resp.result.unwrap_or_else(|| panic!("expected result"));
    assert_eq!(result["tools"][0]["_serverId"], json!("echo-server"));
}

#[tokio::test]
async fn tools_call_dispatches_and_returns_result() {
    let (_dir, registry) = registry_with_running_echo_server().await;
    let resp = handle_request(
        &registry,
        request("tools/call", Some(json!(1)), json!({"name": "echo", "arguments": {}})),
    )
    .await
    .unwrap_or_else(|| panic!("expected a response"));
    let result = resp.result.unwrap_or_else(|| panic!("expected result"));
    assert_eq!(result["content"][0]["text"], json!("ok"));
}

#[tokio::test]
async fn tools_call_for_unknown_tool_never_leaks_internal_text() {
    let (_dir, registry) = registry_with_running_echo_server().await;
    let resp = handle_request(
        &registry,
        request("tools/call", Some(json!(1)), json!({"name": "bogus", "arguments": {}})),
    )
    .await
    .unwrap_or_else(|| panic!("expected a response"));
    let error = resp.error.unwrap_or_else(|| panic!("expected an error"));
    assert_eq!(error.code, -32603);
    assert!(!error.message.contains("bogus"));
}

#[tokio::test]
async fn prompts_and_resources_list_are_always_empty() {
    let (_dir, registry) = registry_with_running_echo_server().await;
    let prompts = handle_request(&registry, request("prompts/list", Some(json!(1)), Value::Null))
        .await
        .unwrap_or_else(|| panic!("expected a response"));
    assert_eq!(prompts.result, Some(json!({"prompts": []})));

    let resources = handle_request(&registry, request("resources/list", Some(json!(1)), Value::Null))
        .await
        .unwrap_or_else(|| panic!("expected a response"));
    assert_eq!(resources.result, Some(json!({"resources": []})));
}

#[tokio::test]
async fn unknown_method_returns_exact_error_shape() {
    let (_dir, registry) = registry_with_running_echo_server().await;
    let resp = handle_request(&registry, request("bogus/call", Some(json!(42)), Value::Null))
        .await
        .unwrap_or_else(|| panic!("expected a response"));
    let value = serde_json::to_value(&resp).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(
        value,
        json!({
            "jsonrpc": "2.0",
            "id": 42,
            "error": {"code": -32601, "message": "Method not found: bogus/call"}
        })
    );
}
