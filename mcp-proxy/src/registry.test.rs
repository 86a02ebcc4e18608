use serde_json::json;
use tempfile::tempdir;

use super::*;

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

async fn registry_with_running_echo_server() -> (tempfile::TempDir, ServerRegistry, String) {
    let dir = tempdir().unwrap_or_else(|e| panic!("{e}"));
    let db = Arc::new(Db::open(dir.path()).unwrap_or_else(|e| panic!("{e}")));
    let registry = ServerRegistry::new(db);

    let mut config = ServerConfig::new("echo", "sh", vec!["-c".to_string(), echo_server_script()]);
    config.call_timeout = Duration::from_secs(5);
    let id = registry.install("echo-server".to_string(), config).await;
    registry.start(&id).await.unwrap_or_else(|e| panic!("{e}"));

    (dir, registry, id)
}

#[tokio::test]
async fn list_tools_returns_union_tagged_with_server_id() {
    let (_dir, registry, _id) = registry_with_running_echo_server().await;

    let tools = registry.list_tools().await;

    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "echo");
    assert_eq!(tools[0].server_id, "echo-server");
}

#[tokio::test]
async fn call_tool_records_mcp_call_history() {
    let (_dir, registry, _id) = registry_with_running_echo_server().await;

    let result = registry
        .call_tool("echo", json!({"x": 1}))
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(result["content"][0]["text"], json!("ok"));

    let calls = registry.db.list_calls_for_server("echo-server", 10).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].status, McpCallStatus::Success);
    assert_eq!(calls[0].request_params, json!({"x": 1}));
    assert!(calls[0].response_result.is_some());
    assert!(calls[0].response_error.is_none());
}

#[tokio::test]
async fn call_tool_for_unknown_tool_is_not_found() {
    let (_dir, registry, _id) = registry_with_running_echo_server().await;

    let err = registry.call_tool("does-not-exist", json!({})).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn stop_removes_server_from_running_tool_union() {
    let (_dir, registry, id) = registry_with_running_echo_server().await;

    registry.stop(&id).await.unwrap_or_else(|e| panic!("{e}"));

    assert!(registry.list_tools().await.is_empty());
    let err = registry.call_tool("echo", json!({})).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn uninstall_removes_server_entirely() {
    let (_dir, registry, id) = registry_with_running_echo_server().await;

    registry.uninstall(&id).await.unwrap_or_else(|e| panic!("{e}"));

    let err = registry.stop(&id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn status_snapshot_reports_running_server_with_tool_count() {
    let (_dir, registry, id) = registry_with_running_echo_server().await;

    let snapshot = registry.status_snapshot().await;
    let entry = snapshot.iter().find(|s| s.id == id).unwrap_or_else(|| panic!("missing entry"));

    assert_eq!(entry.status, "running");
    assert_eq!(entry.tool_count, 1);
    assert!(entry.error.is_none());
}
