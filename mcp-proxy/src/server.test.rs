use serde_json::json;

use super::*;

#[test]
fn normalizes_scoped_package_name() {
    assert_eq!(normalize_server_id("@modelcontextprotocol/server-filesystem"), "modelcontextprotocol-server-filesystem");
}

#[test]
fn normalizes_unscoped_name_unchanged_apart_from_slashes() {
    assert_eq!(normalize_server_id("my/tool"), "my-tool");
    assert_eq!(normalize_server_id("plain-tool"), "plain-tool");
}

fn echo_server_script() -> String {
    r#"
while read -r line; do
  if echo "$line" | grep -q '"method":"initialize"'; then
    printf '{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2024-11-05"}}\n'
  elif echo "$line" | grep -q '"method":"tools/list"'; then
    printf '{"jsonrpc":"2.0","id":2,"result":{"tools":[{"name":"echo","description":"echoes input","inputSchema":{}}]}}\n'
  elif echo "$line" | grep -q '"method":"tools/call"'; then
    printf '{"jsonrpc":"2.0","id":3,"result":{"content":[{"type":"text","text":"ok"}]}}\n'
  fi
done
"#
    .to_string()
}

#[tokio::test]
async fn start_runs_handshake_and_lists_tools() {
    let mut config = ServerConfig::new("echo", "sh", vec!["-c".to_string(), echo_server_script()]);
    config.call_timeout = Duration::from_secs(5);
    let mut server = ToolServer::new("echo-server", config);

    server.start().await.unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(server.status(), &ServerStatus::Running);
    assert_eq!(server.tools().len(), 1);
    assert_eq!(server.tools()[0].name, "echo");
    assert_eq!(server.tools()[0].server_id, "echo-server");
}

#[tokio::test]
async fn call_tool_forwards_to_child_and_returns_result() {
    let mut config = ServerConfig::new("echo", "sh", vec!["-c".to_string(), echo_server_script()]);
    config.call_timeout = Duration::from_secs(5);
    let mut server = ToolServer::new("echo-server", config);
    server.start().await.unwrap_or_else(|e| panic!("{e}"));

    let result = server
        .call_tool("echo", json!({"text": "hi"}))
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(result["content"][0]["text"], json!("ok"));
}

#[tokio::test]
async fn call_tool_on_non_running_server_is_unavailable() {
    let config = ServerConfig::new("echo", "sh", vec!["-c".to_string(), "cat".to_string()]);
    let server = ToolServer::new("echo-server", config);

    let err = server.call_tool("echo", json!({})).await.unwrap_err();
    assert!(matches!(err, Error::ToolServerUnavailable { .. }));
}

#[tokio::test]
async fn stop_marks_server_stopped() {
    let mut config = ServerConfig::new("echo", "sh", vec!["-c".to_string(), echo_server_script()]);
    config.call_timeout = Duration::from_secs(5);
    let mut server = ToolServer::new("echo-server", config);
    server.start().await.unwrap_or_else(|e| panic!("{e}"));

    server.stop().await;

    assert_eq!(server.status(), &ServerStatus::Stopped);
    let err = server.call_tool("echo", json!({})).await.unwrap_err();
    assert!(matches!(err, Error::ToolServerUnavailable { .. }));
}
