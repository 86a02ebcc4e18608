use std::sync::Arc;

use octave_mcp_proxy::ServerRegistry;
use octave_protocol::Role;
use octave_storage::Db;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

use super::*;

fn test_state() -> (tempfile::TempDir, AppState) {
    let dir = tempdir().unwrap_or_else(|e| panic!("{e}"));
    let db = Arc::new(Db::open(dir.path()).unwrap_or_else(|e| panic!("{e}")));
    let registry = Arc::new(ServerRegistry::new(db.clone()));
    let state = AppState::new(db, registry, "claude".to_string());
    (dir, state)
}

#[tokio::test]
async fn unknown_channel_reports_failure_envelope() {
    let (_dir, state) = test_state();

    let response = dispatch(&state, "nonsense:channel", json!({})).await;

    assert_eq!(response["success"], json!(false));
    assert!(response["error"].is_string());
}

#[tokio::test]
async fn conversation_create_then_list_round_trips() {
    let (_dir, state) = test_state();

    let created = dispatch(
        &state,
        "conversation:create",
        json!({"workspaceId": "ws-1", "title": "hello"}),
    )
    .await;
    assert_eq!(created["success"], json!(true));
    let conversation_id = created["data"]["id"].as_str().unwrap_or_else(|| panic!("missing id")).to_string();

    let listed = dispatch(&state, "conversation:list", json!({"workspaceId": "ws-1"})).await;
    assert_eq!(listed["success"], json!(true));
    let conversations = listed["data"].as_array().unwrap_or_else(|| panic!("not an array"));
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0]["id"], json!(conversation_id));
}

#[tokio::test]
async fn conversation_rename_missing_id_is_a_failure_envelope_not_a_panic() {
    let (_dir, state) = test_state();

    let response = dispatch(
        &state,
        "conversation:rename",
        json!({"conversationId": "does-not-exist", "title": "new title"}),
    )
    .await;

    assert_eq!(response["success"], json!(false));
}

#[tokio::test]
async fn message_save_with_blocks_then_list_round_trips() {
    let (_dir, state) = test_state();
    let created = dispatch(&state, "conversation:create", json!({"workspaceId": "ws-1"})).await;
    let conversation_id = created["data"]["id"].as_str().unwrap_or_else(|| panic!("missing id")).to_string();

    let message = json!({
        "id": "msg-1",
        "conversation_id": conversation_id,
        "role": "user",
        "content": "hi",
        "timestamp": 1,
        "metadata": null,
    });
    let response = dispatch(
        &state,
        "message:save-with-blocks",
        json!({"message": message, "blocks": []}),
    )
    .await;
    assert_eq!(response["success"], json!(true));

    let listed = dispatch(&state, "message:list", json!({"conversationId": conversation_id})).await;
    let messages = listed["data"].as_array().unwrap_or_else(|| panic!("not an array"));
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], json!("hi"));
}

#[tokio::test]
async fn context_calculate_tokens_reports_stats_for_given_messages() {
    let (_dir, state) = test_state();
    let message = octave_protocol::Message {
        id: "m1".to_string(),
        conversation_id: "c1".to_string(),
        role: Role::User,
        content: "hello world".to_string(),
        timestamp: 1,
        metadata: None,
    };
    let payload = json!({"messages": [message]});

    let response = context_calculate_tokens(&state, payload).unwrap_or_else(|e| panic!("{e}"));

    assert!(response["current"].as_i64().unwrap_or(0) > 0);
    assert_eq!(response["limit"], json!(octave_context::CONTEXT_WINDOW_LIMIT));
}

#[tokio::test]
async fn circuit_mcp_status_on_empty_registry_is_an_empty_list() {
    let (_dir, state) = test_state();

    let response = dispatch(&state, "circuit:mcp-status", json!({})).await;

    assert_eq!(response["success"], json!(true));
    assert_eq!(response["data"], json!([]));
}

#[tokio::test]
async fn workspace_metadata_round_trips() {
    let (_dir, state) = test_state();
    let metadata = json!({
        "workspace_id": "ws-1",
        "last_active_conversation_id": null,
        "settings": {"theme": "dark"},
    });

    let set = dispatch(&state, "workspace:set-metadata", json!({"metadata": metadata})).await;
    assert_eq!(set["success"], json!(true));

    let got = dispatch(&state, "workspace:get-metadata", json!({"workspaceId": "ws-1"})).await;
    assert_eq!(got["data"]["settings"]["theme"], json!("dark"));
}
