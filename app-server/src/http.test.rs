use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use octave_mcp_proxy::ServerRegistry;
use octave_storage::Db;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::tempdir;
use tower::ServiceExt;

use super::*;

fn test_app() -> (tempfile::TempDir, Router) {
    let dir = tempdir().unwrap_or_else(|e| panic!("{e}"));
    let db = Arc::new(Db::open(dir.path()).unwrap_or_else(|e| panic!("{e}")));
    let registry = Arc::new(ServerRegistry::new(db.clone()));
    let state = AppState::new(db, registry, "claude".to_string());
    (dir, router(state))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("{e}"))
}

#[tokio::test]
async fn health_reports_ok() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap_or_else(|e| panic!("{e}")))
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("ok"));
}

#[tokio::test]
async fn mcp_tools_on_empty_registry_is_an_empty_list() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(Request::builder().uri("/mcp/tools").body(Body::empty()).unwrap_or_else(|e| panic!("{e}")))
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    let body = body_json(response).await;
    assert_eq!(body["tools"], json!([]));
}

#[tokio::test]
async fn mcp_call_for_unknown_tool_is_404_with_a_generic_message() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp/call")
                .header("content-type", "application/json")
                .body(Body::from(json!({"toolName": "nope", "arguments": {}}).to_string()))
                .unwrap_or_else(|e| panic!("{e}")),
        )
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    let error = body["error"].as_str().unwrap_or_else(|| panic!("missing error"));
    assert!(!error.to_lowercase().contains("nope"), "must not leak the tool name: {error}");
}

#[tokio::test]
async fn mcp_logs_for_unknown_server_is_404() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/mcp/logs/does-not-exist")
                .body(Body::empty())
                .unwrap_or_else(|e| panic!("{e}")),
        )
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ipc_route_dispatches_into_the_ipc_surface() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ipc/conversation:create")
                .header("content-type", "application/json")
                .body(Body::from(json!({"workspaceId": "ws-1"}).to_string()))
                .unwrap_or_else(|e| panic!("{e}")),
        )
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert!(body["data"]["id"].is_string());
}
