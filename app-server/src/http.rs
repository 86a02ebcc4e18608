//! The loopback HTTP bridge (§6). Every response here has already had its
//! error text reduced by [`octave_error::PlainError::generic_msg`] — this is
//! an untrusted surface by the same rule as the stdio proxy.
//!
//! `/ipc/:channel` is this crate's own extension: the spec's internal IPC
//! surface has no Electron transport to ride on here, so it is exposed as
//! loopback-only HTTP too, distinct from (and more permissive than) `/mcp/*`
//! since its handlers carry `PlainError::output_msg` per §7 ("IPC responses
//! may carry the original message because the consumer is trusted").

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{Value, json};

use octave_error::PlainError;

use crate::ipc;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/mcp/tools", get(mcp_tools))
        .route("/mcp/call", post(mcp_call))
        .route("/mcp/status", get(mcp_status))
        .route("/mcp/logs/:server_id", get(mcp_logs))
        .route("/ipc/:channel", post(ipc_dispatch))
        .with_state(Arc::new(state))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "timestamp": crate::state::now_ms()}))
}

async fn mcp_tools(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({"tools": state.registry.list_tools().await}))
}

async fn mcp_call(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> impl IntoResponse {
    let Some(tool_name) = body.get("toolName").and_then(Value::as_str) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "missing toolName"}))).into_response();
    };
    let arguments = body.get("arguments").cloned().unwrap_or(json!({}));
    let server_id = body.get("serverId").and_then(Value::as_str);

    match state.registry.call_tool_scoped(tool_name, arguments, server_id).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            let plain: PlainError = (&e).into();
            let status = if matches!(e, octave_error::Error::NotFound { .. }) {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(json!({"error": plain.generic_msg()}))).into_response()
        }
    }
}

async fn mcp_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snapshot = state.registry.status_snapshot().await;
    let by_id: HashMap<String, octave_mcp_proxy::ServerStatusInfo> =
        snapshot.into_iter().map(|info| (info.id.clone(), info)).collect();
    Json(json!(by_id))
}

async fn mcp_logs(
    State(state): State<Arc<AppState>>,
    Path(server_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let lines: usize = query.get("lines").and_then(|v| v.parse().ok()).unwrap_or(100);
    match state.registry.logs_for(&server_id, lines).await {
        Ok(logs) => Json(json!({"logs": logs})).into_response(),
        Err(e) => {
            let plain: PlainError = (&e).into();
            (StatusCode::NOT_FOUND, Json(json!({"error": plain.generic_msg()}))).into_response()
        }
    }
}

async fn ipc_dispatch(
    State(state): State<Arc<AppState>>,
    Path(channel): Path<String>,
    Json(payload): Json<Value>,
) -> Json<Value> {
    Json(ipc::dispatch(&state, &channel, payload).await)
}

#[cfg(test)]
#[path = "http.test.rs"]
mod tests;
