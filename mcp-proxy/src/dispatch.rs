//! Maps one JSON-RPC request onto [`ServerRegistry`] (§4.2 "Dispatch"). Used
//! verbatim by both the stdio proxy and the HTTP bridge so the two
//! transports present an identical surface.

use serde_json::{Value, json};

use octave_error::PlainError;

use crate::jsonrpc::{self, JsonRpcRequest, JsonRpcResponse};
use crate::registry::ServerRegistry;

/// Returns `None` for requests with no `id` (JSON-RPC notifications), which
/// never get a response.
pub async fn handle_request(
    registry: &ServerRegistry,
    request: JsonRpcRequest,
) -> Option<JsonRpcResponse> {
    let id = request.id.clone();

    match request.method.as_str() {
        "initialize" => {
            let id = id?;
            Some(JsonRpcResponse::success(id, initialize_result()))
        }
        "notifications/initialized" => None,
        "tools/list" => {
            let id = id?;
            let tools = registry.list_tools().await;
            Some(JsonRpcResponse::success(id, json!({ "tools": tools })))
        }
        "tools/call" => {
            let id = id?;
            Some(handle_tools_call(registry, id, &request.params).await)
        }
        "prompts/list" => {
            let id = id?;
            Some(JsonRpcResponse::success(id, json!({ "prompts": [] })))
        }
        "resources/list" => {
            let id = id?;
            Some(JsonRpcResponse::success(id, json!({ "resources": [] })))
        }
        other => {
            let id = id.unwrap_or(Value::Null);
            Some(JsonRpcResponse::method_not_found(id, other))
        }
    }
}

async fn handle_tools_call(registry: &ServerRegistry, id: Value, params: &Value) -> JsonRpcResponse {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::error(id, jsonrpc::INVALID_PARAMS, "missing tool name");
    };
    let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

    match registry.call_tool(name, arguments).await {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(e) => {
            // §4.2, §7: never leak internal error text over this channel.
            let plain = PlainError::from(&e);
            JsonRpcResponse::internal_error(id, plain.generic_msg())
        }
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "capabilities": { "tools": {} },
        "serverInfo": { "name": "octave-mcp-proxy", "version": env!("CARGO_PKG_VERSION") },
    })
}

#[cfg(test)]
#[path = "dispatch.test.rs"]
mod tests;
