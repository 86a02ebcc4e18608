use super::*;
use serde_json::json;

#[test]
fn method_not_found_has_exact_shape() {
    let resp = JsonRpcResponse::method_not_found(json!(7), "bogus/call");
    let value = serde_json::to_value(&resp).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(
        value,
        json!({
            "jsonrpc": "2.0",
            "id": 7,
            "error": {"code": -32601, "message": "Method not found: bogus/call"}
        })
    );
}

#[test]
fn internal_error_carries_the_generic_message_it_is_given() {
    let resp = JsonRpcResponse::internal_error(json!(1), "Storage error");
    let value = serde_json::to_value(&resp).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(value["error"]["message"], json!("Storage error"));
    assert_eq!(value["error"]["code"], json!(-32603));
}

#[test]
fn success_response_omits_error_field() {
    let resp = JsonRpcResponse::success(json!(1), json!({"ok": true}));
    let value = serde_json::to_value(&resp).unwrap_or_else(|e| panic!("{e}"));
    assert!(value.get("error").is_none());
}

#[test]
fn request_without_id_parses_as_notification() {
    let parsed: JsonRpcRequest = serde_json::from_str(
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
    )
    .unwrap_or_else(|e| panic!("{e}"));
    assert!(parsed.id.is_none());
    assert_eq!(parsed.method, "notifications/initialized");
}
