use tempfile::tempdir;

use super::*;
use crate::db::Db;
use serde_json::json;

#[test]
fn tool_call_history_scenario() {
    // §8 scenario 5.
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();

    let call = McpCall::pending(
        "call1",
        1000,
        "server-echo",
        "echo",
        "tools/call",
        "echo",
        json!({"x": 1}),
    );
    db.insert_pending_call(&call).unwrap();
    db.complete_call_success("call1", &json!({"ok": true}), 5).unwrap();

    let stored = db.get_call("call1").unwrap().unwrap();
    assert_eq!(stored.status, McpCallStatus::Success);
    assert_eq!(stored.request_params, json!({"x": 1}));
    assert_eq!(stored.response_result, Some(json!({"ok": true})));
    assert!(stored.response_error.is_none());
    assert!(stored.duration_ms.unwrap() >= 0);
    assert!(stored.is_consistent());
}

#[test]
fn failed_call_sets_error_not_result() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();

    let call = McpCall::pending("call1", 1000, "s1", "s1", "tools/call", "t", json!({}));
    db.insert_pending_call(&call).unwrap();
    db.complete_call_failed("call1", McpCallStatus::Timeout, &json!({"code": -1}), 30_000)
        .unwrap();

    let stored = db.get_call("call1").unwrap().unwrap();
    assert_eq!(stored.status, McpCallStatus::Timeout);
    assert!(stored.response_result.is_none());
    assert!(stored.response_error.is_some());
    assert!(stored.is_consistent());
}

#[test]
fn complete_call_failed_rejects_non_terminal_status() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    let call = McpCall::pending("call1", 1000, "s1", "s1", "tools/call", "t", json!({}));
    db.insert_pending_call(&call).unwrap();

    let err = db
        .complete_call_failed("call1", McpCallStatus::Success, &json!({}), 1)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[test]
fn list_calls_for_server_orders_newest_first() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    for (id, ts) in [("a", 1), ("b", 2), ("c", 3)] {
        let call = McpCall::pending(id, ts, "s1", "s1", "tools/call", "t", json!({}));
        db.insert_pending_call(&call).unwrap();
    }

    let calls = db.list_calls_for_server("s1", 10).unwrap();
    let ids: Vec<_> = calls.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "b", "a"]);
}
