use super::*;
use serde_json::json;

#[test]
fn settings_envelope_round_trips_through_json() {
    let meta = WorkspaceMetadata {
        workspace_id: "w1".into(),
        last_active_conversation_id: Some("c1".into()),
        settings: Some(json!({"theme": "dark"})),
    };
    let json = serde_json::to_string(&meta).unwrap_or_default();
    let back: WorkspaceMetadata = serde_json::from_str(&json).unwrap_or(WorkspaceMetadata {
        workspace_id: String::new(),
        last_active_conversation_id: None,
        settings: None,
    });
    assert_eq!(back, meta);
}

#[test]
fn no_active_conversation_serializes_as_null() {
    let meta = WorkspaceMetadata {
        workspace_id: "w1".into(),
        last_active_conversation_id: None,
        settings: None,
    };
    let value = serde_json::to_value(&meta).unwrap_or(serde_json::Value::Null);
    assert_eq!(value["last_active_conversation_id"], serde_json::Value::Null);
}
