#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn role_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    assert_eq!(
        serde_json::to_string(&Role::Assistant).unwrap(),
        "\"assistant\""
    );
}

#[test]
fn metadata_none_round_trips_as_null() {
    let msg = Message {
        id: "m1".into(),
        conversation_id: "c1".into(),
        role: Role::User,
        content: "hi".into(),
        timestamp: 1,
        metadata: None,
    };
    let json = serde_json::to_string(&msg).unwrap();
    let back: Message = serde_json::from_str(&json).unwrap();
    assert_eq!(msg, back);
}
