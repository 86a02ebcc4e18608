#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn round_trips_through_json() {
    let conv = Conversation {
        id: "c1".into(),
        workspace_id: "w1".into(),
        title: Some("first chat".into()),
        created_at: "2026-01-01T00:00:00Z".into(),
        updated_at: "2026-01-01T00:00:00Z".into(),
        active: true,
    };
    let json = serde_json::to_string(&conv).unwrap();
    let back: Conversation = serde_json::from_str(&json).unwrap();
    assert_eq!(conv, back);
}
