use tempfile::tempdir;

use super::*;
use crate::db::Db;
use serde_json::json;

#[test]
fn round_trips_metadata() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    let metadata = WorkspaceMetadata {
        workspace_id: "w1".to_string(),
        last_active_conversation_id: Some("c1".to_string()),
        settings: Some(json!({"theme": "dark"})),
    };
    db.set_workspace_metadata(&metadata).unwrap();

    let reloaded = db.get_workspace_metadata("w1").unwrap().unwrap();
    assert_eq!(reloaded, metadata);
}

#[test]
fn upserts_on_conflict() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    db.set_workspace_metadata(&WorkspaceMetadata {
        workspace_id: "w1".to_string(),
        last_active_conversation_id: Some("c1".to_string()),
        settings: None,
    })
    .unwrap();
    db.set_workspace_metadata(&WorkspaceMetadata {
        workspace_id: "w1".to_string(),
        last_active_conversation_id: Some("c2".to_string()),
        settings: None,
    })
    .unwrap();

    let reloaded = db.get_workspace_metadata("w1").unwrap().unwrap();
    assert_eq!(reloaded.last_active_conversation_id, Some("c2".to_string()));
}

#[test]
fn missing_workspace_returns_none() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    assert!(db.get_workspace_metadata("missing").unwrap().is_none());
}
