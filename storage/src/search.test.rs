use tempfile::tempdir;

use super::*;
use crate::db::Db;
use octave_protocol::{Message, Role};

fn seed(db: &Db, workspace: &str, content: &str) {
    let c = db.create_conversation(workspace, None).unwrap();
    let message = Message {
        id: format!("m-{content}"),
        conversation_id: c.id,
        role: Role::Assistant,
        content: "body".to_string(),
        timestamp: 1,
        metadata: None,
    };
    let block = Block {
        id: format!("b-{content}"),
        message_id: message.id.clone(),
        block_type: BlockType::Text,
        content: content.to_string(),
        metadata: None,
        order: 0,
        created_at: "2024-01-01T00:00:00Z".to_string(),
    };
    db.save_message_with_blocks(&message, &[block]).unwrap();
}

#[test]
fn finds_substring_match() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    seed(&db, "w1", "the quick brown fox");
    seed(&db, "w1", "lazy dog");

    let results = db.search_blocks("quick", BlockSearchFilters::default()).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content, "the quick brown fox");
}

#[test]
fn empty_query_returns_empty() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    seed(&db, "w1", "content");
    assert!(db.search_blocks("  ", BlockSearchFilters::default()).unwrap().is_empty());
}

#[test]
fn filters_by_workspace() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    seed(&db, "w1", "match here");
    seed(&db, "w2", "match here too");

    let results = db
        .search_blocks(
            "match",
            BlockSearchFilters {
                workspace_id: Some("w1".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn like_wildcards_in_query_are_escaped() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    seed(&db, "w1", "100% done");
    seed(&db, "w1", "100x done");

    let results = db.search_blocks("100%", BlockSearchFilters::default()).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content, "100% done");
}
