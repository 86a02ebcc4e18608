use tempfile::tempdir;

use super::*;
use crate::db::Db;
use octave_protocol::{Block, BlockType, Message, Role};

fn open_db_with_block() -> (tempfile::TempDir, Db, String) {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    let c = db.create_conversation("w1", None).unwrap();
    let message = Message {
        id: "m1".to_string(),
        conversation_id: c.id,
        role: Role::Assistant,
        content: "hi".to_string(),
        timestamp: 1,
        metadata: None,
    };
    let block = Block {
        id: "b1".to_string(),
        message_id: "m1".to_string(),
        block_type: BlockType::Code,
        content: "print(1)".to_string(),
        metadata: None,
        order: 0,
        created_at: "2024-01-01T00:00:00Z".to_string(),
    };
    db.save_message_with_blocks(&message, &[block]).unwrap();
    (dir, db, "b1".to_string())
}

#[test]
fn create_and_list_bookmark() {
    let (_dir, db, block_id) = open_db_with_block();
    let bookmark = db
        .create_bookmark(&block_id, Some("title".to_string()), None, vec!["x".to_string()])
        .unwrap();
    let bookmarks = db.list_bookmarks(&block_id).unwrap();
    assert_eq!(bookmarks.len(), 1);
    assert_eq!(bookmarks[0].id, bookmark.id);
    assert_eq!(bookmarks[0].tags, vec!["x".to_string()]);
}

#[test]
fn delete_bookmark_removes_it() {
    let (_dir, db, block_id) = open_db_with_block();
    let bookmark = db.create_bookmark(&block_id, None, None, vec![]).unwrap();
    db.delete_bookmark(&bookmark.id).unwrap();
    assert!(db.list_bookmarks(&block_id).unwrap().is_empty());
}

#[test]
fn record_execution_truncates_output() {
    let (_dir, db, block_id) = open_db_with_block();
    let huge = "a".repeat(EXECUTION_OUTPUT_CAP + 100);
    let execution = db.record_execution(&block_id, 0, &huge, 12).unwrap();
    assert_eq!(execution.output.len(), EXECUTION_OUTPUT_CAP);

    let executions = db.list_executions(&block_id).unwrap();
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0].exit_code, 0);
}

#[test]
fn executions_are_append_only_across_runs() {
    let (_dir, db, block_id) = open_db_with_block();
    db.record_execution(&block_id, 0, "first", 1).unwrap();
    db.record_execution(&block_id, 1, "second", 2).unwrap();
    let executions = db.list_executions(&block_id).unwrap();
    assert_eq!(executions.len(), 2);
}
