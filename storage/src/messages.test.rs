use tempfile::tempdir;

use super::*;
use crate::db::Db;

fn open_db() -> (tempfile::TempDir, Db) {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    (dir, db)
}

fn block(id: &str, block_type: BlockType, content: &str, order: i64) -> Block {
    Block {
        id: id.to_string(),
        message_id: "m1".to_string(),
        block_type,
        content: content.to_string(),
        metadata: None,
        order,
        created_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

fn message(conversation_id: &str, id: &str, timestamp: i64) -> Message {
    Message {
        id: id.to_string(),
        conversation_id: conversation_id.to_string(),
        role: Role::Assistant,
        content: "hi".to_string(),
        timestamp,
        metadata: None,
    }
}

#[test]
fn block_replacement_scenario() {
    // §8 scenario 1.
    let (_dir, db) = open_db();
    let c = db.create_conversation("w1", None).unwrap();
    let m1 = message(&c.id, "m1", 1);

    db.save_message_with_blocks(
        &m1,
        &[
            block("b1", BlockType::Text, "hi", 0),
            block("b2", BlockType::Code, "print(1)", 1),
        ],
    )
    .unwrap();
    assert_eq!(db.get_blocks("m1").unwrap().len(), 2);

    db.save_message_with_blocks(&m1, &[block("b3", BlockType::Text, "hello", 0)])
        .unwrap();

    let blocks = db.get_blocks("m1").unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].content, "hello");
    assert_eq!(blocks[0].order, 0);
    assert_eq!(blocks[0].block_type, BlockType::Text);
}

#[test]
fn save_message_with_blocks_touches_conversation() {
    let (_dir, db) = open_db();
    let c = db.create_conversation("w1", None).unwrap();
    let before = db.get_conversation(&c.id).unwrap().unwrap().updated_at;
    std::thread::sleep(std::time::Duration::from_millis(5));
    db.save_message_with_blocks(&message(&c.id, "m1", 1), &[]).unwrap();
    let after = db.get_conversation(&c.id).unwrap().unwrap().updated_at;
    assert!(after >= before);
}

#[test]
fn retry_flow_deletes_messages_after_pivot() {
    // §8 scenario 6.
    let (_dir, db) = open_db();
    let c = db.create_conversation("w1", None).unwrap();
    db.save_message_with_blocks(&message(&c.id, "m1", 1), &[]).unwrap();
    db.save_message_with_blocks(&message(&c.id, "m2", 2), &[]).unwrap();
    db.save_message_with_blocks(&message(&c.id, "m3", 3), &[]).unwrap();

    let deleted = db.delete_messages_after(&c.id, "m2").unwrap();
    assert_eq!(deleted, 1);

    let remaining = db.list_messages(&c.id).unwrap();
    let ids: Vec<_> = remaining.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2"]);
    assert!(db.get_message("m3").unwrap().is_none());
}

#[test]
fn delete_messages_after_unknown_pivot_not_found() {
    let (_dir, db) = open_db();
    let c = db.create_conversation("w1", None).unwrap();
    let err = db.delete_messages_after(&c.id, "missing").unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}
