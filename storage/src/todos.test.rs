use tempfile::tempdir;

use super::*;
use crate::db::Db;
use octave_protocol::Message;
use octave_protocol::Role;

fn seeded_db() -> (tempfile::TempDir, Db, String, String) {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    let c = db.create_conversation("w1", None).unwrap();
    let message = Message {
        id: "m1".to_string(),
        conversation_id: c.id.clone(),
        role: Role::Assistant,
        content: "hi".to_string(),
        timestamp: 1,
        metadata: None,
    };
    db.save_message_with_blocks(&message, &[]).unwrap();
    (dir, db, c.id, "m1".to_string())
}

fn sample_todo(conversation_id: &str, message_id: &str, id: &str, order: i64) -> Todo {
    Todo {
        id: id.to_string(),
        conversation_id: conversation_id.to_string(),
        message_id: message_id.to_string(),
        parent_todo_id: None,
        order,
        depth: 0,
        content: "do the thing".to_string(),
        active_form: "doing the thing".to_string(),
        status: TodoStatus::Pending,
        progress: None,
        priority: TodoPriority::Medium,
        complexity: TodoComplexity::Simple,
        thinking_step_ids: vec!["t1".to_string()],
        block_ids: vec!["b1".to_string()],
        estimated_duration_secs: Some(60),
        actual_duration_secs: None,
        started_at: None,
        completed_at: None,
        created_at: 1,
        updated_at: 1,
    }
}

#[test]
fn save_and_list_todos() {
    let (_dir, db, conv_id, msg_id) = seeded_db();
    let todo = sample_todo(&conv_id, &msg_id, "todo1", 0);
    db.save_todo(&todo).unwrap();

    let todos = db.list_todos(&conv_id).unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].thinking_step_ids, vec!["t1".to_string()]);
    assert_eq!(todos[0].block_ids, vec!["b1".to_string()]);
}

#[test]
fn save_todo_upserts() {
    let (_dir, db, conv_id, msg_id) = seeded_db();
    let mut todo = sample_todo(&conv_id, &msg_id, "todo1", 0);
    db.save_todo(&todo).unwrap();

    todo.content = "changed".to_string();
    db.save_todo(&todo).unwrap();

    let todos = db.list_todos(&conv_id).unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].content, "changed");
}

#[test]
fn update_status_and_progress() {
    let (_dir, db, conv_id, msg_id) = seeded_db();
    let todo = sample_todo(&conv_id, &msg_id, "todo1", 0);
    db.save_todo(&todo).unwrap();

    db.update_status("todo1", TodoStatus::InProgress, Some(40), 2).unwrap();
    let reloaded = db.get_todo("todo1").unwrap().unwrap();
    assert_eq!(reloaded.status, TodoStatus::InProgress);
    assert_eq!(reloaded.progress, Some(40));
}

#[test]
fn delete_todo_cascades_to_children() {
    let (_dir, db, conv_id, msg_id) = seeded_db();
    let parent = sample_todo(&conv_id, &msg_id, "parent", 0);
    db.save_todo(&parent).unwrap();

    let mut child = sample_todo(&conv_id, &msg_id, "child", 1);
    child.parent_todo_id = Some("parent".to_string());
    child.depth = 1;
    db.save_todo(&child).unwrap();

    db.delete_todo("parent").unwrap();
    assert!(db.get_todo("child").unwrap().is_none());
}

#[test]
fn save_todos_batch() {
    let (_dir, db, conv_id, msg_id) = seeded_db();
    let todos = vec![
        sample_todo(&conv_id, &msg_id, "a", 0),
        sample_todo(&conv_id, &msg_id, "b", 1),
    ];
    db.save_todos(&todos).unwrap();
    assert_eq!(db.list_todos(&conv_id).unwrap().len(), 2);
}
