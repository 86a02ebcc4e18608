use tempfile::tempdir;

use super::*;
use crate::db::Db;
use octave_protocol::Message;
use octave_protocol::Role;

fn draft(content: &str) -> PlanTodoDraft {
    PlanTodoDraft {
        content: content.to_string(),
        active_form: format!("{content}ing"),
        priority: octave_protocol::TodoPriority::Medium,
        complexity: octave_protocol::TodoComplexity::Simple,
        estimated_duration_secs: Some(30),
    }
}

#[test]
fn create_plan_computes_totals() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    let plan = db
        .create_plan(
            "w1",
            "ship feature".to_string(),
            "# plan".to_string(),
            vec![draft("step one"), draft("step two")],
            1000,
        )
        .unwrap();

    assert_eq!(plan.total_todo_count, 2);
    assert_eq!(plan.total_estimated_duration_secs, 60);
    assert_eq!(plan.status, PlanStatus::Pending);
}

#[test]
fn get_plan_round_trips() {
    let dir = tempdir().unwrap();
    let db = Db::open(dir.path()).unwrap();
    let plan = db
        .create_plan("w1", "goal".to_string(), "doc".to_string(), vec![draft("x")], 1000)
        .unwrap();

    let reloaded = db.get_plan(&plan.id).unwrap().unwrap();
    assert_eq!(reloaded.goal, "goal");
    assert_eq!(reloaded.todos.len(), 1);
}

#[test]
fn execute_plan_materializes_todos_and_activates() {
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

    let plan = db
        .create_plan(
            "w1",
            "goal".to_string(),
            "doc".to_string(),
            vec![draft("a"), draft("b")],
            1000,
        )
        .unwrap();

    let todos = db.execute_plan(&plan.id, "m1", 2000).unwrap();
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[0].order, 0);
    assert_eq!(todos[1].order, 1);

    let stored = db.list_todos(&c.id).unwrap();
    assert_eq!(stored.len(), 2);

    let reloaded_plan = db.get_plan(&plan.id).unwrap().unwrap();
    assert_eq!(reloaded_plan.status, PlanStatus::Active);
}

#[test]
fn execute_plan_unknown_plan_not_found() {
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
    db.save_message_with_blocks(&message, &[]).unwrap();

    let err = db.execute_plan("missing", "m1", 2000).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}
