use super::*;

#[test]
fn status_round_trips_through_snake_case_wire_strings() {
    let json = serde_json::to_string(&TodoStatus::InProgress).unwrap_or_default();
    assert_eq!(json, "\"in_progress\"");
    let back: TodoStatus = serde_json::from_str(&json).unwrap_or(TodoStatus::Pending);
    assert_eq!(back, TodoStatus::InProgress);
}

#[test]
fn priority_ordering_is_low_to_critical() {
    assert!(TodoPriority::Low < TodoPriority::Medium);
    assert!(TodoPriority::Medium < TodoPriority::High);
    assert!(TodoPriority::High < TodoPriority::Critical);
}

#[test]
fn complexity_ordering_is_trivial_to_very_complex() {
    assert!(TodoComplexity::Trivial < TodoComplexity::Simple);
    assert!(TodoComplexity::Complex < TodoComplexity::VeryComplex);
}

#[test]
fn todo_serializes_with_nullable_parent_for_root_nodes() {
    let todo = Todo {
        id: "t1".into(),
        conversation_id: "c1".into(),
        message_id: "m1".into(),
        parent_todo_id: None,
        order: 0,
        depth: 0,
        content: "write tests".into(),
        active_form: "writing tests".into(),
        status: TodoStatus::Pending,
        progress: None,
        priority: TodoPriority::Medium,
        complexity: TodoComplexity::Simple,
        thinking_step_ids: vec![],
        block_ids: vec![],
        estimated_duration_secs: None,
        actual_duration_secs: None,
        started_at: None,
        completed_at: None,
        created_at: 1,
        updated_at: 1,
    };
    let value = serde_json::to_value(&todo).unwrap_or(serde_json::Value::Null);
    assert_eq!(value["parent_todo_id"], serde_json::Value::Null);
}
