use super::*;
use crate::{TodoComplexity, TodoPriority};

fn sample_plan() -> Plan {
    Plan {
        id: "p1".into(),
        workspace_id: "w1".into(),
        goal: "ship feature".into(),
        plan_document: "# Plan\n1. do it".into(),
        todos: vec![PlanTodoDraft {
            content: "do it".into(),
            active_form: "doing it".into(),
            priority: TodoPriority::Medium,
            complexity: TodoComplexity::Simple,
            estimated_duration_secs: Some(600),
        }],
        total_todo_count: 1,
        total_estimated_duration_secs: 600,
        status: PlanStatus::Pending,
        ai_analysis: None,
        created_at: 1,
        updated_at: 1,
    }
}

#[test]
fn status_round_trips_through_lowercase_wire_strings() {
    for status in [
        PlanStatus::Pending,
        PlanStatus::Active,
        PlanStatus::Completed,
        PlanStatus::Cancelled,
    ] {
        let json = serde_json::to_string(&status).unwrap_or_default();
        let back: PlanStatus = serde_json::from_str(&json).unwrap_or(PlanStatus::Pending);
        assert_eq!(back, status);
    }
}

#[test]
fn embedded_todos_round_trip_through_json() {
    let plan = sample_plan();
    let json = serde_json::to_string(&plan).unwrap_or_default();
    let back: Plan = serde_json::from_str(&json).unwrap_or(plan.clone());
    assert_eq!(back, plan);
    assert_eq!(back.todos.len(), back.total_todo_count);
}
