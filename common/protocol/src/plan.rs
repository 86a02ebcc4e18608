use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

/// A single todo as it exists inside a [`Plan`]'s embedded draft list, before
/// `plan:execute` materializes it into a [`crate::Todo`] row with a real id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTodoDraft {
    pub content: String,
    pub active_form: String,
    pub priority: crate::TodoPriority,
    pub complexity: crate::TodoComplexity,
    pub estimated_duration_secs: Option<i64>,
}

/// A goal plus a flat, ordered list of todos, persisted as JSON until
/// execution materializes rows. See `plan:execute` in the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub workspace_id: String,
    pub goal: String,
    pub plan_document: String,
    pub todos: Vec<PlanTodoDraft>,
    pub total_todo_count: usize,
    pub total_estimated_duration_secs: i64,
    pub status: PlanStatus,
    /// Opaque envelope carrying AI-CLI-specific plan analysis.
    pub ai_analysis: Option<Value>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

#[cfg(test)]
#[path = "plan.test.rs"]
mod tests;
