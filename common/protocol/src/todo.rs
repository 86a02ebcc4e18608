use serde::{Deserialize, Serialize};

/// Lifecycle state of a [`Todo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoComplexity {
    Trivial,
    Simple,
    Medium,
    Complex,
    VeryComplex,
}

/// One node in a conversation's todo forest. `parent_todo_id` is `None` for a
/// root todo; descendants are expressed as nullable-parent edges, never a
/// pointer graph, so a cascading delete of the parent row is sufficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub conversation_id: String,
    pub message_id: String,
    pub parent_todo_id: Option<String>,
    /// Stable sort key among siblings at the same depth.
    pub order: i64,
    pub depth: i64,
    pub content: String,
    pub active_form: String,
    pub status: TodoStatus,
    /// 0-100 inclusive, if the caller tracks fractional progress.
    pub progress: Option<u8>,
    pub priority: TodoPriority,
    pub complexity: TodoComplexity,
    pub thinking_step_ids: Vec<String>,
    pub block_ids: Vec<String>,
    pub estimated_duration_secs: Option<i64>,
    pub actual_duration_secs: Option<i64>,
    /// Epoch milliseconds.
    pub started_at: Option<i64>,
    /// Epoch milliseconds.
    pub completed_at: Option<i64>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

#[cfg(test)]
#[path = "todo.test.rs"]
mod tests;
