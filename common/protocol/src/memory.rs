use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    Convention,
    Decision,
    Snippet,
    Rule,
    Note,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryPriority {
    Low,
    Medium,
    High,
}

/// A single fact remembered about a project, keyed uniquely by
/// `(project_path, key)`. Lives in the separate `memory.db`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMemory {
    pub id: String,
    pub project_path: String,
    pub memory_type: MemoryType,
    /// Unique per `project_path`.
    pub key: String,
    pub value: String,
    pub priority: MemoryPriority,
    pub usage_count: u64,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

#[cfg(test)]
#[path = "memory.test.rs"]
mod tests;
