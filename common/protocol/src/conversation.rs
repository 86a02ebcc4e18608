use serde::{Deserialize, Serialize};

/// A workspace-scoped container of messages. Deleting a conversation cascades
/// to its messages, blocks, and todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub workspace_id: String,
    pub title: Option<String>,
    /// ISO-8601.
    pub created_at: String,
    /// ISO-8601.
    pub updated_at: String,
    pub active: bool,
}

#[cfg(test)]
#[path = "conversation.test.rs"]
mod tests;
