use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-workspace bookkeeping that is not itself a [`crate::Conversation`]:
/// which conversation was last active, plus an opaque settings envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceMetadata {
    pub workspace_id: String,
    pub last_active_conversation_id: Option<String>,
    pub settings: Option<Value>,
}

#[cfg(test)]
#[path = "workspace.test.rs"]
mod tests;
