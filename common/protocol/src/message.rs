use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn in a conversation. `content` is the raw text as received;
/// `blocks` are a *projection* of it, stored and replaced separately by
/// `save_message_with_blocks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Opaque envelope carrying thinking steps, plan results, and similar
    /// AI-CLI specific payloads. `None` serializes as SQL `NULL`, not `"null"`.
    pub metadata: Option<Value>,
}

#[cfg(test)]
#[path = "message.test.rs"]
mod tests;
