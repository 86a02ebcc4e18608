use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The tag of a [`Block`]'s content. New variants must widen the storage
/// layer's `CHECK` constraint via a migration before they can be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    Text,
    Code,
    Command,
    File,
    Diff,
    Error,
    Result,
    Diagram,
    Link,
    Quote,
    List,
    Table,
    Tool,
    Checklist,
    FileSummary,
}

impl BlockType {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Code => "code",
            BlockType::Command => "command",
            BlockType::File => "file",
            BlockType::Diff => "diff",
            BlockType::Error => "error",
            BlockType::Result => "result",
            BlockType::Diagram => "diagram",
            BlockType::Link => "link",
            BlockType::Quote => "quote",
            BlockType::List => "list",
            BlockType::Table => "table",
            BlockType::Tool => "tool",
            BlockType::Checklist => "checklist",
            BlockType::FileSummary => "file-summary",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "text" => BlockType::Text,
            "code" => BlockType::Code,
            "command" => BlockType::Command,
            "file" => BlockType::File,
            "diff" => BlockType::Diff,
            "error" => BlockType::Error,
            "result" => BlockType::Result,
            "diagram" => BlockType::Diagram,
            "link" => BlockType::Link,
            "quote" => BlockType::Quote,
            "list" => BlockType::List,
            "table" => BlockType::Table,
            "tool" => BlockType::Tool,
            "checklist" => BlockType::Checklist,
            "file-summary" => BlockType::FileSummary,
            _ => return None,
        })
    }
}

/// The `order = 9999` sentinel a `file-summary` block always uses, so it
/// sorts after any ordinary segmented block within the same message.
pub const FILE_SUMMARY_ORDER: i64 = 9999;

/// A typed, ordered unit of an assistant message's body. Never updated in
/// place: a message rewrite deletes all of its blocks and re-inserts the new
/// set (see `save_message_with_blocks`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub message_id: String,
    pub block_type: BlockType,
    pub content: String,
    /// Shape depends on `block_type`; see module docs on each metadata type.
    pub metadata: Option<Value>,
    /// Stable sort key within the message; not necessarily dense.
    pub order: i64,
    /// ISO-8601.
    pub created_at: String,
}

/// Metadata for a `diff` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffMetadata {
    pub file_path: String,
    pub additions: u32,
    pub deletions: u32,
}

/// One file's aggregated change, as tracked inside a `file-summary` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Created,
    Modified,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChangeEntry {
    pub file_path: String,
    pub change_type: ChangeType,
    pub additions: u32,
    pub deletions: u32,
}

/// Metadata for the terminal `file-summary` block of an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileSummaryMetadata {
    pub files: Vec<FileChangeEntry>,
    pub total_files: usize,
    pub total_additions: u32,
    pub total_deletions: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockBookmark {
    pub id: String,
    pub block_id: String,
    pub title: Option<String>,
    pub note: Option<String>,
    pub tags: Vec<String>,
    pub created_at: String,
}

/// A single run of a `command`/`code` block. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockExecution {
    pub id: String,
    pub block_id: String,
    /// ISO-8601.
    pub executed_at: String,
    pub exit_code: i32,
    /// Truncated to a fixed cap by the writer.
    pub output: String,
    pub duration_ms: i64,
}

#[cfg(test)]
#[path = "block.test.rs"]
mod tests;
