//! Commit step (§4.3): wires the segmenter and the file-change aggregator
//! together and hands the result to PL in one call. No intermediate state is
//! persisted — a crash between parse and commit simply loses the turn.

use octave_error::Error;
use octave_protocol::{BlockType, DiffMetadata, Message, Role};
use octave_storage::Db;

use crate::file_changes::{FileChangeAggregator, ToolTrace};
use crate::parser::{ParsedMessage, parse_message_to_blocks};

/// Parses `message.content` into blocks, folds `tool_traces` (ignored for
/// user messages) into a `file-summary` block via a fresh
/// [`FileChangeAggregator`] rooted at `workspace_root`, and commits
/// `message` plus the full block set through
/// [`Db::save_message_with_blocks`].
///
/// Returns the blocks actually committed and any non-fatal parse warnings.
pub fn ingest_assistant_message(
    db: &Db,
    message: &Message,
    tool_traces: &[ToolTrace],
    workspace_root: &str,
) -> Result<ParsedMessage, Error> {
    let mut parsed = parse_message_to_blocks(&message.content, &message.id);

    if matches!(message.role, Role::Assistant) {
        let mut aggregator = FileChangeAggregator::new(workspace_root);

        for trace in tool_traces {
            aggregator.ingest(trace);
        }
        for block in &parsed.blocks {
            if block.block_type == BlockType::Diff {
                if let Some(metadata) = block
                    .metadata
                    .as_ref()
                    .and_then(|v| serde_json::from_value::<DiffMetadata>(v.clone()).ok())
                {
                    aggregator.ingest_diff_block(&metadata);
                }
            }
        }

        parsed.errors.extend(aggregator.warnings().iter().cloned());
        if let Some(summary) = aggregator.finish(&message.id) {
            parsed.blocks.push(summary);
        }
    }

    for warning in &parsed.errors {
        tracing::warn!(message_id = %message.id, warning = %warning, "message ingestion warning");
    }

    db.save_message_with_blocks(message, &parsed.blocks)?;
    Ok(parsed)
}

#[cfg(test)]
#[path = "commit.test.rs"]
mod tests;
