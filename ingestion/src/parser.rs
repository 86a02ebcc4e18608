//! Block segmentation (§4.3): `parse_message_to_blocks` scans raw assistant
//! text and emits `code`/`diff`/`command`/`text` blocks in occurrence order.
//! A malformed segment (an unterminated fence) never aborts the scan — it
//! degrades to a best-effort block plus a warning, so a message is always
//! saveable.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use octave_protocol::{Block, BlockType, DiffMetadata};

use crate::git_diff::parse_git_diff_text;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMessage {
    pub blocks: Vec<Block>,
    pub errors: Vec<String>,
}

/// Segments `content` into ordered blocks for `message_id`. Stable: two
/// calls against the same `content` always emit blocks of the same types in
/// the same order.
pub fn parse_message_to_blocks(content: &str, message_id: &str) -> ParsedMessage {
    let mut blocks = Vec::new();
    let mut errors = Vec::new();
    let mut text_buf: Vec<&str> = Vec::new();

    let lines: Vec<&str> = content.lines().collect();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim_start();

        if let Some(fence_info) = trimmed.strip_prefix("```") {
            flush_text(&mut text_buf, message_id, &mut blocks);

            let lang = fence_info.trim();
            let mut body_lines = Vec::new();
            let mut j = i + 1;
            let mut closed = false;
            while j < lines.len() {
                if lines[j].trim_start() == "```" {
                    closed = true;
                    break;
                }
                body_lines.push(lines[j]);
                j += 1;
            }
            if !closed {
                errors.push(format!(
                    "unterminated fenced segment starting at line {}",
                    i + 1
                ));
            }

            let body = body_lines.join("\n");
            blocks.push(fence_to_block(message_id, lang, &body, blocks.len() as i64));

            i = if closed { j + 1 } else { lines.len() };
            continue;
        }

        if trimmed.starts_with("$ ") {
            flush_text(&mut text_buf, message_id, &mut blocks);

            let mut command_lines = vec![trimmed.trim_start_matches("$ ")];
            let mut j = i + 1;
            while j < lines.len() && lines[j].trim_start().starts_with("$ ") {
                command_lines.push(lines[j].trim_start().trim_start_matches("$ "));
                j += 1;
            }
            blocks.push(new_block(
                message_id,
                BlockType::Command,
                command_lines.join("\n"),
                None,
                blocks.len() as i64,
            ));
            i = j;
            continue;
        }

        text_buf.push(line);
        i += 1;
    }

    flush_text(&mut text_buf, message_id, &mut blocks);

    ParsedMessage { blocks, errors }
}

fn flush_text(buf: &mut Vec<&str>, message_id: &str, blocks: &mut Vec<Block>) {
    if buf.is_empty() {
        return;
    }
    let content = buf.join("\n");
    buf.clear();
    if content.trim().is_empty() {
        return;
    }
    blocks.push(new_block(
        message_id,
        BlockType::Text,
        content,
        None,
        blocks.len() as i64,
    ));
}

fn fence_to_block(message_id: &str, lang: &str, body: &str, order: i64) -> Block {
    let lower = lang.to_ascii_lowercase();
    if lower == "diff" || looks_like_diff(body) {
        let files = parse_git_diff_text(body);
        let (file_path, additions, deletions) = match files.first() {
            Some(f) => (f.file_path.clone(), f.additions, f.deletions),
            None => (String::new(), count_plus_lines(body), count_minus_lines(body)),
        };
        let metadata = DiffMetadata {
            file_path,
            additions,
            deletions,
        };
        return new_block(
            message_id,
            BlockType::Diff,
            body.to_string(),
            serde_json::to_value(&metadata).ok(),
            order,
        );
    }

    let metadata = if lang.is_empty() {
        None
    } else {
        Some(json!({ "language": lang }))
    };
    new_block(message_id, BlockType::Code, body.to_string(), metadata, order)
}

fn looks_like_diff(body: &str) -> bool {
    body.lines().any(|l| l.starts_with("diff --git "))
}

fn count_plus_lines(body: &str) -> u32 {
    body.lines()
        .filter(|l| l.starts_with('+') && !l.starts_with("+++"))
        .count() as u32
}

fn count_minus_lines(body: &str) -> u32 {
    body.lines()
        .filter(|l| l.starts_with('-') && !l.starts_with("---"))
        .count() as u32
}

fn new_block(
    message_id: &str,
    block_type: BlockType,
    content: String,
    metadata: Option<serde_json::Value>,
    order: i64,
) -> Block {
    Block {
        id: Uuid::new_v4().to_string(),
        message_id: message_id.to_string(),
        block_type,
        content,
        metadata,
        order,
        created_at: Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
#[path = "parser.test.rs"]
mod tests;
