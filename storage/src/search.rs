//! `search_blocks` (§4.1, §9 "Full-text search"). The source shipped an FTS5
//! index (migrations v4) and dropped it two versions later (v5) after its
//! sync triggers deadlocked against `save_message_with_blocks`'s
//! delete-then-reinsert pattern under concurrent writers. This
//! implementation picks option (b) from §9: a substring scan over `content`
//! with stable ordering (most recently created first, then block id as a
//! deterministic tiebreak), documented here rather than reintroducing the
//! broken trigger pattern.

use rusqlite::params;

use octave_error::Error;
use octave_protocol::{Block, BlockType};

use crate::db::{Db, map_sql_err};

#[derive(Debug, Clone, Default)]
pub struct BlockSearchFilters {
    pub block_type: Option<BlockType>,
    pub workspace_id: Option<String>,
    pub limit: Option<usize>,
}

impl Db {
    /// Substring match over block content, newest first. `filters.workspace_id`
    /// joins through `messages -> conversations` to scope the search; absent
    /// filters are unconstrained.
    pub fn search_blocks(&self, query: &str, filters: BlockSearchFilters) -> Result<Vec<Block>, Error> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let limit = filters.limit.unwrap_or(100) as i64;
        let like_pattern = format!("%{}%", escape_like(query));

        let sql = "SELECT b.id, b.message_id, b.block_type, b.content, b.metadata, b.block_order, b.created_at \
             FROM blocks b \
             JOIN messages m ON m.id = b.message_id \
             JOIN conversations c ON c.id = m.conversation_id \
             WHERE b.content LIKE ?1 ESCAPE '\\' \
               AND (?2 IS NULL OR b.block_type = ?2) \
               AND (?3 IS NULL OR c.workspace_id = ?3) \
             ORDER BY b.created_at DESC, b.id ASC \
             LIMIT ?4";

        let block_type = filters.block_type.map(|t| t.as_str());

        let mut stmt = conn.prepare(sql).map_err(|e| map_sql_err("search_blocks", e))?;
        let rows = stmt
            .query_map(
                params![like_pattern, block_type, filters.workspace_id, limit],
                row_to_block,
            )
            .map_err(|e| map_sql_err("search_blocks", e))?;

        rows.collect::<Result<Result<Vec<_>, _>, _>>()
            .map_err(|e| map_sql_err("search_blocks", e))?
    }
}

fn escape_like(input: &str) -> String {
    input.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn row_to_block(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<Block, Error>> {
    let type_str: String = row.get(2)?;
    let block_type = BlockType::from_str(&type_str).unwrap_or(BlockType::Text);
    let metadata_text: Option<String> = row.get(4)?;
    Ok(crate::json::from_json_opt(metadata_text).map(|metadata| Block {
        id: row.get(0).unwrap_or_default(),
        message_id: row.get(1).unwrap_or_default(),
        block_type,
        content: row.get(3).unwrap_or_default(),
        metadata,
        order: row.get(5).unwrap_or_default(),
        created_at: row.get(6).unwrap_or_default(),
    }))
}

#[cfg(test)]
#[path = "search.test.rs"]
mod tests;
