//! Block bookmarks and executions (§3.1). Both cascade from their owning
//! block; executions are append-only.

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use octave_error::Error;
use octave_protocol::{BlockBookmark, BlockExecution};

use crate::db::{Db, map_sql_err};

/// Captured execution output is truncated to this many bytes before it is
/// stored, matching §3.1's "captured output (truncated to a fixed cap)".
pub const EXECUTION_OUTPUT_CAP: usize = 64 * 1024;

impl Db {
    pub fn create_bookmark(
        &self,
        block_id: &str,
        title: Option<String>,
        note: Option<String>,
        tags: Vec<String>,
    ) -> Result<BlockBookmark, Error> {
        let bookmark = BlockBookmark {
            id: Uuid::new_v4().to_string(),
            block_id: block_id.to_string(),
            title,
            note,
            tags,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let tags_json = serde_json::to_string(&bookmark.tags).map_err(|e| Error::DbError {
            operation: "create_bookmark".to_string(),
            message: e.to_string(),
        })?;
        conn.execute(
            "INSERT INTO block_bookmarks (id, block_id, title, note, tags, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                bookmark.id,
                bookmark.block_id,
                bookmark.title,
                bookmark.note,
                tags_json,
                bookmark.created_at,
            ],
        )
        .map_err(|e| map_sql_err("create_bookmark", e))?;

        Ok(bookmark)
    }

    pub fn list_bookmarks(&self, block_id: &str) -> Result<Vec<BlockBookmark>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = conn
            .prepare(
                "SELECT id, block_id, title, note, tags, created_at \
                 FROM block_bookmarks WHERE block_id = ?1 ORDER BY created_at ASC",
            )
            .map_err(|e| map_sql_err("list_bookmarks", e))?;
        let rows = stmt
            .query_map(params![block_id], row_to_bookmark)
            .map_err(|e| map_sql_err("list_bookmarks", e))?;
        rows.collect::<Result<Result<Vec<_>, _>, _>>()
            .map_err(|e| map_sql_err("list_bookmarks", e))?
    }

    pub fn delete_bookmark(&self, bookmark_id: &str) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let changed = conn
            .execute("DELETE FROM block_bookmarks WHERE id = ?1", params![bookmark_id])
            .map_err(|e| map_sql_err("delete_bookmark", e))?;
        if changed == 0 {
            return Err(Error::NotFound {
                kind: "bookmark".to_string(),
                id: bookmark_id.to_string(),
            });
        }
        Ok(())
    }

    /// Records a single run of a command/code block. Append-only: there is
    /// no update or delete operation for executions (§3.3).
    pub fn record_execution(
        &self,
        block_id: &str,
        exit_code: i32,
        output: &str,
        duration_ms: i64,
    ) -> Result<BlockExecution, Error> {
        let mut truncated = output.to_string();
        truncated.truncate(EXECUTION_OUTPUT_CAP);

        let execution = BlockExecution {
            id: Uuid::new_v4().to_string(),
            block_id: block_id.to_string(),
            executed_at: Utc::now().to_rfc3339(),
            exit_code,
            output: truncated,
            duration_ms,
        };

        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(
            "INSERT INTO block_executions (id, block_id, executed_at, exit_code, output, duration_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                execution.id,
                execution.block_id,
                execution.executed_at,
                execution.exit_code,
                execution.output,
                execution.duration_ms,
            ],
        )
        .map_err(|e| map_sql_err("record_execution", e))?;

        Ok(execution)
    }

    pub fn list_executions(&self, block_id: &str) -> Result<Vec<BlockExecution>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = conn
            .prepare(
                "SELECT id, block_id, executed_at, exit_code, output, duration_ms \
                 FROM block_executions WHERE block_id = ?1 ORDER BY executed_at ASC",
            )
            .map_err(|e| map_sql_err("list_executions", e))?;

        let rows = stmt
            .query_map(params![block_id], |row| {
                Ok(BlockExecution {
                    id: row.get(0)?,
                    block_id: row.get(1)?,
                    executed_at: row.get(2)?,
                    exit_code: row.get(3)?,
                    output: row.get(4)?,
                    duration_ms: row.get(5)?,
                })
            })
            .map_err(|e| map_sql_err("list_executions", e))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sql_err("list_executions", e))
    }
}

fn row_to_bookmark(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<BlockBookmark, Error>> {
    let tags_json: String = row.get(4)?;
    let id: String = row.get(0)?;
    let block_id: String = row.get(1)?;
    let title: Option<String> = row.get(2)?;
    let note: Option<String> = row.get(3)?;
    let created_at: String = row.get(5)?;
    let tags: Result<Vec<String>, Error> = serde_json::from_str(&tags_json).map_err(|e| Error::DbError {
        operation: "decode bookmark tags".to_string(),
        message: e.to_string(),
    });
    Ok(tags.map(|tags| BlockBookmark {
        id,
        block_id,
        title,
        note,
        tags,
        created_at,
    }))
}

#[cfg(test)]
#[path = "blocks.test.rs"]
mod tests;
