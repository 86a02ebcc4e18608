//! `get_stats` (§4.1): row totals plus on-disk size via a filesystem stat of
//! `conversations.db`, not a SQL `PRAGMA page_count` estimate — the spec
//! asks for the byte size of the file as it sits on disk.

use octave_error::Error;

use crate::db::{Db, map_sql_err};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub conversation_count: i64,
    pub message_count: i64,
    pub block_count: i64,
    pub todo_count: i64,
    pub plan_count: i64,
    pub mcp_call_count: i64,
    pub database_bytes: u64,
}

impl Db {
    pub fn get_stats(&self) -> Result<Stats, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());

        let count = |sql: &str| -> Result<i64, Error> {
            conn.query_row(sql, [], |row| row.get(0))
                .map_err(|e| map_sql_err("get_stats", e))
        };

        let database_bytes = std::fs::metadata(self.paths.conversations_db())
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(Stats {
            conversation_count: count("SELECT COUNT(*) FROM conversations")?,
            message_count: count("SELECT COUNT(*) FROM messages")?,
            block_count: count("SELECT COUNT(*) FROM blocks")?,
            todo_count: count("SELECT COUNT(*) FROM todos")?,
            plan_count: count("SELECT COUNT(*) FROM plans")?,
            mcp_call_count: count("SELECT COUNT(*) FROM mcp_calls")?,
            database_bytes,
        })
    }
}

#[cfg(test)]
#[path = "stats.test.rs"]
mod tests;
