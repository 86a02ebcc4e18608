//! Message + block writes (§4.1). [`Db::save_message_with_blocks`] is the
//! only sanctioned way to write an assistant message's body: it UPSERTs the
//! message, deletes every existing block for it keyed by `message_id`, and
//! re-inserts the supplied set — never a caller-provided id list, which is
//! what makes a retry safe (§4.1 "Algorithms / edge cases").

use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use octave_error::Error;
use octave_protocol::{Block, BlockType, Message, Role};

use crate::db::{Db, map_sql_err};
use crate::json::{from_json_opt, to_json_opt};

impl Db {
    pub fn get_message(&self, message_id: &str) -> Result<Option<Message>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.query_row(
            "SELECT id, conversation_id, role, content, timestamp, metadata \
             FROM messages WHERE id = ?1",
            params![message_id],
            row_to_message,
        )
        .optional()
        .map_err(|e| map_sql_err("get_message", e))?
        .transpose()
    }

    pub fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = conn
            .prepare(
                "SELECT id, conversation_id, role, content, timestamp, metadata \
                 FROM messages WHERE conversation_id = ?1 ORDER BY timestamp ASC",
            )
            .map_err(|e| map_sql_err("list_messages", e))?;

        let rows = stmt
            .query_map(params![conversation_id], row_to_message)
            .map_err(|e| map_sql_err("list_messages", e))?;

        rows.collect::<Result<Result<Vec<_>, _>, _>>()
            .map_err(|e| map_sql_err("list_messages", e))?
    }

    pub fn get_blocks(&self, message_id: &str) -> Result<Vec<Block>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        Self::get_blocks_with_conn(&conn, message_id)
    }

    fn get_blocks_with_conn(conn: &rusqlite::Connection, message_id: &str) -> Result<Vec<Block>, Error> {
        let mut stmt = conn
            .prepare(
                "SELECT id, message_id, block_type, content, metadata, block_order, created_at \
                 FROM blocks WHERE message_id = ?1 ORDER BY block_order ASC",
            )
            .map_err(|e| map_sql_err("get_blocks", e))?;

        let rows = stmt
            .query_map(params![message_id], row_to_block)
            .map_err(|e| map_sql_err("get_blocks", e))?;

        rows.collect::<Result<Result<Vec<_>, _>, _>>()
            .map_err(|e| map_sql_err("get_blocks", e))?
    }

    /// UPSERTs `message` by id (rewriting content/metadata/timestamp on
    /// conflict), replaces all of its blocks with `blocks`, then touches the
    /// owning conversation. One transaction (§4.1, §8 scenario 1).
    pub fn save_message_with_blocks(&self, message: &Message, blocks: &[Block]) -> Result<(), Error> {
        let mut conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let tx = conn
            .transaction()
            .map_err(|e| map_sql_err("save_message_with_blocks", e))?;

        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        let metadata = to_json_opt(&message.metadata);

        tx.execute(
            "INSERT INTO messages (id, conversation_id, role, content, timestamp, metadata) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(id) DO UPDATE SET \
               content = excluded.content, \
               metadata = excluded.metadata, \
               timestamp = excluded.timestamp",
            params![
                message.id,
                message.conversation_id,
                role,
                message.content,
                message.timestamp,
                metadata,
            ],
        )
        .map_err(|e| map_sql_err("save_message_with_blocks", e))?;

        // Keyed by message_id, never by any block-id list the caller
        // supplied — this is what makes a retry (re-save with a different
        // block set) safe.
        tx.execute("DELETE FROM blocks WHERE message_id = ?1", params![message.id])
            .map_err(|e| map_sql_err("save_message_with_blocks", e))?;

        for block in blocks {
            let block_metadata = to_json_opt(&block.metadata);
            tx.execute(
                "INSERT INTO blocks (id, message_id, block_type, content, metadata, block_order, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    block.id,
                    message.id,
                    block.block_type.as_str(),
                    block.content,
                    block_metadata,
                    block.order,
                    block.created_at,
                ],
            )
            .map_err(|e| map_sql_err("save_message_with_blocks", e))?;
        }

        let now = Utc::now().to_rfc3339();
        tx.execute(
            "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
            params![now, message.conversation_id],
        )
        .map_err(|e| map_sql_err("save_message_with_blocks", e))?;

        tx.commit().map_err(|e| map_sql_err("save_message_with_blocks", e))
    }

    /// Deletes every message in `conversation_id` with `timestamp` strictly
    /// greater than the pivot's, cascading to their blocks and todos. Used
    /// by the retry flow (§8 scenario 6).
    pub fn delete_messages_after(
        &self,
        conversation_id: &str,
        pivot_message_id: &str,
    ) -> Result<usize, Error> {
        let mut conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let tx = conn
            .transaction()
            .map_err(|e| map_sql_err("delete_messages_after", e))?;

        let pivot_ts: i64 = tx
            .query_row(
                "SELECT timestamp FROM messages WHERE id = ?1 AND conversation_id = ?2",
                params![pivot_message_id, conversation_id],
                |row| row.get(0),
            )
            .map_err(|_| Error::NotFound {
                kind: "message".to_string(),
                id: pivot_message_id.to_string(),
            })?;

        let deleted = tx
            .execute(
                "DELETE FROM messages WHERE conversation_id = ?1 AND timestamp > ?2",
                params![conversation_id, pivot_ts],
            )
            .map_err(|e| map_sql_err("delete_messages_after", e))?;

        tx.commit().map_err(|e| map_sql_err("delete_messages_after", e))?;
        Ok(deleted)
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<Message, Error>> {
    let role_str: String = row.get(2)?;
    let role = match role_str.as_str() {
        "user" => Role::User,
        _ => Role::Assistant,
    };
    let metadata_text: Option<String> = row.get(5)?;
    Ok(from_json_opt(metadata_text).map(|metadata| Message {
        id: row.get(0).unwrap_or_default(),
        conversation_id: row.get(1).unwrap_or_default(),
        role,
        content: row.get(3).unwrap_or_default(),
        timestamp: row.get(4).unwrap_or_default(),
        metadata,
    }))
}

fn row_to_block(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<Block, Error>> {
    let type_str: String = row.get(2)?;
    let block_type = BlockType::from_str(&type_str).unwrap_or(BlockType::Text);
    let metadata_text: Option<String> = row.get(4)?;
    Ok(from_json_opt(metadata_text).map(|metadata| Block {
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
#[path = "messages.test.rs"]
mod tests;
