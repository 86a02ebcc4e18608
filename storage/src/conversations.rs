//! Conversation CRUD (§4.1). `create_conversation` does not deactivate
//! siblings — that is `set_active`'s job — so callers control whether a new
//! conversation takes over the workspace's active slot.

use chrono::Utc;
use rusqlite::{OptionalExtension, params};
use uuid::Uuid;

use octave_error::Error;
use octave_protocol::Conversation;

use crate::db::{Db, map_sql_err};

impl Db {
    pub fn list_conversations(&self, workspace_id: &str) -> Result<Vec<Conversation>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = conn
            .prepare(
                "SELECT id, workspace_id, title, created_at, updated_at, active \
                 FROM conversations WHERE workspace_id = ?1 ORDER BY updated_at DESC",
            )
            .map_err(|e| map_sql_err("list_conversations", e))?;

        let rows = stmt
            .query_map(params![workspace_id], row_to_conversation)
            .map_err(|e| map_sql_err("list_conversations", e))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sql_err("list_conversations", e))
    }

    pub fn get_conversation(&self, conversation_id: &str) -> Result<Option<Conversation>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.query_row(
            "SELECT id, workspace_id, title, created_at, updated_at, active \
             FROM conversations WHERE id = ?1",
            params![conversation_id],
            row_to_conversation,
        )
        .optional()
        .map_err(|e| map_sql_err("get_conversation", e))
    }

    pub fn get_active_conversation(&self, workspace_id: &str) -> Result<Option<Conversation>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.query_row(
            "SELECT id, workspace_id, title, created_at, updated_at, active \
             FROM conversations WHERE workspace_id = ?1 AND active = 1",
            params![workspace_id],
            row_to_conversation,
        )
        .optional()
        .map_err(|e| map_sql_err("get_active_conversation", e))
    }

    /// Creates a new conversation, active by default. Does **not** deactivate
    /// any other conversation in the workspace; use [`Db::set_active`] for
    /// that transition.
    pub fn create_conversation(
        &self,
        workspace_id: &str,
        title: Option<String>,
    ) -> Result<Conversation, Error> {
        let now = Utc::now().to_rfc3339();
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            workspace_id: workspace_id.to_string(),
            title,
            created_at: now.clone(),
            updated_at: now,
            active: true,
        };

        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(
            "INSERT INTO conversations (id, workspace_id, title, created_at, updated_at, active) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                conversation.id,
                conversation.workspace_id,
                conversation.title,
                conversation.created_at,
                conversation.updated_at,
                conversation.active,
            ],
        )
        .map_err(|e| map_sql_err("create_conversation", e))?;

        Ok(conversation)
    }

    /// Deactivates every conversation in `workspace_id`, then activates
    /// `conversation_id`. Both steps run in one transaction so a reader never
    /// observes zero or two active conversations (§3.2, §8 scenario 3).
    pub fn set_active(&self, workspace_id: &str, conversation_id: &str) -> Result<(), Error> {
        let mut conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let tx = conn.transaction().map_err(|e| map_sql_err("set_active", e))?;

        tx.execute(
            "UPDATE conversations SET active = 0 WHERE workspace_id = ?1",
            params![workspace_id],
        )
        .map_err(|e| map_sql_err("set_active", e))?;

        let changed = tx
            .execute(
                "UPDATE conversations SET active = 1 WHERE id = ?1 AND workspace_id = ?2",
                params![conversation_id, workspace_id],
            )
            .map_err(|e| map_sql_err("set_active", e))?;

        if changed == 0 {
            return Err(Error::NotFound {
                kind: "conversation".to_string(),
                id: conversation_id.to_string(),
            });
        }

        tx.commit().map_err(|e| map_sql_err("set_active", e))
    }

    /// Sets `updated_at = now` on `conversation_id`. Called after every
    /// child-message write (§3.3).
    pub fn touch(&self, conversation_id: &str) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
            params![now, conversation_id],
        )
        .map_err(|e| map_sql_err("touch", e))?;
        Ok(())
    }

    pub fn rename_conversation(&self, conversation_id: &str, title: String) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let changed = conn
            .execute(
                "UPDATE conversations SET title = ?1 WHERE id = ?2",
                params![title, conversation_id],
            )
            .map_err(|e| map_sql_err("rename_conversation", e))?;
        if changed == 0 {
            return Err(Error::NotFound {
                kind: "conversation".to_string(),
                id: conversation_id.to_string(),
            });
        }
        Ok(())
    }

    /// Deletes a conversation and, via `ON DELETE CASCADE`, its messages,
    /// blocks, and todos.
    pub fn delete_conversation(&self, conversation_id: &str) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let changed = conn
            .execute("DELETE FROM conversations WHERE id = ?1", params![conversation_id])
            .map_err(|e| map_sql_err("delete_conversation", e))?;
        if changed == 0 {
            return Err(Error::NotFound {
                kind: "conversation".to_string(),
                id: conversation_id.to_string(),
            });
        }
        Ok(())
    }
}

fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        title: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
        active: row.get(5)?,
    })
}

#[cfg(test)]
#[path = "conversations.test.rs"]
mod tests;
