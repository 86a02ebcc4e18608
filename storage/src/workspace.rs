//! Per-workspace metadata (§3.1): last active conversation plus an opaque
//! settings envelope.

use rusqlite::{OptionalExtension, params};

use octave_error::Error;
use octave_protocol::WorkspaceMetadata;

use crate::db::{Db, map_sql_err};
use crate::json::{from_json_opt, to_json_opt};

impl Db {
    pub fn get_workspace_metadata(&self, workspace_id: &str) -> Result<Option<WorkspaceMetadata>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.query_row(
            "SELECT workspace_id, last_active_conversation_id, settings \
             FROM workspace_metadata WHERE workspace_id = ?1",
            params![workspace_id],
            row_to_workspace,
        )
        .optional()
        .map_err(|e| map_sql_err("get_workspace_metadata", e))?
        .transpose()
    }

    pub fn set_workspace_metadata(&self, metadata: &WorkspaceMetadata) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let settings = to_json_opt(&metadata.settings);
        conn.execute(
            "INSERT INTO workspace_metadata (workspace_id, last_active_conversation_id, settings) \
             VALUES (?1, ?2, ?3) \
             ON CONFLICT(workspace_id) DO UPDATE SET \
               last_active_conversation_id = excluded.last_active_conversation_id, \
               settings = excluded.settings",
            params![metadata.workspace_id, metadata.last_active_conversation_id, settings],
        )
        .map_err(|e| map_sql_err("set_workspace_metadata", e))?;
        Ok(())
    }
}

fn row_to_workspace(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<WorkspaceMetadata, Error>> {
    let workspace_id = row.get(0)?;
    let last_active_conversation_id = row.get(1)?;
    let settings_text: Option<String> = row.get(2)?;
    Ok(from_json_opt(settings_text).map(|settings| WorkspaceMetadata {
        workspace_id,
        last_active_conversation_id,
        settings,
    }))
}

#[cfg(test)]
#[path = "workspace.test.rs"]
mod tests;
