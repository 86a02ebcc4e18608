//! On-request backups (§6): a timestamped copy of `conversations.db` under
//! `backups/`. SQLite's own `VACUUM INTO` gives us a consistent snapshot
//! without holding our write mutex across a raw file copy.

use std::path::PathBuf;

use chrono::Utc;

use octave_error::Error;

use crate::db::{Db, map_sql_err};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub path: PathBuf,
    pub created_at: String,
}

impl Db {
    /// Snapshots `conversations.db` into `backups/conversations-<rfc3339>.db`
    /// via `VACUUM INTO`, which SQLite guarantees is a point-in-time
    /// consistent copy even against an in-progress writer.
    pub fn create_backup(&self) -> Result<BackupInfo, Error> {
        let created_at = Utc::now().to_rfc3339();
        let file_name = format!("conversations-{}.db", created_at.replace([':', '.'], "-"));
        let dest = self.paths.backups_dir().join(file_name);

        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(
            "VACUUM INTO ?1",
            rusqlite::params![dest.to_string_lossy().to_string()],
        )
        .map_err(|e| map_sql_err("create_backup", e))?;

        Ok(BackupInfo {
            path: dest,
            created_at,
        })
    }

    pub fn list_backups(&self) -> Result<Vec<BackupInfo>, Error> {
        let dir = self.paths.backups_dir();
        let mut backups = Vec::new();
        let entries = std::fs::read_dir(&dir).map_err(|e| Error::DbError {
            operation: "list_backups".to_string(),
            message: e.to_string(),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| Error::DbError {
                operation: "list_backups".to_string(),
                message: e.to_string(),
            })?;
            let created_at = entry
                .metadata()
                .ok()
                .and_then(|m| m.created().ok())
                .map(chrono::DateTime::<Utc>::from)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_default();
            backups.push(BackupInfo {
                path: entry.path(),
                created_at,
            });
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(backups)
    }
}

#[cfg(test)]
#[path = "backup.test.rs"]
mod tests;
