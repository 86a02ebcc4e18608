//! [`Db`]: the process-wide persistence handle. Owns both SQLite
//! connections behind single-writer mutexes (§5 — "a single write
//! connection funnel"); every operation module in this crate is an `impl
//! Db` block in its own file.

use std::sync::Mutex;

use rusqlite::Connection;

use octave_error::Error;

use crate::migrations::{self, MEMORY_MIGRATIONS, MIGRATIONS};
use crate::paths::DataPaths;

pub struct Db {
    pub(crate) conn: Mutex<Connection>,
    pub(crate) memory_conn: Mutex<Connection>,
    pub(crate) paths: DataPaths,
}

impl Db {
    /// Opens (creating if absent) both databases under `data_dir`, running
    /// the compatibility copy from a legacy `circuit-data/` directory first,
    /// then applying every un-applied migration to each. Returns
    /// `StorageInit` on any failure; a partially applied migration leaves
    /// the database untouched (§4.1).
    pub fn open(data_dir: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let paths = DataPaths::ensure_initialized(data_dir.as_ref())?;

        let mut conn = open_connection(&paths.conversations_db())?;
        let applied = migrations::run_migrations(&mut conn, MIGRATIONS)?;
        write_migration_log(&paths, "conversations.db", &applied);

        let mut memory_conn = open_connection(&paths.memory_db())?;
        let applied_memory = migrations::run_migrations(&mut memory_conn, MEMORY_MIGRATIONS)?;
        write_migration_log(&paths, "memory.db", &applied_memory);

        Ok(Self {
            conn: Mutex::new(conn),
            memory_conn: Mutex::new(memory_conn),
            paths,
        })
    }

}

fn open_connection(path: &std::path::Path) -> Result<Connection, Error> {
    let conn = Connection::open(path).map_err(|e| Error::StorageInit {
        message: format!("failed to open {}: {e}", path.display()),
    })?;

    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| Error::StorageInit {
            message: format!("failed to enable WAL on {}: {e}", path.display()),
        })?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| Error::StorageInit {
            message: format!("failed to enable foreign keys on {}: {e}", path.display()),
        })?;

    Ok(conn)
}

/// Best-effort write of `migration.log.json` (§6). A failure to write the
/// log is not fatal: the migrations themselves already committed.
fn write_migration_log(paths: &DataPaths, db_name: &str, applied: &[&'static str]) {
    if applied.is_empty() {
        return;
    }
    let entry = serde_json::json!({
        "database": db_name,
        "applied": applied,
        "appliedCount": applied.len(),
    });

    let mut log: Vec<serde_json::Value> = std::fs::read(paths.migration_log())
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default();
    log.push(entry);

    if let Ok(bytes) = serde_json::to_vec_pretty(&log) {
        if let Err(e) = std::fs::write(paths.migration_log(), bytes) {
            tracing::warn!(error = %e, "failed to write migration.log.json");
        }
    }
}

/// Maps a raw `rusqlite::Error` onto the core's error taxonomy, tagging it
/// with the logical operation name so every surfaced error says what was
/// being attempted (§4.1 — "SQL errors are wrapped with the operation name").
pub(crate) fn map_sql_err(operation: &str, err: rusqlite::Error) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(inner, _) => match inner.code {
            rusqlite::ErrorCode::ConstraintViolation => Error::DbConstraint {
                operation: operation.to_string(),
                message: err.to_string(),
            },
            rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                Error::DbConflict {
                    operation: operation.to_string(),
                    message: err.to_string(),
                }
            }
            _ => Error::DbError {
                operation: operation.to_string(),
                message: err.to_string(),
            },
        },
        rusqlite::Error::QueryReturnedNoRows => Error::NotFound {
            kind: operation.to_string(),
            id: "<unspecified>".to_string(),
        },
        _ => Error::DbError {
            operation: operation.to_string(),
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
#[path = "db.test.rs"]
mod tests;
