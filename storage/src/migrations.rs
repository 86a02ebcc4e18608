//! The fixed, linear migration sequence applied to `conversations.db`.
//!
//! Each [`Migration`] is applied at most once: [`run_migrations`] reads the
//! highest version recorded in `schema_version`, then applies every later
//! migration in order inside its own transaction, so a crash mid-migration
//! never leaves a partially-applied version recorded. Migrations never run
//! twice; [`run_migrations`] is safe to call on every `Db::open`.

use rusqlite::{Connection, Transaction};

use octave_error::Error;

pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub up: fn(&Transaction<'_>) -> rusqlite::Result<()>,
}

/// The original block types the schema shipped with; `file-summary` was
/// added later by [`widen_block_type_check`], which is why that migration
/// has to rebuild the table instead of altering the constraint in place.
const BLOCK_TYPES_V1: &str = "'text','code','command','file','diff','error','result','diagram','link','quote','list','table','tool','checklist'";
const BLOCK_TYPES_V6: &str = "'text','code','command','file','diff','error','result','diagram','link','quote','list','table','tool','checklist','file-summary'";

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_conversations_messages_blocks",
        up: create_conversations_messages_blocks,
    },
    Migration {
        version: 2,
        name: "create_block_bookmarks_and_executions",
        up: create_block_bookmarks_and_executions,
    },
    Migration {
        version: 3,
        name: "create_todos_plans_workspace_metadata",
        up: create_todos_plans_workspace_metadata,
    },
    Migration {
        version: 4,
        name: "create_block_fts_index",
        up: create_block_fts_index,
    },
    Migration {
        version: 5,
        name: "drop_block_fts_index",
        up: drop_block_fts_index,
    },
    Migration {
        version: 6,
        name: "widen_block_type_check",
        up: widen_block_type_check,
    },
    Migration {
        version: 7,
        name: "create_mcp_calls",
        up: create_mcp_calls,
    },
];

fn create_conversations_messages_blocks(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS conversations (
            id TEXT PRIMARY KEY,
            workspace_id TEXT NOT NULL,
            title TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_conversations_workspace ON conversations(workspace_id);
        CREATE INDEX IF NOT EXISTS idx_conversations_updated ON conversations(updated_at DESC);

        CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
            role TEXT NOT NULL CHECK(role IN ('user','assistant')),
            content TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            metadata TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id, timestamp);

        CREATE TABLE IF NOT EXISTS blocks (
            id TEXT PRIMARY KEY,
            message_id TEXT NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
            block_type TEXT NOT NULL CHECK(block_type IN ({BLOCK_TYPES_V1})),
            content TEXT NOT NULL,
            metadata TEXT,
            block_order INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_blocks_message ON blocks(message_id, block_order);"
    ))
}

fn create_block_bookmarks_and_executions(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS block_bookmarks (
            id TEXT PRIMARY KEY,
            block_id TEXT NOT NULL REFERENCES blocks(id) ON DELETE CASCADE,
            title TEXT,
            note TEXT,
            tags TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_block_bookmarks_block ON block_bookmarks(block_id);

        CREATE TABLE IF NOT EXISTS block_executions (
            id TEXT PRIMARY KEY,
            block_id TEXT NOT NULL REFERENCES blocks(id) ON DELETE CASCADE,
            executed_at TEXT NOT NULL,
            exit_code INTEGER NOT NULL,
            output TEXT NOT NULL,
            duration_ms INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_block_executions_block ON block_executions(block_id);",
    )
}

fn create_todos_plans_workspace_metadata(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS todos (
            id TEXT PRIMARY KEY,
            conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
            message_id TEXT NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
            parent_todo_id TEXT REFERENCES todos(id) ON DELETE CASCADE,
            todo_order INTEGER NOT NULL,
            depth INTEGER NOT NULL,
            content TEXT NOT NULL,
            active_form TEXT NOT NULL,
            status TEXT NOT NULL,
            progress INTEGER,
            priority TEXT NOT NULL,
            complexity TEXT NOT NULL,
            thinking_step_ids TEXT NOT NULL,
            block_ids TEXT NOT NULL,
            estimated_duration_secs INTEGER,
            actual_duration_secs INTEGER,
            started_at INTEGER,
            completed_at INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_todos_conversation ON todos(conversation_id, todo_order);
        CREATE INDEX IF NOT EXISTS idx_todos_parent ON todos(parent_todo_id);

        CREATE TABLE IF NOT EXISTS plans (
            id TEXT PRIMARY KEY,
            workspace_id TEXT NOT NULL,
            goal TEXT NOT NULL,
            plan_document TEXT NOT NULL,
            todos TEXT NOT NULL,
            total_todo_count INTEGER NOT NULL,
            total_estimated_duration_secs INTEGER NOT NULL,
            status TEXT NOT NULL,
            ai_analysis TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_plans_workspace ON plans(workspace_id);

        CREATE TABLE IF NOT EXISTS workspace_metadata (
            workspace_id TEXT PRIMARY KEY,
            last_active_conversation_id TEXT,
            settings TEXT
        );",
    )
}

/// Adds an FTS5 index over block content, with triggers to keep it in sync.
/// Dropped two versions later by [`drop_block_fts_index`] — the triggers
/// this migration installs deadlock against the `save_message_with_blocks`
/// delete-then-reinsert pattern under concurrent writers.
fn create_block_fts_index(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(
        "CREATE VIRTUAL TABLE IF NOT EXISTS blocks_fts USING fts5(content, content='blocks', content_rowid='rowid');
        CREATE TRIGGER IF NOT EXISTS blocks_fts_ai AFTER INSERT ON blocks BEGIN
            INSERT INTO blocks_fts(rowid, content) VALUES (new.rowid, new.content);
        END;
        CREATE TRIGGER IF NOT EXISTS blocks_fts_ad AFTER DELETE ON blocks BEGIN
            INSERT INTO blocks_fts(blocks_fts, rowid, content) VALUES ('delete', old.rowid, old.content);
        END;
        CREATE TRIGGER IF NOT EXISTS blocks_fts_au AFTER UPDATE ON blocks BEGIN
            INSERT INTO blocks_fts(blocks_fts, rowid, content) VALUES ('delete', old.rowid, old.content);
            INSERT INTO blocks_fts(rowid, content) VALUES (new.rowid, new.content);
        END;",
    )
}

/// Removes the FTS5 index and its triggers. `search_blocks` falls back to a
/// substring scan (see `crate::search`) from this version forward.
fn drop_block_fts_index(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(
        "DROP TRIGGER IF EXISTS blocks_fts_ai;
        DROP TRIGGER IF EXISTS blocks_fts_ad;
        DROP TRIGGER IF EXISTS blocks_fts_au;
        DROP TABLE IF EXISTS blocks_fts;",
    )
}

/// Widens the `block_type` CHECK constraint to admit `file-summary`. SQLite
/// cannot `ALTER TABLE ... ALTER COLUMN` a CHECK constraint, so this rebuilds
/// the table: rename the old one aside, create the new one with the wider
/// constraint, copy rows across, drop the old table, then recreate indexes.
/// Every step uses `IF EXISTS`/`IF NOT EXISTS` so a re-open that crashed
/// partway through a previous attempt can resume from any point.
fn widen_block_type_check(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    let old_exists: bool = tx.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='blocks'",
        [],
        |row| row.get::<_, i64>(0),
    )? > 0;
    let new_exists: bool = tx.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='blocks_v6'",
        [],
        |row| row.get::<_, i64>(0),
    )? > 0;

    if !new_exists {
        tx.execute_batch(&format!(
            "CREATE TABLE blocks_v6 (
                id TEXT PRIMARY KEY,
                message_id TEXT NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
                block_type TEXT NOT NULL CHECK(block_type IN ({BLOCK_TYPES_V6})),
                content TEXT NOT NULL,
                metadata TEXT,
                block_order INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );"
        ))?;
    }

    if old_exists {
        tx.execute_batch(
            "INSERT INTO blocks_v6 SELECT id, message_id, block_type, content, metadata, block_order, created_at FROM blocks;
            DROP TABLE blocks;",
        )?;
    }

    tx.execute_batch(
        "ALTER TABLE blocks_v6 RENAME TO blocks;
        CREATE INDEX IF NOT EXISTS idx_blocks_message ON blocks(message_id, block_order);",
    )
}

fn create_mcp_calls(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS mcp_calls (
            id TEXT PRIMARY KEY,
            timestamp INTEGER NOT NULL,
            duration_ms INTEGER,
            server_id TEXT NOT NULL,
            server_name TEXT NOT NULL,
            method TEXT NOT NULL,
            tool_name TEXT NOT NULL,
            request_params TEXT NOT NULL,
            response_result TEXT,
            response_error TEXT,
            status TEXT NOT NULL CHECK(status IN ('pending','success','error','timeout'))
        );
        CREATE INDEX IF NOT EXISTS idx_mcp_calls_timestamp ON mcp_calls(timestamp DESC);
        CREATE INDEX IF NOT EXISTS idx_mcp_calls_server ON mcp_calls(server_id);",
    )
}

/// The `memory.db` schema is a single table; small enough that it does not
/// warrant its own module, but it goes through the exact same
/// [`run_migrations`] machinery so a crash mid-migration is just as safe.
pub const MEMORY_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "create_project_memories",
    up: create_project_memories,
}];

fn create_project_memories(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS project_memories (
            id TEXT PRIMARY KEY,
            project_path TEXT NOT NULL,
            memory_type TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            priority TEXT NOT NULL,
            usage_count INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE(project_path, key)
        );
        CREATE INDEX IF NOT EXISTS idx_project_memories_path ON project_memories(project_path);",
    )
}

/// Applies every migration in `migrations` with `version` greater than the
/// highest one already recorded in this connection's `schema_version`
/// table, each inside its own transaction. Returns the list of migrations
/// actually applied, in order, for `migration.log.json`.
pub fn run_migrations(
    conn: &mut Connection,
    migrations: &[Migration],
) -> Result<Vec<&'static str>, Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        );",
    )
    .map_err(|e| Error::StorageInit {
        message: format!("failed to create schema_version table: {e}"),
    })?;

    let current: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| {
            row.get(0)
        })
        .map_err(|e| Error::StorageInit {
            message: format!("failed to read schema_version: {e}"),
        })?;

    let mut applied = Vec::new();
    for migration in migrations.iter().filter(|m| m.version > current) {
        let tx = conn.transaction().map_err(|e| Error::StorageInit {
            message: format!("failed to start migration transaction: {e}"),
        })?;

        (migration.up)(&tx).map_err(|e| Error::StorageInit {
            message: format!("migration {} ({}) failed: {e}", migration.version, migration.name),
        })?;

        let applied_at = chrono::Utc::now().to_rfc3339();
        tx.execute(
            "INSERT INTO schema_version (version, name, applied_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![migration.version, migration.name, applied_at],
        )
        .map_err(|e| Error::StorageInit {
            message: format!("failed to record migration {}: {e}", migration.version),
        })?;

        tx.commit().map_err(|e| Error::StorageInit {
            message: format!("failed to commit migration {}: {e}", migration.version),
        })?;

        tracing::info!(version = migration.version, name = migration.name, "applied migration");
        applied.push(migration.name);
    }

    Ok(applied)
}

#[cfg(test)]
#[path = "migrations.test.rs"]
mod tests;
