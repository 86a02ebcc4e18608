//! Project memory CRUD (§3.1), backed by the separate `memory.db` connection.
//! `(project_path, key)` is enforced unique by the schema's `UNIQUE`
//! constraint (§3.2, §8 universal invariant).

use rusqlite::{OptionalExtension, params};
use uuid::Uuid;

use octave_error::Error;
use octave_protocol::{MemoryPriority, MemoryType, ProjectMemory};

use crate::db::{Db, map_sql_err};

impl Db {
    /// Creates or updates the memory for `(project_path, key)`. On conflict,
    /// `value`/`priority`/`memory_type` are overwritten and `usage_count` is
    /// preserved (a fresh write of the same key is not itself a "use").
    pub fn upsert_project_memory(
        &self,
        project_path: &str,
        memory_type: MemoryType,
        key: &str,
        value: &str,
        priority: MemoryPriority,
        now_ms: i64,
    ) -> Result<ProjectMemory, Error> {
        let conn = self.memory_conn.lock().unwrap_or_else(|e| e.into_inner());
        let id = Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO project_memories (id, project_path, memory_type, key, value, priority, \
                                            usage_count, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7) \
             ON CONFLICT(project_path, key) DO UPDATE SET \
               memory_type = excluded.memory_type, \
               value = excluded.value, \
               priority = excluded.priority, \
               updated_at = excluded.updated_at",
            params![
                id,
                project_path,
                memory_type_str(memory_type),
                key,
                value,
                priority_str(priority),
                now_ms,
            ],
        )
        .map_err(|e| map_sql_err("upsert_project_memory", e))?;

        get_by_key(&conn, project_path, key)?.ok_or_else(|| Error::DbError {
            operation: "upsert_project_memory".to_string(),
            message: "row missing immediately after upsert".to_string(),
        })
    }

    pub fn get_project_memory(&self, project_path: &str, key: &str) -> Result<Option<ProjectMemory>, Error> {
        let conn = self.memory_conn.lock().unwrap_or_else(|e| e.into_inner());
        get_by_key(&conn, project_path, key)
    }

    pub fn list_project_memories(&self, project_path: &str) -> Result<Vec<ProjectMemory>, Error> {
        let conn = self.memory_conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = conn
            .prepare(
                "SELECT id, project_path, memory_type, key, value, priority, usage_count, \
                        created_at, updated_at \
                 FROM project_memories WHERE project_path = ?1 ORDER BY updated_at DESC",
            )
            .map_err(|e| map_sql_err("list_project_memories", e))?;

        let rows = stmt
            .query_map(params![project_path], row_to_memory)
            .map_err(|e| map_sql_err("list_project_memories", e))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sql_err("list_project_memories", e))
    }

    /// Increments `usage_count` by one, for callers that track how often a
    /// remembered fact is actually consulted.
    pub fn record_memory_usage(&self, memory_id: &str) -> Result<(), Error> {
        let conn = self.memory_conn.lock().unwrap_or_else(|e| e.into_inner());
        let changed = conn
            .execute(
                "UPDATE project_memories SET usage_count = usage_count + 1 WHERE id = ?1",
                params![memory_id],
            )
            .map_err(|e| map_sql_err("record_memory_usage", e))?;
        if changed == 0 {
            return Err(Error::NotFound {
                kind: "project_memory".to_string(),
                id: memory_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn delete_project_memory(&self, memory_id: &str) -> Result<(), Error> {
        let conn = self.memory_conn.lock().unwrap_or_else(|e| e.into_inner());
        let changed = conn
            .execute("DELETE FROM project_memories WHERE id = ?1", params![memory_id])
            .map_err(|e| map_sql_err("delete_project_memory", e))?;
        if changed == 0 {
            return Err(Error::NotFound {
                kind: "project_memory".to_string(),
                id: memory_id.to_string(),
            });
        }
        Ok(())
    }
}

fn get_by_key(
    conn: &rusqlite::Connection,
    project_path: &str,
    key: &str,
) -> Result<Option<ProjectMemory>, Error> {
    conn.query_row(
        "SELECT id, project_path, memory_type, key, value, priority, usage_count, created_at, updated_at \
         FROM project_memories WHERE project_path = ?1 AND key = ?2",
        params![project_path, key],
        row_to_memory,
    )
    .optional()
    .map_err(|e| map_sql_err("get_project_memory", e))
}

fn memory_type_str(memory_type: MemoryType) -> &'static str {
    match memory_type {
        MemoryType::Convention => "convention",
        MemoryType::Decision => "decision",
        MemoryType::Snippet => "snippet",
        MemoryType::Rule => "rule",
        MemoryType::Note => "note",
    }
}

fn memory_type_from_str(s: &str) -> MemoryType {
    match s {
        "decision" => MemoryType::Decision,
        "snippet" => MemoryType::Snippet,
        "rule" => MemoryType::Rule,
        "note" => MemoryType::Note,
        _ => MemoryType::Convention,
    }
}

fn priority_str(priority: MemoryPriority) -> &'static str {
    match priority {
        MemoryPriority::Low => "low",
        MemoryPriority::Medium => "medium",
        MemoryPriority::High => "high",
    }
}

fn priority_from_str(s: &str) -> MemoryPriority {
    match s {
        "medium" => MemoryPriority::Medium,
        "high" => MemoryPriority::High,
        _ => MemoryPriority::Low,
    }
}

fn row_to_memory(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectMemory> {
    let memory_type: String = row.get(2)?;
    let priority: String = row.get(5)?;
    let usage_count: i64 = row.get(6)?;
    Ok(ProjectMemory {
        id: row.get(0)?,
        project_path: row.get(1)?,
        memory_type: memory_type_from_str(&memory_type),
        key: row.get(3)?,
        value: row.get(4)?,
        priority: priority_from_str(&priority),
        usage_count: usage_count as u64,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[cfg(test)]
#[path = "memory.test.rs"]
mod tests;
