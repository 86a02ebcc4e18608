//! Todo CRUD (§3.1, §4.1). Rows form a forest via nullable `parent_todo_id`
//! with `ON DELETE CASCADE`; `thinking_step_ids`/`block_ids` are JSON-encoded
//! list columns, decoded back on every read.

use rusqlite::{OptionalExtension, params};

use octave_error::Error;
use octave_protocol::{Todo, TodoComplexity, TodoPriority, TodoStatus};

use crate::db::{Db, map_sql_err};
use crate::json::{from_json_str, to_json_string};

impl Db {
    /// UPSERTs a single todo by id.
    pub fn save_todo(&self, todo: &Todo) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        upsert_todo(&conn, todo)
    }

    /// UPSERTs every todo in `todos`, in one transaction.
    pub fn save_todos(&self, todos: &[Todo]) -> Result<(), Error> {
        let mut conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let tx = conn.transaction().map_err(|e| map_sql_err("save_todos", e))?;
        for todo in todos {
            upsert_todo(&tx, todo)?;
        }
        tx.commit().map_err(|e| map_sql_err("save_todos", e))
    }

    pub fn list_todos(&self, conversation_id: &str) -> Result<Vec<Todo>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = conn
            .prepare(
                "SELECT id, conversation_id, message_id, parent_todo_id, todo_order, depth, \
                        content, active_form, status, progress, priority, complexity, \
                        thinking_step_ids, block_ids, estimated_duration_secs, \
                        actual_duration_secs, started_at, completed_at, created_at, updated_at \
                 FROM todos WHERE conversation_id = ?1 ORDER BY todo_order ASC",
            )
            .map_err(|e| map_sql_err("list_todos", e))?;

        let rows = stmt
            .query_map(params![conversation_id], row_to_todo)
            .map_err(|e| map_sql_err("list_todos", e))?;

        rows.collect::<Result<Result<Vec<_>, _>, _>>()
            .map_err(|e| map_sql_err("list_todos", e))?
    }

    pub fn get_todo(&self, todo_id: &str) -> Result<Option<Todo>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.query_row(
            "SELECT id, conversation_id, message_id, parent_todo_id, todo_order, depth, \
                    content, active_form, status, progress, priority, complexity, \
                    thinking_step_ids, block_ids, estimated_duration_secs, \
                    actual_duration_secs, started_at, completed_at, created_at, updated_at \
             FROM todos WHERE id = ?1",
            params![todo_id],
            row_to_todo,
        )
        .optional()
        .map_err(|e| map_sql_err("get_todo", e))?
        .transpose()
    }

    pub fn update_status(
        &self,
        todo_id: &str,
        status: TodoStatus,
        progress: Option<u8>,
        now_ms: i64,
    ) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let changed = conn
            .execute(
                "UPDATE todos SET status = ?1, progress = ?2, updated_at = ?3 WHERE id = ?4",
                params![status_str(status), progress, now_ms, todo_id],
            )
            .map_err(|e| map_sql_err("update_status", e))?;
        if changed == 0 {
            return Err(Error::NotFound {
                kind: "todo".to_string(),
                id: todo_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn update_timing(
        &self,
        todo_id: &str,
        started_at: Option<i64>,
        completed_at: Option<i64>,
        actual_duration_secs: Option<i64>,
        now_ms: i64,
    ) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let changed = conn
            .execute(
                "UPDATE todos SET started_at = ?1, completed_at = ?2, \
                                  actual_duration_secs = ?3, updated_at = ?4 WHERE id = ?5",
                params![started_at, completed_at, actual_duration_secs, now_ms, todo_id],
            )
            .map_err(|e| map_sql_err("update_timing", e))?;
        if changed == 0 {
            return Err(Error::NotFound {
                kind: "todo".to_string(),
                id: todo_id.to_string(),
            });
        }
        Ok(())
    }

    /// Deletes a todo; `ON DELETE CASCADE` removes its descendants.
    pub fn delete_todo(&self, todo_id: &str) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let changed = conn
            .execute("DELETE FROM todos WHERE id = ?1", params![todo_id])
            .map_err(|e| map_sql_err("delete_todo", e))?;
        if changed == 0 {
            return Err(Error::NotFound {
                kind: "todo".to_string(),
                id: todo_id.to_string(),
            });
        }
        Ok(())
    }
}

/// Shared with `plans::execute_plan`, which materializes draft todos inside
/// its own transaction and needs the same UPSERT.
pub(crate) fn upsert_todo(conn: &rusqlite::Connection, todo: &Todo) -> Result<(), Error> {
    let thinking_step_ids = to_json_string(&todo.thinking_step_ids)?;
    let block_ids = to_json_string(&todo.block_ids)?;

    conn.execute(
        "INSERT INTO todos (id, conversation_id, message_id, parent_todo_id, todo_order, depth, \
                             content, active_form, status, progress, priority, complexity, \
                             thinking_step_ids, block_ids, estimated_duration_secs, \
                             actual_duration_secs, started_at, completed_at, created_at, updated_at) \
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20) \
         ON CONFLICT(id) DO UPDATE SET \
           conversation_id = excluded.conversation_id, \
           message_id = excluded.message_id, \
           parent_todo_id = excluded.parent_todo_id, \
           todo_order = excluded.todo_order, \
           depth = excluded.depth, \
           content = excluded.content, \
           active_form = excluded.active_form, \
           status = excluded.status, \
           progress = excluded.progress, \
           priority = excluded.priority, \
           complexity = excluded.complexity, \
           thinking_step_ids = excluded.thinking_step_ids, \
           block_ids = excluded.block_ids, \
           estimated_duration_secs = excluded.estimated_duration_secs, \
           actual_duration_secs = excluded.actual_duration_secs, \
           started_at = excluded.started_at, \
           completed_at = excluded.completed_at, \
           updated_at = excluded.updated_at",
        params![
            todo.id,
            todo.conversation_id,
            todo.message_id,
            todo.parent_todo_id,
            todo.order,
            todo.depth,
            todo.content,
            todo.active_form,
            status_str(todo.status),
            todo.progress,
            priority_str(todo.priority),
            complexity_str(todo.complexity),
            thinking_step_ids,
            block_ids,
            todo.estimated_duration_secs,
            todo.actual_duration_secs,
            todo.started_at,
            todo.completed_at,
            todo.created_at,
            todo.updated_at,
        ],
    )
    .map_err(|e| map_sql_err("save_todo", e))?;

    Ok(())
}

fn status_str(status: TodoStatus) -> &'static str {
    match status {
        TodoStatus::Pending => "pending",
        TodoStatus::InProgress => "in_progress",
        TodoStatus::Completed => "completed",
        TodoStatus::Failed => "failed",
        TodoStatus::Skipped => "skipped",
    }
}

fn status_from_str(s: &str) -> TodoStatus {
    match s {
        "in_progress" => TodoStatus::InProgress,
        "completed" => TodoStatus::Completed,
        "failed" => TodoStatus::Failed,
        "skipped" => TodoStatus::Skipped,
        _ => TodoStatus::Pending,
    }
}

fn priority_str(priority: TodoPriority) -> &'static str {
    match priority {
        TodoPriority::Low => "low",
        TodoPriority::Medium => "medium",
        TodoPriority::High => "high",
        TodoPriority::Critical => "critical",
    }
}

fn priority_from_str(s: &str) -> TodoPriority {
    match s {
        "medium" => TodoPriority::Medium,
        "high" => TodoPriority::High,
        "critical" => TodoPriority::Critical,
        _ => TodoPriority::Low,
    }
}

fn complexity_str(complexity: TodoComplexity) -> &'static str {
    match complexity {
        TodoComplexity::Trivial => "trivial",
        TodoComplexity::Simple => "simple",
        TodoComplexity::Medium => "medium",
        TodoComplexity::Complex => "complex",
        TodoComplexity::VeryComplex => "very_complex",
    }
}

fn complexity_from_str(s: &str) -> TodoComplexity {
    match s {
        "simple" => TodoComplexity::Simple,
        "medium" => TodoComplexity::Medium,
        "complex" => TodoComplexity::Complex,
        "very_complex" => TodoComplexity::VeryComplex,
        _ => TodoComplexity::Trivial,
    }
}

fn row_to_todo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<Todo, Error>> {
    let status: String = row.get(8)?;
    let priority: String = row.get(10)?;
    let complexity: String = row.get(11)?;
    let thinking_step_ids_json: String = row.get(12)?;
    let block_ids_json: String = row.get(13)?;

    let id = row.get(0)?;
    let conversation_id = row.get(1)?;
    let message_id = row.get(2)?;
    let parent_todo_id = row.get(3)?;
    let order = row.get(4)?;
    let depth = row.get(5)?;
    let content = row.get(6)?;
    let active_form = row.get(7)?;
    let progress = row.get(9)?;
    let estimated_duration_secs = row.get(14)?;
    let actual_duration_secs = row.get(15)?;
    let started_at = row.get(16)?;
    let completed_at = row.get(17)?;
    let created_at = row.get(18)?;
    let updated_at = row.get(19)?;

    let decoded = (|| -> Result<Todo, Error> {
        Ok(Todo {
            id,
            conversation_id,
            message_id,
            parent_todo_id,
            order,
            depth,
            content,
            active_form,
            status: status_from_str(&status),
            progress,
            priority: priority_from_str(&priority),
            complexity: complexity_from_str(&complexity),
            thinking_step_ids: from_json_str(&thinking_step_ids_json)?,
            block_ids: from_json_str(&block_ids_json)?,
            estimated_duration_secs,
            actual_duration_secs,
            started_at,
            completed_at,
            created_at,
            updated_at,
        })
    })();

    Ok(decoded)
}

#[cfg(test)]
#[path = "todos.test.rs"]
mod tests;
