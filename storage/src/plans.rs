//! Plan CRUD and `plan:execute` materialization (§3.1, §4.1). A [`Plan`]
//! carries its todos as an embedded JSON draft list until execution expands
//! them into real [`octave_protocol::Todo`] rows inside one transaction.

use rusqlite::{OptionalExtension, params};
use uuid::Uuid;

use octave_error::Error;
use octave_protocol::{Plan, PlanStatus, PlanTodoDraft, Todo, TodoStatus};

use crate::db::{Db, map_sql_err};
use crate::json::{from_json_opt, from_json_str, to_json_opt, to_json_string};

impl Db {
    pub fn create_plan(
        &self,
        workspace_id: &str,
        goal: String,
        plan_document: String,
        todos: Vec<PlanTodoDraft>,
        now_ms: i64,
    ) -> Result<Plan, Error> {
        let total_estimated_duration_secs = todos
            .iter()
            .filter_map(|t| t.estimated_duration_secs)
            .sum();

        let plan = Plan {
            id: Uuid::new_v4().to_string(),
            workspace_id: workspace_id.to_string(),
            goal,
            plan_document,
            total_todo_count: todos.len(),
            total_estimated_duration_secs,
            todos,
            status: PlanStatus::Pending,
            ai_analysis: None,
            created_at: now_ms,
            updated_at: now_ms,
        };

        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        insert_plan(&conn, &plan)?;
        Ok(plan)
    }

    pub fn get_plan(&self, plan_id: &str) -> Result<Option<Plan>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.query_row(
            "SELECT id, workspace_id, goal, plan_document, todos, total_todo_count, \
                    total_estimated_duration_secs, status, ai_analysis, created_at, updated_at \
             FROM plans WHERE id = ?1",
            params![plan_id],
            row_to_plan,
        )
        .optional()
        .map_err(|e| map_sql_err("get_plan", e))?
        .transpose()
    }

    pub fn list_plans(&self, workspace_id: &str) -> Result<Vec<Plan>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = conn
            .prepare(
                "SELECT id, workspace_id, goal, plan_document, todos, total_todo_count, \
                        total_estimated_duration_secs, status, ai_analysis, created_at, updated_at \
                 FROM plans WHERE workspace_id = ?1 ORDER BY created_at DESC",
            )
            .map_err(|e| map_sql_err("list_plans", e))?;

        let rows = stmt
            .query_map(params![workspace_id], row_to_plan)
            .map_err(|e| map_sql_err("list_plans", e))?;

        rows.collect::<Result<Result<Vec<_>, _>, _>>()
            .map_err(|e| map_sql_err("list_plans", e))?
    }

    pub fn update_plan(&self, plan: &Plan) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        insert_plan(&conn, plan)
    }

    /// Materializes `plan.todos` into real [`Todo`] rows attached to
    /// `message_id`, then marks the plan `Active`. One transaction: either
    /// every todo row is created and the plan transitions, or neither.
    pub fn execute_plan(&self, plan_id: &str, message_id: &str, now_ms: i64) -> Result<Vec<Todo>, Error> {
        let mut conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let tx = conn.transaction().map_err(|e| map_sql_err("execute_plan", e))?;

        let plan = tx
            .query_row(
                "SELECT id, workspace_id, goal, plan_document, todos, total_todo_count, \
                        total_estimated_duration_secs, status, ai_analysis, created_at, updated_at \
                 FROM plans WHERE id = ?1",
                params![plan_id],
                row_to_plan,
            )
            .optional()
            .map_err(|e| map_sql_err("execute_plan", e))?
            .ok_or_else(|| Error::NotFound {
                kind: "plan".to_string(),
                id: plan_id.to_string(),
            })??;

        let conversation_id = tx
            .query_row(
                "SELECT conversation_id FROM messages WHERE id = ?1",
                params![message_id],
                |row| row.get::<_, String>(0),
            )
            .map_err(|_| Error::NotFound {
                kind: "message".to_string(),
                id: message_id.to_string(),
            })?;

        let mut materialized = Vec::with_capacity(plan.todos.len());
        for (index, draft) in plan.todos.iter().enumerate() {
            let todo = Todo {
                id: Uuid::new_v4().to_string(),
                conversation_id: conversation_id.clone(),
                message_id: message_id.to_string(),
                parent_todo_id: None,
                order: index as i64,
                depth: 0,
                content: draft.content.clone(),
                active_form: draft.active_form.clone(),
                status: TodoStatus::Pending,
                progress: None,
                priority: draft.priority,
                complexity: draft.complexity,
                thinking_step_ids: Vec::new(),
                block_ids: Vec::new(),
                estimated_duration_secs: draft.estimated_duration_secs,
                actual_duration_secs: None,
                started_at: None,
                completed_at: None,
                created_at: now_ms,
                updated_at: now_ms,
            };
            crate::todos::upsert_todo(&tx, &todo)?;
            materialized.push(todo);
        }

        tx.execute(
            "UPDATE plans SET status = 'active', updated_at = ?1 WHERE id = ?2",
            params![now_ms, plan_id],
        )
        .map_err(|e| map_sql_err("execute_plan", e))?;

        tx.commit().map_err(|e| map_sql_err("execute_plan", e))?;
        Ok(materialized)
    }
}

fn insert_plan(conn: &rusqlite::Connection, plan: &Plan) -> Result<(), Error> {
    let todos_json = to_json_string(&plan.todos)?;
    let ai_analysis = to_json_opt(&plan.ai_analysis);

    conn.execute(
        "INSERT INTO plans (id, workspace_id, goal, plan_document, todos, total_todo_count, \
                             total_estimated_duration_secs, status, ai_analysis, created_at, updated_at) \
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11) \
         ON CONFLICT(id) DO UPDATE SET \
           goal = excluded.goal, \
           plan_document = excluded.plan_document, \
           todos = excluded.todos, \
           total_todo_count = excluded.total_todo_count, \
           total_estimated_duration_secs = excluded.total_estimated_duration_secs, \
           status = excluded.status, \
           ai_analysis = excluded.ai_analysis, \
           updated_at = excluded.updated_at",
        params![
            plan.id,
            plan.workspace_id,
            plan.goal,
            plan.plan_document,
            todos_json,
            plan.total_todo_count,
            plan.total_estimated_duration_secs,
            status_str(plan.status),
            ai_analysis,
            plan.created_at,
            plan.updated_at,
        ],
    )
    .map_err(|e| map_sql_err("save_plan", e))?;
    Ok(())
}

fn status_str(status: PlanStatus) -> &'static str {
    match status {
        PlanStatus::Pending => "pending",
        PlanStatus::Active => "active",
        PlanStatus::Completed => "completed",
        PlanStatus::Cancelled => "cancelled",
    }
}

fn status_from_str(s: &str) -> PlanStatus {
    match s {
        "active" => PlanStatus::Active,
        "completed" => PlanStatus::Completed,
        "cancelled" => PlanStatus::Cancelled,
        _ => PlanStatus::Pending,
    }
}

fn row_to_plan(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<Plan, Error>> {
    let todos_json: String = row.get(4)?;
    let status: String = row.get(7)?;
    let ai_analysis_text: Option<String> = row.get(8)?;

    let id = row.get(0)?;
    let workspace_id = row.get(1)?;
    let goal = row.get(2)?;
    let plan_document = row.get(3)?;
    let total_todo_count: i64 = row.get(5)?;
    let total_estimated_duration_secs = row.get(6)?;
    let created_at = row.get(9)?;
    let updated_at = row.get(10)?;

    let decoded = (|| -> Result<Plan, Error> {
        let todos: Vec<PlanTodoDraft> = from_json_str(&todos_json)?;
        let ai_analysis = from_json_opt(ai_analysis_text)?;
        Ok(Plan {
            id,
            workspace_id,
            goal,
            plan_document,
            todos,
            total_todo_count: total_todo_count as usize,
            total_estimated_duration_secs,
            status: status_from_str(&status),
            ai_analysis,
            created_at,
            updated_at,
        })
    })();

    Ok(decoded)
}

#[cfg(test)]
#[path = "plans.test.rs"]
mod tests;
