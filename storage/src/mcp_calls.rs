//! MCP call history (§3.1, §3.3): written once in `Pending` state by the
//! proxy before it forwards a request, then transitioned to a terminal
//! state by a single follow-up update keyed on the same id. Never deleted
//! programmatically.

use rusqlite::{OptionalExtension, params};

use octave_error::Error;
use octave_protocol::{McpCall, McpCallStatus};

use crate::db::{Db, map_sql_err};

impl Db {
    /// Inserts a call row in `Pending` state, as the proxy does immediately
    /// before forwarding a `tools/call` request (§4.2).
    pub fn insert_pending_call(&self, call: &McpCall) -> Result<(), Error> {
        debug_assert!(call.status == McpCallStatus::Pending);
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(
            "INSERT INTO mcp_calls (id, timestamp, duration_ms, server_id, server_name, method, \
                                     tool_name, request_params, response_result, response_error, status) \
             VALUES (?1, ?2, NULL, ?3, ?4, ?5, ?6, ?7, NULL, NULL, 'pending')",
            params![
                call.id,
                call.timestamp,
                call.server_id,
                call.server_name,
                call.method,
                call.tool_name,
                call.request_params.to_string(),
            ],
        )
        .map_err(|e| map_sql_err("insert_pending_call", e))?;
        Ok(())
    }

    /// Transitions a pending call to `Success`, attaching the result and
    /// duration (§4.2, §8 scenario 5).
    pub fn complete_call_success(
        &self,
        call_id: &str,
        response_result: &serde_json::Value,
        duration_ms: i64,
    ) -> Result<(), Error> {
        self.transition_call(call_id, "success", Some(response_result), None, duration_ms)
    }

    /// Transitions a pending call to `Error` or `Timeout`, attaching the
    /// error payload and duration.
    pub fn complete_call_failed(
        &self,
        call_id: &str,
        status: McpCallStatus,
        response_error: &serde_json::Value,
        duration_ms: i64,
    ) -> Result<(), Error> {
        let status_str = match status {
            McpCallStatus::Error => "error",
            McpCallStatus::Timeout => "timeout",
            _ => {
                return Err(Error::InvalidArgument {
                    message: "complete_call_failed requires Error or Timeout status".to_string(),
                });
            }
        };
        self.transition_call(call_id, status_str, None, Some(response_error), duration_ms)
    }

    fn transition_call(
        &self,
        call_id: &str,
        status_str: &str,
        response_result: Option<&serde_json::Value>,
        response_error: Option<&serde_json::Value>,
        duration_ms: i64,
    ) -> Result<(), Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let changed = conn
            .execute(
                "UPDATE mcp_calls SET status = ?1, response_result = ?2, response_error = ?3, \
                                      duration_ms = ?4 WHERE id = ?5",
                params![
                    status_str,
                    response_result.map(|v| v.to_string()),
                    response_error.map(|v| v.to_string()),
                    duration_ms,
                    call_id,
                ],
            )
            .map_err(|e| map_sql_err("transition_call", e))?;
        if changed == 0 {
            return Err(Error::NotFound {
                kind: "mcp_call".to_string(),
                id: call_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn get_call(&self, call_id: &str) -> Result<Option<McpCall>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.query_row(
            "SELECT id, timestamp, duration_ms, server_id, server_name, method, tool_name, \
                    request_params, response_result, response_error, status \
             FROM mcp_calls WHERE id = ?1",
            params![call_id],
            row_to_call,
        )
        .optional()
        .map_err(|e| map_sql_err("get_call", e))?
        .transpose()
    }

    pub fn list_calls_for_server(&self, server_id: &str, limit: usize) -> Result<Vec<McpCall>, Error> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = conn
            .prepare(
                "SELECT id, timestamp, duration_ms, server_id, server_name, method, tool_name, \
                        request_params, response_result, response_error, status \
                 FROM mcp_calls WHERE server_id = ?1 ORDER BY timestamp DESC LIMIT ?2",
            )
            .map_err(|e| map_sql_err("list_calls_for_server", e))?;

        let rows = stmt
            .query_map(params![server_id, limit as i64], row_to_call)
            .map_err(|e| map_sql_err("list_calls_for_server", e))?;

        rows.collect::<Result<Result<Vec<_>, _>, _>>()
            .map_err(|e| map_sql_err("list_calls_for_server", e))?
    }
}

fn row_to_call(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<McpCall, Error>> {
    let status_str: String = row.get(10)?;
    let status = match status_str.as_str() {
        "success" => McpCallStatus::Success,
        "error" => McpCallStatus::Error,
        "timeout" => McpCallStatus::Timeout,
        _ => McpCallStatus::Pending,
    };
    let request_params_text: String = row.get(7)?;
    let response_result_text: Option<String> = row.get(8)?;
    let response_error_text: Option<String> = row.get(9)?;

    let id = row.get(0)?;
    let timestamp = row.get(1)?;
    let duration_ms = row.get(2)?;
    let server_id = row.get(3)?;
    let server_name = row.get(4)?;
    let method = row.get(5)?;
    let tool_name = row.get(6)?;

    let decoded = (|| -> Result<McpCall, Error> {
        let request_params = serde_json::from_str(&request_params_text).map_err(|e| Error::DbError {
            operation: "decode mcp_call request_params".to_string(),
            message: e.to_string(),
        })?;
        let response_result = response_result_text
            .map(|t| serde_json::from_str(&t))
            .transpose()
            .map_err(|e: serde_json::Error| Error::DbError {
                operation: "decode mcp_call response_result".to_string(),
                message: e.to_string(),
            })?;
        let response_error = response_error_text
            .map(|t| serde_json::from_str(&t))
            .transpose()
            .map_err(|e: serde_json::Error| Error::DbError {
                operation: "decode mcp_call response_error".to_string(),
                message: e.to_string(),
            })?;
        Ok(McpCall {
            id,
            timestamp,
            duration_ms,
            server_id,
            server_name,
            method,
            tool_name,
            request_params,
            response_result,
            response_error,
            status,
        })
    })();

    Ok(decoded)
}

#[cfg(test)]
#[path = "mcp_calls.test.rs"]
mod tests;
