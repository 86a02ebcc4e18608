use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpCallStatus {
    Pending,
    Success,
    Error,
    Timeout,
}

/// One recorded tool-server call. Written once in `Pending` state and
/// transitioned to a terminal state by a single follow-up update; never
/// deleted programmatically.
///
/// Invariant: `status == Success` iff `response_result` is set and
/// `response_error` is not; `status ∈ {Error, Timeout}` iff `response_error`
/// is set. `Pending` has neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpCall {
    pub id: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub duration_ms: Option<i64>,
    pub server_id: String,
    pub server_name: String,
    pub method: String,
    pub tool_name: String,
    pub request_params: Value,
    pub response_result: Option<Value>,
    pub response_error: Option<Value>,
    pub status: McpCallStatus,
}

impl McpCall {
    /// Construct a freshly-opened call row in `Pending` state, as written by
    /// the proxy before it forwards the request to the child process.
    pub fn pending(
        id: impl Into<String>,
        timestamp: i64,
        server_id: impl Into<String>,
        server_name: impl Into<String>,
        method: impl Into<String>,
        tool_name: impl Into<String>,
        request_params: Value,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            duration_ms: None,
            server_id: server_id.into(),
            server_name: server_name.into(),
            method: method.into(),
            tool_name: tool_name.into(),
            request_params,
            response_result: None,
            response_error: None,
            status: McpCallStatus::Pending,
        }
    }

    /// Whether this row satisfies the result/error-exclusivity invariant.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            McpCallStatus::Pending => {
                self.response_result.is_none() && self.response_error.is_none()
            }
            McpCallStatus::Success => {
                self.response_result.is_some() && self.response_error.is_none()
            }
            McpCallStatus::Error | McpCallStatus::Timeout => self.response_error.is_some(),
        }
    }
}

#[cfg(test)]
#[path = "mcp_call.test.rs"]
mod tests;
