//! The core's single error type. Every crate returns `octave_error::Result<T>`
//! from its public API; `snafu` builds the variants, `StatusCode` (see
//! [`crate::status_code`]) carries the wire-level classification.

use snafu::Snafu;

use crate::status_code::StatusCode;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("failed to initialize storage: {message}"))]
    StorageInit { message: String },

    #[snafu(display("database error during {operation}: {message}"))]
    DbError { operation: String, message: String },

    #[snafu(display("conflicting write during {operation}: {message}"))]
    DbConflict { operation: String, message: String },

    #[snafu(display("constraint violation during {operation}: {message}"))]
    DbConstraint { operation: String, message: String },

    #[snafu(display("{kind} not found: {id}"))]
    NotFound { kind: String, id: String },

    #[snafu(display("invalid argument: {message}"))]
    InvalidArgument { message: String },

    #[snafu(display("tool server {server_id} is unavailable"))]
    ToolServerUnavailable { server_id: String },

    #[snafu(display("tool server {server_id} crashed: {message}"))]
    ToolServerCrashed { server_id: String, message: String },

    #[snafu(display("tool call {tool_name} on {server_id} timed out"))]
    ToolCallTimeout { server_id: String, tool_name: String },

    #[snafu(display("failed to parse message content: {message}"))]
    ParseError { message: String },

    #[snafu(display("operation cancelled"))]
    Cancelled,

    #[snafu(display("rate limited: {message}"))]
    RateLimited { message: String },

    #[snafu(display("model error: {message}"))]
    ModelError { message: String },

    #[snafu(display("command blocked by deny-list: {command}"))]
    DangerousCommand { command: String },

    #[snafu(display("{feature} is not implemented"))]
    NotImplemented { feature: String },

    #[snafu(display("need at least {minimum} messages to compact, got {actual}"))]
    TooFewMessages { minimum: usize, actual: usize },
}

impl Error {
    /// The stable status code this error maps to, used for wire-level
    /// classification and for deciding retry/logging behavior.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::StorageInit { .. } => StatusCode::StorageInit,
            Error::DbError { .. } => StatusCode::DbError,
            Error::DbConflict { .. } => StatusCode::DbConflict,
            Error::DbConstraint { .. } => StatusCode::DbConstraint,
            Error::NotFound { .. } => StatusCode::NotFound,
            Error::InvalidArgument { .. } => StatusCode::InvalidArgument,
            Error::ToolServerUnavailable { .. } => StatusCode::ToolServerUnavailable,
            Error::ToolServerCrashed { .. } => StatusCode::ToolServerCrashed,
            Error::ToolCallTimeout { .. } => StatusCode::ToolCallTimeout,
            Error::ParseError { .. } => StatusCode::ParseError,
            Error::Cancelled => StatusCode::Cancelled,
            Error::RateLimited { .. } => StatusCode::RateLimited,
            Error::ModelError { .. } => StatusCode::ModelError,
            Error::DangerousCommand { .. } => StatusCode::DangerousCommand,
            Error::NotImplemented { .. } => StatusCode::NotImplemented,
            Error::TooFewMessages { .. } => StatusCode::TooFewMessages,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.status_code().is_retryable()
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::StorageInit { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
#[path = "error.test.rs"]
mod tests;
