//! [`PlainError`] hides internal error text from untrusted surfaces (the
//! stdio JSON-RPC proxy, the HTTP bridge) while still letting trusted
//! surfaces (the internal IPC handlers) see the original message.

use std::error::Error as StdError;
use std::fmt;

use crate::error::Error;
use crate::status_code::StatusCode;

/// An error reduced to a status code plus a message, with an explicit split
/// between the message a trusted caller may see (`output_msg`) and the
/// generic, category-named message an untrusted surface must use instead.
#[derive(Debug, Clone)]
pub struct PlainError {
    message: String,
    status_code: StatusCode,
}

impl PlainError {
    pub fn new(message: impl Into<String>, status_code: StatusCode) -> Self {
        Self {
            message: message.into(),
            status_code,
        }
    }

    /// Wrap a boxed source error (e.g. an `io::Error` from spawning a child
    /// process) under an explicit status code.
    pub fn boxed(source: Box<dyn StdError + Send + Sync>, status_code: StatusCode) -> Self {
        Self::new(source.to_string(), status_code)
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn is_retryable(&self) -> bool {
        self.status_code.is_retryable()
    }

    /// The message a trusted caller (internal IPC) may surface verbatim.
    pub fn output_msg(&self) -> &str {
        &self.message
    }

    /// The message an untrusted caller (stdio proxy, HTTP bridge) must use
    /// instead: the error's category name, never the original text.
    pub fn generic_msg(&self) -> String {
        format!("{:?} error", self.status_code.category())
    }
}

impl fmt::Display for PlainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status_code, self.message)
    }
}

impl StdError for PlainError {}

impl From<Error> for PlainError {
    fn from(err: Error) -> Self {
        let status_code = err.status_code();
        Self::new(err.to_string(), status_code)
    }
}

impl From<&Error> for PlainError {
    fn from(err: &Error) -> Self {
        Self::new(err.to_string(), err.status_code())
    }
}

#[cfg(test)]
#[path = "ext.test.rs"]
mod tests;
