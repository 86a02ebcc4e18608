//! Stable, machine-readable status codes for every error the core surfaces.
//!
//! Codes follow an `XX_YYY` scheme: the leading two digits name a
//! [`StatusCategory`], the trailing three disambiguate within it. The
//! category ranges are fixed so a caller can classify an unrecognized code
//! from its numeric value alone.

use std::fmt;

use strum::EnumIter;

/// Coarse grouping a [`StatusCode`] falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCategory {
    Success,
    Common,
    Validation,
    Storage,
    ToolServer,
    Ingestion,
    Context,
    Control,
}

/// Metadata attached to every [`StatusCode`], used by retry policies and
/// logging call sites so neither has to hard-code per-variant behavior.
#[derive(Debug, Clone, Copy)]
pub struct StatusMeta {
    pub retryable: bool,
    pub log_error: bool,
    pub category: StatusCategory,
}

macro_rules! define_status_codes {
    (
        $(
            $(#[$doc:meta])*
            $variant:ident = $value:expr => {
                category: $category:expr,
                retryable: $retryable:expr,
                log_error: $log_error:expr $(,)?
            }
        ),* $(,)?
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
        #[repr(i32)]
        pub enum StatusCode {
            $(
                $(#[$doc])*
                $variant = $value,
            )*
        }

        impl StatusCode {
            pub fn meta(self) -> StatusMeta {
                match self {
                    $(
                        Self::$variant => StatusMeta {
                            retryable: $retryable,
                            log_error: $log_error,
                            category: $category,
                        },
                    )*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)*
                }
            }
        }

        // Compile-time duplicate-value check: two variants sharing a numeric
        // code would make `StatusCode as i32` ambiguous for callers matching
        // on the wire value.
        const _: () = {
            const VALUES: &[i32] = &[$($value),*];
            let mut i = 0;
            while i < VALUES.len() {
                let mut j = i + 1;
                while j < VALUES.len() {
                    if VALUES[i] == VALUES[j] {
                        panic!("duplicate StatusCode value");
                    }
                    j += 1;
                }
                i += 1;
            }
        };
    };
}

define_status_codes! {
    /// Operation completed normally.
    Success = 00_000 => { category: StatusCategory::Success, retryable: false, log_error: false },

    /// An error was returned with no more specific classification available.
    Unknown = 01_000 => { category: StatusCategory::Common, retryable: false, log_error: true },
    /// A bug or invariant violation internal to the core.
    Internal = 01_001 => { category: StatusCategory::Common, retryable: false, log_error: true },

    /// Caller-supplied id or payload failed basic validation.
    InvalidArgument = 02_000 => { category: StatusCategory::Validation, retryable: false, log_error: false },

    /// Database open or migration failed; fatal for the core.
    StorageInit = 03_000 => { category: StatusCategory::Storage, retryable: false, log_error: true },
    /// A runtime SQLite error not otherwise classified.
    DbError = 03_001 => { category: StatusCategory::Storage, retryable: false, log_error: true },
    /// A transaction rolled back due to a conflicting concurrent write.
    DbConflict = 03_002 => { category: StatusCategory::Storage, retryable: false, log_error: false },
    /// A write violated a schema constraint (uniqueness, foreign key, check).
    DbConstraint = 03_003 => { category: StatusCategory::Storage, retryable: false, log_error: false },
    /// The referenced conversation/message/block/todo/plan/tool does not exist.
    NotFound = 03_004 => { category: StatusCategory::Storage, retryable: false, log_error: false },

    /// The tool server is not running (stopped, errored, or never installed).
    ToolServerUnavailable = 04_000 => { category: StatusCategory::ToolServer, retryable: true, log_error: true },
    /// The tool server's child process exited unexpectedly.
    ToolServerCrashed = 04_001 => { category: StatusCategory::ToolServer, retryable: true, log_error: true },
    /// A tool call exceeded its soft deadline; the child is still alive.
    ToolCallTimeout = 04_002 => { category: StatusCategory::ToolServer, retryable: true, log_error: false },

    /// The message ingestion pipeline could not fully segment the content.
    ParseError = 05_000 => { category: StatusCategory::Ingestion, retryable: false, log_error: false },

    /// The AI CLI reported a rate limit during the compact protocol.
    RateLimited = 06_000 => { category: StatusCategory::Context, retryable: true, log_error: false },
    /// The AI CLI reported a model-level failure during the compact protocol.
    ModelError = 06_001 => { category: StatusCategory::Context, retryable: true, log_error: true },

    /// Cooperative cancellation observed at a suspend point.
    Cancelled = 07_000 => { category: StatusCategory::Control, retryable: false, log_error: false },
    /// User-initiated shell execution blocked by the command deny-list.
    DangerousCommand = 07_001 => { category: StatusCategory::Control, retryable: false, log_error: false },

    /// The operation has no implementation in this build (e.g. block search).
    NotImplemented = 01_002 => { category: StatusCategory::Common, retryable: false, log_error: false },
    /// The compact protocol was invoked with too few messages to summarize.
    TooFewMessages = 06_002 => { category: StatusCategory::Context, retryable: false, log_error: false },
}

impl StatusCode {
    pub fn is_success(value: i32) -> bool {
        value == Self::Success as i32
    }

    pub fn is_retryable(self) -> bool {
        self.meta().retryable
    }

    pub fn should_log_error(self) -> bool {
        self.meta().log_error
    }

    pub fn category(self) -> StatusCategory {
        self.meta().category
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[path = "status_code.test.rs"]
mod tests;
