//! Shared error taxonomy for every octave crate: [`status_code`] defines the
//! wire-level `StatusCode`, [`error`] defines the domain `Error` enum, and
//! [`ext`] defines `PlainError` for surfaces that must not leak internal text.

pub mod error;
pub mod ext;
pub mod status_code;

pub use error::{Error, Result};
pub use ext::PlainError;
pub use status_code::{StatusCategory, StatusCode, StatusMeta};
