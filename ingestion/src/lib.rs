//! Message Ingestion Pipeline (§4.3): turns streamed assistant text and
//! tool-call traces into the typed block graph that [`octave_storage`]
//! persists. Three pieces, used together by [`commit::ingest_assistant_message`]:
//!
//! - [`parser`] segments raw content into ordered blocks.
//! - [`file_changes`] folds Edit/Write/diff traces into one `file-summary`
//!   block per turn.
//! - [`commit`] wires both into [`octave_storage::Db::save_message_with_blocks`].

mod commit;
mod file_changes;
mod git_diff;
mod parser;

pub use commit::ingest_assistant_message;
pub use file_changes::{FileChangeAggregator, ToolTrace};
pub use parser::{ParsedMessage, parse_message_to_blocks};
