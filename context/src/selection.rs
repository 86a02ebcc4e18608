//! Smart selection (§4.4): decides which messages survive a compaction pass
//! untouched (bootstrap + recency + anything important) and which get
//! folded into the AI-generated summary.

use std::collections::BTreeSet;

use octave_error::Error;
use octave_protocol::Message;

use crate::importance::{Importance, classify_importance};

const MINIMUM_MESSAGES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmartSelectionParams {
    pub keep_initial: usize,
    pub keep_recent: usize,
}

impl Default for SmartSelectionParams {
    fn default() -> Self {
        Self {
            keep_initial: 3,
            keep_recent: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub kept: Vec<Message>,
    pub to_summarize: Vec<Message>,
}

/// Keeps the first `keep_initial` and last `keep_recent` messages plus any
/// `critical`/`high` message from the middle; everything else in the middle
/// is returned in `to_summarize`. Fails with `TooFewMessages` when the input
/// is smaller than 20, or when nothing ends up needing summarization.
pub fn smart_select(
    messages: &[Message],
    params: SmartSelectionParams,
) -> Result<SelectionResult, Error> {
    if messages.len() < MINIMUM_MESSAGES {
        return Err(Error::TooFewMessages {
            minimum: MINIMUM_MESSAGES,
            actual: messages.len(),
        });
    }

    let keep_initial = params.keep_initial.min(messages.len());
    let keep_recent = params.keep_recent.min(messages.len());
    let initial_end = keep_initial;
    let recent_start = messages.len().saturating_sub(keep_recent).max(initial_end);

    let mut kept_indices: BTreeSet<usize> = (0..initial_end).collect();
    kept_indices.extend(recent_start..messages.len());

    let mut to_summarize = Vec::new();
    for (i, message) in messages.iter().enumerate().take(recent_start).skip(initial_end) {
        if classify_importance(message) >= Importance::High {
            kept_indices.insert(i);
        } else {
            to_summarize.push(message.clone());
        }
    }

    if to_summarize.is_empty() {
        return Err(Error::TooFewMessages {
            minimum: 1,
            actual: 0,
        });
    }

    let kept = kept_indices.into_iter().map(|i| messages[i].clone()).collect();
    Ok(SelectionResult { kept, to_summarize })
}

#[cfg(test)]
#[path = "selection.test.rs"]
mod tests;
