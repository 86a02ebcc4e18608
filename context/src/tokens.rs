//! Token accounting (§4.4). Uses `cl100k_base`, the same BPE vocabulary
//! GPT-4 and Claude models are close enough to for budgeting purposes — an
//! exact tokenizer match isn't available outside the provider, so this is
//! the same approximation the teacher's retrieval crate uses for budgeting.

use once_cell::sync::Lazy;
use tiktoken_rs::CoreBPE;

use octave_protocol::Message;

pub const CONTEXT_WINDOW_LIMIT: i64 = 200_000;
const COMPACT_THRESHOLD_PERCENTAGE: f64 = 80.0;

#[allow(clippy::expect_used)]
static TOKENIZER: Lazy<CoreBPE> =
    Lazy::new(|| tiktoken_rs::cl100k_base().expect("cl100k_base tokenizer data is bundled"));

pub fn tokenize_count(text: &str) -> i64 {
    TOKENIZER.encode_ordinary(text).len() as i64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenStats {
    pub current: i64,
    pub limit: i64,
    pub percentage: f64,
    pub should_compact: bool,
}

/// `current = Σ tokenize(msg.content)`, `percentage = min(100, 100·current/limit)`,
/// `should_compact = percentage ≥ 80`.
pub fn calculate_tokens(messages: &[Message]) -> TokenStats {
    let current: i64 = messages.iter().map(|m| tokenize_count(&m.content)).sum();
    let percentage = (current as f64 * 100.0 / CONTEXT_WINDOW_LIMIT as f64).min(100.0);
    TokenStats {
        current,
        limit: CONTEXT_WINDOW_LIMIT,
        percentage,
        should_compact: percentage >= COMPACT_THRESHOLD_PERCENTAGE,
    }
}

#[cfg(test)]
#[path = "tokens.test.rs"]
mod tests;
