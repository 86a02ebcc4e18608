//! Importance classification (§4.4): scores a message into
//! `{critical, high, medium, low}` so smart selection knows which middle
//! messages survive compaction untouched.

use once_cell::sync::Lazy;
use regex::Regex;

use octave_protocol::{Message, Role};

use crate::extraction::extract_context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Importance {
    Low,
    Medium,
    High,
    Critical,
}

#[allow(clippy::expect_used)]
static ERROR_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(error|exception|fail(?:ed|ure)?|crash(?:ed)?|traceback|panic(?:ked)?)\b")
        .expect("static regex is valid")
});

#[allow(clippy::expect_used)]
static DECISION_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(decide[sd]?|choose|choice|architecture|design|implement(?:ed|ation)?|approach)\b")
        .expect("static regex is valid")
});

fn mentions_errors(content: &str) -> bool {
    ERROR_KEYWORDS.is_match(content)
}

fn looks_like_decision(content: &str) -> bool {
    DECISION_KEYWORDS.is_match(content)
}

fn touches_files(content: &str) -> bool {
    !extract_context(content).file_paths.is_empty()
}

/// `critical` ⇐ errors ∧ files. `high` ⇐ decision-shaped content, or an
/// assistant message that touches files. `medium` ⇐ files ∨ errors ∨ a user
/// message. `low` otherwise.
pub fn classify_importance(message: &Message) -> Importance {
    let errors = mentions_errors(&message.content);
    let files = touches_files(&message.content);

    if errors && files {
        return Importance::Critical;
    }

    let decision = looks_like_decision(&message.content);
    let assistant_touches_files = matches!(message.role, Role::Assistant) && files;
    if decision || assistant_touches_files {
        return Importance::High;
    }

    if files || errors || matches!(message.role, Role::User) {
        return Importance::Medium;
    }

    Importance::Low
}

#[cfg(test)]
#[path = "importance.test.rs"]
mod tests;
