use super::*;
use octave_protocol::Role;

fn message(i: usize, role: Role, content: &str) -> Message {
    Message {
        id: format!("m{i}"),
        conversation_id: "c".to_string(),
        role,
        content: content.to_string(),
        timestamp: i as i64,
        metadata: None,
    }
}

fn filler(n: usize) -> Vec<Message> {
    (0..n)
        .map(|i| message(i, Role::User, "just some ordinary filler text"))
        .collect()
}

#[test]
fn fewer_than_twenty_messages_is_too_few() {
    let messages = filler(19);
    let err = smart_select(&messages, SmartSelectionParams::default()).unwrap_err();
    assert_eq!(err.status_code(), octave_error::StatusCode::TooFewMessages);
}

#[test]
fn keeps_initial_and_recent_and_summarizes_the_ordinary_middle() {
    let messages = filler(25);
    let result = smart_select(&messages, SmartSelectionParams::default()).unwrap();

    // 3 initial + 10 recent = 13 kept, 12 left to summarize
    assert_eq!(result.kept.len(), 13);
    assert_eq!(result.to_summarize.len(), 12);
    assert!(result.kept.iter().any(|m| m.id == "m0"));
    assert!(result.kept.iter().any(|m| m.id == "m24"));
}

#[test]
fn critical_middle_messages_survive_into_kept() {
    let mut messages = filler(25);
    messages[12] = message(12, Role::Assistant, "error in src/lib.rs during the build");
    let result = smart_select(&messages, SmartSelectionParams::default()).unwrap();

    assert!(result.kept.iter().any(|m| m.id == "m12"));
    assert!(!result.to_summarize.iter().any(|m| m.id == "m12"));
}

#[test]
fn an_all_important_middle_fails_with_too_few_to_summarize() {
    let messages: Vec<Message> = (0..25)
        .map(|i| message(i, Role::Assistant, "decide on the architecture for src/lib.rs"))
        .collect();
    let err = smart_select(&messages, SmartSelectionParams::default()).unwrap_err();
    assert_eq!(err.status_code(), octave_error::StatusCode::TooFewMessages);
}
