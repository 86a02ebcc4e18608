use super::*;
use octave_protocol::Role;

fn message(content: &str) -> Message {
    Message {
        id: "m".to_string(),
        conversation_id: "c".to_string(),
        role: Role::User,
        content: content.to_string(),
        timestamp: 0,
        metadata: None,
    }
}

#[test]
fn empty_conversation_has_zero_tokens() {
    let stats = calculate_tokens(&[]);
    assert_eq!(stats.current, 0);
    assert_eq!(stats.limit, CONTEXT_WINDOW_LIMIT);
    assert!(!stats.should_compact);
}

#[test]
fn percentage_is_capped_at_100() {
    let huge = "word ".repeat(500_000);
    let stats = calculate_tokens(&[message(&huge)]);
    assert_eq!(stats.percentage, 100.0);
    assert!(stats.should_compact);
}

#[test]
fn should_compact_flips_at_eighty_percent() {
    // cl100k_base tokenizes plain ascii words roughly 1:1 with whitespace
    // splits, so this is comfortably past 80% of the 200k window.
    let messages = vec![message(&"word ".repeat(170_000))];
    let stats = calculate_tokens(&messages);
    assert!(stats.percentage >= 80.0);
    assert!(stats.should_compact);
}
