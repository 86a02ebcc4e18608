use super::*;

fn message(role: Role, content: &str) -> Message {
    Message {
        id: "m".to_string(),
        conversation_id: "c".to_string(),
        role,
        content: content.to_string(),
        timestamp: 0,
        metadata: None,
    }
}

#[test]
fn error_plus_file_is_critical() {
    let m = message(Role::Assistant, "Got an error in src/lib.rs while building");
    assert_eq!(classify_importance(&m), Importance::Critical);
}

#[test]
fn decision_language_is_high_even_without_files() {
    let m = message(Role::User, "Let's decide on the architecture for this module");
    assert_eq!(classify_importance(&m), Importance::High);
}

#[test]
fn assistant_touching_files_without_decision_language_is_high() {
    let m = message(Role::Assistant, "Updated src/lib.rs with the new function");
    assert_eq!(classify_importance(&m), Importance::High);
}

#[test]
fn plain_user_message_is_medium() {
    let m = message(Role::User, "what do you think about this");
    assert_eq!(classify_importance(&m), Importance::Medium);
}

#[test]
fn bare_assistant_prose_is_low() {
    let m = message(Role::Assistant, "Sounds good, glad that worked out.");
    assert_eq!(classify_importance(&m), Importance::Low);
}

#[test]
fn ordering_places_critical_above_high_above_medium_above_low() {
    assert!(Importance::Critical > Importance::High);
    assert!(Importance::High > Importance::Medium);
    assert!(Importance::Medium > Importance::Low);
}
