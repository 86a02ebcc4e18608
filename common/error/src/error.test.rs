use super::*;

#[test]
fn storage_init_is_fatal_everything_else_is_not() {
    let fatal = Error::StorageInit {
        message: "disk full".into(),
    };
    assert!(fatal.is_fatal());

    let not_fatal = Error::NotFound {
        kind: "conversation".into(),
        id: "c1".into(),
    };
    assert!(!not_fatal.is_fatal());
}

#[test]
fn status_code_mapping_matches_error_kind() {
    let err = Error::ToolCallTimeout {
        server_id: "server-echo".into(),
        tool_name: "echo".into(),
    };
    assert_eq!(err.status_code(), StatusCode::ToolCallTimeout);
    assert!(err.is_retryable());
}

#[test]
fn not_implemented_and_too_few_messages_map_to_their_own_codes() {
    let not_impl = Error::NotImplemented {
        feature: "search_blocks".into(),
    };
    assert_eq!(not_impl.status_code(), StatusCode::NotImplemented);
    assert!(!not_impl.is_fatal());

    let too_few = Error::TooFewMessages {
        minimum: 20,
        actual: 4,
    };
    assert_eq!(too_few.status_code(), StatusCode::TooFewMessages);
    assert!(!too_few.is_retryable());
}

#[test]
fn display_never_panics_and_includes_context() {
    let err = Error::DbConstraint {
        operation: "save_message_with_blocks".into(),
        message: "UNIQUE constraint failed".into(),
    };
    let rendered = err.to_string();
    assert!(rendered.contains("save_message_with_blocks"));
}
