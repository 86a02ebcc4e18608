use std::io;

use super::*;

#[test]
fn new_carries_message_and_status_code() {
    let err = PlainError::new("disk full", StatusCode::StorageInit);
    assert_eq!(err.output_msg(), "disk full");
    assert_eq!(err.status_code(), StatusCode::StorageInit);
    assert!(!err.is_retryable());
}

#[test]
fn boxed_wraps_a_std_error_source() {
    let io_err: Box<dyn std::error::Error + Send + Sync> =
        Box::new(io::Error::other("spawn failed"));
    let err = PlainError::boxed(io_err, StatusCode::ToolServerCrashed);
    assert!(err.output_msg().contains("spawn failed"));
    assert!(err.is_retryable());
}

#[test]
fn generic_msg_never_contains_the_original_text() {
    let err = PlainError::new(
        "UNIQUE constraint failed: blocks.message_id",
        StatusCode::DbConstraint,
    );
    let generic = err.generic_msg();
    assert!(!generic.contains("UNIQUE"));
    assert!(!generic.contains("blocks"));
}

#[test]
fn from_domain_error_preserves_status_code() {
    let domain_err = Error::NotFound {
        kind: "conversation".into(),
        id: "c1".into(),
    };
    let plain: PlainError = (&domain_err).into();
    assert_eq!(plain.status_code(), StatusCode::NotFound);
    assert!(plain.output_msg().contains("conversation"));
}
