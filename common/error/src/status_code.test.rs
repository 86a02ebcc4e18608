use super::*;
use strum::IntoEnumIterator;

#[test]
fn test_status_code_values() {
    assert_eq!(StatusCode::Success as i32, 00_000);
    assert_eq!(StatusCode::Unknown as i32, 01_000);
    assert_eq!(StatusCode::InvalidArgument as i32, 02_000);
    assert_eq!(StatusCode::StorageInit as i32, 03_000);
    assert_eq!(StatusCode::ToolServerUnavailable as i32, 04_000);
    assert_eq!(StatusCode::ParseError as i32, 05_000);
    assert_eq!(StatusCode::RateLimited as i32, 06_000);
    assert_eq!(StatusCode::Cancelled as i32, 07_000);
}

#[test]
fn test_is_success() {
    assert!(StatusCode::is_success(0));
    assert!(!StatusCode::is_success(01_000));
}

#[test]
fn test_is_retryable() {
    assert!(StatusCode::ToolServerUnavailable.is_retryable());
    assert!(StatusCode::ToolServerCrashed.is_retryable());
    assert!(StatusCode::ToolCallTimeout.is_retryable());
    assert!(StatusCode::RateLimited.is_retryable());
    assert!(StatusCode::ModelError.is_retryable());
    assert!(!StatusCode::InvalidArgument.is_retryable());
    assert!(!StatusCode::NotFound.is_retryable());
    assert!(!StatusCode::DangerousCommand.is_retryable());
}

#[test]
fn test_should_log_error() {
    assert!(StatusCode::Unknown.should_log_error());
    assert!(StatusCode::Internal.should_log_error());
    assert!(StatusCode::StorageInit.should_log_error());
    assert!(!StatusCode::InvalidArgument.should_log_error());
    assert!(!StatusCode::NotFound.should_log_error());
    assert!(!StatusCode::Cancelled.should_log_error());
}

#[test]
fn test_display_and_name() {
    assert_eq!(format!("{}", StatusCode::Success), "Success");
    assert_eq!(StatusCode::DbConflict.name(), "DbConflict");
}

#[test]
fn test_new_variants_classified_correctly() {
    assert_eq!(StatusCode::NotImplemented.category(), StatusCategory::Common);
    assert!(!StatusCode::NotImplemented.is_retryable());
    assert_eq!(StatusCode::TooFewMessages.category(), StatusCategory::Context);
    assert!(!StatusCode::TooFewMessages.is_retryable());
}

#[test]
fn test_category() {
    assert_eq!(StatusCode::Success.category(), StatusCategory::Success);
    assert_eq!(StatusCode::NotFound.category(), StatusCategory::Storage);
    assert_eq!(
        StatusCode::ToolCallTimeout.category(),
        StatusCategory::ToolServer
    );
    assert_eq!(StatusCode::ParseError.category(), StatusCategory::Ingestion);
    assert_eq!(StatusCode::RateLimited.category(), StatusCategory::Context);
    assert_eq!(
        StatusCode::DangerousCommand.category(),
        StatusCategory::Control
    );
}

#[test]
fn test_metadata_consistency_with_code_ranges() {
    for code in StatusCode::iter() {
        let meta = code.meta();
        let value = code as i32;
        match meta.category {
            StatusCategory::Success => assert_eq!(value, 0),
            StatusCategory::Common => assert!((01_000..02_000).contains(&value)),
            StatusCategory::Validation => assert!((02_000..03_000).contains(&value)),
            StatusCategory::Storage => assert!((03_000..04_000).contains(&value)),
            StatusCategory::ToolServer => assert!((04_000..05_000).contains(&value)),
            StatusCategory::Ingestion => assert!((05_000..06_000).contains(&value)),
            StatusCategory::Context => assert!((06_000..07_000).contains(&value)),
            StatusCategory::Control => assert!((07_000..08_000).contains(&value)),
        }
    }
}
