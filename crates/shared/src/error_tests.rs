use rstest::rstest;

use super::*;

#[rstest]
#[case(AppError::Unauthorized("test".into()), 401, "UNAUTHORIZED")]
#[case(AppError::Forbidden("test".into()), 403, "FORBIDDEN")]
#[case(AppError::NotFound("test".into()), 404, "NOT_FOUND")]
#[case(AppError::Validation("test".into()), 400, "VALIDATION_ERROR")]
#[case(AppError::Conflict("test".into()), 400, "CONFLICT")]
#[case(AppError::Database("test".into()), 500, "DATABASE_ERROR")]
#[case(AppError::Internal("test".into()), 500, "INTERNAL_ERROR")]
fn test_app_error_mapping(#[case] error: AppError, #[case] status: u16, #[case] code: &str) {
    assert_eq!(error.status_code(), status);
    assert_eq!(error.error_code(), code);
}

#[test]
fn test_app_error_display() {
    assert_eq!(
        AppError::Conflict("Account code '1001' already exists".into()).to_string(),
        "Conflict: Account code '1001' already exists"
    );
    assert_eq!(
        AppError::NotFound("Product not found".into()).to_string(),
        "Not found: Product not found"
    );
}

#[test]
fn test_internal_messages_are_not_leaked() {
    let error = AppError::Database("relation \"accounts\" does not exist".into());
    assert!(error.is_internal());
    assert_eq!(error.public_message(), "An internal error occurred");

    let error = AppError::Validation("quantity must be greater than zero".into());
    assert!(!error.is_internal());
    assert_eq!(error.public_message(), "quantity must be greater than zero");
}
