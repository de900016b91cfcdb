//! Unit tests for domain error types

use hl_shared::ErrorResponse;

use crate::errors::{AuthError, DomainError, TokenError};

#[test]
fn test_auth_error_codes() {
    assert_eq!(AuthError::InvalidCredentials.code(), "INVALID_CREDENTIALS");
    assert_eq!(AuthError::InvalidOtp.code(), "INVALID_OTP");
    assert_eq!(
        AuthError::UnsupportedProvider { provider: "myspace".into() }.code(),
        "UNSUPPORTED_PROVIDER"
    );
}

#[test]
fn test_token_error_conversion() {
    let error: DomainError = TokenError::TokenReused.into();
    let response = ErrorResponse::from(&error);
    assert_eq!(response.error, "TOKEN_REUSED");
    assert_eq!(response.message, "Refresh token reuse detected");
}

#[test]
fn test_internal_details_are_hidden() {
    let error = DomainError::internal("connection refused at 10.0.0.5:3306");
    let response = ErrorResponse::from(&error);
    assert_eq!(response.error, "INTERNAL_ERROR");
    assert!(!response.message.contains("10.0.0.5"));

    let signing = ErrorResponse::from(&DomainError::from(TokenError::SigningKeyUnavailable));
    assert_eq!(signing.message, "Internal server error");
}

#[test]
fn test_cooldown_carries_retry_hint() {
    let response = ErrorResponse::from(&AuthError::OtpCooldown { retry_after: 42 });
    assert_eq!(response.error, "RATE_LIMIT_EXCEEDED");
    assert_eq!(response.details.unwrap()["retry_after"], serde_json::json!(42));
}

#[test]
fn test_unique_violation_predicate() {
    let error = DomainError::UniqueViolation { constraint: "phone".into() };
    assert!(error.is_unique_violation());
    assert!(!DomainError::from(AuthError::InvalidOtp).is_unique_violation());
}
