//! Mapping of domain errors onto HTTP responses

use actix_web::{http::StatusCode, HttpResponse};
use tracing::{error, warn};

use hl_core::errors::{AuthError, DomainError, TokenError};
use hl_shared::ErrorResponse;

/// HTTP status for a domain error
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Auth(auth) => match auth {
            AuthError::InvalidCredentials
            | AuthError::InvalidOtp
            | AuthError::InvalidResetToken
            | AuthError::ResetTokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::DuplicateAccount { .. } => StatusCode::CONFLICT,
            AuthError::UnsupportedProvider { .. }
            | AuthError::InvalidPhoneFormat { .. }
            | AuthError::InvalidEmail
            | AuthError::WeakPassword { .. } => StatusCode::BAD_REQUEST,
            AuthError::OtpCooldown { .. } => StatusCode::TOO_MANY_REQUESTS,
            AuthError::SmsDeliveryFailed | AuthError::ProviderUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        },
        DomainError::Token(token) => match token {
            TokenError::TokenExpired
            | TokenError::TokenReused
            | TokenError::TokenRevoked
            | TokenError::InvalidToken => StatusCode::UNAUTHORIZED,
            TokenError::SigningKeyUnavailable | TokenError::SigningFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
        DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::UniqueViolation { .. } | DomainError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Convert a domain error into its JSON error response
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    let status = status_for(&error);
    if status.is_server_error() {
        error!(error = %error, status = status.as_u16(), "Request failed");
    } else {
        warn!(code = %ErrorResponse::from(&error).error, status = status.as_u16(), "Request rejected");
    }

    let mut builder = HttpResponse::build(status);
    if let DomainError::Auth(AuthError::OtpCooldown { retry_after }) = &error {
        builder.insert_header(("Retry-After", retry_after.to_string()));
    }
    builder.json(ErrorResponse::from(&error))
}

/// 401 for a request without usable credentials
pub fn unauthorized(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse::new(
        hl_shared::error_codes::UNAUTHORIZED,
        message,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_errors_are_unauthorized() {
        for error in [
            DomainError::from(AuthError::InvalidCredentials),
            DomainError::from(AuthError::InvalidOtp),
            DomainError::from(AuthError::InvalidResetToken),
            DomainError::from(AuthError::ResetTokenExpired),
            DomainError::from(TokenError::TokenReused),
            DomainError::from(TokenError::TokenExpired),
        ] {
            assert_eq!(status_for(&error), StatusCode::UNAUTHORIZED, "{:?}", error);
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&AuthError::DuplicateAccount { field: "email".into() }.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&AuthError::UnsupportedProvider { provider: "myspace".into() }.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AuthError::OtpCooldown { retry_after: 30 }.into()),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_for(&AuthError::ProviderUnavailable.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&DomainError::internal("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_cooldown_sets_retry_after() {
        let response = handle_domain_error(AuthError::OtpCooldown { retry_after: 42 }.into());
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "42");
    }
}
