//! Authentication and token error types

use hl_shared::errors::error_codes;
use hl_shared::ErrorResponse;
use thiserror::Error;

/// Identity and credential errors. Terminal for the caller: none of these
/// are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired one-time password")]
    InvalidOtp,

    #[error("An account with this {field} already exists")]
    DuplicateAccount { field: String },

    #[error("Unsupported identity provider: {provider}")]
    UnsupportedProvider { provider: String },

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Reset token expired")]
    ResetTokenExpired,

    #[error("Invalid phone format: {phone}")]
    InvalidPhoneFormat { phone: String },

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least {min_length} characters")]
    WeakPassword { min_length: usize },

    #[error("A code was sent recently, retry in {retry_after} seconds")]
    OtpCooldown { retry_after: i64 },

    #[error("SMS delivery failed")]
    SmsDeliveryFailed,

    #[error("Identity provider unavailable")]
    ProviderUnavailable,
}

impl AuthError {
    /// Stable wire code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => error_codes::INVALID_CREDENTIALS,
            AuthError::InvalidOtp => error_codes::INVALID_OTP,
            AuthError::DuplicateAccount { .. } => error_codes::DUPLICATE_ACCOUNT,
            AuthError::UnsupportedProvider { .. } => error_codes::UNSUPPORTED_PROVIDER,
            AuthError::InvalidResetToken => error_codes::INVALID_RESET_TOKEN,
            AuthError::ResetTokenExpired => error_codes::RESET_TOKEN_EXPIRED,
            AuthError::InvalidPhoneFormat { .. } => error_codes::PHONE_INVALID,
            AuthError::InvalidEmail => error_codes::EMAIL_INVALID,
            AuthError::WeakPassword { .. } => error_codes::WEAK_PASSWORD,
            AuthError::OtpCooldown { .. } => error_codes::RATE_LIMIT_EXCEEDED,
            AuthError::SmsDeliveryFailed | AuthError::ProviderUnavailable => {
                error_codes::SERVICE_UNAVAILABLE
            }
        }
    }
}

/// Token lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    /// A rotated refresh token was presented again
    #[error("Refresh token reuse detected")]
    TokenReused,

    /// The session this token belongs to is no longer live
    #[error("Token revoked")]
    TokenRevoked,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Signing key unavailable")]
    SigningKeyUnavailable,

    #[error("Token signing failed")]
    SigningFailed,
}

impl TokenError {
    /// Stable wire code for this error
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::TokenExpired => error_codes::TOKEN_EXPIRED,
            TokenError::TokenReused => error_codes::TOKEN_REUSED,
            TokenError::TokenRevoked => error_codes::TOKEN_REVOKED,
            TokenError::InvalidToken => error_codes::TOKEN_INVALID,
            TokenError::SigningKeyUnavailable | TokenError::SigningFailed => {
                error_codes::INTERNAL_ERROR
            }
        }
    }
}

impl From<&AuthError> for ErrorResponse {
    fn from(error: &AuthError) -> Self {
        let response = ErrorResponse::new(error.code(), error.to_string());
        match error {
            AuthError::OtpCooldown { retry_after } => response.add_detail("retry_after", retry_after),
            AuthError::WeakPassword { min_length } => response.add_detail("min_length", min_length),
            AuthError::DuplicateAccount { field } => response.add_detail("field", field),
            _ => response,
        }
    }
}

impl From<&TokenError> for ErrorResponse {
    fn from(error: &TokenError) -> Self {
        match error {
            // Never leak key configuration problems to callers
            TokenError::SigningKeyUnavailable | TokenError::SigningFailed => {
                ErrorResponse::new(error.code(), "Internal server error")
            }
            _ => ErrorResponse::new(error.code(), error.to_string()),
        }
    }
}
