use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::dto::{
    validation_error_response, AuthResponseDto, SendOtpRequest, SendOtpResponse, VerifyOtpRequest,
};
use crate::handlers::{handle_domain_error, session_from};

use super::AppState;

/// Handler for POST /api/v1/auth/send-otp
///
/// ## Errors
/// - 400 `PHONE_INVALID`
/// - 429 `RATE_LIMIT_EXCEEDED` while the resend cooldown runs (`Retry-After` set)
/// - 503 `SERVICE_UNAVAILABLE` when the SMS provider rejects the message
pub async fn send_otp(
    state: web::Data<AppState>,
    req: HttpRequest,
    request: web::Json<SendOtpRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(errors);
    }

    match state.auth.send_otp(&session_from(&req), &request.phone).await {
        Ok(dispatch) => HttpResponse::Ok().json(SendOtpResponse {
            sent: true,
            expires_at: dispatch.expires_at,
        }),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/v1/auth/verify-otp
///
/// Consumes the outstanding code for the phone and signs the caller in,
/// creating a phone-only account on first use.
pub async fn verify_otp(
    state: web::Data<AppState>,
    req: HttpRequest,
    request: web::Json<VerifyOtpRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(errors);
    }

    match state
        .auth
        .verify_otp(&session_from(&req), &request.phone, &request.otp)
        .await
    {
        Ok(response) => HttpResponse::Ok().json(AuthResponseDto::from(response)),
        Err(error) => handle_domain_error(error),
    }
}
