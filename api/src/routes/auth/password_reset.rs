use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::dto::{
    validation_error_response, RequestPasswordResetRequest, ResetPasswordRequest, SuccessResponse,
};
use crate::handlers::{handle_domain_error, session_from};

use super::AppState;

/// Handler for POST /api/v1/auth/request-password-reset
///
/// Always answers `{ "success": true }` so the endpoint cannot be used to
/// probe which addresses have accounts.
pub async fn request_password_reset(
    state: web::Data<AppState>,
    req: HttpRequest,
    request: web::Json<RequestPasswordResetRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(errors);
    }

    state
        .auth
        .request_password_reset(&session_from(&req), &request.email)
        .await;
    HttpResponse::Ok().json(SuccessResponse { success: true })
}

/// Handler for POST /api/v1/auth/reset-password
///
/// Redeems a reset token once, sets the new password and signs out every
/// session of the account.
pub async fn reset_password(
    state: web::Data<AppState>,
    req: HttpRequest,
    request: web::Json<ResetPasswordRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(errors);
    }

    match state
        .auth
        .reset_password(&session_from(&req), &request.token, &request.new_password)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(SuccessResponse { success: true }),
        Err(error) => handle_domain_error(error),
    }
}
