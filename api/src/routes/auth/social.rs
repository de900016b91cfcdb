use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::dto::{validation_error_response, AuthResponseDto, SocialLoginRequest};
use crate::handlers::{handle_domain_error, session_from};

use super::AppState;

/// Handler for POST /api/v1/auth/social-login
///
/// `provider` is one of `google`, `facebook` or `apple`; `token` is the
/// credential that provider issued to the client.
pub async fn social_login(
    state: web::Data<AppState>,
    req: HttpRequest,
    request: web::Json<SocialLoginRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(errors);
    }

    match state
        .auth
        .social_login(&session_from(&req), &request.provider, &request.token)
        .await
    {
        Ok(response) => HttpResponse::Ok().json(AuthResponseDto::from(response)),
        Err(error) => handle_domain_error(error),
    }
}
