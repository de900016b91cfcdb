use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::dto::{validation_error_response, AuthResponseDto, LoginRequest};
use crate::handlers::{handle_domain_error, session_from};

use super::AppState;

/// Handler for POST /api/v1/auth/login
///
/// Accepts `{ "email" | "phone", "password" }` and answers with a token pair
/// plus the account profile. Unknown identifiers and wrong passwords both
/// produce 401 `INVALID_CREDENTIALS`.
pub async fn login(
    state: web::Data<AppState>,
    req: HttpRequest,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(errors);
    }

    let session = session_from(&req);
    match state
        .auth
        .login(&session, request.identifier(), &request.password)
        .await
    {
        Ok(response) => HttpResponse::Ok().json(AuthResponseDto::from(response)),
        Err(error) => handle_domain_error(error),
    }
}
