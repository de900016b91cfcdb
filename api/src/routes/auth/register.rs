use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use hl_core::services::RegisterInput;

use crate::dto::{validation_error_response, RegisterRequest, RegisterResponse};
use crate::handlers::{handle_domain_error, session_from};

use super::AppState;

/// Handler for POST /api/v1/auth/register
///
/// Creates a password account. Answers 201 with the new profile; tokens are
/// obtained through a subsequent login.
pub async fn register(
    state: web::Data<AppState>,
    req: HttpRequest,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(errors);
    }

    let request = request.into_inner();
    let input = RegisterInput {
        email: request.email,
        phone: request.phone,
        password: request.password,
        name: request.name,
        role: request.role.unwrap_or_default(),
    };

    match state.auth.register(&session_from(&req), input).await {
        Ok(user) => HttpResponse::Created().json(RegisterResponse { user }),
        Err(error) => handle_domain_error(error),
    }
}
