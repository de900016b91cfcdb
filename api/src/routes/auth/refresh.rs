use actix_web::{web, HttpRequest, HttpResponse};

use crate::dto::{RefreshTokenRequest, TokenPairResponse};
use crate::handlers::{bearer_token, handle_domain_error, session_from, unauthorized};

use super::AppState;

/// Handler for POST /api/v1/auth/refresh-token (also mounted at `/refresh`)
///
/// The refresh token travels as `Authorization: Bearer <refresh token>`, with
/// a `{ "refreshToken": ... }` body accepted as a fallback. A successful call
/// rotates the token: the presented one is dead afterwards, and presenting it
/// again revokes the whole session (401 `TOKEN_REUSED`).
pub async fn refresh(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> HttpResponse {
    let token = bearer_token(&req).or_else(|| body.and_then(|body| body.into_inner().refresh_token));
    let Some(token) = token else {
        return unauthorized("Refresh token required");
    };

    match state.auth.refresh(&session_from(&req), &token).await {
        Ok(pair) => HttpResponse::Ok().json(TokenPairResponse::from(pair)),
        Err(error) => handle_domain_error(error),
    }
}
