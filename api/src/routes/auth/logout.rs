use actix_web::{web, HttpRequest, HttpResponse};

use crate::dto::MessageResponse;
use crate::handlers::{bearer_token, session_from, unauthorized};

use super::AppState;

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the session behind the bearer access token. Expired or already
/// revoked tokens still log out successfully.
pub async fn logout(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let Some(token) = bearer_token(&req) else {
        return unauthorized("Access token required");
    };

    state.auth.logout(&session_from(&req), &token).await;
    HttpResponse::Ok().json(MessageResponse {
        message: "Logged out".to_string(),
    })
}
