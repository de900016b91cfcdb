use actix_web::HttpResponse;

use crate::dto::SessionResponse;
use crate::middleware::auth::AuthContext;

/// Handler for GET /api/v1/auth/me, behind `JwtAuth`
pub async fn me(context: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(SessionResponse::from(context.claims))
}
