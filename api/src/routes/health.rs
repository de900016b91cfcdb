use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::routes::auth::AppState;

/// Handler for GET /health
///
/// 200 while every connected storage backend answers, 503 otherwise.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let healthy = state.backends.health_check().await;
    let body = json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "service": "heallink-auth",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.backends.backend_name(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
