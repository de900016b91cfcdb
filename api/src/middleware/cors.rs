//! CORS configuration for browser and mobile clients.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use hl_shared::{Environment, ServerConfig};

const MAX_AGE_SECS: usize = 3600;

/// CORS for the configured origins
///
/// With no origins configured, development allows any origin while other
/// environments allow only the local app schemes.
pub fn create_cors(server: &ServerConfig, environment: Environment) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-app-version"),
            header::HeaderName::from_static("x-platform"),
        ])
        .expose_headers(vec![
            header::RETRY_AFTER,
            header::HeaderName::from_static("x-request-id"),
        ])
        .max_age(MAX_AGE_SECS);

    let origins: Vec<&str> = server
        .allowed_origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .collect();

    if origins.is_empty() {
        if environment.is_development() {
            tracing::info!("CORS allows any origin in development");
            return cors.allow_any_origin();
        }
        for origin in ["capacitor://localhost", "ionic://localhost", "https://localhost"] {
            cors = cors.allowed_origin(origin);
        }
        return cors;
    }

    for origin in origins {
        tracing::info!(origin, "Adding allowed origin");
        cors = cors.allowed_origin(origin);
    }
    cors
}
