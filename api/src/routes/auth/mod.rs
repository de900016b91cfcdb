//! Authentication route handlers
//!
//! Login by password, OTP or social token, registration, refresh rotation,
//! logout, password reset and the current-session lookup.

pub mod login;
pub mod logout;
pub mod otp;
pub mod password_reset;
pub mod refresh;
pub mod register;
pub mod session;
pub mod social;

use std::sync::Arc;

use actix_web::web;

use hl_core::services::AuthService;
use hl_infra::StorageBackends;

use crate::middleware::auth::JwtAuth;

/// Shared state handed to every handler
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub backends: StorageBackends,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, backends: StorageBackends) -> Self {
        Self { auth, backends }
    }
}

/// Mount the auth endpoints on the given scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(login::login))
        .route("/register", web::post().to(register::register))
        .route("/send-otp", web::post().to(otp::send_otp))
        .route("/verify-otp", web::post().to(otp::verify_otp))
        .route("/social-login", web::post().to(social::social_login))
        .route("/refresh-token", web::post().to(refresh::refresh))
        .route("/refresh", web::post().to(refresh::refresh))
        .route("/logout", web::post().to(logout::logout))
        .route(
            "/request-password-reset",
            web::post().to(password_reset::request_password_reset),
        )
        .route("/reset-password", web::post().to(password_reset::reset_password))
        .route("/me", web::get().to(session::me).wrap(JwtAuth::new()));
}
