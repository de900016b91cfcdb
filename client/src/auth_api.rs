//! Sign-in and sign-out calls that populate the session store

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::ClientResult;
use crate::session::{SessionStore, SessionTokens, SessionUser};
use crate::transport::{ApiRequest, HttpTransport};

/// Password login by e-mail or phone
#[derive(Debug, Clone)]
pub enum LoginCredentials {
    Email { email: String, password: String },
    Phone { phone: String, password: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthPayload {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    user: Option<SessionUser>,
}

pub struct AuthApi {
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionStore>,
}

impl AuthApi {
    pub fn new(transport: Arc<dyn HttpTransport>, session: Arc<SessionStore>) -> Self {
        Self { transport, session }
    }

    pub async fn login(&self, credentials: LoginCredentials) -> ClientResult<SessionUser> {
        let body = match credentials {
            LoginCredentials::Email { email, password } => json!({ "email": email, "password": password }),
            LoginCredentials::Phone { phone, password } => json!({ "phone": phone, "password": password }),
        };
        self.sign_in(ApiRequest::post("/login", Some(body))).await
    }

    pub async fn verify_otp(&self, phone: &str, otp: &str) -> ClientResult<SessionUser> {
        let body = json!({ "phone": phone, "otp": otp });
        self.sign_in(ApiRequest::post("/verify-otp", Some(body))).await
    }

    pub async fn social_login(&self, provider: &str, token: &str) -> ClientResult<SessionUser> {
        let body = json!({ "provider": provider, "token": token });
        self.sign_in(ApiRequest::post("/social-login", Some(body))).await
    }

    /// Revoke the session server-side and clear it locally
    ///
    /// The local session is cleared even when the server cannot be reached.
    pub async fn logout(&self) {
        if let Some(token) = self.session.access_token() {
            let request = ApiRequest::post("/logout", None).with_bearer(token);
            if let Err(error) = self.transport.send(&request).await {
                debug!(error = %error, "Logout request failed");
            }
        }
        self.session.sign_out();
    }

    async fn sign_in(&self, request: ApiRequest) -> ClientResult<SessionUser> {
        let response = self.transport.send(&request).await?;
        if !response.is_success() {
            return Err(response.into_api_error());
        }

        let payload: AuthPayload = response.json()?;
        let user = payload.user.unwrap_or_default();
        self.session.sign_in(
            SessionTokens {
                access_token: payload.access_token,
                refresh_token: payload.refresh_token,
            },
            Some(user.clone()),
        );
        info!(path = %request.path, "Signed in");
        Ok(user)
    }
}
