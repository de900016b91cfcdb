//! Facebook access token verification
//!
//! `debug_token` with the app access token confirms the token is valid and
//! was issued to this app; the Graph `/me` call then supplies the profile.

use async_trait::async_trait;
use serde::Deserialize;

use hl_core::domain::entities::SocialProvider;
use hl_core::services::{SocialIdentityVerifier, SocialProfile, SocialVerifyError};

use super::{classify_status, transport_error};

const GRAPH_URL: &str = "https://graph.facebook.com";
const GRAPH_VERSION: &str = "v18.0";

#[derive(Debug, Deserialize)]
pub(crate) struct DebugTokenResponse {
    pub data: DebugTokenData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DebugTokenData {
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default)]
    pub app_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

pub struct FacebookVerifier {
    client: reqwest::Client,
    app_id: String,
    app_secret: String,
    graph_url: String,
}

impl FacebookVerifier {
    pub fn new(client: reqwest::Client, app_id: String, app_secret: String) -> Self {
        Self {
            client,
            app_id,
            app_secret,
            graph_url: GRAPH_URL.to_string(),
        }
    }

    pub fn with_graph_url(mut self, graph_url: impl Into<String>) -> Self {
        self.graph_url = graph_url.into();
        self
    }
}

pub(crate) fn check_debug_token(debug: &DebugTokenData, app_id: &str) -> Result<(), SocialVerifyError> {
    if !debug.is_valid {
        return Err(SocialVerifyError::Rejected("Facebook token is invalid".to_string()));
    }
    if debug.app_id.as_deref() != Some(app_id) {
        return Err(SocialVerifyError::Rejected(
            "Facebook token issued for another app".to_string(),
        ));
    }
    Ok(())
}

/// Graph only returns confirmed addresses
pub(crate) fn profile_from_graph_user(user: GraphUser) -> SocialProfile {
    SocialProfile {
        provider_user_id: user.id,
        email_verified: user.email.is_some(),
        email: user.email,
        name: user.name,
    }
}

#[async_trait]
impl SocialIdentityVerifier for FacebookVerifier {
    fn provider(&self) -> SocialProvider {
        SocialProvider::Facebook
    }

    async fn verify(&self, token: &str) -> Result<SocialProfile, SocialVerifyError> {
        let app_token = format!("{}|{}", self.app_id, self.app_secret);
        let response = self
            .client
            .get(format!("{}/debug_token", self.graph_url))
            .query(&[("input_token", token), ("access_token", app_token.as_str())])
            .send()
            .await
            .map_err(|e| transport_error(e, "facebook"))?;

        if !response.status().is_success() {
            return Err(classify_status(response.status(), "facebook"));
        }
        let debug: DebugTokenResponse = response
            .json()
            .await
            .map_err(|e| SocialVerifyError::Unavailable(format!("Malformed debug_token: {}", e)))?;
        check_debug_token(&debug.data, &self.app_id)?;

        let response = self
            .client
            .get(format!("{}/{}/me", self.graph_url, GRAPH_VERSION))
            .query(&[("fields", "id,name,email"), ("access_token", token)])
            .send()
            .await
            .map_err(|e| transport_error(e, "facebook"))?;

        if !response.status().is_success() {
            return Err(classify_status(response.status(), "facebook"));
        }
        let user: GraphUser = response
            .json()
            .await
            .map_err(|e| SocialVerifyError::Unavailable(format!("Malformed Graph user: {}", e)))?;
        Ok(profile_from_graph_user(user))
    }
}
