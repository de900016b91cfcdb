//! Google ID token verification via the tokeninfo endpoint

use async_trait::async_trait;
use serde::Deserialize;

use hl_core::domain::entities::SocialProvider;
use hl_core::services::{SocialIdentityVerifier, SocialProfile, SocialVerifyError};

use super::{classify_status, transport_error};

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Subset of the tokeninfo response. Google encodes booleans as strings here.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenInfo {
    pub sub: String,
    pub aud: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

pub struct GoogleVerifier {
    client: reqwest::Client,
    client_ids: Vec<String>,
    endpoint: String,
}

impl GoogleVerifier {
    pub fn new(client: reqwest::Client, client_ids: Vec<String>) -> Self {
        Self {
            client,
            client_ids,
            endpoint: TOKENINFO_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

pub(crate) fn profile_from_token_info(
    info: TokenInfo,
    client_ids: &[String],
) -> Result<SocialProfile, SocialVerifyError> {
    if !client_ids.iter().any(|id| id == &info.aud) {
        return Err(SocialVerifyError::Rejected(
            "Google token issued for another client".to_string(),
        ));
    }

    Ok(SocialProfile {
        provider_user_id: info.sub,
        email: info.email,
        name: info.name,
        email_verified: info.email_verified.as_deref() == Some("true"),
    })
}

#[async_trait]
impl SocialIdentityVerifier for GoogleVerifier {
    fn provider(&self) -> SocialProvider {
        SocialProvider::Google
    }

    async fn verify(&self, token: &str) -> Result<SocialProfile, SocialVerifyError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| transport_error(e, "google"))?;

        if !response.status().is_success() {
            return Err(classify_status(response.status(), "google"));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| SocialVerifyError::Rejected(format!("Malformed tokeninfo: {}", e)))?;
        profile_from_token_info(info, &self.client_ids)
    }
}
