//! Sign in with Apple identity token verification
//!
//! Tokens are RS256 JWTs signed with one of Apple's published keys. The key
//! set is cached and refetched when a token names an unknown key id or the
//! cache is older than an hour.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Deserializer};
use tokio::sync::RwLock;

use hl_core::domain::entities::SocialProvider;
use hl_core::services::{SocialIdentityVerifier, SocialProfile, SocialVerifyError};

use super::{classify_status, transport_error};

const APPLE_KEYS_URL: &str = "https://appleid.apple.com/auth/keys";
pub(crate) const APPLE_ISSUER: &str = "https://appleid.apple.com";

/// Claims of an Apple identity token
#[derive(Debug, Deserialize)]
pub(crate) struct AppleClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Apple sends either a boolean or the string "true"
    #[serde(default, deserialize_with = "flexible_bool")]
    pub email_verified: bool,
}

fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    Ok(match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(value) => value,
        BoolOrString::String(value) => value == "true",
    })
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: DateTime<Utc>,
}

pub struct AppleVerifier {
    client: reqwest::Client,
    client_id: String,
    keys_url: String,
    cache: RwLock<Option<CachedKeys>>,
}

impl AppleVerifier {
    pub fn new(client: reqwest::Client, client_id: String) -> Self {
        Self {
            client,
            client_id,
            keys_url: APPLE_KEYS_URL.to_string(),
            cache: RwLock::new(None),
        }
    }

    pub fn with_keys_url(mut self, keys_url: impl Into<String>) -> Self {
        self.keys_url = keys_url.into();
        self
    }

    async fn fetch_keys(&self) -> Result<JwkSet, SocialVerifyError> {
        let response = self
            .client
            .get(&self.keys_url)
            .send()
            .await
            .map_err(|e| transport_error(e, "apple"))?;

        if !response.status().is_success() {
            // A failing key endpoint is never the caller's fault
            return Err(SocialVerifyError::Unavailable(
                classify_status(response.status(), "apple").to_string(),
            ));
        }
        response
            .json::<JwkSet>()
            .await
            .map_err(|e| SocialVerifyError::Unavailable(format!("Malformed Apple key set: {}", e)))
    }

    /// Decoding key for `kid`, refreshing the cached key set when needed
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, SocialVerifyError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                let fresh = Utc::now() - cached.fetched_at < Duration::hours(1);
                if let (true, Some(jwk)) = (fresh, cached.keys.find(kid)) {
                    return key_from_jwk(jwk);
                }
            }
        }

        let keys = self.fetch_keys().await?;
        let key = keys
            .find(kid)
            .ok_or_else(|| SocialVerifyError::Rejected(format!("Unknown Apple key id {}", kid)))
            .and_then(key_from_jwk);
        *self.cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Utc::now(),
        });
        key
    }
}

fn key_from_jwk(jwk: &jsonwebtoken::jwk::Jwk) -> Result<DecodingKey, SocialVerifyError> {
    DecodingKey::from_jwk(jwk)
        .map_err(|e| SocialVerifyError::Unavailable(format!("Unusable Apple key: {}", e)))
}

pub(crate) fn validation(client_id: &str) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[client_id]);
    validation.set_issuer(&[APPLE_ISSUER]);
    validation
}

pub(crate) fn profile_from_claims(claims: AppleClaims) -> SocialProfile {
    SocialProfile {
        provider_user_id: claims.sub,
        email: claims.email,
        // Apple only shares a name on the first authorization, outside the token
        name: None,
        email_verified: claims.email_verified,
    }
}

#[async_trait]
impl SocialIdentityVerifier for AppleVerifier {
    fn provider(&self) -> SocialProvider {
        SocialProvider::Apple
    }

    async fn verify(&self, token: &str) -> Result<SocialProfile, SocialVerifyError> {
        let header = decode_header(token)
            .map_err(|e| SocialVerifyError::Rejected(format!("Malformed Apple token: {}", e)))?;
        let kid = header
            .kid
            .ok_or_else(|| SocialVerifyError::Rejected("Apple token has no key id".to_string()))?;

        let key = self.decoding_key(&kid).await?;
        let data = decode::<AppleClaims>(token, &key, &validation(&self.client_id))
            .map_err(|e| SocialVerifyError::Rejected(format!("Apple token rejected: {}", e)))?;

        Ok(profile_from_claims(data.claims))
    }
}
