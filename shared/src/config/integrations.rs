//! External collaborator configuration: e-mail, SMS and social identity providers

use serde::{Deserialize, Serialize};

use super::auth::env_or;

/// Outbound e-mail configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Provider name: `log` or `resend`
    pub provider: String,

    /// Provider API key
    pub api_key: String,

    /// Sender address
    pub from_address: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Link target of the welcome mail
    pub dashboard_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: String::from("log"),
            api_key: String::new(),
            from_address: String::from("Heallink <onboarding@resend.dev>"),
            timeout_seconds: 10,
            dashboard_url: String::from("http://localhost:3000/dashboard"),
        }
    }
}

impl EmailConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: std::env::var("EMAIL_PROVIDER").unwrap_or(defaults.provider),
            api_key: std::env::var("RESEND_API_KEY").unwrap_or(defaults.api_key),
            from_address: std::env::var("EMAIL_FROM").unwrap_or(defaults.from_address),
            timeout_seconds: env_or("EMAIL_TIMEOUT", defaults.timeout_seconds),
            dashboard_url: std::env::var("FRONTEND_URL")
                .map(|url| format!("{}/dashboard", url.trim_end_matches('/')))
                .unwrap_or(defaults.dashboard_url),
        }
    }
}

/// SMS gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SmsConfig {
    /// Provider name: `mock` or `twilio`
    pub provider: String,

    /// Account SID / API key
    pub api_key: String,

    /// Auth token / API secret
    pub api_secret: String,

    /// Sender number in E.164 format
    pub from_number: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: String::from("mock"),
            api_key: String::new(),
            api_secret: String::new(),
            from_number: String::from("+15005550006"),
        }
    }
}

impl SmsConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: std::env::var("SMS_PROVIDER").unwrap_or(defaults.provider),
            api_key: std::env::var("SMS_API_KEY").unwrap_or(defaults.api_key),
            api_secret: std::env::var("SMS_API_SECRET").unwrap_or(defaults.api_secret),
            from_number: std::env::var("SMS_FROM_NUMBER").unwrap_or(defaults.from_number),
        }
    }
}

/// Social identity provider credentials. A provider with no configured
/// audience is not offered.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SocialConfig {
    /// Accepted Google OAuth client ids
    pub google_client_ids: Vec<String>,

    /// Facebook app id
    pub facebook_app_id: Option<String>,

    /// Facebook app secret, used for the app access token of `debug_token`
    pub facebook_app_secret: Option<String>,

    /// Apple service id / bundle id expected as `aud`
    pub apple_client_id: Option<String>,

    /// Outbound request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            google_client_ids: Vec::new(),
            facebook_app_id: None,
            facebook_app_secret: None,
            apple_client_id: None,
            timeout_seconds: 10,
        }
    }
}

impl SocialConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let google_client_ids = std::env::var("GOOGLE_CLIENT_IDS")
            .map(|ids| {
                ids.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            google_client_ids,
            facebook_app_id: std::env::var("FACEBOOK_APP_ID").ok(),
            facebook_app_secret: std::env::var("FACEBOOK_APP_SECRET").ok(),
            apple_client_id: std::env::var("APPLE_CLIENT_ID").ok(),
            timeout_seconds: env_or("SOCIAL_TIMEOUT", 10),
        }
    }
}
