//! Authentication configuration: token signing, OTP, password and reset policies

use serde::{Deserialize, Serialize};

const DEFAULT_ACCESS_SECRET: &str = "dev-access-secret-change-in-production";
const DEFAULT_REFRESH_SECRET: &str = "dev-refresh-secret-change-in-production";

/// JWT signing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret used to sign access tokens
    pub access_secret: String,

    /// Secret used to sign refresh tokens
    pub refresh_secret: String,

    /// Access token lifetime in seconds
    pub access_token_expiry: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,

    /// Clock skew tolerated when validating `exp`/`nbf`, in seconds
    pub leeway: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::from(DEFAULT_ACCESS_SECRET),
            refresh_secret: String::from(DEFAULT_REFRESH_SECRET),
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
            issuer: String::from("heallink-api"),
            audience: String::from("heallink-app"),
            leeway: 0,
        }
    }
}

impl JwtConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            access_secret: std::env::var("JWT_SECRET").unwrap_or(defaults.access_secret),
            refresh_secret: std::env::var("JWT_REFRESH_SECRET").unwrap_or(defaults.refresh_secret),
            access_token_expiry: env_or("JWT_ACCESS_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_or("JWT_REFRESH_EXPIRY", defaults.refresh_token_expiry),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            leeway: env_or("JWT_LEEWAY", defaults.leeway),
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if using default secrets (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.access_secret == DEFAULT_ACCESS_SECRET || self.refresh_secret == DEFAULT_REFRESH_SECRET
    }
}

/// One-time password configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OtpConfig {
    /// Number of digits in a generated code
    pub code_length: u32,

    /// Code lifetime in seconds
    pub expiry_seconds: i64,

    /// Wrong attempts tolerated before the challenge is burned
    pub max_attempts: u32,

    /// Minimum delay between two codes sent to the same phone, in seconds
    pub resend_cooldown_seconds: i64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            expiry_seconds: 600,
            max_attempts: 3,
            resend_cooldown_seconds: 60,
        }
    }
}

impl OtpConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            code_length: env_or("OTP_CODE_LENGTH", defaults.code_length),
            expiry_seconds: env_or("OTP_EXPIRY_SECONDS", defaults.expiry_seconds),
            max_attempts: env_or("OTP_MAX_ATTEMPTS", defaults.max_attempts),
            resend_cooldown_seconds: env_or("OTP_RESEND_COOLDOWN", defaults.resend_cooldown_seconds),
        }
    }
}

/// Password hashing and policy
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// bcrypt work factor (4..=31)
    pub bcrypt_cost: u32,

    /// Minimum accepted password length
    pub min_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: 12,
            min_length: 8,
        }
    }
}

impl PasswordConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bcrypt_cost: env_or("BCRYPT_COST", defaults.bcrypt_cost),
            min_length: env_or("PASSWORD_MIN_LENGTH", defaults.min_length),
        }
    }
}

/// Password reset configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResetConfig {
    /// Reset token lifetime in seconds
    pub expiry_seconds: i64,

    /// Front-end page receiving `?token=` links
    pub reset_url: String,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            expiry_seconds: 1800, // 30 minutes
            reset_url: String::from("http://localhost:3000/reset-password"),
        }
    }
}

impl ResetConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let reset_url = std::env::var("FRONTEND_URL")
            .map(|url| format!("{}/reset-password", url.trim_end_matches('/')))
            .unwrap_or(defaults.reset_url);
        Self {
            expiry_seconds: env_or("PASSWORD_RESET_EXPIRY", defaults.expiry_seconds),
            reset_url,
        }
    }
}

pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
