//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token signing, OTP, password and reset policies
//! - `environment` - Environment detection and logging configuration
//! - `integrations` - E-mail, SMS and social identity providers
//! - `server` - HTTP server configuration
//! - `storage` - Backend selection, MySQL pool and Redis

pub mod auth;
pub mod environment;
pub mod integrations;
pub mod server;
pub mod storage;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::{JwtConfig, OtpConfig, PasswordConfig, ResetConfig};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use integrations::{EmailConfig, SmsConfig, SocialConfig};
pub use server::ServerConfig;
pub use storage::{CacheConfig, DatabaseConfig, StorageBackend};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub storage: StorageBackend,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub jwt: JwtConfig,
    pub otp: OtpConfig,
    pub password: PasswordConfig,
    pub reset: ResetConfig,
    pub email: EmailConfig,
    pub sms: SmsConfig,
    pub social: SocialConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            storage: std::env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or_default(),
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            jwt: JwtConfig::from_env(),
            otp: OtpConfig::from_env(),
            password: PasswordConfig::from_env(),
            reset: ResetConfig::from_env(),
            email: EmailConfig::from_env(),
            sms: SmsConfig::from_env(),
            social: SocialConfig::from_env(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Reject configurations that are unsafe outside development
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt.access_secret.is_empty() || self.jwt.refresh_secret.is_empty() {
            return Err("JWT secrets must not be empty".to_string());
        }
        if self.jwt.access_secret == self.jwt.refresh_secret {
            return Err("access and refresh tokens must use different secrets".to_string());
        }
        if !self.environment.is_development() {
            if self.jwt.is_using_default_secret() {
                return Err("default JWT secrets are only allowed in development".to_string());
            }
            if self.storage == StorageBackend::Memory {
                return Err("the in-memory storage backend is only allowed in development".to_string());
            }
        }
        if !(4..=31).contains(&self.password.bcrypt_cost) {
            return Err(format!("bcrypt cost {} is out of range 4..=31", self.password.bcrypt_cost));
        }
        Ok(())
    }
}
