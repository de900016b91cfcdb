//! Shared utilities and common types for the Heallink authentication services
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration sections
//! - Error response envelope and error codes
//! - Utility functions (phone and e-mail normalisation, log masking)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, DatabaseConfig, EmailConfig, Environment, JwtConfig, LoggingConfig,
    OtpConfig, PasswordConfig, ResetConfig, ServerConfig, SmsConfig, SocialConfig, StorageBackend,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::{email, phone};
