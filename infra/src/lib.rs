//! # Infrastructure Layer
//!
//! Concrete implementations of the stores and external collaborators the
//! core services are written against.
//!
//! ## Architecture
//!
//! - **Database**: MySQL repositories for accounts, refresh records and reset tokens (SQLx)
//! - **Cache**: Redis client and the OTP challenge store
//! - **SMS**: Mock and Twilio gateways
//! - **Email**: Log-only and Resend providers
//! - **Social**: Google, Facebook and Apple token verifiers
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis caching support (default)

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Cache module - Redis client and OTP challenge storage
#[cfg(feature = "redis-cache")]
pub mod cache;

/// SMS service module - External SMS providers
pub mod sms;

/// E-mail service module - Transactional mail providers
pub mod email;

/// Social identity module - Provider token verification
pub mod social;

/// Wiring of stores and collaborators from configuration
pub mod factory;

pub use factory::{build_collaborators, build_stores, StorageBackends};

use hl_core::errors::DomainError;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[cfg(feature = "mysql")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[cfg(feature = "redis-cache")]
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),

    /// E-mail service error
    #[error("Email service error: {0}")]
    Email(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        DomainError::internal(error)
    }
}
