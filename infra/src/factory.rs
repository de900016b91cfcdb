//! Wiring of stores and collaborators from configuration

use std::sync::Arc;

use hl_core::services::{AuthCollaborators, AuthStores};
use hl_shared::{AppConfig, StorageBackend};

use crate::email::create_email_service;
use crate::sms::create_sms_service;
use crate::social::build_registry;
use crate::InfrastructureError;

#[cfg(feature = "redis-cache")]
use crate::cache::{RedisClient, RedisOtpChallengeRepository};
#[cfg(feature = "mysql")]
use crate::database::{
    DatabasePool, MySqlAccountRepository, MySqlRefreshRecordRepository, MySqlResetTokenRepository,
};

/// Selected stores plus the connections behind them, kept for health checks
#[derive(Clone)]
pub struct StorageBackends {
    pub stores: AuthStores,
    #[cfg(feature = "mysql")]
    pub database: Option<DatabasePool>,
    #[cfg(feature = "redis-cache")]
    pub cache: Option<RedisClient>,
}

impl StorageBackends {
    /// Whether every connected backend answers
    pub async fn health_check(&self) -> bool {
        #[cfg(feature = "mysql")]
        if let Some(database) = &self.database {
            if !database.health_check().await.unwrap_or(false) {
                return false;
            }
        }
        #[cfg(feature = "redis-cache")]
        if let Some(cache) = &self.cache {
            if !cache.health_check().await.unwrap_or(false) {
                return false;
            }
        }
        true
    }

    /// Release pooled database connections. Used on shutdown.
    pub async fn close(&self) {
        #[cfg(feature = "mysql")]
        if let Some(database) = &self.database {
            database.close().await;
        }
    }

    pub fn backend_name(&self) -> &'static str {
        #[cfg(feature = "mysql")]
        if self.database.is_some() {
            return "mysql";
        }
        "memory"
    }

    fn in_memory() -> Self {
        Self {
            stores: AuthStores::in_memory(),
            #[cfg(feature = "mysql")]
            database: None,
            #[cfg(feature = "redis-cache")]
            cache: None,
        }
    }
}

/// Connect the configured storage backend
///
/// `mysql` runs the embedded migrations and keeps OTP challenges in Redis.
pub async fn build_stores(config: &AppConfig) -> Result<StorageBackends, InfrastructureError> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory stores; state is lost on restart");
            Ok(StorageBackends::in_memory())
        }
        StorageBackend::Mysql => build_durable_stores(config).await,
    }
}

#[cfg(all(feature = "mysql", feature = "redis-cache"))]
async fn build_durable_stores(config: &AppConfig) -> Result<StorageBackends, InfrastructureError> {
    let database = DatabasePool::new(&config.database).await?;
    database.run_migrations().await?;
    let cache = RedisClient::new(&config.cache).await?;
    let pool = database.get_pool().clone();

    let stores = AuthStores {
        accounts: Arc::new(MySqlAccountRepository::new(pool.clone())),
        refresh_records: Arc::new(MySqlRefreshRecordRepository::new(pool.clone())),
        otp_challenges: Arc::new(RedisOtpChallengeRepository::new(cache.clone())),
        reset_tokens: Arc::new(MySqlResetTokenRepository::new(pool)),
    };

    tracing::info!(pool = %database.get_statistics(), "Durable stores connected");
    Ok(StorageBackends {
        stores,
        database: Some(database),
        cache: Some(cache),
    })
}

#[cfg(not(all(feature = "mysql", feature = "redis-cache")))]
async fn build_durable_stores(_config: &AppConfig) -> Result<StorageBackends, InfrastructureError> {
    Err(InfrastructureError::Config(
        "mysql storage requires the mysql and redis-cache features".to_string(),
    ))
}

/// SMS, e-mail and social verifiers selected by configuration
pub fn build_collaborators(config: &AppConfig) -> Result<AuthCollaborators, InfrastructureError> {
    Ok(AuthCollaborators {
        sms: create_sms_service(&config.sms),
        email: create_email_service(&config.email),
        social: build_registry(&config.social)?,
    })
}
