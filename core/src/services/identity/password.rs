use hl_shared::PasswordConfig;
use tokio::sync::OnceCell;

use crate::errors::{AuthError, DomainError, DomainResult};

/// bcrypt ignores input past this many bytes
const BCRYPT_MAX_BYTES: usize = 72;

/// bcrypt hashing and the password policy. Hashing runs on the blocking pool.
pub struct PasswordHasher {
    cost: u32,
    min_length: usize,
    dummy_hash: OnceCell<String>,
}

impl PasswordHasher {
    pub fn new(config: &PasswordConfig) -> Self {
        Self {
            cost: config.bcrypt_cost,
            min_length: config.min_length,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Reject passwords shorter than the configured minimum
    pub fn check_policy(&self, password: &str) -> DomainResult<()> {
        if password.chars().count() < self.min_length {
            return Err(AuthError::WeakPassword {
                min_length: self.min_length,
            }
            .into());
        }
        if password.len() > BCRYPT_MAX_BYTES {
            return Err(DomainError::Validation {
                message: format!("Password must be at most {} bytes", BCRYPT_MAX_BYTES),
            });
        }
        Ok(())
    }

    pub async fn hash(&self, password: &str) -> DomainResult<String> {
        let password = password.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(DomainError::internal)?
            .map_err(DomainError::internal)
    }

    pub async fn verify(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(DomainError::internal)?
            .map_err(DomainError::internal)
    }

    /// Spend the same work as a real verification. Used when the account is
    /// missing so response timing does not reveal whether it exists.
    pub async fn burn(&self, password: &str) {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| self.hash("heallink-dummy-password"))
            .await;
        if let Ok(dummy) = dummy {
            let _ = self.verify(password, dummy).await;
        }
    }
}
