//! Reset token repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::ResetToken;
use crate::errors::DomainError;

/// Repository trait for password reset tokens, keyed by token hash
#[async_trait]
pub trait ResetTokenRepository: Send + Sync {
    /// Store a new reset token
    async fn save(&self, token: ResetToken) -> Result<(), DomainError>;

    /// Look a token up by the hash of its plaintext
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<ResetToken>, DomainError>;

    /// Atomically delete a token
    ///
    /// # Returns
    /// * `Ok(true)` - This call removed the token and owns its redemption
    /// * `Ok(false)` - The token was already gone
    async fn consume(&self, token_hash: &str) -> Result<bool, DomainError>;

    /// Delete every token issued for an account
    async fn delete_for_account(&self, account_id: Uuid) -> Result<u64, DomainError>;

    /// Drop tokens that expired before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}
