//! In-memory reset token store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::ResetToken;
use crate::errors::DomainError;

use super::r#trait::ResetTokenRepository;

#[derive(Clone, Default)]
pub struct InMemoryResetTokenRepository {
    tokens: Arc<RwLock<HashMap<String, ResetToken>>>,
}

impl InMemoryResetTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored token
    pub async fn all(&self) -> Vec<ResetToken> {
        self.tokens.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl ResetTokenRepository for InMemoryResetTokenRepository {
    async fn save(&self, token: ResetToken) -> Result<(), DomainError> {
        self.tokens
            .write()
            .await
            .insert(token.token_hash.clone(), token);
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<ResetToken>, DomainError> {
        Ok(self.tokens.read().await.get(token_hash).cloned())
    }

    async fn consume(&self, token_hash: &str) -> Result<bool, DomainError> {
        Ok(self.tokens.write().await.remove(token_hash).is_some())
    }

    async fn delete_for_account(&self, account_id: Uuid) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| token.account_id != account_id);
        Ok((before - tokens.len()) as u64)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| !token.is_expired_at(now));
        Ok((before - tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_consume_is_single_use() {
        let repo = InMemoryResetTokenRepository::new();
        repo.save(ResetToken::new(Uuid::new_v4(), "hash", Duration::minutes(30))).await.unwrap();

        assert!(repo.consume("hash").await.unwrap());
        assert!(!repo.consume("hash").await.unwrap());
        assert!(repo.find_by_hash("hash").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_for_account() {
        let repo = InMemoryResetTokenRepository::new();
        let account = Uuid::new_v4();
        repo.save(ResetToken::new(account, "a", Duration::minutes(30))).await.unwrap();
        repo.save(ResetToken::new(account, "b", Duration::minutes(30))).await.unwrap();
        repo.save(ResetToken::new(Uuid::new_v4(), "c", Duration::minutes(30))).await.unwrap();

        assert_eq!(repo.delete_for_account(account).await.unwrap(), 2);
        assert_eq!(repo.all().await.len(), 1);
    }
}
