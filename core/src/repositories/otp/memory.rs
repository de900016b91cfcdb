//! In-memory OTP challenge store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::OtpChallenge;
use crate::errors::DomainError;

use super::r#trait::OtpChallengeRepository;

#[derive(Clone, Default)]
pub struct InMemoryOtpChallengeRepository {
    challenges: Arc<RwLock<HashMap<String, OtpChallenge>>>,
}

impl InMemoryOtpChallengeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpChallengeRepository for InMemoryOtpChallengeRepository {
    async fn save(&self, challenge: OtpChallenge) -> Result<(), DomainError> {
        self.challenges
            .write()
            .await
            .insert(challenge.phone.clone(), challenge);
        Ok(())
    }

    async fn find_latest(&self, phone: &str) -> Result<Option<OtpChallenge>, DomainError> {
        Ok(self.challenges.read().await.get(phone).cloned())
    }

    async fn record_failed_attempt(
        &self,
        phone: &str,
        challenge_id: Uuid,
        max_attempts: u32,
    ) -> Result<u32, DomainError> {
        let mut challenges = self.challenges.write().await;
        match challenges.get_mut(phone) {
            Some(challenge) if challenge.id == challenge_id => {
                if challenge.attempts < max_attempts {
                    challenge.attempts += 1;
                }
                Ok(challenge.attempts)
            }
            _ => Ok(0),
        }
    }

    async fn consume(
        &self,
        phone: &str,
        challenge_id: Uuid,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut challenges = self.challenges.write().await;
        match challenges.get_mut(phone) {
            Some(challenge)
                if challenge.id == challenge_id
                    && !challenge.is_expired_at(now)
                    && challenge.attempts < max_attempts =>
            {
                challenge.consumed = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut challenges = self.challenges.write().await;
        let before = challenges.len();
        challenges.retain(|_, challenge| !challenge.is_expired_at(now));
        Ok((before - challenges.len()) as u64)
    }
}
