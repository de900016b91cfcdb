//! OTP challenge repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::OtpChallenge;
use crate::errors::DomainError;

/// Stores at most one challenge per phone: saving a new challenge
/// supersedes the previous one.
#[async_trait]
pub trait OtpChallengeRepository: Send + Sync {
    /// Store a challenge, replacing any earlier challenge for the same phone
    async fn save(&self, challenge: OtpChallenge) -> Result<(), DomainError>;

    /// The most recent challenge for a phone, consumed or not
    async fn find_latest(&self, phone: &str) -> Result<Option<OtpChallenge>, DomainError>;

    /// Count a wrong code against a challenge, atomically
    ///
    /// The counter never moves past `max_attempts`.
    ///
    /// # Returns
    /// The attempt count after the call, or 0 if the challenge has been
    /// superseded or removed in the meantime
    async fn record_failed_attempt(
        &self,
        phone: &str,
        challenge_id: Uuid,
        max_attempts: u32,
    ) -> Result<u32, DomainError>;

    /// Consume a challenge if it is still redeemable, in one atomic step
    ///
    /// Succeeds only while `challenge_id` is the latest challenge, it has not
    /// expired at `now` and fewer than `max_attempts` wrong codes were
    /// counted. A challenge that is already consumed but still within those
    /// bounds succeeds again, so concurrent submissions of the same correct
    /// code all resolve to the same phone.
    ///
    /// # Returns
    /// `true` if the caller may treat the code as accepted
    async fn consume(
        &self,
        phone: &str,
        challenge_id: Uuid,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Drop challenges that expired before `now`, returning how many were removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}
