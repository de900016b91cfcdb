//! One-time password challenge sent over SMS.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A code sent to a phone. Only the hash of the code is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub id: Uuid,
    /// E.164 phone number
    pub phone: String,
    /// SHA-256 (hex) of `phone:code`
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
    /// Failed verification attempts so far
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn new(phone: impl Into<String>, code_hash: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            phone: phone.into(),
            code_hash: code_hash.into(),
            expires_at: now + ttl,
            consumed: false,
            attempts: 0,
            created_at: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether a verification may still be attempted against this challenge
    pub fn is_open(&self, now: DateTime<Utc>, max_attempts: u32) -> bool {
        !self.consumed && !self.is_expired_at(now) && self.attempts < max_attempts
    }

    /// Seconds remaining before another code may be sent, given a cooldown
    pub fn cooldown_remaining(&self, now: DateTime<Utc>, cooldown: Duration) -> Option<i64> {
        let ready_at = self.created_at + cooldown;
        (now < ready_at).then(|| (ready_at - now).num_seconds().max(1))
    }
}
