//! Password reset token record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored half of a reset link. The plaintext token only ever exists in the
/// e-mail sent to the account owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetToken {
    pub account_id: Uuid,
    /// SHA-256 (hex) of the plaintext token
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn new(account_id: Uuid, token_hash: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            token_hash: token_hash.into(),
            expires_at: now + ttl,
            created_at: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
