//! Redis storage for OTP challenges
//!
//! One hash per phone under `otp:{phone}`. Saving replaces the hash, so a
//! newer challenge supersedes the older one. Attempt counting and
//! consumption run as Lua scripts that check the challenge id, the attempt
//! budget and the expiry inside Redis, so concurrent verifications cannot
//! act on a stale read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use hl_core::domain::entities::OtpChallenge;
use hl_core::errors::DomainError;
use hl_core::repositories::OtpChallengeRepository;
use hl_shared::utils::phone::mask_phone;

use super::RedisClient;

const OTP_KEY_PREFIX: &str = "otp";

/// ARGV: challenge id, max attempts
const RECORD_FAILED_ATTEMPT: &str = r#"
if redis.call('HGET', KEYS[1], 'id') ~= ARGV[1] then
    return 0
end
local attempts = tonumber(redis.call('HGET', KEYS[1], 'attempts') or '0')
if attempts >= tonumber(ARGV[2]) then
    return attempts
end
return redis.call('HINCRBY', KEYS[1], 'attempts', 1)
"#;

/// ARGV: challenge id, max attempts, now (unix seconds)
const CONSUME: &str = r#"
if redis.call('HGET', KEYS[1], 'id') ~= ARGV[1] then
    return 0
end
local attempts = tonumber(redis.call('HGET', KEYS[1], 'attempts') or '0')
if attempts >= tonumber(ARGV[2]) then
    return 0
end
local expires = tonumber(redis.call('HGET', KEYS[1], 'expires_epoch') or '0')
if tonumber(ARGV[3]) >= expires then
    return 0
end
redis.call('HSET', KEYS[1], 'consumed', '1')
return 1
"#;

/// Redis implementation of OtpChallengeRepository
pub struct RedisOtpChallengeRepository {
    redis: RedisClient,
    record_failed_attempt: redis::Script,
    consume: redis::Script,
}

impl RedisOtpChallengeRepository {
    pub fn new(redis: RedisClient) -> Self {
        Self {
            redis,
            record_failed_attempt: redis::Script::new(RECORD_FAILED_ATTEMPT),
            consume: redis::Script::new(CONSUME),
        }
    }

    fn key(&self, phone: &str) -> String {
        self.redis.key(&format!("{}:{}", OTP_KEY_PREFIX, phone))
    }
}

/// Hash fields stored for a challenge
pub(crate) fn challenge_to_fields(challenge: &OtpChallenge) -> Vec<(&'static str, String)> {
    vec![
        ("id", challenge.id.to_string()),
        ("phone", challenge.phone.clone()),
        ("code_hash", challenge.code_hash.clone()),
        ("expires_at", challenge.expires_at.to_rfc3339()),
        ("expires_epoch", challenge.expires_at.timestamp().to_string()),
        ("created_at", challenge.created_at.to_rfc3339()),
        ("attempts", challenge.attempts.to_string()),
        ("consumed", if challenge.consumed { "1" } else { "0" }.to_string()),
    ]
}

/// Rebuild a challenge from its hash; `None` for an empty (missing) hash
pub(crate) fn challenge_from_fields(
    fields: &HashMap<String, String>,
) -> Result<Option<OtpChallenge>, DomainError> {
    if fields.is_empty() {
        return Ok(None);
    }

    let field = |name: &str| {
        fields
            .get(name)
            .ok_or_else(|| DomainError::internal(format!("OTP challenge missing field {}", name)))
    };
    let timestamp = |name: &str| -> Result<DateTime<Utc>, DomainError> {
        DateTime::parse_from_rfc3339(field(name)?)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| DomainError::internal(format!("Invalid {}: {}", name, e)))
    };

    Ok(Some(OtpChallenge {
        id: Uuid::parse_str(field("id")?)
            .map_err(|e| DomainError::internal(format!("Invalid challenge id: {}", e)))?,
        phone: field("phone")?.clone(),
        code_hash: field("code_hash")?.clone(),
        expires_at: timestamp("expires_at")?,
        created_at: timestamp("created_at")?,
        attempts: field("attempts")?
            .parse()
            .map_err(|e| DomainError::internal(format!("Invalid attempts: {}", e)))?,
        consumed: field("consumed")? == "1",
    }))
}

#[async_trait]
impl OtpChallengeRepository for RedisOtpChallengeRepository {
    async fn save(&self, challenge: OtpChallenge) -> Result<(), DomainError> {
        let ttl = (challenge.expires_at - Utc::now()).num_seconds().max(1);
        debug!(phone = %mask_phone(&challenge.phone), ttl, "Storing OTP challenge");

        self.redis
            .replace_hash(&self.key(&challenge.phone), challenge_to_fields(&challenge), ttl)
            .await?;
        Ok(())
    }

    async fn find_latest(&self, phone: &str) -> Result<Option<OtpChallenge>, DomainError> {
        let fields = self.redis.hash_get_all(&self.key(phone)).await?;
        challenge_from_fields(&fields)
    }

    async fn record_failed_attempt(
        &self,
        phone: &str,
        challenge_id: Uuid,
        max_attempts: u32,
    ) -> Result<u32, DomainError> {
        let attempts: i64 = self
            .redis
            .eval_script(
                &self.record_failed_attempt,
                &self.key(phone),
                vec![challenge_id.to_string(), max_attempts.to_string()],
            )
            .await?;
        Ok(attempts.max(0) as u32)
    }

    async fn consume(
        &self,
        phone: &str,
        challenge_id: Uuid,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let accepted: i64 = self
            .redis
            .eval_script(
                &self.consume,
                &self.key(phone),
                vec![
                    challenge_id.to_string(),
                    max_attempts.to_string(),
                    now.timestamp().to_string(),
                ],
            )
            .await?;
        Ok(accepted == 1)
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<u64, DomainError> {
        // Keys carry their own TTL
        Ok(0)
    }
}
