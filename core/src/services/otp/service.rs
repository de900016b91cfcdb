//! OTP service implementation

use chrono::{DateTime, Duration, Utc};
use hl_shared::utils::phone::{mask_phone, normalize_phone};
use hl_shared::OtpConfig;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::domain::entities::OtpChallenge;
use crate::domain::value_objects::Session;
use crate::errors::{AuthError, DomainResult};
use crate::repositories::OtpChallengeRepository;
use crate::services::crypto::{hashes_match, random_numeric_code, sha256_hex};

use super::traits::SmsService;

/// Outcome of a successful `send_code`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpDispatch {
    /// Phone the code was sent to, in E.164
    pub phone: String,
    pub expires_at: DateTime<Utc>,
    pub message_id: String,
}

/// Issues and checks per-phone codes. Codes are generated with the OS CSPRNG,
/// stored only as a hash bound to the phone and expire after a fixed window.
pub struct OtpService {
    challenges: Arc<dyn OtpChallengeRepository>,
    sms: Arc<dyn SmsService>,
    config: OtpConfig,
}

impl OtpService {
    pub fn new(
        challenges: Arc<dyn OtpChallengeRepository>,
        sms: Arc<dyn SmsService>,
        config: OtpConfig,
    ) -> Self {
        Self {
            challenges,
            sms,
            config,
        }
    }

    /// Send a fresh code to `phone`
    ///
    /// This method:
    /// 1. Normalises the phone number to E.164
    /// 2. Enforces the resend cooldown of the previous open challenge
    /// 3. Stores the hashed code, superseding any earlier challenge
    /// 4. Sends the plaintext code via SMS
    #[instrument(skip_all, fields(request_id = %session.request_id))]
    pub async fn send_code(&self, session: &Session, phone: &str) -> DomainResult<OtpDispatch> {
        let phone = normalize_phone(phone).ok_or_else(|| AuthError::InvalidPhoneFormat {
            phone: mask_phone(phone),
        })?;
        let now = Utc::now();

        if let Some(previous) = self.challenges.find_latest(&phone).await? {
            let cooldown = Duration::seconds(self.config.resend_cooldown_seconds);
            if !previous.consumed {
                if let Some(retry_after) = previous.cooldown_remaining(now, cooldown) {
                    warn!(
                        phone = %mask_phone(&phone),
                        retry_after,
                        event = "otp_cooldown",
                        "Verification code requested during cooldown"
                    );
                    return Err(AuthError::OtpCooldown { retry_after }.into());
                }
            }
        }

        let code = random_numeric_code(self.config.code_length);
        let challenge = OtpChallenge::new(
            phone.clone(),
            Self::code_hash(&phone, &code),
            Duration::seconds(self.config.expiry_seconds),
        );
        let expires_at = challenge.expires_at;
        self.challenges.save(challenge).await?;

        let message_id = self
            .sms
            .send_verification_code(&phone, &code)
            .await
            .map_err(|e| {
                error!(
                    phone = %mask_phone(&phone),
                    error = %e,
                    event = "otp_delivery_failed",
                    "Failed to send verification code"
                );
                AuthError::SmsDeliveryFailed
            })?;

        info!(phone = %mask_phone(&phone), event = "otp_sent", "Sent verification code");
        Ok(OtpDispatch {
            phone,
            expires_at,
            message_id,
        })
    }

    /// Check `code` against the latest challenge for `phone` and consume it
    ///
    /// # Returns
    ///
    /// The normalised phone number on success; `InvalidOtp` when the code is
    /// wrong, expired, already used, or the attempt budget is spent.
    #[instrument(skip_all, fields(request_id = %session.request_id))]
    pub async fn verify_code(&self, session: &Session, phone: &str, code: &str) -> DomainResult<String> {
        let phone = normalize_phone(phone).ok_or(AuthError::InvalidOtp)?;
        let challenge = self
            .challenges
            .find_latest(&phone)
            .await?
            .ok_or(AuthError::InvalidOtp)?;

        if !challenge.is_open(Utc::now(), self.config.max_attempts) {
            return Err(AuthError::InvalidOtp.into());
        }

        let max_attempts = self.config.max_attempts;
        if !hashes_match(&Self::code_hash(&phone, code.trim()), &challenge.code_hash) {
            let attempts = self
                .challenges
                .record_failed_attempt(&phone, challenge.id, max_attempts)
                .await?;
            if attempts >= max_attempts {
                warn!(
                    phone = %mask_phone(&phone),
                    attempts,
                    event = "otp_attempts_exhausted",
                    "Verification code locked after repeated failures"
                );
            }
            return Err(AuthError::InvalidOtp.into());
        }

        // The snapshot above may be stale; the store re-checks the budget
        if !self
            .challenges
            .consume(&phone, challenge.id, max_attempts, Utc::now())
            .await?
        {
            warn!(
                phone = %mask_phone(&phone),
                event = "otp_consume_refused",
                "Verification code closed while it was being checked"
            );
            return Err(AuthError::InvalidOtp.into());
        }

        info!(phone = %mask_phone(&phone), event = "otp_verified", "Verification code accepted");
        Ok(phone)
    }

    fn code_hash(phone: &str, code: &str) -> String {
        sha256_hex(&format!("{}:{}", phone, code))
    }
}
