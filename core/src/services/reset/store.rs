use chrono::{Duration, Utc};
use hl_shared::utils::email::{mask_email, normalize_email};
use hl_shared::ResetConfig;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domain::entities::ResetToken;
use crate::domain::value_objects::Session;
use crate::errors::{AuthError, DomainResult};
use crate::repositories::{AccountRepository, ResetTokenRepository};
use crate::services::crypto::{random_token_hex, sha256_hex};
use crate::services::identity::PasswordHasher;
use crate::services::mail::{templates, MailOutbox};
use crate::services::token::TokenService;

const RESET_TOKEN_BYTES: usize = 32;

/// Issues and redeems password reset tokens
///
/// Only the SHA-256 of a token is stored. The plaintext exists in the e-mail
/// link and nowhere else. Redemption deletes the stored record atomically, so
/// a token changes the password at most once even when submitted twice
/// concurrently.
pub struct ResetTokenStore {
    tokens: Arc<dyn ResetTokenRepository>,
    accounts: Arc<dyn AccountRepository>,
    passwords: Arc<PasswordHasher>,
    token_service: Arc<TokenService>,
    outbox: MailOutbox,
    config: ResetConfig,
}

impl ResetTokenStore {
    pub fn new(
        tokens: Arc<dyn ResetTokenRepository>,
        accounts: Arc<dyn AccountRepository>,
        passwords: Arc<PasswordHasher>,
        token_service: Arc<TokenService>,
        outbox: MailOutbox,
        config: ResetConfig,
    ) -> Self {
        Self {
            tokens,
            accounts,
            passwords,
            token_service,
            outbox,
            config,
        }
    }

    /// Start a reset for `email`
    ///
    /// Returns `Ok(())` whether or not an account exists for the address. Any
    /// earlier unredeemed token for the account is discarded.
    #[instrument(skip_all, fields(request_id = %session.request_id))]
    pub async fn request_reset(&self, session: &Session, email: &str) -> DomainResult<()> {
        let Some(email) = normalize_email(email) else {
            debug!("Reset requested for malformed address");
            return Ok(());
        };
        let Some(account) = self.accounts.find_by_email(&email).await? else {
            info!(email = %mask_email(&email), "Reset requested for unknown address");
            return Ok(());
        };

        let superseded = self.tokens.delete_for_account(account.id).await?;
        let token = random_token_hex(RESET_TOKEN_BYTES);
        self.tokens
            .save(ResetToken::new(
                account.id,
                sha256_hex(&token),
                Duration::seconds(self.config.expiry_seconds),
            ))
            .await?;

        let link = format!("{}?token={}", self.config.reset_url, token);
        self.outbox.enqueue(templates::password_reset(
            &email,
            account.name.as_deref(),
            &link,
            self.config.expiry_seconds / 60,
        ));

        info!(
            subject_id = %account.id,
            superseded,
            event = "password_reset_requested",
            "Issued password reset token"
        );
        Ok(())
    }

    /// Redeem `token` and set a new password
    ///
    /// On success every standing session of the account is revoked. A policy
    /// failure leaves the token redeemable.
    #[instrument(skip_all, fields(request_id = %session.request_id))]
    pub async fn reset_password(&self, session: &Session, token: &str, new_password: &str) -> DomainResult<()> {
        self.passwords.check_policy(new_password)?;

        let token_hash = sha256_hex(token.trim());
        let record = self
            .tokens
            .find_by_hash(&token_hash)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        if record.is_expired_at(Utc::now()) {
            self.tokens.consume(&token_hash).await?;
            warn!(subject_id = %record.account_id, event = "reset_token_expired", "Expired reset token presented");
            return Err(AuthError::ResetTokenExpired.into());
        }

        let password_hash = self.passwords.hash(new_password).await?;

        if !self.tokens.consume(&token_hash).await? {
            warn!(subject_id = %record.account_id, event = "reset_token_race_lost", "Reset token redeemed concurrently");
            return Err(AuthError::InvalidResetToken.into());
        }

        self.accounts
            .update_password(record.account_id, &password_hash)
            .await?;
        self.token_service.revoke(session, record.account_id).await?;

        info!(subject_id = %record.account_id, event = "password_reset", "Password reset completed");
        Ok(())
    }

    /// Drop expired tokens
    pub async fn purge_expired(&self) -> DomainResult<u64> {
        self.tokens.purge_expired(Utc::now()).await
    }
}
