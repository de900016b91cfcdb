//! Wiring of the authentication services from stores, collaborators and settings

use hl_shared::{AppConfig, JwtConfig, OtpConfig, PasswordConfig, ResetConfig};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::errors::DomainResult;
use crate::repositories::{
    AccountRepository, InMemoryAccountRepository, InMemoryOtpChallengeRepository,
    InMemoryRefreshRecordRepository, InMemoryResetTokenRepository, OtpChallengeRepository,
    RefreshRecordRepository, ResetTokenRepository,
};
use crate::services::identity::{IdentityResolver, PasswordHasher, SocialVerifierRegistry};
use crate::services::mail::{EmailService, MailOutbox};
use crate::services::otp::{OtpService, SmsService};
use crate::services::reset::ResetTokenStore;
use crate::services::token::{TokenService, TokenServiceConfig};

use super::service::AuthService;

/// Persistence backends
#[derive(Clone)]
pub struct AuthStores {
    pub accounts: Arc<dyn AccountRepository>,
    pub refresh_records: Arc<dyn RefreshRecordRepository>,
    pub otp_challenges: Arc<dyn OtpChallengeRepository>,
    pub reset_tokens: Arc<dyn ResetTokenRepository>,
}

impl AuthStores {
    /// Process-local stores, for development and tests
    pub fn in_memory() -> Self {
        Self {
            accounts: Arc::new(InMemoryAccountRepository::new()),
            refresh_records: Arc::new(InMemoryRefreshRecordRepository::new()),
            otp_challenges: Arc::new(InMemoryOtpChallengeRepository::new()),
            reset_tokens: Arc::new(InMemoryResetTokenRepository::new()),
        }
    }
}

/// External services the flows call out to
#[derive(Clone)]
pub struct AuthCollaborators {
    pub sms: Arc<dyn SmsService>,
    pub email: Arc<dyn EmailService>,
    pub social: SocialVerifierRegistry,
}

/// Policy knobs
#[derive(Debug, Clone, Default)]
pub struct AuthSettings {
    pub jwt: JwtConfig,
    pub otp: OtpConfig,
    pub password: PasswordConfig,
    pub reset: ResetConfig,
    pub dashboard_url: String,
}

impl From<&AppConfig> for AuthSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            jwt: config.jwt.clone(),
            otp: config.otp.clone(),
            password: config.password.clone(),
            reset: config.reset.clone(),
            dashboard_url: config.email.dashboard_url.clone(),
        }
    }
}

impl AuthService {
    /// Build the service graph and start the mail worker
    ///
    /// Must be called inside a Tokio runtime. The returned handle finishes
    /// once the service and every clone of its outbox are dropped.
    pub fn assemble(
        stores: AuthStores,
        collaborators: AuthCollaborators,
        settings: AuthSettings,
    ) -> DomainResult<(Self, JoinHandle<()>)> {
        let tokens = Arc::new(TokenService::new(
            stores.refresh_records,
            TokenServiceConfig::from(&settings.jwt),
        )?);
        let passwords = Arc::new(PasswordHasher::new(&settings.password));
        let otp = Arc::new(OtpService::new(
            stores.otp_challenges,
            collaborators.sms,
            settings.otp,
        ));
        let (outbox, worker) = MailOutbox::start(collaborators.email);

        let identity = Arc::new(IdentityResolver::new(
            stores.accounts.clone(),
            otp.clone(),
            passwords.clone(),
            collaborators.social,
        ));
        let resets = Arc::new(ResetTokenStore::new(
            stores.reset_tokens,
            stores.accounts,
            passwords,
            tokens.clone(),
            outbox.clone(),
            settings.reset,
        ));

        let service = AuthService::new(identity, tokens, otp, resets, outbox, settings.dashboard_url);
        Ok((service, worker))
    }
}
