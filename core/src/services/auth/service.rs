//! Main authentication service implementation

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domain::entities::{Account, Claims, SocialProvider, TokenPair, TokenSubject};
use crate::domain::value_objects::{AccountProfile, AuthResponse, ProofOfIdentity, Session};
use crate::errors::DomainResult;
use crate::services::identity::{IdentityResolver, RegisterInput};
use crate::services::mail::{templates, MailOutbox};
use crate::services::otp::{OtpDispatch, OtpService};
use crate::services::reset::ResetTokenStore;
use crate::services::token::TokenService;

/// Authentication service for the complete credential lifecycle
pub struct AuthService {
    identity: Arc<IdentityResolver>,
    tokens: Arc<TokenService>,
    otp: Arc<OtpService>,
    resets: Arc<ResetTokenStore>,
    outbox: MailOutbox,
    dashboard_url: String,
}

impl AuthService {
    pub fn new(
        identity: Arc<IdentityResolver>,
        tokens: Arc<TokenService>,
        otp: Arc<OtpService>,
        resets: Arc<ResetTokenStore>,
        outbox: MailOutbox,
        dashboard_url: String,
    ) -> Self {
        Self {
            identity,
            tokens,
            otp,
            resets,
            outbox,
            dashboard_url,
        }
    }

    /// The token service, for bearer verification at the edge
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Flush queued mail. Used on shutdown.
    pub async fn flush_mail(&self) {
        self.outbox.flush().await;
    }

    /// Login with e-mail or phone and password
    ///
    /// # Returns
    ///
    /// * `Ok(AuthResponse)` - A fresh token pair and the account profile
    /// * `Err(DomainError)` - `InvalidCredentials` for any unknown identifier
    ///   or wrong password
    pub async fn login(&self, session: &Session, identifier: &str, password: &str) -> DomainResult<AuthResponse> {
        let proof = ProofOfIdentity::Password {
            identifier: identifier.to_string(),
            password: password.to_string(),
        };
        self.sign_in(session, &proof).await
    }

    /// Explicit signup. Queues a welcome mail after the account is stored.
    #[instrument(skip_all, fields(request_id = %session.request_id))]
    pub async fn register(&self, session: &Session, input: RegisterInput) -> DomainResult<AccountProfile> {
        let account = self.identity.register(session, input).await?;
        if let Some(email) = account.email.as_deref() {
            self.outbox.enqueue(templates::welcome(
                email,
                account.name.as_deref(),
                &self.dashboard_url,
            ));
        }
        Ok(AccountProfile::from(&account))
    }

    pub async fn send_otp(&self, session: &Session, phone: &str) -> DomainResult<OtpDispatch> {
        self.otp.send_code(session, phone).await
    }

    /// Login with a code previously sent by [`send_otp`](Self::send_otp).
    /// The account is created on first use.
    pub async fn verify_otp(&self, session: &Session, phone: &str, code: &str) -> DomainResult<AuthResponse> {
        let proof = ProofOfIdentity::Otp {
            phone: phone.to_string(),
            code: code.to_string(),
        };
        self.sign_in(session, &proof).await
    }

    /// Login with a provider token. `provider` is the wire name.
    pub async fn social_login(&self, session: &Session, provider: &str, token: &str) -> DomainResult<AuthResponse> {
        let provider: SocialProvider = provider.parse()?;
        let proof = ProofOfIdentity::Social {
            provider,
            token: token.to_string(),
        };
        self.sign_in(session, &proof).await
    }

    /// Rotate a refresh token
    pub async fn refresh(&self, session: &Session, refresh_token: &str) -> DomainResult<TokenPair> {
        self.tokens.refresh(session, refresh_token).await
    }

    /// End the session an access token belongs to
    ///
    /// Expired but authentic tokens are accepted. Anything else is ignored.
    #[instrument(skip_all, fields(request_id = %session.request_id))]
    pub async fn logout(&self, session: &Session, access_token: &str) {
        let claims = match self.tokens.decode_access_token_allow_expired(access_token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Logout with unusable token ignored");
                return;
            }
        };
        let Ok(subject_id) = claims.subject_id() else {
            return;
        };
        match self.tokens.revoke(session, subject_id).await {
            Ok(_) => info!(subject_id = %subject_id, "Logged out"),
            Err(e) => warn!(subject_id = %subject_id, error = %e, "Failed to revoke session on logout"),
        }
    }

    /// Start a password reset. Never fails from the caller's point of view.
    #[instrument(skip_all, fields(request_id = %session.request_id))]
    pub async fn request_password_reset(&self, session: &Session, email: &str) {
        if let Err(e) = self.resets.request_reset(session, email).await {
            warn!(error = %e, "Password reset request failed");
        }
    }

    pub async fn reset_password(&self, session: &Session, token: &str, new_password: &str) -> DomainResult<()> {
        self.resets.reset_password(session, token, new_password).await
    }

    /// Verify a bearer access token
    pub async fn authenticate(&self, access_token: &str) -> DomainResult<Claims> {
        self.tokens.verify_access_token(access_token).await
    }

    #[instrument(skip_all, fields(request_id = %session.request_id, proof = proof.kind()))]
    async fn sign_in(&self, session: &Session, proof: &ProofOfIdentity) -> DomainResult<AuthResponse> {
        let account = self.identity.resolve(session, proof).await?;
        self.issue_for(session, &account).await
    }

    async fn issue_for(&self, session: &Session, account: &Account) -> DomainResult<AuthResponse> {
        let pair = self.tokens.issue(session, &TokenSubject::from(account)).await?;
        Ok(AuthResponse::from_token_pair(pair, account))
    }
}
