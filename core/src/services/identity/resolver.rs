use std::sync::Arc;
use tracing::{info, instrument, warn};

use hl_shared::utils::email::{mask_email, normalize_email};
use hl_shared::utils::phone::{mask_phone, normalize_phone};

use crate::domain::entities::{Account, ProviderId, Role, SocialProvider};
use crate::domain::value_objects::{LoginIdentifier, ProofOfIdentity, Session};
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::AccountRepository;
use crate::services::otp::OtpService;

use super::password::PasswordHasher;
use super::social::{SocialVerifierRegistry, SocialVerifyError};

/// Explicit signup request
#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
    pub name: Option<String>,
    pub role: Role,
}

/// Store lookups tried, in order, after losing an insert race
enum Lookup<'a> {
    Phone(&'a str),
    Email(&'a str),
    Provider(&'a ProviderId),
}

/// Resolves password, OTP and social proofs to accounts
///
/// OTP and social first logins create the account on the fly. Creation relies
/// on the store's unique constraints: a concurrent resolution of the same
/// identifier that loses the insert re-reads the winner's account instead of
/// failing.
pub struct IdentityResolver {
    accounts: Arc<dyn AccountRepository>,
    otp: Arc<OtpService>,
    passwords: Arc<PasswordHasher>,
    social: SocialVerifierRegistry,
}

impl IdentityResolver {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        otp: Arc<OtpService>,
        passwords: Arc<PasswordHasher>,
        social: SocialVerifierRegistry,
    ) -> Self {
        Self {
            accounts,
            otp,
            passwords,
            social,
        }
    }

    /// Single entry point for every proof kind
    pub async fn resolve(&self, session: &Session, proof: &ProofOfIdentity) -> DomainResult<Account> {
        match proof {
            ProofOfIdentity::Password { identifier, password } => {
                self.by_password(session, identifier, password).await
            }
            ProofOfIdentity::Otp { phone, code } => self.by_otp(session, phone, code).await,
            ProofOfIdentity::Social { provider, token } => {
                self.by_social(session, *provider, token).await
            }
        }
    }

    /// Look the account up by e-mail or phone and check its password
    ///
    /// Unknown identifiers and wrong passwords both yield `InvalidCredentials`,
    /// after the same amount of hashing work.
    #[instrument(skip_all, fields(request_id = %session.request_id))]
    pub async fn by_password(&self, session: &Session, identifier: &str, password: &str) -> DomainResult<Account> {
        let account = match LoginIdentifier::parse(identifier) {
            Some(LoginIdentifier::Email(email)) => self.accounts.find_by_email(&email).await?,
            Some(LoginIdentifier::Phone(phone)) => self.accounts.find_by_phone(&phone).await?,
            None => None,
        };

        let Some(account) = account else {
            self.passwords.burn(password).await;
            warn!(event = "invalid_credentials", reason = "unknown_identifier", "Password login rejected");
            return Err(AuthError::InvalidCredentials.into());
        };
        let Some(hash) = account.password_hash.as_deref() else {
            self.passwords.burn(password).await;
            warn!(
                subject_id = %account.id,
                event = "invalid_credentials",
                reason = "no_password",
                "Password login rejected"
            );
            return Err(AuthError::InvalidCredentials.into());
        };

        if !self.passwords.verify(password, hash).await? {
            warn!(
                subject_id = %account.id,
                event = "invalid_credentials",
                reason = "wrong_password",
                "Password login rejected"
            );
            return Err(AuthError::InvalidCredentials.into());
        }

        info!(subject_id = %account.id, "Password login accepted");
        Ok(account)
    }

    /// Verify an OTP and return the phone's account, creating it on first use
    #[instrument(skip_all, fields(request_id = %session.request_id))]
    pub async fn by_otp(&self, session: &Session, phone: &str, code: &str) -> DomainResult<Account> {
        let phone = self.otp.verify_code(session, phone, code).await?;

        if let Some(mut account) = self.accounts.find_by_phone(&phone).await? {
            if !account.phone_verified {
                self.accounts.mark_phone_verified(account.id).await?;
                account.phone_verified = true;
            }
            return Ok(account);
        }

        let candidate = Account::new().with_phone(phone.clone(), true);
        let account = self
            .insert_or_fetch(candidate, &[Lookup::Phone(&phone)])
            .await?;
        info!(subject_id = %account.id, phone = %mask_phone(&phone), "Resolved OTP login");
        Ok(account)
    }

    /// Verify a provider token and return the linked account
    ///
    /// Lookup order is provider identity, then verified e-mail (linking the
    /// provider to that account), then a new account.
    #[instrument(skip_all, fields(request_id = %session.request_id, provider = %provider))]
    pub async fn by_social(&self, session: &Session, provider: SocialProvider, token: &str) -> DomainResult<Account> {
        let verifier = self
            .social
            .get(provider)
            .ok_or_else(|| AuthError::UnsupportedProvider {
                provider: provider.to_string(),
            })?;

        let profile = verifier.verify(token).await.map_err(|e| {
            warn!(event = "invalid_credentials", error = %e, "Social token not accepted");
            match e {
                SocialVerifyError::Rejected(_) => AuthError::InvalidCredentials,
                SocialVerifyError::Unavailable(_) => AuthError::ProviderUnavailable,
            }
        })?;

        let provider_id = ProviderId::new(provider, profile.provider_user_id.clone());
        if let Some(account) = self.accounts.find_by_provider(&provider_id).await? {
            return Ok(account);
        }

        // Only a provider-verified address may be used to link accounts
        let email = profile
            .email
            .as_deref()
            .filter(|_| profile.email_verified)
            .and_then(normalize_email);

        if let Some(email) = email.as_deref() {
            if let Some(account) = self.accounts.find_by_email(email).await? {
                return self.link(account, &provider_id).await;
            }
        }

        let mut candidate = Account::new()
            .with_name(profile.name.clone())
            .with_provider(provider_id.clone());
        if let Some(email) = email.as_deref() {
            candidate = candidate.with_email(email, true);
        }

        let mut lookups = vec![Lookup::Provider(&provider_id)];
        if let Some(email) = email.as_deref() {
            lookups.push(Lookup::Email(email));
        }
        let account = self.insert_or_fetch(candidate, &lookups).await?;
        let account = if account.is_linked_to(&provider_id) {
            account
        } else {
            self.link(account, &provider_id).await?
        };

        info!(
            subject_id = %account.id,
            email = %email.as_deref().map(mask_email).unwrap_or_default(),
            "Resolved social login"
        );
        Ok(account)
    }

    /// Create a password account. Taken e-mail or phone is `DuplicateAccount`.
    #[instrument(skip_all, fields(request_id = %session.request_id))]
    pub async fn register(&self, session: &Session, input: RegisterInput) -> DomainResult<Account> {
        let email = match input.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            Some(raw) => Some(normalize_email(raw).ok_or(AuthError::InvalidEmail)?),
            None => None,
        };
        let phone = match input.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(raw) => Some(normalize_phone(raw).ok_or_else(|| AuthError::InvalidPhoneFormat {
                phone: mask_phone(raw),
            })?),
            None => None,
        };
        if email.is_none() && phone.is_none() {
            return Err(DomainError::Validation {
                message: "Either email or phone is required".to_string(),
            });
        }
        self.passwords.check_policy(&input.password)?;

        let mut account = Account::new()
            .with_password_hash(self.passwords.hash(&input.password).await?)
            .with_name(input.name.filter(|n| !n.trim().is_empty()));
        account.role = input.role;
        if let Some(email) = email {
            account = account.with_email(email, false);
        }
        if let Some(phone) = phone {
            account = account.with_phone(phone, false);
        }

        match self.accounts.insert(account).await {
            Ok(account) => {
                info!(subject_id = %account.id, role = account.role.as_str(), "Registered account");
                Ok(account)
            }
            Err(DomainError::UniqueViolation { constraint }) => {
                Err(AuthError::DuplicateAccount { field: constraint }.into())
            }
            Err(e) => Err(e),
        }
    }

    async fn find(&self, lookup: &Lookup<'_>) -> DomainResult<Option<Account>> {
        match lookup {
            Lookup::Phone(phone) => self.accounts.find_by_phone(phone).await,
            Lookup::Email(email) => self.accounts.find_by_email(email).await,
            Lookup::Provider(provider_id) => self.accounts.find_by_provider(provider_id).await,
        }
    }

    /// Insert `candidate`; on a unique violation return whichever existing
    /// account the lookups find first.
    async fn insert_or_fetch(&self, candidate: Account, lookups: &[Lookup<'_>]) -> DomainResult<Account> {
        match self.accounts.insert(candidate).await {
            Ok(account) => Ok(account),
            Err(e) if e.is_unique_violation() => {
                for lookup in lookups {
                    if let Some(existing) = self.find(lookup).await? {
                        info!(subject_id = %existing.id, "Concurrent first login converged on existing account");
                        return Ok(existing);
                    }
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn link(&self, mut account: Account, provider_id: &ProviderId) -> DomainResult<Account> {
        match self.accounts.link_provider(account.id, provider_id).await {
            Ok(()) => {
                account.linked_providers.insert(provider_id.clone());
                Ok(account)
            }
            // Someone linked this identity elsewhere in the meantime
            Err(e) if e.is_unique_violation() => self
                .accounts
                .find_by_provider(provider_id)
                .await?
                .ok_or(e),
            Err(e) => Err(e),
        }
    }
}
