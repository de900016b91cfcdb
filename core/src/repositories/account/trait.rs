//! Account repository trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{Account, ProviderId};
use crate::errors::DomainError;

/// Repository trait for Account persistence
///
/// Uniqueness of email, phone and every `(provider, provider_user_id)` pair
/// must be enforced by the store itself, atomically with the write. Callers
/// rely on this to converge concurrent first-time logins onto one account:
/// a losing insert surfaces `DomainError::UniqueViolation` and the caller
/// re-reads the winner.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by its id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DomainError>;

    /// Find an account by normalised e-mail address
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    /// Find an account by E.164 phone number
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Account>, DomainError>;

    /// Find the account a provider identity is linked to
    async fn find_by_provider(&self, provider_id: &ProviderId) -> Result<Option<Account>, DomainError>;

    /// Insert a new account
    ///
    /// # Returns
    /// * `Ok(Account)` - The stored account
    /// * `Err(DomainError::UniqueViolation)` - Email, phone or a linked
    ///   provider id already belongs to another account
    ///
    /// # Example
    /// ```no_run
    /// # use hl_core::domain::entities::Account;
    /// # use hl_core::repositories::AccountRepository;
    /// # async fn example(repo: &dyn AccountRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let account = Account::new().with_phone("+15551234567", true);
    /// match repo.insert(account).await {
    ///     Ok(created) => println!("created {}", created.id),
    ///     Err(e) if e.is_unique_violation() => {
    ///         let existing = repo.find_by_phone("+15551234567").await?;
    ///         println!("already registered: {:?}", existing.map(|a| a.id));
    ///     }
    ///     Err(e) => return Err(e.into()),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn insert(&self, account: Account) -> Result<Account, DomainError>;

    /// Replace the password hash. `NotFound` if the account does not exist.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DomainError>;

    /// Link a provider identity to an account
    ///
    /// Linking an identity already linked to the same account is a no-op.
    /// Linking one that belongs to another account is a `UniqueViolation`.
    async fn link_provider(&self, id: Uuid, provider_id: &ProviderId) -> Result<(), DomainError>;

    /// Record that the account's phone number has been proven by OTP
    async fn mark_phone_verified(&self, id: Uuid) -> Result<(), DomainError>;
}
