//! # Heallink Core
//!
//! Domain layer of the Heallink authentication services: entities, error
//! taxonomy, repository interfaces and the services that issue, rotate and
//! revoke credentials.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    Account, AccountProfile, AuthResponse, Claims, ProofOfIdentity, Role, Session,
    SocialProvider, StoredRefreshRecord, TokenPair,
};
pub use errors::{AuthError, DomainError, DomainResult, TokenError};
pub use repositories::{
    AccountRepository, CasOutcome, OtpChallengeRepository, RefreshRecordRepository,
    ResetTokenRepository,
};
pub use services::{AuthService, IdentityResolver, ResetTokenStore, TokenService};
