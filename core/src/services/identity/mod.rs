//! Turns a proof of identity into an [`Account`](crate::domain::entities::Account).
//!
//! None of the paths here issue tokens; callers hand the resolved account to
//! the token service.

mod password;
mod resolver;
mod social;

#[cfg(test)]
pub(crate) mod tests;

pub use password::PasswordHasher;
pub use resolver::{IdentityResolver, RegisterInput};
pub use social::{SocialIdentityVerifier, SocialProfile, SocialVerifierRegistry, SocialVerifyError};
