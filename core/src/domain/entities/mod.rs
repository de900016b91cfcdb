//! Domain entities representing core business objects.

pub mod account;
pub mod otp_challenge;
pub mod reset_token;
pub mod token;

// Re-export commonly used types
pub use account::{Account, ProviderId, Role, SocialProvider};
pub use otp_challenge::OtpChallenge;
pub use reset_token::ResetToken;
pub use token::{Claims, StoredRefreshRecord, TokenKind, TokenPair, TokenSubject};

#[cfg(test)]
mod tests;
