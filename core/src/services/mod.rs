//! Business services containing domain logic and use cases.

pub mod auth;
pub mod crypto;
pub mod identity;
pub mod mail;
pub mod otp;
pub mod reset;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthCollaborators, AuthService, AuthSettings, AuthStores};
pub use identity::{
    IdentityResolver, PasswordHasher, RegisterInput, SocialIdentityVerifier, SocialProfile,
    SocialVerifierRegistry, SocialVerifyError,
};
pub use mail::{EmailMessage, EmailService, MailOutbox};
pub use otp::{OtpDispatch, OtpService, SmsService};
pub use reset::ResetTokenStore;
pub use token::{TokenService, TokenServiceConfig};
