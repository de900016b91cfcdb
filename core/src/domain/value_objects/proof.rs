//! Credential proofs accepted by the identity resolver.

use hl_shared::utils::{email::normalize_email, phone::normalize_phone};

use crate::domain::entities::SocialProvider;

/// Everything a caller can present to prove who they are
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofOfIdentity {
    Password { identifier: String, password: String },
    Otp { phone: String, code: String },
    Social { provider: SocialProvider, token: String },
}

impl ProofOfIdentity {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ProofOfIdentity::Password { .. } => "password",
            ProofOfIdentity::Otp { .. } => "otp",
            ProofOfIdentity::Social { .. } => "social",
        }
    }
}

/// A login identifier after normalisation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    Email(String),
    Phone(String),
}

impl LoginIdentifier {
    /// Anything containing `@` is treated as an e-mail address, everything
    /// else as a phone number.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.contains('@') {
            normalize_email(raw).map(LoginIdentifier::Email)
        } else {
            normalize_phone(raw).map(LoginIdentifier::Phone)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifier() {
        assert_eq!(
            LoginIdentifier::parse("Jane@Example.com"),
            Some(LoginIdentifier::Email("jane@example.com".into()))
        );
        assert_eq!(
            LoginIdentifier::parse("+1 555 123 4567"),
            Some(LoginIdentifier::Phone("+15551234567".into()))
        );
        assert_eq!(LoginIdentifier::parse("jane"), None);
    }

    #[test]
    fn test_proof_kind() {
        let proof = ProofOfIdentity::Social {
            provider: SocialProvider::Apple,
            token: "t".into(),
        };
        assert_eq!(proof.kind(), "social");
    }
}
