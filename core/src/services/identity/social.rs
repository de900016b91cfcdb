use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::entities::SocialProvider;

/// Identity asserted by a provider for a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialProfile {
    pub provider_user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Whether the provider vouches for the e-mail address
    pub email_verified: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SocialVerifyError {
    /// The provider looked at the token and refused it
    #[error("Token rejected: {0}")]
    Rejected(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// Trait for social identity provider integration
#[async_trait]
pub trait SocialIdentityVerifier: Send + Sync {
    fn provider(&self) -> SocialProvider;

    /// Exchange-verify a provider token
    async fn verify(&self, token: &str) -> Result<SocialProfile, SocialVerifyError>;
}

/// Configured verifiers, one per provider
#[derive(Clone, Default)]
pub struct SocialVerifierRegistry {
    verifiers: HashMap<SocialProvider, Arc<dyn SocialIdentityVerifier>>,
}

impl SocialVerifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a verifier, replacing any earlier one for the same provider
    pub fn with(mut self, verifier: Arc<dyn SocialIdentityVerifier>) -> Self {
        self.verifiers.insert(verifier.provider(), verifier);
        self
    }

    pub fn get(&self, provider: SocialProvider) -> Option<Arc<dyn SocialIdentityVerifier>> {
        self.verifiers.get(&provider).cloned()
    }

    pub fn providers(&self) -> Vec<SocialProvider> {
        let mut providers: Vec<_> = self.verifiers.keys().copied().collect();
        providers.sort();
        providers
    }
}
