//! Social identity verifiers
//!
//! Each verifier exchanges a client-supplied provider token for a verified
//! profile. A provider is only registered when its audience is configured.

use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

use hl_core::services::{SocialVerifierRegistry, SocialVerifyError};
use hl_shared::SocialConfig;

use crate::InfrastructureError;

pub mod apple;
pub mod facebook;
pub mod google;

pub use apple::AppleVerifier;
pub use facebook::FacebookVerifier;
pub use google::GoogleVerifier;

#[cfg(test)]
mod tests;

/// Build the registry of verifiers enabled by configuration
pub fn build_registry(config: &SocialConfig) -> Result<SocialVerifierRegistry, InfrastructureError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()?;
    let mut registry = SocialVerifierRegistry::new();

    if !config.google_client_ids.is_empty() {
        registry = registry.with(Arc::new(GoogleVerifier::new(
            client.clone(),
            config.google_client_ids.clone(),
        )));
    }

    match (&config.facebook_app_id, &config.facebook_app_secret) {
        (Some(app_id), Some(app_secret)) => {
            registry = registry.with(Arc::new(FacebookVerifier::new(
                client.clone(),
                app_id.clone(),
                app_secret.clone(),
            )));
        }
        (Some(_), None) => tracing::warn!("Facebook app id set without app secret; provider disabled"),
        _ => {}
    }

    if let Some(client_id) = &config.apple_client_id {
        registry = registry.with(Arc::new(AppleVerifier::new(client.clone(), client_id.clone())));
    }

    tracing::info!(providers = ?registry.providers(), "Social login providers configured");
    Ok(registry)
}

/// Client errors mean the provider refused the token; anything else is an outage
pub(crate) fn classify_status(status: StatusCode, provider: &str) -> SocialVerifyError {
    if status.is_client_error() {
        SocialVerifyError::Rejected(format!("{} returned {}", provider, status))
    } else {
        SocialVerifyError::Unavailable(format!("{} returned {}", provider, status))
    }
}

pub(crate) fn transport_error(error: reqwest::Error, provider: &str) -> SocialVerifyError {
    tracing::warn!(provider, error = %error, "Social provider request failed");
    SocialVerifyError::Unavailable(format!("{} unreachable: {}", provider, error))
}
