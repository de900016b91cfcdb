use reqwest::StatusCode;

use hl_core::domain::entities::SocialProvider;
use hl_core::services::{SocialIdentityVerifier, SocialVerifyError};
use hl_shared::SocialConfig;

use crate::social::apple::{profile_from_claims, validation, AppleClaims, APPLE_ISSUER};
use crate::social::facebook::{check_debug_token, profile_from_graph_user, DebugTokenData, GraphUser};
use crate::social::google::{profile_from_token_info, TokenInfo};
use crate::social::{build_registry, classify_status, AppleVerifier, GoogleVerifier};

fn token_info(aud: &str, verified: Option<&str>) -> TokenInfo {
    TokenInfo {
        sub: "1234567890".to_string(),
        aud: aud.to_string(),
        email: Some("jane@gmail.com".to_string()),
        email_verified: verified.map(String::from),
        name: Some("Jane".to_string()),
    }
}

#[test]
fn test_registry_only_enables_configured_providers() {
    let registry = build_registry(&SocialConfig::default()).unwrap();
    assert!(registry.providers().is_empty());

    let config = SocialConfig {
        google_client_ids: vec!["web.apps.googleusercontent.com".to_string()],
        facebook_app_id: Some("1234".to_string()),
        facebook_app_secret: None,
        apple_client_id: Some("com.heallink.app".to_string()),
        ..SocialConfig::default()
    };
    let registry = build_registry(&config).unwrap();
    assert_eq!(
        registry.providers(),
        vec![SocialProvider::Google, SocialProvider::Apple]
    );
}

#[test]
fn test_status_classification() {
    assert!(matches!(
        classify_status(StatusCode::BAD_REQUEST, "google"),
        SocialVerifyError::Rejected(_)
    ));
    assert!(matches!(
        classify_status(StatusCode::SERVICE_UNAVAILABLE, "google"),
        SocialVerifyError::Unavailable(_)
    ));
}

#[test]
fn test_google_audience_must_match() {
    let client_ids = vec!["ours".to_string()];
    assert!(matches!(
        profile_from_token_info(token_info("theirs", Some("true")), &client_ids),
        Err(SocialVerifyError::Rejected(_))
    ));

    let profile = profile_from_token_info(token_info("ours", Some("true")), &client_ids).unwrap();
    assert_eq!(profile.provider_user_id, "1234567890");
    assert!(profile.email_verified);

    let profile = profile_from_token_info(token_info("ours", Some("false")), &client_ids).unwrap();
    assert!(!profile.email_verified);
}

#[tokio::test]
async fn test_unreachable_google_is_unavailable() {
    let verifier = GoogleVerifier::new(reqwest::Client::new(), vec!["ours".to_string()])
        .with_endpoint("http://127.0.0.1:9/tokeninfo");
    assert!(matches!(
        verifier.verify("token").await,
        Err(SocialVerifyError::Unavailable(_))
    ));
}

#[test]
fn test_facebook_debug_token_checks() {
    let valid = DebugTokenData {
        is_valid: true,
        app_id: Some("1234".to_string()),
    };
    assert!(check_debug_token(&valid, "1234").is_ok());
    assert!(check_debug_token(&valid, "9999").is_err());

    let invalid = DebugTokenData {
        is_valid: false,
        app_id: Some("1234".to_string()),
    };
    assert!(check_debug_token(&invalid, "1234").is_err());
}

#[test]
fn test_facebook_profile_without_email_is_unverified() {
    let profile = profile_from_graph_user(GraphUser {
        id: "fb-1".to_string(),
        name: Some("Jane".to_string()),
        email: None,
    });
    assert_eq!(profile.provider_user_id, "fb-1");
    assert!(!profile.email_verified);
}

#[test]
fn test_apple_email_verified_accepts_string_or_bool() {
    let claims: AppleClaims =
        serde_json::from_str(r#"{"sub":"a1","email":"x@privaterelay.appleid.com","email_verified":"true"}"#)
            .unwrap();
    assert!(profile_from_claims(claims).email_verified);

    let claims: AppleClaims = serde_json::from_str(r#"{"sub":"a1","email_verified":false}"#).unwrap();
    assert!(!profile_from_claims(claims).email_verified);
}

#[test]
fn test_apple_validation_pins_issuer_and_audience() {
    let validation = validation("com.heallink.app");
    assert!(validation.iss.as_ref().unwrap().contains(APPLE_ISSUER));
    assert!(validation.aud.as_ref().unwrap().contains("com.heallink.app"));
}

#[tokio::test]
async fn test_malformed_apple_token_is_rejected_without_network() {
    let verifier = AppleVerifier::new(reqwest::Client::new(), "com.heallink.app".to_string())
        .with_keys_url("http://127.0.0.1:9/keys");
    assert!(matches!(
        verifier.verify("not-a-jwt").await,
        Err(SocialVerifyError::Rejected(_))
    ));
}
