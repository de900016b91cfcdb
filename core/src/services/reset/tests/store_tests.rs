use chrono::Duration;
use hl_shared::ResetConfig;
use uuid::Uuid;

use crate::domain::entities::ResetToken;
use crate::domain::value_objects::Session;
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::{AccountRepository, ResetTokenRepository};
use crate::services::crypto::sha256_hex;
use crate::services::identity::tests::fast_passwords;

use super::fixture;

async fn password_hash(fx: &super::Fixture) -> Option<String> {
    fx.accounts
        .find_by_id(fx.account.id)
        .await
        .unwrap()
        .unwrap()
        .password_hash
}

#[tokio::test]
async fn test_request_stores_hash_and_mails_plaintext() {
    let fx = fixture(ResetConfig::default()).await;
    let token = fx.request_token().await;

    assert_eq!(token.len(), 64);
    let stored = fx.tokens.all().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].token_hash, sha256_hex(&token));
    assert_eq!(stored[0].account_id, fx.account.id);

    let message = fx.mailer.messages().await.pop().unwrap();
    assert_eq!(message.to, "jane@example.com");
    assert!(message.html.contains("http://localhost:3000/reset-password?token="));
}

#[tokio::test]
async fn test_unknown_and_known_addresses_look_identical() {
    let fx = fixture(ResetConfig::default()).await;

    let unknown = fx.store.request_reset(&Session::new(), "nonexistent@x.com").await;
    let malformed = fx.store.request_reset(&Session::new(), "not-an-email").await;
    assert!(fx.tokens.all().await.is_empty());

    let known = fx.store.request_reset(&Session::new(), "jane@example.com").await;
    assert_eq!(unknown.unwrap(), known.unwrap());
    assert!(malformed.is_ok());

    fx.outbox.flush().await;
    assert_eq!(fx.mailer.messages().await.len(), 1);
}

#[tokio::test]
async fn test_new_request_supersedes_old_token() {
    let fx = fixture(ResetConfig::default()).await;
    let first = fx.request_token().await;
    let second = fx.request_token().await;
    assert_eq!(fx.tokens.all().await.len(), 1);

    let stale = fx.store.reset_password(&Session::new(), &first, "new-password-1").await;
    assert!(matches!(stale, Err(DomainError::Auth(AuthError::InvalidResetToken))));
    fx.store
        .reset_password(&Session::new(), &second, "new-password-1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reset_changes_password_and_is_single_use() {
    let fx = fixture(ResetConfig::default()).await;
    let before = password_hash(&fx).await;
    let token = fx.request_token().await;

    fx.store
        .reset_password(&Session::new(), &token, "brand-new-pass")
        .await
        .unwrap();
    let after = password_hash(&fx).await;
    assert_ne!(before, after);
    assert!(fast_passwords()
        .verify("brand-new-pass", after.as_deref().unwrap())
        .await
        .unwrap());

    let replay = fx.store.reset_password(&Session::new(), &token, "another-pass").await;
    assert!(matches!(replay, Err(DomainError::Auth(AuthError::InvalidResetToken))));
    assert_eq!(password_hash(&fx).await, after);
}

#[tokio::test]
async fn test_expired_token_never_changes_password() {
    let fx = fixture(ResetConfig::default()).await;
    let before = password_hash(&fx).await;
    let token = "feedface".repeat(8);
    fx.tokens
        .save(ResetToken::new(fx.account.id, sha256_hex(&token), Duration::seconds(-1)))
        .await
        .unwrap();

    let result = fx.store.reset_password(&Session::new(), &token, "brand-new-pass").await;
    assert!(matches!(result, Err(DomainError::Auth(AuthError::ResetTokenExpired))));
    assert_eq!(password_hash(&fx).await, before);

    // Expired records are dropped on first presentation
    let again = fx.store.reset_password(&Session::new(), &token, "brand-new-pass").await;
    assert!(matches!(again, Err(DomainError::Auth(AuthError::InvalidResetToken))));
}

#[tokio::test]
async fn test_weak_password_keeps_token_redeemable() {
    let fx = fixture(ResetConfig::default()).await;
    let token = fx.request_token().await;

    let weak = fx.store.reset_password(&Session::new(), &token, "short").await;
    assert!(matches!(weak, Err(DomainError::Auth(AuthError::WeakPassword { .. }))));
    assert!(fx.store.reset_password(&Session::new(), &token, "long-enough-pass").await.is_ok());
}

#[tokio::test]
async fn test_reset_revokes_standing_sessions() {
    let fx = fixture(ResetConfig::default()).await;
    let pair = fx.token_service.issue(&Session::new(), &fx.subject()).await.unwrap();
    let token = fx.request_token().await;

    fx.store
        .reset_password(&Session::new(), &token, "brand-new-pass")
        .await
        .unwrap();

    let refresh = fx.token_service.refresh(&Session::new(), &pair.refresh_token).await;
    assert!(matches!(refresh, Err(DomainError::Token(TokenError::TokenExpired))));
    let access = fx.token_service.verify_access_token(&pair.access_token).await;
    assert!(matches!(access, Err(DomainError::Token(TokenError::TokenRevoked))));
}

#[tokio::test]
async fn test_concurrent_redemption_changes_password_once() {
    let fx = std::sync::Arc::new(fixture(ResetConfig::default()).await);
    let token = fx.request_token().await;

    let attempts: Vec<_> = ["first-new-pass", "second-new-pass"]
        .into_iter()
        .map(|password| {
            let fx = fx.clone();
            let token = token.clone();
            tokio::spawn(async move { fx.store.reset_password(&Session::new(), &token, password).await })
        })
        .collect();

    let mut succeeded = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(()) => succeeded += 1,
            Err(e) => assert!(matches!(e, DomainError::Auth(AuthError::InvalidResetToken))),
        }
    }
    assert_eq!(succeeded, 1);
}

#[tokio::test]
async fn test_purge_expired() {
    let fx = fixture(ResetConfig::default()).await;
    fx.tokens
        .save(ResetToken::new(Uuid::new_v4(), "stale", Duration::seconds(-5)))
        .await
        .unwrap();
    fx.request_token().await;

    assert_eq!(fx.store.purge_expired().await.unwrap(), 1);
    assert_eq!(fx.tokens.all().await.len(), 1);
}
