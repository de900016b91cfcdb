//! Integration tests for wiring the auth services from configuration

use futures_util::future::join_all;
use std::sync::Arc;

use hl_core::domain::entities::StoredRefreshRecord;
use hl_core::domain::value_objects::Session;
use hl_core::errors::{AuthError, DomainError};
use hl_core::repositories::CasOutcome;
use hl_core::services::{AuthService, AuthSettings, RegisterInput};
use hl_infra::{build_collaborators, build_stores};
use hl_shared::{AppConfig, PasswordConfig, StorageBackend};

fn memory_config() -> AppConfig {
    AppConfig {
        storage: StorageBackend::Memory,
        password: PasswordConfig {
            bcrypt_cost: 4,
            ..PasswordConfig::default()
        },
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn test_memory_backends_serve_register_and_login() {
    let config = memory_config();
    let backends = build_stores(&config).await.unwrap();
    assert_eq!(backends.backend_name(), "memory");
    assert!(backends.health_check().await);

    let collaborators = build_collaborators(&config).unwrap();
    let (auth, _worker) =
        AuthService::assemble(backends.stores.clone(), collaborators, AuthSettings::from(&config)).unwrap();

    let session = Session::new();
    auth.register(
        &session,
        RegisterInput {
            email: Some("jane@example.com".to_string()),
            password: "correct-horse".to_string(),
            ..RegisterInput::default()
        },
    )
    .await
    .unwrap();

    let response = auth.login(&session, "jane@example.com", "correct-horse").await.unwrap();
    let claims = auth.authenticate(&response.tokens.access_token).await.unwrap();
    assert_eq!(claims.sub, response.user.id.to_string());
    auth.flush_mail().await;
}

#[tokio::test]
async fn test_unconfigured_social_provider_is_unsupported() {
    let config = memory_config();
    let backends = build_stores(&config).await.unwrap();
    let (auth, _worker) = AuthService::assemble(
        backends.stores,
        build_collaborators(&config).unwrap(),
        AuthSettings::from(&config),
    )
    .unwrap();

    let result = auth.social_login(&Session::new(), "google", "token").await;
    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::UnsupportedProvider { .. }))
    ));
}

#[tokio::test]
#[ignore] // Requires MySQL and Redis
async fn test_mysql_refresh_record_cas_has_one_winner() {
    let mut config = memory_config();
    config.storage = StorageBackend::Mysql;
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }
    let backends = build_stores(&config).await.unwrap();
    let records = backends.stores.refresh_records.clone();

    let subject = uuid::Uuid::new_v4();
    let initial = StoredRefreshRecord::new(subject, "hash-0".to_string(), uuid::Uuid::new_v4());
    records.put(initial.clone()).await.unwrap();

    let attempts = (0..8).map(|i| {
        let records = Arc::clone(&records);
        let next = initial.rotate(format!("hash-{}", i + 1));
        async move { records.compare_and_swap(subject, "hash-0", next).await.unwrap() }
    });
    let outcomes = join_all(attempts).await;

    let winners = outcomes.iter().filter(|o| **o == CasOutcome::Swapped).count();
    assert_eq!(winners, 1);
    assert!(outcomes
        .iter()
        .all(|o| matches!(o, CasOutcome::Swapped | CasOutcome::Mismatch)));
    records.delete(subject).await.unwrap();
}

#[tokio::test]
async fn test_closing_memory_backends_is_harmless() {
    let backends = build_stores(&memory_config()).await.unwrap();
    backends.close().await;
    assert!(backends.health_check().await);
}
