use std::sync::Arc;

use crate::domain::entities::Role;
use crate::domain::value_objects::{ProofOfIdentity, Session};
use crate::errors::{AuthError, DomainError};
use crate::repositories::{AccountRepository, InMemoryAccountRepository, InMemoryOtpChallengeRepository};
use crate::services::identity::{RegisterInput, SocialVerifierRegistry};

use super::mocks::{Gate, GatedAccounts, GatedChallenges};
use super::{fixture, fixture_with, Fixture};

const PHONE: &str = "+15551234567";

fn registration(email: Option<&str>, phone: Option<&str>) -> RegisterInput {
    RegisterInput {
        email: email.map(str::to_string),
        phone: phone.map(str::to_string),
        password: "s3cret-pass".to_string(),
        name: Some("Jane".to_string()),
        role: Role::User,
    }
}

async fn send_and_read_code(fx: &Fixture) -> String {
    fx.otp.send_code(&Session::new(), PHONE).await.unwrap();
    fx.sms.last_code(PHONE).await.unwrap()
}

#[tokio::test]
async fn test_register_then_password_login_by_email_and_phone() {
    let fx = fixture(SocialVerifierRegistry::new());
    let session = Session::new();
    let created = fx
        .resolver
        .register(&session, registration(Some("Jane@Example.com"), Some("+1 555 123 4567")))
        .await
        .unwrap();
    assert_eq!(created.email.as_deref(), Some("jane@example.com"));
    assert_ne!(created.password_hash.as_deref(), Some("s3cret-pass"));

    let by_email = fx
        .resolver
        .by_password(&session, "jane@example.com", "s3cret-pass")
        .await
        .unwrap();
    let by_phone = fx
        .resolver
        .by_password(&session, PHONE, "s3cret-pass")
        .await
        .unwrap();
    assert_eq!(by_email.id, created.id);
    assert_eq!(by_phone.id, created.id);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_account_look_the_same() {
    let fx = fixture(SocialVerifierRegistry::new());
    let session = Session::new();
    fx.resolver
        .register(&session, registration(Some("jane@example.com"), None))
        .await
        .unwrap();

    let wrong = fx
        .resolver
        .by_password(&session, "jane@example.com", "not-the-password")
        .await
        .unwrap_err();
    let unknown = fx
        .resolver
        .by_password(&session, "nobody@example.com", "s3cret-pass")
        .await
        .unwrap_err();
    let garbage = fx
        .resolver
        .by_password(&session, "not an identifier", "s3cret-pass")
        .await
        .unwrap_err();

    for error in [wrong, unknown, garbage] {
        assert!(matches!(error, DomainError::Auth(AuthError::InvalidCredentials)));
    }
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let fx = fixture(SocialVerifierRegistry::new());
    let session = Session::new();
    fx.resolver
        .register(&session, registration(Some("jane@example.com"), None))
        .await
        .unwrap();

    let duplicate = fx
        .resolver
        .register(&session, registration(Some("JANE@example.com"), None))
        .await;
    assert!(matches!(
        duplicate,
        Err(DomainError::Auth(AuthError::DuplicateAccount { ref field })) if field == "email"
    ));

    let missing = fx.resolver.register(&session, registration(None, None)).await;
    assert!(matches!(missing, Err(DomainError::Validation { .. })));

    let mut weak = registration(Some("other@example.com"), None);
    weak.password = "short".to_string();
    assert!(matches!(
        fx.resolver.register(&session, weak).await,
        Err(DomainError::Auth(AuthError::WeakPassword { .. }))
    ));

    let bad_email = fx.resolver.register(&session, registration(Some("nope"), None)).await;
    assert!(matches!(bad_email, Err(DomainError::Auth(AuthError::InvalidEmail))));
}

#[tokio::test]
async fn test_otp_login_creates_account_once() {
    let fx = fixture(SocialVerifierRegistry::new());
    let code = send_and_read_code(&fx).await;
    let first = fx.resolver.by_otp(&Session::new(), PHONE, &code).await.unwrap();
    assert_eq!(first.phone.as_deref(), Some(PHONE));
    assert!(first.phone_verified);

    // A consumed challenge does not hold the resend cooldown
    let code = send_and_read_code(&fx).await;
    let second = fx.resolver.by_otp(&Session::new(), PHONE, &code).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(fx.accounts.len().await, 1);
}

#[tokio::test]
async fn test_otp_login_verifies_registered_phone() {
    let fx = fixture(SocialVerifierRegistry::new());
    let registered = fx
        .resolver
        .register(&Session::new(), registration(None, Some(PHONE)))
        .await
        .unwrap();
    assert!(!registered.phone_verified);

    let code = send_and_read_code(&fx).await;
    let account = fx.resolver.by_otp(&Session::new(), PHONE, &code).await.unwrap();
    assert_eq!(account.id, registered.id);
    assert!(account.phone_verified);
    assert!(fx.accounts.find_by_id(account.id).await.unwrap().unwrap().phone_verified);
}

#[tokio::test]
async fn test_wrong_otp_creates_nothing() {
    let fx = fixture(SocialVerifierRegistry::new());
    let code = send_and_read_code(&fx).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let result = fx.resolver.by_otp(&Session::new(), PHONE, wrong).await;
    assert!(matches!(result, Err(DomainError::Auth(AuthError::InvalidOtp))));
    assert!(fx.accounts.is_empty().await);
}

#[tokio::test]
async fn test_concurrent_first_otp_login_creates_one_account() {
    let accounts = InMemoryAccountRepository::new();
    let challenge_gate = Gate::disarmed(2);
    let fx = fixture_with(
        Arc::new(GatedAccounts {
            inner: accounts.clone(),
            gate: Gate::new(2),
        }),
        accounts.clone(),
        Arc::new(GatedChallenges {
            inner: InMemoryOtpChallengeRepository::new(),
            gate: challenge_gate.clone(),
        }),
        SocialVerifierRegistry::new(),
    );
    let code = send_and_read_code(&fx).await;
    challenge_gate.arm(2);

    let spawn_login = || {
        let resolver = fx.resolver.clone();
        let code = code.clone();
        tokio::spawn(async move { resolver.by_otp(&Session::new(), PHONE, &code).await })
    };
    let left = spawn_login();
    let right = spawn_login();

    let left = left.await.unwrap().unwrap();
    let right = right.await.unwrap().unwrap();
    assert_eq!(left.id, right.id);
    assert_eq!(accounts.len().await, 1);
}

#[tokio::test]
async fn test_resolve_dispatches_on_proof_kind() {
    let fx = fixture(SocialVerifierRegistry::new());
    let session = Session::new();
    let created = fx
        .resolver
        .register(&session, registration(Some("jane@example.com"), None))
        .await
        .unwrap();

    let proof = ProofOfIdentity::Password {
        identifier: "jane@example.com".to_string(),
        password: "s3cret-pass".to_string(),
    };
    assert_eq!(fx.resolver.resolve(&session, &proof).await.unwrap().id, created.id);
}
