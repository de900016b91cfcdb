use crate::domain::entities::{Account, ProviderId, Role, SocialProvider};
use crate::errors::AuthError;

#[test]
fn test_new_account_has_no_identifiers() {
    let account = Account::new();
    assert!(account.email.is_none());
    assert!(account.phone.is_none());
    assert!(!account.has_password());
    assert_eq!(account.role, Role::User);
    assert!(account.linked_providers.is_empty());
}

#[test]
fn test_builders() {
    let google = ProviderId::new(SocialProvider::Google, "108234");
    let account = Account::new()
        .with_email("jane@example.com", true)
        .with_phone("+15551234567", false)
        .with_provider(google.clone());

    assert!(account.email_verified);
    assert!(!account.phone_verified);
    assert!(account.is_linked_to(&google));
    assert!(!account.is_linked_to(&ProviderId::new(SocialProvider::Apple, "108234")));
}

#[test]
fn test_provider_parsing() {
    assert_eq!("Google".parse::<SocialProvider>(), Ok(SocialProvider::Google));
    assert_eq!(" apple ".parse::<SocialProvider>(), Ok(SocialProvider::Apple));
    assert_eq!(
        "myspace".parse::<SocialProvider>(),
        Err(AuthError::UnsupportedProvider { provider: "myspace".to_string() })
    );
}

#[test]
fn test_role_round_trip_through_str() {
    for role in [Role::User, Role::Provider, Role::Admin] {
        assert_eq!(role.as_str().parse::<Role>(), Ok(role));
    }
}
