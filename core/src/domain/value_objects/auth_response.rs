//! Authentication response value objects for API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{Account, Role, SocialProvider, TokenPair};

/// Public view of an account; never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub role: Role,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub providers: Vec<SocialProvider>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountProfile {
    fn from(account: &Account) -> Self {
        let mut providers: Vec<SocialProvider> = account
            .linked_providers
            .iter()
            .map(|link| link.provider)
            .collect();
        providers.dedup();
        Self {
            id: account.id,
            email: account.email.clone(),
            phone: account.phone.clone(),
            name: account.name.clone(),
            role: account.role,
            email_verified: account.email_verified,
            phone_verified: account.phone_verified,
            providers,
            created_at: account.created_at,
        }
    }
}

/// Result of a successful login on any channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub tokens: TokenPair,
    pub user: AccountProfile,
}

impl AuthResponse {
    /// Creates an authentication response from a token pair and the resolved account
    pub fn from_token_pair(tokens: TokenPair, account: &Account) -> Self {
        Self {
            tokens,
            user: AccountProfile::from(account),
        }
    }
}
