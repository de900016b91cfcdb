//! Token entities for JWT-based authentication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::{Account, Role};

/// Distinguishes access from refresh tokens inside the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,

    /// Role of the subject at issuance
    pub role: Role,

    /// E-mail of the subject, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Session id shared by every token of one login
    pub sid: String,

    /// Token kind
    pub typ: TokenKind,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl Claims {
    /// Gets the subject id from the claims
    ///
    /// # Returns
    ///
    /// `Ok(Uuid)` if the subject can be parsed as a UUID, `Err` otherwise
    pub fn subject_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Gets the session id from the claims
    pub fn session_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sid)
    }
}

/// What a token is minted for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub subject_id: Uuid,
    pub role: Role,
    pub email: Option<String>,
}

impl From<&Account> for TokenSubject {
    fn from(account: &Account) -> Self {
        Self {
            subject_id: account.id,
            role: account.role,
            email: account.email.clone(),
        }
    }
}

/// Access/refresh pair handed to exactly one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub subject_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub access_expiry: DateTime<Utc>,
    pub refresh_expiry: DateTime<Utc>,
}

impl TokenPair {
    /// Seconds until the access token expires, as of issuance
    pub fn access_expires_in(&self) -> i64 {
        (self.access_expiry - self.issued_at).num_seconds()
    }

    /// Seconds until the refresh token expires, as of issuance
    pub fn refresh_expires_in(&self) -> i64 {
        (self.refresh_expiry - self.issued_at).num_seconds()
    }
}

/// The single live refresh credential of a subject. Overwritten by `issue`,
/// swapped by rotation, deleted by revocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRefreshRecord {
    pub subject_id: Uuid,
    /// SHA-256 (hex) of the only refresh token currently redeemable
    pub refresh_token_hash: String,
    /// Login this record belongs to; survives rotations
    pub session_id: Uuid,
    /// Number of tokens minted in this session, starting at 1
    pub generation: u64,
    pub rotated_at: DateTime<Utc>,
}

impl StoredRefreshRecord {
    pub fn new(subject_id: Uuid, refresh_token_hash: String, session_id: Uuid) -> Self {
        Self {
            subject_id,
            refresh_token_hash,
            session_id,
            generation: 1,
            rotated_at: Utc::now(),
        }
    }

    /// The record that replaces this one once `refresh_token_hash` is redeemed
    pub fn rotate(&self, refresh_token_hash: String) -> Self {
        Self {
            subject_id: self.subject_id,
            refresh_token_hash,
            session_id: self.session_id,
            generation: self.generation + 1,
            rotated_at: Utc::now(),
        }
    }
}
