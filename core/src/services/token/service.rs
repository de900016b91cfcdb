//! Main token service implementation

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::entities::{Claims, StoredRefreshRecord, TokenKind, TokenPair, TokenSubject};
use crate::domain::value_objects::Session;
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::{CasOutcome, RefreshRecordRepository};
use crate::services::crypto::{hashes_match, sha256_hex};

use super::config::TokenServiceConfig;

/// Keys and validation rules for one token kind
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SigningKeys {
    fn new(secret: &str, config: &TokenServiceConfig) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::SigningKeyUnavailable);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.validate_nbf = true;
        validation.leeway = config.leeway;
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

/// Service for issuing and rotating JWT token pairs
///
/// A subject has at most one live refresh token, recorded by hash in the
/// [`RefreshRecordRepository`]. Each refresh redeems the live token and
/// installs its successor with a compare-and-swap, so a refresh token can
/// be redeemed at most once.
pub struct TokenService {
    records: Arc<dyn RefreshRecordRepository>,
    config: TokenServiceConfig,
    access_keys: SigningKeys,
    refresh_keys: SigningKeys,
}

impl TokenService {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `records` - Store of live refresh records
    /// * `config` - Token service configuration
    ///
    /// # Returns
    ///
    /// A new `TokenService`, or `TokenError::SigningKeyUnavailable` if a
    /// secret is missing
    pub fn new(
        records: Arc<dyn RefreshRecordRepository>,
        config: TokenServiceConfig,
    ) -> Result<Self, DomainError> {
        let access_keys = SigningKeys::new(&config.access_secret, &config)?;
        let refresh_keys = SigningKeys::new(&config.refresh_secret, &config)?;
        Ok(Self {
            records,
            config,
            access_keys,
            refresh_keys,
        })
    }

    /// Issues a token pair for a freshly authenticated subject
    ///
    /// Starts a new session: any previously stored refresh record of the
    /// subject is overwritten, so older refresh tokens stop working.
    #[instrument(skip_all, fields(request_id = %session.request_id, subject_id = %subject.subject_id))]
    pub async fn issue(&self, session: &Session, subject: &TokenSubject) -> DomainResult<TokenPair> {
        let session_id = Uuid::new_v4();
        let (pair, refresh_hash) = self.mint_pair(subject, session_id)?;

        self.records
            .put(StoredRefreshRecord::new(subject.subject_id, refresh_hash, session_id))
            .await?;

        info!(session_id = %session_id, "Issued token pair for new session");
        Ok(pair)
    }

    /// Redeems a refresh token for a new pair
    ///
    /// 1. Verifies signature and expiry; any failure is `TokenExpired`
    /// 2. Loads the subject's record; none means the session was revoked
    /// 3. A hash mismatch within the live session is reuse: that session is
    ///    revoked (a login that replaced it meanwhile is kept) and
    ///    `TokenReused` returned. A token from a superseded
    ///    session is rejected the same way but leaves the live one intact
    /// 4. Installs the successor with a compare-and-swap against the hash
    ///    read in step 2; losing the swap is `TokenReused`
    #[instrument(skip_all, fields(request_id = %session.request_id))]
    pub async fn refresh(&self, session: &Session, refresh_token: &str) -> DomainResult<TokenPair> {
        let claims = self.decode_refresh(refresh_token)?;
        let (subject_id, token_session) = match (claims.subject_id(), claims.session_id()) {
            (Ok(subject_id), Ok(token_session)) => (subject_id, token_session),
            _ => return Err(TokenError::TokenExpired.into()),
        };

        let Some(record) = self.records.find(subject_id).await? else {
            debug!(subject_id = %subject_id, "No live session for refresh token");
            return Err(TokenError::TokenExpired.into());
        };

        let presented_hash = sha256_hex(refresh_token);
        if !hashes_match(&presented_hash, &record.refresh_token_hash) {
            if token_session == record.session_id {
                warn!(
                    subject_id = %subject_id,
                    session_id = %record.session_id,
                    generation = record.generation,
                    event = "refresh_token_reused",
                    "Rotated refresh token presented again, revoking session"
                );
                self.records.delete_session(subject_id, record.session_id).await?;
            } else {
                warn!(
                    subject_id = %subject_id,
                    event = "superseded_session_token",
                    "Refresh token from a superseded session rejected"
                );
            }
            return Err(TokenError::TokenReused.into());
        }

        let subject = TokenSubject {
            subject_id,
            role: claims.role,
            email: claims.email,
        };
        let (pair, next_hash) = self.mint_pair(&subject, record.session_id)?;
        let replacement = record.rotate(next_hash);
        let generation = replacement.generation;

        match self
            .records
            .compare_and_swap(subject_id, &record.refresh_token_hash, replacement)
            .await?
        {
            CasOutcome::Swapped => {
                info!(subject_id = %subject_id, generation, "Rotated refresh token");
                Ok(pair)
            }
            CasOutcome::Mismatch | CasOutcome::Missing => {
                warn!(
                    subject_id = %subject_id,
                    event = "refresh_cas_lost",
                    "Concurrent refresh already redeemed this token"
                );
                Err(TokenError::TokenReused.into())
            }
        }
    }

    /// Revokes the subject's session
    ///
    /// # Returns
    ///
    /// `true` if a live session existed
    #[instrument(skip_all, fields(request_id = %session.request_id, subject_id = %subject_id))]
    pub async fn revoke(&self, session: &Session, subject_id: Uuid) -> DomainResult<bool> {
        let revoked = self.records.delete(subject_id).await?;
        if revoked {
            info!("Revoked session");
        }
        Ok(revoked)
    }

    /// Verifies an access token and returns the claims
    ///
    /// Besides signature, expiry, issuer and audience, the token must belong
    /// to the subject's live session; tokens of revoked or superseded
    /// sessions fail with `TokenRevoked`.
    pub async fn verify_access_token(&self, token: &str) -> DomainResult<Claims> {
        let claims = decode::<Claims>(token, &self.access_keys.decoding, &self.access_keys.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                _ => TokenError::InvalidToken,
            })?
            .claims;
        if claims.typ != TokenKind::Access {
            return Err(TokenError::InvalidToken.into());
        }
        let subject_id = claims.subject_id().map_err(|_| TokenError::InvalidToken)?;

        let live = self.records.find(subject_id).await?;
        match live {
            Some(record) if record.session_id.to_string() == claims.sid => Ok(claims),
            _ => Err(TokenError::TokenRevoked.into()),
        }
    }

    /// Decodes an access token whose signature is valid, ignoring expiry
    ///
    /// Used by logout so that a caller holding an expired access token can
    /// still end its session.
    pub fn decode_access_token_allow_expired(&self, token: &str) -> DomainResult<Claims> {
        let mut validation = self.access_keys.validation.clone();
        validation.validate_exp = false;
        let claims = decode::<Claims>(token, &self.access_keys.decoding, &validation)
            .map_err(|_| TokenError::InvalidToken)?
            .claims;
        if claims.typ != TokenKind::Access {
            return Err(TokenError::InvalidToken.into());
        }
        Ok(claims)
    }

    fn decode_refresh(&self, token: &str) -> DomainResult<Claims> {
        let claims = decode::<Claims>(token, &self.refresh_keys.decoding, &self.refresh_keys.validation)
            .map_err(|e| {
                debug!(error = %e, "Refresh token rejected");
                TokenError::TokenExpired
            })?
            .claims;
        if claims.typ != TokenKind::Refresh {
            return Err(TokenError::TokenExpired.into());
        }
        Ok(claims)
    }

    /// Mints a pair for `subject` in `session_id`, returning it with the
    /// hash of its refresh token
    fn mint_pair(&self, subject: &TokenSubject, session_id: Uuid) -> DomainResult<(TokenPair, String)> {
        let issued_at = Utc::now();
        let access_expiry = issued_at + self.config.access_ttl;
        let refresh_expiry = issued_at + self.config.refresh_ttl;

        let claims = |typ: TokenKind, exp: i64| Claims {
            sub: subject.subject_id.to_string(),
            role: subject.role,
            email: subject.email.clone(),
            sid: session_id.to_string(),
            typ,
            iat: issued_at.timestamp(),
            exp,
            nbf: issued_at.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let access_token = self.encode_jwt(
            &claims(TokenKind::Access, access_expiry.timestamp()),
            &self.access_keys,
        )?;
        let refresh_token = self.encode_jwt(
            &claims(TokenKind::Refresh, refresh_expiry.timestamp()),
            &self.refresh_keys,
        )?;
        let refresh_hash = sha256_hex(&refresh_token);

        Ok((
            TokenPair {
                access_token,
                refresh_token,
                subject_id: subject.subject_id,
                issued_at,
                access_expiry,
                refresh_expiry,
            },
            refresh_hash,
        ))
    }

    /// Encodes claims into a JWT
    fn encode_jwt(&self, claims: &Claims, keys: &SigningKeys) -> DomainResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &keys.encoding)
            .map_err(|_| DomainError::Token(TokenError::SigningFailed))
    }
}
