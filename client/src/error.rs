//! Client error types

use thiserror::Error;

/// Errors surfaced to callers of the client
///
/// `Clone` so one refresh outcome can be handed to every queued caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request never produced a usable response: transport failure,
    /// timeout or a 5xx from the refresh endpoint
    #[error("Network error: {0}")]
    Network(String),

    /// The server refused the refresh token
    #[error("Refresh rejected: {code}")]
    RefreshRejected { code: String },

    /// No refresh token is held; the user must sign in again
    #[error("Session expired")]
    SessionExpired,

    /// An auth endpoint answered with an error envelope
    #[error("Request failed with status {status}: {code}")]
    Api { status: u16, code: String, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Whether another attempt could succeed without user action
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
