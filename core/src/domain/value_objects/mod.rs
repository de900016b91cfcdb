//! Value objects representing immutable domain concepts.

pub mod auth_response;
pub mod proof;
pub mod session;

// Re-export commonly used types
pub use auth_response::{AccountProfile, AuthResponse};
pub use proof::{LoginIdentifier, ProofOfIdentity};
pub use session::Session;
