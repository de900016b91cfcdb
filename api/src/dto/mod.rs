//! Request and response bodies of the HTTP surface

pub mod auth;
pub mod error;

pub use auth::*;
pub use error::validation_error_response;
