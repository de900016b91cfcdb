pub mod error;
pub mod request;

pub use error::{handle_domain_error, status_for, unauthorized};
pub use request::{bearer_token, session_from};
