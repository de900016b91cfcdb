//! E-mail delivery providers
//!
//! `log` writes messages to the tracing output for development; `resend`
//! delivers through the Resend HTTP API.

use std::sync::Arc;

use hl_core::services::EmailService;
use hl_shared::EmailConfig;

pub mod log_email;
pub mod resend;

pub use log_email::LogEmailService;
pub use resend::ResendEmailService;


/// Create an e-mail service based on configuration
pub fn create_email_service(config: &EmailConfig) -> Arc<dyn EmailService> {
    match config.provider.as_str() {
        "resend" => match ResendEmailService::new(config) {
            Ok(service) => Arc::new(service),
            Err(e) => {
                tracing::error!("Failed to initialize Resend e-mail service: {}", e);
                tracing::warn!("Falling back to log e-mail service");
                Arc::new(LogEmailService::new())
            }
        },
        "log" => Arc::new(LogEmailService::new()),
        other => {
            tracing::warn!("Unknown e-mail provider '{}', using log implementation", other);
            Arc::new(LogEmailService::new())
        }
    }
}
