//! SMS Service Module
//!
//! Implementations of the core `SmsService` used to deliver OTP codes: a
//! logging mock for development and a Twilio client for production.

use std::sync::Arc;

use hl_core::services::SmsService;
use hl_shared::SmsConfig;

pub mod mock_sms;
pub mod twilio;

pub use mock_sms::MockSmsService;
pub use twilio::{TwilioConfig, TwilioSmsService};


/// Verification message body sent for an OTP code
pub fn verification_message(code: &str) -> String {
    format!(
        "Your Heallink verification code is: {}. It expires in 10 minutes. Do not share this code.",
        code
    )
}

/// Create an SMS service based on configuration
///
/// Unknown providers and a Twilio client that cannot be built fall back to
/// the mock implementation.
pub fn create_sms_service(config: &SmsConfig) -> Arc<dyn SmsService> {
    match config.provider.as_str() {
        "mock" => Arc::new(MockSmsService::new()),
        "twilio" => match TwilioSmsService::new(TwilioConfig::from_sms_config(config)) {
            Ok(service) => Arc::new(service),
            Err(e) => {
                tracing::error!("Failed to initialize Twilio SMS service: {}", e);
                tracing::warn!("Falling back to mock SMS service");
                Arc::new(MockSmsService::new())
            }
        },
        other => {
            tracing::warn!("Unknown SMS provider '{}', using mock implementation", other);
            Arc::new(MockSmsService::new())
        }
    }
}
