//! Mock SMS Service Implementation
//!
//! Logs verification codes instead of sending them.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use hl_core::services::SmsService;
use hl_shared::utils::phone::mask_phone;

/// Mock SMS service for development and testing
#[derive(Clone)]
pub struct MockSmsService {
    /// Number of messages sent
    message_count: Arc<AtomicU64>,
    /// Fail every send
    simulate_failure: bool,
}

impl MockSmsService {
    pub fn new() -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            simulate_failure: false,
        }
    }

    /// A service whose every send fails
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::new()
        }
    }

    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }
}

impl Default for MockSmsService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsService for MockSmsService {
    async fn send_verification_code(&self, phone: &str, code: &str) -> Result<String, String> {
        if self.simulate_failure {
            warn!(phone = %mask_phone(phone), "Simulated SMS failure");
            return Err("simulated SMS failure".to_string());
        }

        self.message_count.fetch_add(1, Ordering::SeqCst);
        let message_id = format!("mock-{}", Uuid::new_v4());

        // Development only: the code is visible in the logs
        info!(
            phone = %mask_phone(phone),
            code,
            message_id = %message_id,
            "[MOCK SMS] {}",
            super::verification_message(code)
        );

        Ok(message_id)
    }
}
