use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use hl_core::services::{EmailMessage, EmailService};
use hl_shared::email::mask_email;

/// Writes e-mails to the log instead of sending them
#[derive(Clone, Default)]
pub struct LogEmailService {
    sent: Arc<AtomicU64>,
}

impl LogEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailService for LogEmailService {
    async fn send(&self, message: &EmailMessage) -> bool {
        self.sent.fetch_add(1, Ordering::SeqCst);
        info!(
            to = %mask_email(&message.to),
            subject = %message.subject,
            bytes = message.html.len(),
            "[LOG EMAIL] message accepted"
        );
        true
    }
}
