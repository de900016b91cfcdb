//! Outbound e-mail. Messages are handed to a background worker so that
//! request handlers never wait on the mail provider.

mod outbox;
pub mod templates;


use async_trait::async_trait;

pub use outbox::MailOutbox;

/// A rendered e-mail ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Trait for e-mail provider integration
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Deliver a message, returning whether the provider accepted it
    async fn send(&self, message: &EmailMessage) -> bool;
}
