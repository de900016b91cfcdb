//! Resend e-mail delivery
//!
//! `POST https://api.resend.com/emails` with a bearer API key.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

use hl_core::services::{EmailMessage, EmailService};
use hl_shared::email::mask_email;
use hl_shared::EmailConfig;

use crate::InfrastructureError;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
pub(crate) struct SendEmailRequest<'a> {
    pub from: &'a str,
    pub to: [&'a str; 1],
    pub subject: &'a str,
    pub html: &'a str,
}

pub struct ResendEmailService {
    client: reqwest::Client,
    api_key: String,
    from_address: String,
    endpoint: String,
}

impl ResendEmailService {
    pub fn new(config: &EmailConfig) -> Result<Self, InfrastructureError> {
        Self::with_endpoint(config, RESEND_API_URL)
    }

    pub fn with_endpoint(config: &EmailConfig, endpoint: &str) -> Result<Self, InfrastructureError> {
        if config.api_key.is_empty() {
            return Err(InfrastructureError::Config("Resend API key is required".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
            endpoint: endpoint.to_string(),
        })
    }

    pub(crate) fn request_body<'a>(&'a self, message: &'a EmailMessage) -> SendEmailRequest<'a> {
        SendEmailRequest {
            from: &self.from_address,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        }
    }
}

#[async_trait]
impl EmailService for ResendEmailService {
    async fn send(&self, message: &EmailMessage) -> bool {
        let result = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(message))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!(to = %mask_email(&message.to), subject = %message.subject, "E-mail sent");
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                error!(
                    to = %mask_email(&message.to),
                    status = %status,
                    body = %body,
                    "Resend rejected e-mail"
                );
                false
            }
            Err(e) => {
                error!(to = %mask_email(&message.to), error = %e, "Failed to reach Resend");
                false
            }
        }
    }
}
