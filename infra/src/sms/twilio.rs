//! Twilio SMS Service Implementation
//!
//! Sends messages through the Twilio Programmable Messaging REST API with
//! retry and exponential backoff on rate limiting and server errors.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use hl_core::services::SmsService;
use hl_shared::utils::phone::mask_phone;
use hl_shared::SmsConfig;

use crate::InfrastructureError;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Twilio SMS service configuration
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// From phone number (must be a Twilio phone number)
    pub from_number: String,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub request_timeout_secs: u64,
    /// Overridable for tests
    pub api_base: String,
}

impl TwilioConfig {
    pub fn from_sms_config(config: &SmsConfig) -> Self {
        Self {
            account_sid: config.api_key.clone(),
            auth_token: config.api_secret.clone(),
            from_number: config.from_number.clone(),
            max_retries: 3,
            retry_delay_ms: 1000,
            request_timeout_secs: 30,
            api_base: TWILIO_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

/// Twilio SMS service implementation
pub struct TwilioSmsService {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioSmsService {
    pub fn new(config: TwilioConfig) -> Result<Self, InfrastructureError> {
        if config.account_sid.is_empty() || config.auth_token.is_empty() {
            return Err(InfrastructureError::Config(
                "Twilio account SID and auth token are required".to_string(),
            ));
        }
        if !config.from_number.starts_with('+') {
            return Err(InfrastructureError::Config(
                "Twilio from number must be in E.164 format (starting with '+')".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            from = %mask_phone(&config.from_number),
            "Twilio SMS service initialized"
        );
        Ok(Self { client, config })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.config.api_base, self.config.account_sid
        )
    }

    async fn send_once(&self, to: &str, body: &str) -> Result<String, (bool, String)> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[("To", to), ("From", self.config.from_number.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|e| (e.is_timeout() || e.is_connect(), e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let message: MessageResponse = response
                .json()
                .await
                .map_err(|e| (false, format!("Invalid Twilio response: {}", e)))?;
            return Ok(message.sid);
        }

        let detail = response
            .json::<TwilioErrorBody>()
            .await
            .ok()
            .map(|b| format!("{} ({})", b.message.unwrap_or_default(), b.code.unwrap_or_default()))
            .unwrap_or_default();
        Err((is_retryable_status(status), format!("Twilio returned {}: {}", status, detail)))
    }

    async fn send_with_retry(&self, to: &str, body: &str) -> Result<String, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;
            debug!(
                "Sending SMS attempt {}/{} to {}",
                attempts,
                self.config.max_retries,
                mask_phone(to)
            );

            match self.send_once(to, body).await {
                Ok(sid) => {
                    info!(phone = %mask_phone(to), sid = %sid, "SMS sent");
                    return Ok(sid);
                }
                Err((retryable, message)) if retryable && attempts < self.config.max_retries => {
                    warn!(
                        "Failed to send SMS (attempt {}/{}): {}. Retrying in {:?}",
                        attempts, self.config.max_retries, message, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err((_, message)) => {
                    error!(phone = %mask_phone(to), attempts, "Failed to send SMS: {}", message);
                    return Err(InfrastructureError::Sms(message));
                }
            }
        }
    }
}

pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl SmsService for TwilioSmsService {
    async fn send_verification_code(&self, phone: &str, code: &str) -> Result<String, String> {
        self.send_with_retry(phone, &super::verification_message(code))
            .await
            .map_err(|e| e.to_string())
    }
}
