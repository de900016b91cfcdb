//! The refresh round-trip

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{ClientError, ClientResult};
use crate::session::SessionTokens;
use crate::transport::{ApiRequest, HttpTransport};

pub const REFRESH_PATH: &str = "/refresh-token";

/// Exchanges a refresh token for a rotated pair
#[async_trait]
pub trait RefreshClient: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> ClientResult<SessionTokens>;
}

/// `POST /refresh-token` with the refresh token as bearer credential
pub struct HttpRefreshClient {
    transport: Arc<dyn HttpTransport>,
}

impl HttpRefreshClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl RefreshClient for HttpRefreshClient {
    async fn refresh(&self, refresh_token: &str) -> ClientResult<SessionTokens> {
        let request = ApiRequest::post(REFRESH_PATH, None).with_bearer(refresh_token);
        let response = self.transport.send(&request).await?;

        if response.is_success() {
            return response.json();
        }
        if response.status >= 500 {
            return Err(ClientError::Network(format!(
                "refresh failed with status {}",
                response.status
            )));
        }

        let code = response.error_code().unwrap_or("UNKNOWN").to_string();
        warn!(status = response.status, code = %code, "Refresh token rejected");
        Err(ClientError::RefreshRejected { code })
    }
}
