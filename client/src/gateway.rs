//! Authenticated request path

use std::sync::Arc;

use tracing::debug;

use crate::coordinator::RefreshCoordinator;
use crate::error::ClientResult;
use crate::session::SessionStore;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};

/// Attaches the cached access token to every call and replays a call once
/// after a 401, with whatever token the coordinator produces. Any other
/// status, and a 401 on the replay, is returned unchanged.
pub struct RequestGateway {
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionStore>,
    coordinator: Arc<RefreshCoordinator>,
}

impl RequestGateway {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionStore>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            transport,
            session,
            coordinator,
        }
    }

    pub async fn send(&self, mut request: ApiRequest) -> ClientResult<ApiResponse> {
        if !request.retried || request.bearer.is_none() {
            request.bearer = self.session.access_token();
        }
        let response = self.transport.send(&request).await?;
        if !response.is_unauthorized() || request.retried {
            return Ok(response);
        }

        debug!(path = %request.path, "Access token rejected");
        let fresh = self
            .coordinator
            .fresh_access_token(request.bearer.as_deref())
            .await?;

        request.bearer = Some(fresh);
        request.retried = true;
        self.transport.send(&request).await
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }
}
