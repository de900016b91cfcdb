//! # Heallink Client
//!
//! Caller side of the token lifecycle. Every authenticated request goes
//! through [`RequestGateway`], which attaches the cached access token and, on
//! a 401, hands off to [`RefreshCoordinator`]. The coordinator collapses any
//! number of concurrent 401s into one refresh round-trip and resolves every
//! waiting caller with its outcome.

pub mod auth_api;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod refresh;
pub mod session;
pub mod transport;

use std::sync::Arc;

pub use auth_api::{AuthApi, LoginCredentials};
pub use config::ClientConfig;
pub use coordinator::RefreshCoordinator;
pub use error::{ClientError, ClientResult};
pub use gateway::RequestGateway;
pub use refresh::{HttpRefreshClient, RefreshClient};
pub use session::{SessionEvent, SessionStore, SessionTokens, SessionUser};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport};

/// One signed-in client: shared session, gateway and auth endpoints
#[derive(Clone)]
pub struct AuthClient {
    session: Arc<SessionStore>,
    gateway: Arc<RequestGateway>,
    api: Arc<AuthApi>,
}

impl AuthClient {
    /// Client talking HTTP to `config.base_url`
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Client over any transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let session = Arc::new(SessionStore::new());
        let refresher: Arc<dyn RefreshClient> = Arc::new(HttpRefreshClient::new(transport.clone()));
        let coordinator = Arc::new(RefreshCoordinator::new(
            refresher,
            session.clone(),
            config.refresh_timeout,
            config.network_retries,
        ));
        Self {
            gateway: Arc::new(RequestGateway::new(transport.clone(), session.clone(), coordinator)),
            api: Arc::new(AuthApi::new(transport, session.clone())),
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    pub fn api(&self) -> &AuthApi {
        &self.api
    }
}
