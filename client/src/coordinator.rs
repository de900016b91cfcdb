//! Single-flight refresh coordination
//!
//! State is `Idle` or `Refreshing { waiters }`, kept behind one mutex that is
//! never held across an await. The first caller to report a rejected token
//! flips the state to `Refreshing` and starts the round-trip on its own task;
//! every caller, the first included, then waits on a oneshot. When the
//! round-trip settles the state returns to `Idle` and the waiters are
//! resolved in arrival order with the same outcome.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::refresh::RefreshClient;
use crate::session::SessionStore;

type Waiter = oneshot::Sender<ClientResult<String>>;

enum RefreshState {
    Idle,
    Refreshing { waiters: VecDeque<Waiter> },
}

pub struct RefreshCoordinator {
    refresher: Arc<dyn RefreshClient>,
    session: Arc<SessionStore>,
    state: Mutex<RefreshState>,
    refresh_timeout: Duration,
    network_retries: u32,
}

impl RefreshCoordinator {
    pub fn new(
        refresher: Arc<dyn RefreshClient>,
        session: Arc<SessionStore>,
        refresh_timeout: Duration,
        network_retries: u32,
    ) -> Self {
        Self {
            refresher,
            session,
            state: Mutex::new(RefreshState::Idle),
            refresh_timeout,
            network_retries,
        }
    }

    /// A usable access token after `rejected` drew a 401
    ///
    /// Joins the refresh in flight if there is one. If the session already
    /// holds a different token than the rejected one, that token is returned
    /// without a round-trip. On failure the session is signed out and every
    /// waiter receives the same error.
    pub async fn fresh_access_token(self: &Arc<Self>, rejected: Option<&str>) -> ClientResult<String> {
        let (waiter, outcome) = oneshot::channel();
        {
            let mut state = self.lock_state();
            match &mut *state {
                RefreshState::Refreshing { waiters } => {
                    waiters.push_back(waiter);
                    debug!(queued = waiters.len(), "Joined refresh in flight");
                }
                RefreshState::Idle => {
                    if let Some(current) = self.session.access_token() {
                        if rejected != Some(current.as_str()) {
                            debug!("Token was replaced meanwhile, replaying without refresh");
                            return Ok(current);
                        }
                    }
                    *state = RefreshState::Refreshing {
                        waiters: VecDeque::from([waiter]),
                    };
                    let coordinator = Arc::clone(self);
                    tokio::spawn(async move { coordinator.drive_refresh().await });
                }
            }
        }

        outcome
            .await
            .unwrap_or_else(|_| Err(ClientError::Network("refresh abandoned".to_string())))
    }

    /// Callers currently parked on the refresh in flight
    pub fn waiting(&self) -> usize {
        match &*self.lock_state() {
            RefreshState::Idle => 0,
            RefreshState::Refreshing { waiters } => waiters.len(),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(&*self.lock_state(), RefreshState::Refreshing { .. })
    }

    async fn drive_refresh(&self) {
        let outcome = self.refresh_with_retry().await;
        match &outcome {
            Ok(_) => info!("Access token refreshed"),
            Err(error) => {
                warn!(error = %error, "Refresh failed, signing out");
                self.session.sign_out();
            }
        }

        let waiters = match std::mem::replace(&mut *self.lock_state(), RefreshState::Idle) {
            RefreshState::Refreshing { waiters } => waiters,
            RefreshState::Idle => VecDeque::new(),
        };
        debug!(waiters = waiters.len(), ok = outcome.is_ok(), "Resolving refresh waiters");
        for waiter in waiters {
            // A caller that gave up has dropped its receiver
            let _ = waiter.send(outcome.clone());
        }
    }

    async fn refresh_with_retry(&self) -> ClientResult<String> {
        let Some(refresh_token) = self.session.refresh_token() else {
            return Err(ClientError::SessionExpired);
        };

        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(
                self.refresh_timeout,
                self.refresher.refresh(&refresh_token),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(ClientError::Network(format!(
                    "refresh timed out after {}s",
                    self.refresh_timeout.as_secs()
                ))),
            };

            match result {
                Ok(tokens) => {
                    let access_token = tokens.access_token.clone();
                    if !self.session.update_tokens(tokens) {
                        // Signed out while the refresh was in flight
                        return Err(ClientError::SessionExpired);
                    }
                    return Ok(access_token);
                }
                Err(error) if error.is_network() && attempt < self.network_retries => {
                    attempt += 1;
                    warn!(error = %error, attempt, "Refresh failed on the network, retrying");
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
