//! Per-call authentication context.

use uuid::Uuid;

/// Context supplied by the caller to every token and identity operation.
/// Nothing in the core keeps an ambient session; whatever a call needs to
/// know about who is asking travels in this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Correlates log lines of one inbound request
    pub request_id: Uuid,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            client_ip: None,
            user_agent: None,
        }
    }

    pub fn with_client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = Some(client_ip.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
