//! Client-held session state

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// The signed-in account as the server described it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    Refreshed,
    /// Logout, or a refresh failure that needs a fresh login
    SignedOut,
}

#[derive(Debug, Clone)]
struct StoredSession {
    tokens: SessionTokens,
    user: Option<SessionUser>,
}

/// Current tokens and user, with a change feed for the owning application
pub struct SessionStore {
    current: RwLock<Option<StoredSession>>,
    events: watch::Sender<SessionEvent>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (events, _) = watch::channel(SessionEvent::SignedOut);
        Self {
            current: RwLock::new(None),
            events,
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(|session| session.tokens.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(|session| session.tokens.refresh_token.clone())
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.read(|session| session.user.clone()).flatten()
    }

    pub fn is_signed_in(&self) -> bool {
        self.read(|_| ()).is_some()
    }

    pub fn sign_in(&self, tokens: SessionTokens, user: Option<SessionUser>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) =
            Some(StoredSession { tokens, user });
        self.events.send_replace(SessionEvent::SignedIn);
    }

    /// Swap in rotated tokens, keeping the user. Ignored when signed out.
    pub fn update_tokens(&self, tokens: SessionTokens) -> bool {
        let updated = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            match current.as_mut() {
                Some(session) => {
                    session.tokens = tokens;
                    true
                }
                None => false,
            }
        };
        if updated {
            self.events.send_replace(SessionEvent::Refreshed);
        }
        updated
    }

    pub fn sign_out(&self) {
        let was_signed_in = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if was_signed_in {
            info!("Session cleared");
        }
        self.events.send_replace(SessionEvent::SignedOut);
    }

    /// Follow sign-in, refresh and sign-out events
    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn read<T>(&self, f: impl FnOnce(&StoredSession) -> T) -> Option<T> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(access: &str) -> SessionTokens {
        SessionTokens {
            access_token: access.to_string(),
            refresh_token: format!("{}-refresh", access),
        }
    }

    #[test]
    fn test_sign_in_refresh_sign_out() {
        let store = SessionStore::new();
        let events = store.subscribe();
        assert!(!store.is_signed_in());

        store.sign_in(tokens("a1"), None);
        assert_eq!(store.access_token().as_deref(), Some("a1"));
        assert_eq!(*events.borrow(), SessionEvent::SignedIn);

        assert!(store.update_tokens(tokens("a2")));
        assert_eq!(store.refresh_token().as_deref(), Some("a2-refresh"));
        assert_eq!(*events.borrow(), SessionEvent::Refreshed);

        store.sign_out();
        assert!(store.access_token().is_none());
        assert_eq!(*events.borrow(), SessionEvent::SignedOut);
    }

    #[test]
    fn test_update_after_sign_out_is_ignored() {
        let store = SessionStore::new();
        assert!(!store.update_tokens(tokens("late")));
        assert!(!store.is_signed_in());
    }

    #[test]
    fn test_user_ignores_unknown_fields() {
        let user: SessionUser = serde_json::from_value(serde_json::json!({
            "id": "4f7c",
            "email": "ana@example.com",
            "role": "provider",
            "providers": ["google"],
            "emailVerified": true
        }))
        .unwrap();
        assert_eq!(user.role, "provider");
        assert!(user.phone.is_none());
    }
}
