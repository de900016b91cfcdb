//! Client configuration

use std::time::Duration;

/// Where the auth server lives and how patient to be with it
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base of the auth routes, e.g. `https://api.heallink.com/api/v1/auth`
    pub base_url: String,

    /// Upper bound on one refresh round-trip
    pub refresh_timeout: Duration,

    /// Extra attempts after a refresh fails with a network error
    pub network_retries: u32,

    /// Upper bound on any other request
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:8080/api/v1/auth"),
            refresh_timeout: Duration::from_secs(10),
            network_retries: 1,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secs = |name: &str, fallback: Duration| {
            std::env::var(name)
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(fallback)
        };
        Self {
            base_url: std::env::var("HEALLINK_API_URL").unwrap_or(defaults.base_url),
            refresh_timeout: secs("HEALLINK_REFRESH_TIMEOUT_SECS", defaults.refresh_timeout),
            network_retries: std::env::var("HEALLINK_REFRESH_RETRIES")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.network_retries),
            request_timeout: secs("HEALLINK_REQUEST_TIMEOUT_SECS", defaults.request_timeout),
        }
    }

    /// Absolute URL for a route path such as `/login`
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.refresh_timeout, Duration::from_secs(10));
        assert_eq!(config.network_retries, 1);
    }

    #[test]
    fn test_endpoint_joins_slashes() {
        let config = ClientConfig::new("https://api.heallink.com/api/v1/auth/");
        assert_eq!(
            config.endpoint("/refresh-token"),
            "https://api.heallink.com/api/v1/auth/refresh-token"
        );
        assert_eq!(config.endpoint("login"), "https://api.heallink.com/api/v1/auth/login");
    }
}
