//! Configuration for the OAuth key bridge.

use std::time::Duration;

/// OAuth protocol constants.
pub mod oauth {
    use std::time::Duration;

    /// Authorization code lifetime: 5 minutes.
    pub const AUTH_CODE_LIFETIME: Duration = Duration::from_secs(5 * 60);

    /// Access token lifetime: 365 days.
    pub const ACCESS_TOKEN_LIFETIME: Duration = Duration::from_secs(365 * 24 * 3600);

    /// Scopes granted to every validated credential.
    pub const DEFAULT_SCOPES: &[&str] = &["api:read"];

    /// Scopes advertised in discovery metadata.
    pub const SUPPORTED_SCOPES: &[&str] = &["api:read", "api:write"];

    /// Client id assumed when an authorization request names none.
    pub const DEFAULT_CLIENT_ID: &str = "default";

    /// Client name assigned when registration omits one.
    pub const DEFAULT_CLIENT_NAME: &str = "MCP Client";
}

/// Upstream service constants.
pub mod upstream {
    use std::time::Duration;

    /// Endpoint probed with a freshly submitted API key.
    pub const PROBE_URL: &str = "https://httpbin.org/bearer";

    /// Base URL of the upstream API called by tools.
    pub const API_URL: &str = "https://api.cloud.llamaindex.ai";

    /// Upper bound on the API key probe.
    pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Request timeout for tool calls.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Default issuer URL.
pub const DEFAULT_ISSUER_URL: &str = "http://localhost:8000";

/// Maximum entries held by each bookkeeping cache.
pub const LEDGER_CAPACITY: u64 = 10_000;

/// Server configuration.
#[derive(Clone)]
pub struct Config {
    /// Symmetric secret signing every code and token.
    pub signing_secret: String,

    /// Public base URL of this server.
    pub issuer_url: String,

    /// URL probed with a submitted API key.
    pub upstream_probe_url: String,

    /// Base URL of the upstream API (for testing with mock servers).
    pub upstream_api_url: String,

    /// Probe timeout.
    pub probe_timeout: Duration,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Capacity of each bookkeeping cache.
    pub ledger_capacity: u64,
}

impl Config {
    /// Create a new configuration with the given signing secret.
    ///
    /// A trailing slash on the issuer URL is dropped so endpoint URLs can be
    /// built by plain concatenation.
    #[must_use]
    pub fn new(signing_secret: impl Into<String>, issuer_url: Option<String>) -> Self {
        let issuer_url = issuer_url.unwrap_or_else(|| DEFAULT_ISSUER_URL.to_string());
        Self {
            signing_secret: signing_secret.into(),
            issuer_url: issuer_url.trim_end_matches('/').to_string(),
            upstream_probe_url: upstream::PROBE_URL.to_string(),
            upstream_api_url: upstream::API_URL.to_string(),
            probe_timeout: upstream::PROBE_TIMEOUT,
            request_timeout: upstream::REQUEST_TIMEOUT,
            connect_timeout: upstream::CONNECT_TIMEOUT,
            ledger_capacity: LEDGER_CAPACITY,
        }
    }

    /// Create a test configuration with custom URLs for mock servers.
    #[must_use]
    pub fn for_testing(upstream_base: &str) -> Self {
        Self {
            signing_secret: "test-signing-secret".to_string(),
            issuer_url: "https://example.com".to_string(),
            upstream_probe_url: format!("{}/bearer", upstream_base),
            upstream_api_url: upstream_base.to_string(),
            probe_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            ledger_capacity: 100,
        }
    }

    /// Absolute URL of an endpoint served by this issuer.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.issuer_url, path)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("issuer_url", &self.issuer_url)
            .field("upstream_probe_url", &self.upstream_probe_url)
            .field("upstream_api_url", &self.upstream_api_url)
            .field("probe_timeout", &self.probe_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::new("secret", None);
        assert_eq!(config.issuer_url, DEFAULT_ISSUER_URL);
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
        assert_eq!(config.upstream_probe_url, upstream::PROBE_URL);
    }

    #[test]
    fn test_issuer_trailing_slash_trimmed() {
        let config = Config::new("secret", Some("https://bridge.example.com/".into()));
        assert_eq!(config.endpoint("/token"), "https://bridge.example.com/token");
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = Config::new("super-secret-value", None);
        assert!(!format!("{config:?}").contains("super-secret-value"));
    }

    #[test]
    fn test_lifetimes() {
        assert_eq!(oauth::AUTH_CODE_LIFETIME.as_secs(), 300);
        assert_eq!(oauth::ACCESS_TOKEN_LIFETIME.as_secs(), 31_536_000);
    }
}
