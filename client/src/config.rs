//! Client configuration.
//!
//! Values have sensible defaults for a local backend; applications override
//! them with the builder methods or from the environment.

use crate::error::{ApiError, Result};
use std::time::Duration;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// API client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every request path is appended to (e.g., "https://cellar.example.com/api").
    pub base_url: String,

    /// Timeout for ordinary API requests.
    ///
    /// Default: 10 seconds
    pub request_timeout: Duration,

    /// Timeout for the token refresh call.
    ///
    /// Kept shorter than `request_timeout` so a stuck refresh does not
    /// stall the retry of the original request.
    ///
    /// Default: 5 seconds
    pub refresh_timeout: Duration,

    /// Collapse concurrent token refreshes into a single refresh call.
    ///
    /// Default: true
    pub coalesce_refresh: bool,
}

impl ClientConfig {
    /// Create configuration for the given base URL.
    ///
    /// A trailing slash is dropped so paths can always start with `/`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Build configuration from environment variables.
    ///
    /// - `VINDEX_API_URL` (default [`DEFAULT_BASE_URL`])
    /// - `VINDEX_REQUEST_TIMEOUT_SECS` (default 10)
    /// - `VINDEX_REFRESH_TIMEOUT_SECS` (default 5)
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if a timeout variable is not a
    /// positive integer.
    pub fn from_env() -> Result<Self> {
        let mut config = std::env::var("VINDEX_API_URL")
            .map_or_else(|_| Self::default(), Self::new);

        if let Some(secs) = env_secs("VINDEX_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = secs;
        }
        if let Some(secs) = env_secs("VINDEX_REFRESH_TIMEOUT_SECS")? {
            config.refresh_timeout = secs;
        }

        Ok(config)
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set refresh timeout.
    #[must_use]
    pub const fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Enable or disable single-flight refresh.
    #[must_use]
    pub const fn with_coalesced_refresh(mut self, enabled: bool) -> Self {
        self.coalesce_refresh = enabled;
        self
    }

    /// Absolute URL for an API path such as `/wines`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Scheme and authority of the base URL (`http://localhost:8080`).
    #[must_use]
    pub fn origin(&self) -> &str {
        let after_scheme = self.base_url.find("://").map_or(0, |i| i + 3);
        match self.base_url[after_scheme..].find('/') {
            Some(i) => &self.base_url[..after_scheme + i],
            None => &self.base_url,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            refresh_timeout: Duration::from_secs(5),
            coalesce_refresh: true,
        }
    }
}

fn env_secs(name: &str) -> Result<Option<Duration>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(|secs| Some(Duration::from_secs(secs)))
            .ok_or_else(|| ApiError::InvalidRequest(format!("{name} must be a positive integer, got {raw:?}"))),
        Err(_) => Ok(None),
    }
}
