//! API client configuration.
//!
//! Defaults target a locally running service. Override via environment
//! variables or explicit construction for staging/testing.

use url::Url;

/// Default base URL of the API under test.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the API under test.
///
/// Custom `Debug` implementation redacts `api_token`.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are appended to it, so any path prefix
    /// (e.g. `/api/v1`) is preserved.
    pub base_url: Url,
    /// Optional bearer token sent with every request.
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ApiConfig {
    /// Configuration for `base_url` with default timeout and no token.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SPECKIT_BASE_URL` (default: `http://localhost:8080/api/v1`)
    /// - `SPECKIT_API_TOKEN` (optional)
    /// - `SPECKIT_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("SPECKIT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(&raw)?;

        let timeout_secs = match std::env::var("SPECKIT_TIMEOUT_SECS") {
            Ok(val) => val
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(val))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            api_token: std::env::var("SPECKIT_API_TOKEN").ok().filter(|t| !t.is_empty()),
            timeout_secs,
        })
    }

    /// Full URL for an endpoint path relative to `base_url`.
    ///
    /// Unlike [`Url::join`], a leading `/` on `path` does not discard the
    /// base URL's own path: `http://h/api/v1` + `/users` is
    /// `http://h/api/v1/users`.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, ConfigError> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| ConfigError::InvalidUrl(joined, e.to_string()))
    }
}

/// Parse and check a base URL string.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            raw.to_string(),
            "not usable as a base URL".to_string(),
        ));
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL {0}: {1}")]
    InvalidUrl(String, String),
    #[error("SPECKIT_TIMEOUT_SECS must be a positive integer, got {0:?}")]
    InvalidTimeout(String),
    #[error("API token contains characters not allowed in an HTTP header")]
    InvalidToken,
}
