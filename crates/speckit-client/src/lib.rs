//! # speckit-client — HTTP Contract Checks
//!
//! Issues real requests against the API under test and hands the decoded
//! bodies to [`speckit_schema::RecordValidator`]. Contract tests assert on
//! the resulting [`ContractCheck`] instead of comparing hard-coded
//! expectations with themselves.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use speckit_client::{ApiClient, ApiConfig};
//! use speckit_schema::SchemaStore;
//!
//! let client = ApiClient::new(ApiConfig::from_env()?)?;
//! let store = SchemaStore::new("schemas")?;
//! let check = client
//!     .check("/users", 200, store.validator("user-list.schema.json")?)
//!     .await?;
//! assert!(check.passed(), "{check}");
//! # Ok(())
//! # }
//! ```
//!
//! Requests are sent once: no retries, no caching.

pub mod config;
pub mod contract;
pub mod error;

pub use config::{ApiConfig, ConfigError};
pub use contract::ContractCheck;
pub use error::ApiError;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use speckit_schema::RecordValidator;

/// Status and decoded body of one response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// JSON body; `Value::Null` when the body is empty.
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Client for the API under test. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::Config(ConfigError::InvalidToken))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `GET {base_url}/{path}`.
    ///
    /// Any HTTP status is returned as-is; callers assert on it. An empty
    /// body decodes to `Value::Null`.
    ///
    /// # Errors
    ///
    /// `ApiError::Http` on transport failure, `ApiError::Deserialization`
    /// if a non-empty body is not JSON.
    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        let endpoint = format!("GET {path}");
        let url = self.config.endpoint_url(path)?;

        let resp = self.http.get(url).send().await.map_err(|e| ApiError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        let status = resp.status().as_u16();

        let bytes = resp.bytes().await.map_err(|e| ApiError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Deserialization {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?
        };

        tracing::debug!(%endpoint, status, "received response");
        Ok(ApiResponse { status, body })
    }

    /// `GET /health`, decoded.
    ///
    /// # Errors
    ///
    /// `ApiError::UnexpectedStatus` for a non-2xx status, plus everything
    /// [`get`](Self::get) returns.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let endpoint = "GET /health";
        let resp = self.get("/health").await?;
        if !resp.is_success() {
            return Err(ApiError::UnexpectedStatus {
                endpoint: endpoint.into(),
                status: resp.status,
                body: resp.body.to_string(),
            });
        }
        serde_json::from_value(resp.body).map_err(|e| ApiError::Deserialization {
            endpoint: endpoint.into(),
            reason: e.to_string(),
        })
    }

    /// Fetch `path` and validate the body against `validator`.
    ///
    /// Status mismatches and schema violations are reported in the
    /// returned [`ContractCheck`], not as errors.
    pub async fn check(
        &self,
        path: &str,
        expected_status: u16,
        validator: &RecordValidator,
    ) -> Result<ContractCheck, ApiError> {
        let resp = self.get(path).await?;
        let result = validator.validate(&resp.body);
        let check = ContractCheck {
            endpoint: format!("GET {path}"),
            expected_status,
            status: resp.status,
            result,
        };

        if check.passed() {
            tracing::info!(endpoint = %check.endpoint, "contract check passed");
        } else {
            tracing::warn!(
                endpoint = %check.endpoint,
                status = check.status,
                expected_status,
                violations = check.result.violations().len(),
                "contract check failed"
            );
        }
        Ok(check)
    }
}
