//! Shared HTTP transport for provider adapters.
//!
//! One pooled `reqwest::Client` with bounded timeouts, a response size cap
//! and retry with exponential backoff on transient failures.

use std::time::Duration;

use log::{debug, warn};
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::errors::FailureCause;

/// Default upper bound on a response body: 5 MiB.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 5 * 1024 * 1024;

/// Transport tuning.
#[derive(Clone, Debug)]
pub struct HttpSettings {
    /// Total time for one request, body included.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Extra attempts after the first one.
    pub retries: u32,
    /// Base delay; attempt `n` waits `backoff * 2^n`.
    pub backoff: Duration,
    pub max_response_bytes: usize,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            retries: 2,
            backoff: Duration::from_millis(500),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: format!("cbb-sports-data/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Errors from a single HTTP exchange.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("Response too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: usize },

    #[error("Invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TransportError {
    /// Whether another attempt could succeed.
    fn is_transient(&self) -> bool {
        match self {
            Self::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Status { status } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
            }
            Self::TooLarge { .. } | Self::Decode(_) => false,
        }
    }

    /// Summary safe to surface past the resolution boundary: no URLs or
    /// underlying error chains.
    pub fn summary(&self) -> FailureCause {
        match self {
            Self::Request(e) if e.is_timeout() => FailureCause::Timeout,
            Self::Request(e) if e.is_connect() => {
                FailureCause::Provider("connection failed".to_string())
            }
            Self::Request(_) => FailureCause::Provider("request failed".to_string()),
            Self::Status { status } if *status == StatusCode::TOO_MANY_REQUESTS.as_u16() => {
                FailureCause::RateLimited
            }
            Self::Status { status } => {
                FailureCause::Provider(format!("upstream returned HTTP {}", status))
            }
            Self::TooLarge { size, .. } => {
                FailureCause::Provider(format!("response too large ({} bytes)", size))
            }
            Self::Decode(_) => FailureCause::Malformed("invalid JSON".to_string()),
        }
    }
}

/// Pooled HTTP client shared by all adapters.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    settings: HttpSettings,
}

impl HttpTransport {
    pub fn new(settings: HttpSettings) -> Self {
        let client = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self { client, settings }
    }

    pub fn settings(&self) -> &HttpSettings {
        &self.settings
    }

    /// GET `url` and decode the body as JSON, retrying transient failures.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, TransportError> {
        let body = self.get_bytes(url, query).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// GET `url` and return the raw body, retrying transient failures.
    pub async fn get_bytes(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<u8>, TransportError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url, query).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < self.settings.retries => {
                    let wait = self.settings.backoff * 2u32.saturating_pow(attempt);
                    warn!(
                        "HTTP attempt {} for {} failed ({}), retrying in {:?}",
                        attempt + 1,
                        url,
                        e,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<u8>, TransportError> {
        debug!("GET {} ({} params)", url, query.len());

        let mut response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        let limit = self.settings.max_response_bytes;
        let declared = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        if let Some(size) = declared {
            if size > limit as u64 {
                return Err(TransportError::TooLarge { size, limit });
            }
        }

        let mut body = Vec::with_capacity(declared.unwrap_or(0) as usize);
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit {
                return Err(TransportError::TooLarge {
                    size: (body.len() + chunk.len()) as u64,
                    limit,
                });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(HttpSettings::default())
    }
}
