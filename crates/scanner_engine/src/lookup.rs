use std::time::Duration;

use futures_util::StreamExt;
use scanner_core::Isbn;
use scanner_logging::{redact, scanner_debug};
use url::Url;

use crate::volume::project_volumes;
use crate::{FailureKind, LookupError, LookupResult};

/// Public Google Books volumes endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes";

#[derive(Debug, Clone)]
pub struct LookupSettings {
    pub endpoint: String,
    /// Sent as the `key` query parameter when present.
    pub api_key: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    /// Extra attempts after a retryable failure. Zero disables retry.
    pub max_retries: u32,
    /// Delay before the first retry; grows linearly per attempt.
    pub retry_backoff: Duration,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(15),
            max_bytes: 2 * 1024 * 1024,
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

#[async_trait::async_trait]
pub trait BookLookup: Send + Sync {
    async fn lookup(&self, isbn: &Isbn) -> Result<LookupResult, LookupError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBookLookup {
    settings: LookupSettings,
    client: reqwest::Client,
}

impl ReqwestBookLookup {
    pub fn new(settings: LookupSettings) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| LookupError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &LookupSettings {
        &self.settings
    }

    /// Builds `{endpoint}?q=isbn:{isbn}[&key=...]`.
    pub fn request_url(&self, isbn: &Isbn) -> Result<Url, LookupError> {
        let mut url = Url::parse(&self.settings.endpoint)
            .map_err(|err| LookupError::new(FailureKind::InvalidEndpoint, err.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("q", &format!("isbn:{isbn}"));
            if let Some(key) = self.settings.api_key.as_deref() {
                query.append_pair("key", key);
            }
        }
        Ok(url)
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, LookupError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(LookupError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(LookupError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl BookLookup for ReqwestBookLookup {
    async fn lookup(&self, isbn: &Isbn) -> Result<LookupResult, LookupError> {
        let url = self.request_url(isbn)?;
        scanner_debug!(
            "GET {} (key: {})",
            self.settings.endpoint,
            self.settings
                .api_key
                .as_deref()
                .map(redact)
                .unwrap_or_else(|| "none".to_string())
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = self.read_body(response).await?;
        project_volumes(isbn, &body)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        return LookupError::new(FailureKind::Timeout, err.to_string());
    }
    LookupError::new(FailureKind::Network, err.to_string())
}
