//! Upstream API client.
//!
//! Provides:
//! - A per-API-key client for tool calls (no pooling across keys)
//! - The API key probe run when a human submits a key
//! - Status code mapping into [`ClientError`]
//!
//! Nothing here retries. A single failure is final for the request.

use std::time::Duration;

use reqwest::Client;

use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::Project;

/// Client for the upstream API, authenticated with one API key.
#[derive(Clone)]
pub struct UpstreamClient {
    /// HTTP client.
    client: Client,

    /// Bearer credential for every request.
    api_key: String,

    /// Upstream API base URL.
    api_url: String,

    /// Request timeout, reported on timeout errors.
    request_timeout: Duration,
}

impl UpstreamClient {
    /// Create a client authenticated with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config, api_key: impl Into<String>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            api_url: config.upstream_api_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout,
        })
    }

    /// List the projects visible to this API key.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        let url = format!("{}/api/v1/projects", self.api_url);
        self.get(&url).await
    }

    /// Make an authenticated GET request.
    async fn get<T>(&self, url: &str) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| send_error(e, self.request_timeout))?;

        let response = handle_response(response).await?;
        let value: serde_json::Value = response.json().await?;

        serde_json::from_value(value).map_err(ClientError::from)
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient").field("api_url", &self.api_url).finish()
    }
}

/// Best-effort check that an API key is accepted upstream.
#[async_trait::async_trait]
pub trait UpstreamProbe: Send + Sync {
    /// Probe the upstream service with `api_key`.
    async fn probe(&self, api_key: &str) -> ClientResult<()>;
}

/// Probe that sends one bearer-authenticated GET to a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpProbe {
    /// Create a probe against `config.upstream_probe_url`.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.probe_timeout)
            .connect_timeout(config.probe_timeout)
            .build()?;

        Ok(Self { client, url: config.upstream_probe_url.clone(), timeout: config.probe_timeout })
    }
}

#[async_trait::async_trait]
impl UpstreamProbe for HttpProbe {
    async fn probe(&self, api_key: &str) -> ClientResult<()> {
        let response = self
            .client
            .get(&self.url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout))?;

        handle_response(response).await.map(|_| ())
    }
}

fn send_error(err: reqwest::Error, timeout: Duration) -> ClientError {
    if err.is_timeout() { ClientError::Timeout(timeout) } else { ClientError::Http(err) }
}

/// Handle API response status codes.
async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        401 | 403 => Err(ClientError::Unauthorized { status: status.as_u16() }),
        404 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::not_found(text))
        }
        500..=599 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::server(status.as_u16(), text))
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
        }
    }
}
