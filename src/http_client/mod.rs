//! JSON-over-HTTP client used by spiders.
//!
//! Transport failures are returned to the caller untouched: this client
//! does not retry, and the request timeout is the only bound it enforces.

mod user_agent;

pub use user_agent::{resolve_user_agent, IMPERSONATE_USER_AGENTS, USER_AGENT};

use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::debug;
use url::Url;

/// Errors raised by the transport.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    source_id: String,
}

impl HttpClient {
    /// Create a new HTTP client with the default user agent.
    pub fn new(source_id: &str, base_url: &str, timeout: Duration) -> Result<Self, HttpError> {
        Self::with_user_agent(source_id, base_url, timeout, None)
    }

    /// Create a new HTTP client with custom user agent configuration.
    /// - None: Use default seedwatch user agent
    /// - Some("impersonate"): Use random real browser user agent
    /// - Some(custom): Use custom user agent string
    pub fn with_user_agent(
        source_id: &str,
        base_url: &str,
        timeout: Duration,
        user_agent_config: Option<&str>,
    ) -> Result<Self, HttpError> {
        let base_url = Url::parse(base_url).map_err(|source| HttpError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            base_url,
            source_id: source_id.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET `path` (relative to the base URL) and decode the body as JSON.
    ///
    /// An empty body decodes to `Value::Null`. Non-2xx statuses and bodies
    /// that are not JSON are errors.
    pub async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, HttpError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|source| HttpError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                source,
            })?;

        let start = Instant::now();
        let response = self.client.get(url.clone()).query(query).send().await?;
        let status = response.status();
        debug!(
            "[{}] GET {} -> {} in {}ms",
            self.source_id,
            url,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body).map_err(|source| HttpError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
