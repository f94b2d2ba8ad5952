use crate::util::{validate_url, UrlValidationError};
use futures::StreamExt;
use reqwest::redirect::Policy;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024; // 10MB
pub const MAX_REDIRECTS: usize = 5;

/// Errors that can occur while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The address failed validation (bad scheme, private host, etc.)
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),
    /// Network-level error (DNS, connection refused, TLS, reset mid-body)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// No complete response within the configured timeout
    #[error("request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),
    /// Response body exceeded the configured size limit
    #[error("response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
}

/// Source of page markup.
///
/// The pipelines only ever talk to the network through this trait, so tests
/// can substitute canned pages for [`HttpFetcher`].
pub trait MarkupSource {
    /// Returns the full body of the page at `address`.
    fn fetch(&self, address: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// [`MarkupSource`] backed by a `reqwest` client.
///
/// Issues a single GET per call with no retries. The timeout covers both the
/// request and reading the body.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_response_bytes: usize,
    allow_private_hosts: bool,
}

impl HttpFetcher {
    /// Wraps a client with the default timeout and size limit.
    ///
    /// Addresses on localhost or private networks are refused until
    /// [`allow_private_hosts`](Self::allow_private_hosts) is enabled.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            allow_private_hosts: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }

    pub fn allow_private_hosts(mut self, allow: bool) -> Self {
        self.allow_private_hosts = allow;
        self
    }

    async fn get(&self, url: reqwest::Url) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let bytes = read_limited_bytes(response, self.max_response_bytes).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl MarkupSource for HttpFetcher {
    async fn fetch(&self, address: &str) -> Result<String, FetchError> {
        let url = validate_url(address, self.allow_private_hosts)?;
        tracing::debug!(url = %url, "Fetching page");

        let result = tokio::time::timeout(self.timeout, self.get(url))
            .await
            .unwrap_or(Err(FetchError::Timeout(self.timeout)));

        match &result {
            Ok(markup) => tracing::debug!(url = %address, bytes = markup.len(), "Fetched page"),
            Err(e) => tracing::warn!(url = %address, error = %e, "Fetch failed"),
        }
        result
    }
}

/// Redirect policy for page fetches.
///
/// Follows at most [`MAX_REDIRECTS`] hops and stops on loops. Every hop is
/// validated with the same private-host rule as the initial address.
pub fn redirect_policy(allow_private_hosts: bool) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error(format!("Too many redirects (max {MAX_REDIRECTS})"));
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev == url) {
            return attempt.error("Redirect loop detected");
        }

        if let Err(e) = validate_url(url.as_str(), allow_private_hosts) {
            tracing::warn!(to = %url, error = %e, "Refusing redirect");
            return attempt.error(e);
        }

        tracing::debug!(
            to = %url,
            hop = attempt.previous().len(),
            "Following redirect"
        );
        attempt.follow()
    })
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
