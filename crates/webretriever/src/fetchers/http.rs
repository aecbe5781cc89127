//! HTTP fetcher
//!
//! Handles http:// and https:// URLs with reqwest. The body is read as a
//! stream so a slow or oversized response yields partial content instead of
//! an error.

use crate::client::FetchOptions;
use crate::error::RetrieveError;
use crate::fetchers::Fetcher;
use crate::types::RawResource;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Connect + response headers timeout
const FIRST_BYTE_TIMEOUT: Duration = Duration::from_secs(1);

/// Body timeout (total)
const BODY_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on body size
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

const ACCEPT_VALUE: &str =
    "text/html, application/xhtml+xml, application/pdf, application/json, text/plain, */*;q=0.8";

/// Default HTTP fetcher
pub struct HttpFetcher;

impl HttpFetcher {
    /// Create a new HTTP fetcher
    pub fn new() -> Self {
        Self
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<RawResource, RetrieveError> {
        // Build headers
        let mut headers = HeaderMap::new();
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(FIRST_BYTE_TIMEOUT)
            .build()
            .map_err(RetrieveError::ClientBuildError)?;

        let response = tokio::time::timeout(FIRST_BYTE_TIMEOUT, client.get(url).send())
            .await
            .map_err(|_| RetrieveError::FirstByteTimeout)?
            .map_err(RetrieveError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "Non-success status");
            return Err(RetrieveError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let max_size = options.max_body_size.unwrap_or(DEFAULT_MAX_BODY_SIZE);
        let (bytes, truncated) = read_body(response, BODY_TIMEOUT, max_size).await;

        Ok(RawResource {
            url: url.to_string(),
            bytes,
            content_type,
            status_code: status.as_u16(),
            truncated,
        })
    }
}

/// Read response body, returning partial content on timeout, stream error
/// or once `max_size` bytes have been read
async fn read_body(response: reqwest::Response, timeout: Duration, max_size: usize) -> (Bytes, bool) {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let chunk_future = stream.next();
        let timeout_future = tokio::time::sleep_until(deadline);

        tokio::select! {
            chunk = chunk_future => {
                match chunk {
                    Some(Ok(bytes)) => {
                        body.extend_from_slice(&bytes);
                        if body.len() >= max_size {
                            warn!(max_size, "Body size cap reached, returning partial content");
                            body.truncate(max_size);
                            return (Bytes::from(body), true);
                        }
                    }
                    Some(Err(e)) => {
                        error!("Error reading body chunk: {}", e);
                        let has_content = !body.is_empty();
                        return (Bytes::from(body), has_content);
                    }
                    None => {
                        // Stream complete
                        return (Bytes::from(body), false);
                    }
                }
            }
            _ = timeout_future => {
                warn!("Body timeout reached, returning partial content");
                return (Bytes::from(body), true);
            }
        }
    }
}
