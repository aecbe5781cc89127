//! Error types for the web retriever

use thiserror::Error;

/// Errors that can occur while retrieving and normalizing a resource
#[derive(Debug, Error)]
pub enum RetrieveError {
    /// URL is missing
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// URL is blocked by prefix list
    #[error("Blocked URL: prefix not allowed")]
    BlockedUrl,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Request timed out waiting for first byte
    #[error("Request timed out: server did not respond within 1 second")]
    FirstByteTimeout,

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Server answered with a non-success status
    #[error("Server responded with HTTP status {0}")]
    HttpStatus(u16),

    /// Body is neither a PDF nor decodable text
    #[error("Content could not be decoded as text: {0}")]
    Undecodable(String),

    /// Extraction task panicked or was cancelled
    #[error("Extraction task failed: {0}")]
    ExtractionTask(String),
}

impl RetrieveError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RetrieveError::FirstByteTimeout
        } else if err.is_connect() {
            RetrieveError::ConnectError(err)
        } else {
            RetrieveError::RequestError(err.to_string())
        }
    }

    /// Message meant to be relayed to the end user by the consuming model
    pub fn user_message(&self) -> String {
        format!(
            "Sorry, the url is not available. {}\nYou should report this message to the user!",
            self
        )
    }
}
