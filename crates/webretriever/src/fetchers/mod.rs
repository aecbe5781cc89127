//! Byte sources for the pipeline
//!
//! A fetcher turns a URL into a [`RawResource`] and is responsible for
//! everything that can go wrong on the wire: timeouts, connection failures
//! and non-success status codes. The pipeline only ever sees bytes from a
//! successful fetch.

mod http;

pub use http::HttpFetcher;

use crate::client::FetchOptions;
use crate::error::RetrieveError;
use crate::types::RawResource;
use async_trait::async_trait;

/// Trait for resource fetchers
///
/// Implement this trait to feed the pipeline from somewhere other than
/// plain HTTP, such as a cache or a test fixture.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Unique identifier for this fetcher (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Fetch the body behind a validated URL
    ///
    /// Must return an error for non-success HTTP statuses.
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<RawResource, RetrieveError>;
}
