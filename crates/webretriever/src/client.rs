//! Entry points for retrieving a URL
//!
//! Fetching is delegated to a [`Fetcher`](crate::fetchers::Fetcher);
//! normalization runs on the blocking pool so PDF parsing never holds up the
//! async runtime.

use crate::error::RetrieveError;
use crate::fetchers::{Fetcher, HttpFetcher};
use crate::pipeline::{Pipeline, PipelineConfig};
use crate::types::{RawResource, RetrieveRequest, RetrieveResponse};

/// Fetch options that can be configured via tool builder
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Allow list of URL prefixes
    pub allow_prefixes: Vec<String>,
    /// Block list of URL prefixes
    pub block_prefixes: Vec<String>,
    /// Cap on body bytes read (defaults to 10 MiB)
    pub max_body_size: Option<usize>,
}

/// Retrieve a URL and return the rendered summary
///
/// Uses the HTTP fetcher with default options and budgets.
/// For custom options, use [`retrieve_with_options`].
pub async fn retrieve(url: impl Into<String>) -> Result<String, RetrieveError> {
    let response = retrieve_with_options(
        RetrieveRequest::new(url),
        FetchOptions::default(),
        PipelineConfig::default(),
    )
    .await?;
    Ok(response.content.unwrap_or_default())
}

/// Retrieve a URL with custom fetch options and budgets
pub async fn retrieve_with_options(
    req: RetrieveRequest,
    options: FetchOptions,
    config: PipelineConfig,
) -> Result<RetrieveResponse, RetrieveError> {
    retrieve_with(&HttpFetcher::new(), &Pipeline::new(config), req, &options).await
}

pub(crate) async fn retrieve_with(
    fetcher: &dyn Fetcher,
    pipeline: &Pipeline,
    req: RetrieveRequest,
    options: &FetchOptions,
) -> Result<RetrieveResponse, RetrieveError> {
    validate_url(&req.url, options)?;

    tracing::debug!(fetcher = fetcher.name(), url = %req.url, "Using fetcher");
    let resource = fetcher.fetch(&req.url, options).await?;

    normalize(pipeline.clone(), resource).await
}

/// Check scheme and allow/block lists
pub(crate) fn validate_url(url: &str, options: &FetchOptions) -> Result<(), RetrieveError> {
    if url.is_empty() {
        return Err(RetrieveError::MissingUrl);
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(RetrieveError::InvalidUrlScheme);
    }

    url::Url::parse(url).map_err(|_| RetrieveError::InvalidUrlScheme)?;

    if !options.allow_prefixes.is_empty()
        && !options
            .allow_prefixes
            .iter()
            .any(|prefix| url.starts_with(prefix))
    {
        return Err(RetrieveError::BlockedUrl);
    }

    if options
        .block_prefixes
        .iter()
        .any(|prefix| url.starts_with(prefix))
    {
        return Err(RetrieveError::BlockedUrl);
    }

    Ok(())
}

/// Run the pipeline off the async executor
pub(crate) async fn normalize(
    pipeline: Pipeline,
    resource: RawResource,
) -> Result<RetrieveResponse, RetrieveError> {
    tokio::task::spawn_blocking(move || summarize(&pipeline, &resource))
        .await
        .map_err(|e| RetrieveError::ExtractionTask(e.to_string()))?
}

fn summarize(pipeline: &Pipeline, resource: &RawResource) -> Result<RetrieveResponse, RetrieveError> {
    let output = pipeline.run(resource)?;

    Ok(RetrieveResponse {
        url: resource.url.clone(),
        status_code: resource.status_code,
        content_type: resource.content_type.clone(),
        size: Some(resource.bytes.len() as u64),
        format: Some(output.format()),
        image_count: Some(output.images().len()),
        content: Some(output.into_string()),
        truncated: if resource.truncated { Some(true) } else { None },
    })
}
