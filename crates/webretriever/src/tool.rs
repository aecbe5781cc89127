//! Tool builder and contract for the web retriever

use crate::client::{normalize, retrieve_with, validate_url, FetchOptions};
use crate::error::RetrieveError;
use crate::fetchers::{Fetcher, HttpFetcher};
use crate::pipeline::{Pipeline, PipelineConfig};
use crate::types::{RetrieveRequest, RetrieveResponse};
use crate::{TOOL_DESCRIPTION, TOOL_LLMTXT};
use schemars::schema_for;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Status update during tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolStatus {
    /// Current phase (e.g., "validate", "fetch", "normalize", "complete")
    pub phase: String,
    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Estimated completion percentage (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<f32>,
}

impl ToolStatus {
    /// Create a new status with phase
    pub fn new(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            message: None,
            percent_complete: None,
        }
    }

    /// Set message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set completion percentage
    pub fn with_percent(mut self, percent: f32) -> Self {
        self.percent_complete = Some(percent);
        self
    }
}

/// Builder for configuring the retriever tool
#[derive(Clone, Default)]
pub struct ToolBuilder {
    options: FetchOptions,
    config: PipelineConfig,
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl ToolBuilder {
    /// Create a new tool builder with default budgets and the HTTP fetcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.options.user_agent = Some(ua.into());
        self
    }

    /// Add URL prefix to allow list
    pub fn allow_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.allow_prefixes.push(prefix.into());
        self
    }

    /// Add URL prefix to block list
    pub fn block_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.block_prefixes.push(prefix.into());
        self
    }

    /// Cap the number of body bytes read
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.options.max_body_size = Some(bytes);
        self
    }

    /// Replace all budgets at once
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the text budget in characters
    pub fn text_budget(mut self, budget: usize) -> Self {
        self.config = self.config.with_text_budget(budget);
        self
    }

    /// Bound images by a character budget
    pub fn image_budget(mut self, budget: usize) -> Self {
        self.config = self.config.with_image_budget(budget);
        self
    }

    /// Bound images by count (legacy mode)
    pub fn max_images(mut self, max: usize) -> Self {
        self.config = self.config.with_max_images(max);
        self
    }

    /// Use a custom fetcher instead of plain HTTP
    pub fn fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Build the tool
    pub fn build(self) -> Tool {
        Tool {
            options: self.options,
            pipeline: Pipeline::new(self.config),
            fetcher: self.fetcher.unwrap_or_else(|| Arc::new(HttpFetcher::new())),
        }
    }
}

/// Configured retriever tool
#[derive(Clone)]
pub struct Tool {
    options: FetchOptions,
    pipeline: Pipeline,
    fetcher: Arc<dyn Fetcher>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("options", &self.options)
            .field("pipeline", &self.pipeline)
            .field("fetcher", &self.fetcher.name())
            .finish()
    }
}

impl Default for Tool {
    fn default() -> Self {
        ToolBuilder::new().build()
    }
}

impl Tool {
    /// Create a new tool builder
    pub fn builder() -> ToolBuilder {
        ToolBuilder::new()
    }

    /// Get tool description
    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Budgets used by this tool
    pub fn config(&self) -> &PipelineConfig {
        self.pipeline.config()
    }

    /// Get input schema as JSON
    pub fn input_schema(&self) -> serde_json::Value {
        let schema = schema_for!(RetrieveRequest);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Get output schema as JSON
    pub fn output_schema(&self) -> serde_json::Value {
        let schema = schema_for!(RetrieveResponse);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Execute the tool with the given request
    pub async fn execute(&self, req: RetrieveRequest) -> Result<RetrieveResponse, RetrieveError> {
        retrieve_with(self.fetcher.as_ref(), &self.pipeline, req, &self.options).await
    }

    /// Execute the tool with status updates
    pub async fn execute_with_status<F>(
        &self,
        req: RetrieveRequest,
        mut status_callback: F,
    ) -> Result<RetrieveResponse, RetrieveError>
    where
        F: FnMut(ToolStatus),
    {
        status_callback(ToolStatus::new("validate").with_percent(0.0));

        validate_url(&req.url, &self.options)?;

        status_callback(
            ToolStatus::new("fetch")
                .with_message(format!("Fetching {}", req.url))
                .with_percent(10.0),
        );

        let resource = self.fetcher.fetch(&req.url, &self.options).await?;

        status_callback(
            ToolStatus::new("normalize")
                .with_message(format!("Normalizing {} bytes", resource.bytes.len()))
                .with_percent(70.0),
        );

        let response = normalize(self.pipeline.clone(), resource).await?;

        status_callback(ToolStatus::new("complete").with_percent(100.0));

        Ok(response)
    }
}
