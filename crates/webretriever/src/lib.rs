//! Web Retriever - bounded, LLM-ready summaries of web resources
//!
//! This crate fetches a URL and normalizes the body into a fixed text block:
//! a `text_content` literal, an optional `images` list and guidance for the
//! consuming model.
//!
//! ## Pipeline
//!
//! 1. [`detect`] classifies the bytes as PDF, HTML, JSON, YAML or plain text
//!    from their leading bytes, never from the Content-Type header.
//! 2. Text fragments and image links are extracted per format.
//! 3. Text and images are cut to the budgets in [`PipelineConfig`].
//! 4. The result is rendered as a [`RenderedOutput`].
//!
//! [`Pipeline`] works on in-memory bytes and can be used without any
//! network access; [`Tool`] and [`retrieve`] add the HTTP fetch in front.

pub mod client;
mod error;
mod extract;
pub mod fetchers;
mod format;
mod images;
mod pipeline;
mod sniff;
mod tool;
pub mod truncate;
mod types;

pub use client::{retrieve, retrieve_with_options, FetchOptions};
pub use error::RetrieveError;
pub use fetchers::{Fetcher, HttpFetcher};
pub use format::{RenderedOutput, IMAGES_GUIDANCE, NO_IMAGES_GUIDANCE};
pub use images::{has_image_extension, normalize_url, IMAGE_EXTENSIONS};
pub use pipeline::{
    ImageLimit, Pipeline, PipelineConfig, DEFAULT_IMAGE_BUDGET, DEFAULT_TEXT_BUDGET,
    LEGACY_MAX_IMAGES,
};
pub use sniff::detect;
pub use tool::{Tool, ToolBuilder, ToolStatus};
pub use types::{FormatTag, RawResource, RetrieveRequest, RetrieveResponse};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "WebRetriever/0.1";

/// Tool description for LLM consumption
pub const TOOL_DESCRIPTION: &str = r#"Returns a web page's, PDF's or document's content as bounded text plus image links.

- Detects PDF, HTML, JSON, YAML and plain text from the content itself
- Extracts paragraphs and related images
- Output is capped to a fixed number of characters"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# Web Retriever Tool

Fetches a URL and returns its readable content as a bounded text block with
image links that can be shown to the user.

## Capabilities
- PDF text extraction (all pages, in order)
- HTML paragraph extraction with images next to those paragraphs
- JSON rendered as readable block text, with image URLs collected from top-level values
- YAML and plain text passed through; plain-text lines that are image URLs are listed as images
- Text capped to 1280 characters by default, image list capped separately

## Input Parameters
- `url` (required): The URL to fetch content from (must be http:// or https://)

## Output
```text
text_content: |
  <extracted text>
images:
  - <image url>
<usage guidance>
```
The `images:` section is omitted when there are no images.

## Output Fields
- `url`: The fetched URL
- `status_code`: HTTP status code
- `content_type`: Content-Type header value (informational only)
- `size`: Body size in bytes
- `format`: "pdf", "html", "json", "yaml" or "plain"
- `content`: The rendered block above
- `image_count`: Number of listed images
- `truncated`: True if the body was cut short by a timeout or the size cap

## Examples

### Summarize a web page
```json
{"url": "https://example.com"}
```

### Summarize a PDF
```json
{"url": "https://example.com/paper.pdf"}
```

## Error Handling
- Invalid or blocked URLs return an error
- Non-success HTTP statuses return an error
- Binary content that is neither PDF nor text returns an error
- Use the listed images verbatim; never invent image links
"#;
