//! Core types for the web retriever

use bytes::Bytes;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Body bytes of a successfully fetched resource
///
/// The content type is advisory only: format detection looks at the bytes.
#[derive(Debug, Clone, Default)]
pub struct RawResource {
    /// URL the bytes came from
    pub url: String,
    /// Response body
    pub bytes: Bytes,
    /// Content-Type header value, if the server sent one
    pub content_type: Option<String>,
    /// HTTP status code of the fetch
    pub status_code: u16,
    /// True if the body was cut short by a timeout or the size cap
    pub truncated: bool,
}

impl RawResource {
    /// Create a resource from a URL and body bytes
    pub fn new(url: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            url: url.into(),
            bytes: bytes.into(),
            status_code: 200,
            ..Default::default()
        }
    }

    /// Set the advisory content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Format of a resource, derived from its leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    Pdf,
    Html,
    Json,
    Yaml,
    Plain,
}

impl FormatTag {
    /// Lowercase name used in responses and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatTag::Pdf => "pdf",
            FormatTag::Html => "html",
            FormatTag::Json => "json",
            FormatTag::Yaml => "yaml",
            FormatTag::Plain => "plain",
        }
    }
}

impl FromStr for FormatTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(FormatTag::Pdf),
            "html" => Ok(FormatTag::Html),
            "json" => Ok(FormatTag::Json),
            "yaml" => Ok(FormatTag::Yaml),
            "plain" => Ok(FormatTag::Plain),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl std::fmt::Display for FormatTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to retrieve a URL
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RetrieveRequest {
    /// The URL to fetch content from (required, must be http:// or https://)
    pub url: String,
}

impl RetrieveRequest {
    /// Create a new request with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Response from a retrieve operation
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RetrieveResponse {
    /// The fetched URL
    pub url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Body size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Detected format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatTag>,

    /// Rendered text_content/images block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Number of images listed in the content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_count: Option<usize>,

    /// True if the body was cut short by a timeout or the size cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tag_from_str() {
        assert_eq!(FormatTag::from_str("PDF").unwrap(), FormatTag::Pdf);
        assert_eq!(FormatTag::from_str("html").unwrap(), FormatTag::Html);
        assert_eq!(FormatTag::from_str("Yaml").unwrap(), FormatTag::Yaml);
        assert!(FormatTag::from_str("docx").is_err());
    }

    #[test]
    fn test_format_tag_display() {
        assert_eq!(FormatTag::Json.to_string(), "json");
        assert_eq!(FormatTag::Plain.to_string(), "plain");
    }

    #[test]
    fn test_raw_resource_builder() {
        let res = RawResource::new("https://example.com/a.txt", "hello")
            .with_content_type("text/plain");
        assert_eq!(res.url, "https://example.com/a.txt");
        assert_eq!(&res.bytes[..], b"hello");
        assert_eq!(res.content_type.as_deref(), Some("text/plain"));
        assert_eq!(res.status_code, 200);
        assert!(!res.truncated);
    }

    #[test]
    fn test_response_serialization() {
        let resp = RetrieveResponse {
            url: "https://example.com".to_string(),
            status_code: 200,
            format: Some(FormatTag::Html),
            content: Some("text_content: |\n  Hello\n".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&resp).unwrap();
        // Optional None fields should be omitted
        assert!(!json.contains("content_type"));
        assert!(!json.contains("truncated"));
        assert!(json.contains("\"format\":\"html\""));
    }
}
