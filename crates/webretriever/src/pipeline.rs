//! Normalization pipeline
//!
//! bytes → sniff → extract text / collect images → truncate → render.
//!
//! The pipeline holds only its configuration, so one instance can serve any
//! number of concurrent requests.

use crate::error::RetrieveError;
use crate::extract::Document;
use crate::format::{self, RenderedOutput};
use crate::truncate;
use crate::types::RawResource;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default text budget in characters
pub const DEFAULT_TEXT_BUDGET: usize = 1280;

/// Default budget for the serialized image list in characters
pub const DEFAULT_IMAGE_BUDGET: usize = 512;

/// Image count used by [`PipelineConfig::legacy`]
pub const LEGACY_MAX_IMAGES: usize = 3;

/// How the image list is bounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageLimit {
    /// Greedy selection against a character budget for the serialized list
    CharBudget(usize),
    /// First `n` images, whatever their length
    Count(usize),
}

impl Default for ImageLimit {
    fn default() -> Self {
        ImageLimit::CharBudget(DEFAULT_IMAGE_BUDGET)
    }
}

/// Budgets for one pipeline instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum characters of extracted text
    pub text_budget: usize,
    /// Bound on the image list
    pub image_limit: ImageLimit,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            text_budget: DEFAULT_TEXT_BUDGET,
            image_limit: ImageLimit::default(),
        }
    }
}

impl PipelineConfig {
    /// Count-capped image list, as earlier versions of the service did
    pub fn legacy() -> Self {
        Self {
            image_limit: ImageLimit::Count(LEGACY_MAX_IMAGES),
            ..Default::default()
        }
    }

    /// Set the text budget
    pub fn with_text_budget(mut self, budget: usize) -> Self {
        self.text_budget = budget;
        self
    }

    /// Bound images by a character budget
    pub fn with_image_budget(mut self, budget: usize) -> Self {
        self.image_limit = ImageLimit::CharBudget(budget);
        self
    }

    /// Bound images by count instead of characters
    pub fn with_max_images(mut self, max: usize) -> Self {
        self.image_limit = ImageLimit::Count(max);
        self
    }
}

/// The normalization pipeline
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline with the given budgets
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Normalize one resource
    ///
    /// Fails only when bytes that are not PDF cannot be decoded as text.
    pub fn run(&self, resource: &RawResource) -> Result<RenderedOutput, RetrieveError> {
        let document = Document::decode(&resource.bytes, resource.truncated)?;

        let fragments = document.fragments();
        let candidates = document.image_candidates();

        let budget = self.config.text_budget;
        let text = truncate::join_within(&truncate::truncate_fragments(&fragments, budget), budget);

        let images = match self.config.image_limit {
            ImageLimit::CharBudget(budget) => {
                truncate::truncate_images(&candidates, budget, format::image_entry_len)
            }
            ImageLimit::Count(max) => truncate::cap_images(&candidates, max),
        };

        debug!(
            url = %resource.url,
            content_type = resource.content_type.as_deref().unwrap_or("-"),
            format = %document.format(),
            fragments = fragments.len(),
            candidates = candidates.len(),
            images = images.len(),
            "Normalized resource"
        );

        Ok(RenderedOutput::new(document.format(), text, images))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{IMAGES_GUIDANCE, NO_IMAGES_GUIDANCE};
    use crate::types::FormatTag;

    fn run(config: PipelineConfig, body: &str) -> RenderedOutput {
        Pipeline::new(config)
            .run(&RawResource::new("https://example.com/", body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_html_scenario() {
        let output = run(
            PipelineConfig::default().with_text_budget(100),
            "<html><body><p>Hello</p><p>World</p></body></html>",
        );
        assert_eq!(output.format(), FormatTag::Html);
        assert_eq!(output.text(), "Hello World");
        assert!(output.as_str().contains("  Hello World\n"));
        assert!(!output.as_str().contains("images:"));
        assert!(output.as_str().ends_with(NO_IMAGES_GUIDANCE));
    }

    #[test]
    fn test_headless_html_fragment() {
        let output = run(
            PipelineConfig::default().with_text_budget(100),
            "<p>Hello</p><p>World</p>",
        );
        assert_eq!(output.format(), FormatTag::Html);
        assert_eq!(output.text(), "Hello World");
        assert!(output.as_str().starts_with("text_content: |\n  Hello World\n"));
        assert!(!output.as_str().contains("<p>"));
        assert!(!output.as_str().contains("images:"));
    }

    #[test]
    fn test_json_scenario() {
        let output = run(
            PipelineConfig::default(),
            r#"{"a": "http://x.com/1.jpg", "b": ["http://x.com/2.png"]}"#,
        );
        assert_eq!(output.format(), FormatTag::Json);
        assert_eq!(output.images(), ["http://x.com/1.jpg", "http://x.com/2.png"]);
        assert!(output
            .as_str()
            .contains("images:\n  - http://x.com/1.jpg\n  - http://x.com/2.png\n"));
        assert!(output.as_str().ends_with(IMAGES_GUIDANCE));
    }

    #[test]
    fn test_plain_scenario() {
        let output = run(PipelineConfig::default(), "http://x.com/a.jpg\nnot an image");
        assert_eq!(output.format(), FormatTag::Plain);
        assert_eq!(output.images(), ["http://x.com/a.jpg"]);
        assert_eq!(output.text(), "http://x.com/a.jpg\nnot an image");
    }

    #[test]
    fn test_exact_budget_scenario() {
        let output = run(
            PipelineConfig::default().with_text_budget(5),
            "<html><body><p>Hello</p><p>World</p></body></html>",
        );
        assert_eq!(output.text(), "Hello");
    }

    #[test]
    fn test_text_budget_clamps_single_fragment() {
        let body = "x".repeat(5000);
        let output = run(PipelineConfig::default(), &body);
        assert_eq!(output.text().chars().count(), DEFAULT_TEXT_BUDGET);
    }

    #[test]
    fn test_image_budget_bounds_section() {
        let body: String = (0..50)
            .map(|i| format!("//cdn.example.com/images/{}.png\n", i))
            .collect();
        for budget in [0, 10, 40, 100, 512] {
            let output = run(PipelineConfig::default().with_image_budget(budget), &body);
            assert!(output.image_section().chars().count() <= budget);
            assert!(output.images().iter().all(|u| u.starts_with("http://cdn.example.com/")));
        }
    }

    #[test]
    fn test_protocol_relative_counted_after_normalization() {
        // Entry is "  - http://a.co/b/c.png\n": 24 characters with the scheme
        let body = "//a.co/b/c.png\n";
        let fits = run(PipelineConfig::default().with_image_budget(24), body);
        assert_eq!(fits.images(), ["http://a.co/b/c.png"]);
        let short = run(PipelineConfig::default().with_image_budget(23), body);
        assert!(short.images().is_empty());
    }

    #[test]
    fn test_legacy_count_cap() {
        let html = r#"<html><body><div>
            <img src="1.png"><img src="2.png"><img src="3.png"><img src="4.png">
            <p>Gallery</p>
        </div></body></html>"#;
        let output = run(PipelineConfig::legacy(), html);
        assert_eq!(output.images(), ["1.png", "2.png", "3.png"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let output = run(
            PipelineConfig::default(),
            "http://x.com/a.png\nhttp://x.com/a.png\n",
        );
        assert_eq!(output.images(), ["http://x.com/a.png", "http://x.com/a.png"]);
    }

    #[test]
    fn test_rerunning_output_text_is_stable() {
        let config = PipelineConfig::default().with_text_budget(12);
        let first = run(config, "<html><body><p>alpha</p><p>beta gamma</p></body></html>");
        let second = run(config, first.text());
        assert_eq!(first.text(), "alpha beta g");
        assert_eq!(second.text(), first.text());
    }

    #[test]
    fn test_undecodable_body_fails() {
        let resource = RawResource::new("https://example.com/blob", vec![0xC3u8, 0x28, 0xA0, 0xA1]);
        let result = Pipeline::default().run(&resource);
        assert!(matches!(result, Err(RetrieveError::Undecodable(_))));
    }

    #[test]
    fn test_truncated_body_cut_mid_character() {
        let mut resource = RawResource::new("https://example.com/", &b"h\xC3\xA9llo w\xC3"[..]);
        resource.truncated = true;

        let output = Pipeline::default().run(&resource).unwrap();
        assert_eq!(output.format(), FormatTag::Plain);
        assert_eq!(output.text(), "héllo w");
    }

    #[test]
    fn test_empty_body_is_well_formed() {
        let output = run(PipelineConfig::default(), "");
        assert_eq!(output.format(), FormatTag::Plain);
        assert!(output.as_str().starts_with("text_content: |\n"));
    }

    #[test]
    fn test_config_builders() {
        let config = PipelineConfig::default()
            .with_text_budget(10)
            .with_max_images(2);
        assert_eq!(config.text_budget, 10);
        assert_eq!(config.image_limit, ImageLimit::Count(2));
        assert_eq!(
            config.with_image_budget(64).image_limit,
            ImageLimit::CharBudget(64)
        );
        assert_eq!(PipelineConfig::legacy().image_limit, ImageLimit::Count(3));
    }
}
