//! Output rendering
//!
//! ```text
//! text_content: |
//!   <text, every line indented by two spaces>
//! images:
//!   - <url>
//! <guidance>
//! ```
//!
//! The `images:` section is left out when there are no images.

use crate::truncate::char_len;
use crate::types::FormatTag;

/// Guidance appended when the output lists images
pub const IMAGES_GUIDANCE: &str = r#"You MUST use the images from the "images" list above verbatim when they are relevant, formatted as markdown: ![](image_link)
Never make up your own image links; only use the ones provided in the "images" list, and do not repeat the same image over and over again.
"#;

/// Guidance appended when no image survived
pub const NO_IMAGES_GUIDANCE: &str =
    "No images were found for this content. Do not make up any image links in your response.\n";

const TEXT_INDENT: &str = "  ";
const IMAGE_ENTRY_PREFIX: &str = "  - ";

/// One serialized line of the `images:` section
pub fn image_entry(url: &str) -> String {
    format!("{}{}\n", IMAGE_ENTRY_PREFIX, url)
}

/// Character length of [`image_entry`] without allocating it
pub fn image_entry_len(url: &str) -> usize {
    IMAGE_ENTRY_PREFIX.len() + char_len(url) + 1
}

/// Final result of the pipeline: the rendered block and the parts it was
/// built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    format: FormatTag,
    text: String,
    images: Vec<String>,
    rendered: String,
}

impl RenderedOutput {
    /// Render already-truncated text and images
    pub fn new(format: FormatTag, text: String, images: Vec<String>) -> Self {
        let rendered = render(&text, &images);
        Self {
            format,
            text,
            images,
            rendered,
        }
    }

    pub fn format(&self) -> FormatTag {
        self.format
    }

    /// Text section before indentation
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Serialized entries of the `images:` section, header excluded
    pub fn image_section(&self) -> String {
        self.images.iter().map(|url| image_entry(url)).collect()
    }

    /// The full rendered block
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    pub fn into_string(self) -> String {
        self.rendered
    }
}

impl std::fmt::Display for RenderedOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.rendered)
    }
}

fn render(text: &str, images: &[String]) -> String {
    let mut output = String::new();

    if needs_indent_indicator(text) {
        output.push_str("text_content: |2\n");
    } else {
        output.push_str("text_content: |\n");
    }

    for line in text.lines() {
        output.push_str(TEXT_INDENT);
        output.push_str(line);
        output.push('\n');
    }

    if images.is_empty() {
        output.push_str(NO_IMAGES_GUIDANCE);
    } else {
        output.push_str("images:\n");
        for url in images {
            output.push_str(&image_entry(url));
        }
        output.push_str(IMAGES_GUIDANCE);
    }

    output
}

/// YAML infers block indentation from the first non-blank line, and blank
/// lines before it may not be indented deeper; an explicit indicator keeps
/// leading whitespace intact in both cases
fn needs_indent_indicator(text: &str) -> bool {
    for line in text.lines() {
        if line.trim().is_empty() {
            if !line.is_empty() {
                return true;
            }
        } else {
            return line.starts_with(char::is_whitespace);
        }
    }
    false
}
