//! Image link collection
//!
//! Candidates keep source order and are never deduplicated. Protocol-relative
//! links are rewritten to `http:` before anything measures them.

use crate::extract::{self, Document};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

/// Recognized image file extensions, lowercase, with leading dot
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg"];

/// URL with a host followed by a path ending in an image extension
static RE_IMAGE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:https?:)?//[^\s"'<>/]+/[^\s"'<>]*?\.(?:jpe?g|png|gif|bmp|webp|svg)\b"#)
        .unwrap()
});

impl Document {
    /// Normalized image URLs associated with the document
    pub(crate) fn image_candidates(&self) -> Vec<String> {
        let raw = match self {
            Document::Html(html) => html_images(html),
            Document::Json(value) => json_images(value),
            Document::Plain(text) => plain_images(text),
            Document::Pdf(_) | Document::Yaml(_) => Vec::new(),
        };
        raw.into_iter().map(|url| normalize_url(&url)).collect()
    }
}

/// Rewrite protocol-relative URLs (`//host/a.png`) to `http://host/a.png`
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("http:{}", url)
    } else {
        url.to_string()
    }
}

/// True if the string ends with a known image extension (case-insensitive)
pub fn has_image_extension(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// `<img>` elements around every paragraph
///
/// Every image under a paragraph's parent counts, at any depth (so images
/// wrapped in `<a>`, `<figure>` or `<picture>` are found), except images
/// inside that paragraph itself. Paragraphs that share a parent each
/// contribute that parent's images again.
fn html_images(html: &Html) -> Vec<String> {
    let mut images = Vec::new();
    for paragraph in extract::paragraphs(html) {
        let Some(parent) = paragraph.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        images.extend(
            parent
                .descendants()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == "img")
                .filter(|img| !img.ancestors().any(|node| node == *paragraph))
                .filter_map(|img| img.value().attr("src"))
                .map(str::trim)
                .filter(|src| !src.is_empty())
                .map(str::to_string),
        );
    }
    images
}

/// Image URLs in top-level strings and in strings of top-level arrays
///
/// A top-level array is treated as the list of top-level values.
fn json_images(value: &serde_json::Value) -> Vec<String> {
    let top_level: Vec<&serde_json::Value> = match value {
        serde_json::Value::Object(map) => map.values().collect(),
        serde_json::Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut images = Vec::new();
    for value in top_level {
        match value {
            serde_json::Value::String(s) => images.extend(scan_image_urls(s)),
            serde_json::Value::Array(items) => {
                for item in items {
                    if let serde_json::Value::String(s) = item {
                        images.extend(scan_image_urls(s));
                    }
                }
            }
            _ => {}
        }
    }
    images
}

/// Regex matches, minus scheme-less `//host/...` hits that are really the
/// tail of another scheme such as `ftp://host/...`
fn scan_image_urls(s: &str) -> impl Iterator<Item = String> + '_ {
    RE_IMAGE_URL
        .find_iter(s)
        .filter(move |m| !(m.as_str().starts_with("//") && s[..m.start()].ends_with(':')))
        .map(|m| m.as_str().to_string())
}

/// Lines that end with an image extension are image URLs; others are ignored
fn plain_images(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| has_image_extension(line))
        .map(str::to_string)
        .collect()
}
