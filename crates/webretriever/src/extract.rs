//! Per-format text extraction
//!
//! A [`Document`] is the decoded form of a resource: one variant per
//! [`FormatTag`], each with its own fragment extractor. Failures inside a
//! page or element are logged and skipped so extraction always returns
//! whatever it could read.

use crate::error::RetrieveError;
use crate::sniff::{self, Probe};
use crate::types::FormatTag;
use bytes::Bytes;
use scraper::node::Node;
use scraper::{ElementRef, Html};
use tracing::{debug, warn};

/// Elements whose text never reaches the output
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Block-level elements, the fallback tier when a page has no paragraphs
const BLOCK_TAGS: &[&str] = &[
    "div",
    "section",
    "article",
    "main",
    "header",
    "footer",
    "aside",
    "nav",
    "li",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "pre",
    "td",
    "th",
    "dd",
    "dt",
    "figcaption",
];

const SPAN_TAGS: &[&str] = &["span"];

/// A decoded resource, ready for text and image extraction
pub(crate) enum Document {
    Pdf(Bytes),
    Html(Html),
    Json(serde_json::Value),
    Yaml(String),
    Plain(String),
}

impl Document {
    /// Sniff and decode raw bytes
    ///
    /// Only plain text that is not valid UTF-8 (or carries NUL bytes) fails;
    /// HTML is decoded lossily. A `partial` body may end in the middle of a
    /// character; that incomplete tail is dropped.
    pub(crate) fn decode(bytes: &Bytes, partial: bool) -> Result<Self, RetrieveError> {
        let document = match sniff::probe(bytes) {
            Probe::Pdf => Document::Pdf(bytes.clone()),
            Probe::Html => Document::Html(Html::parse_document(&String::from_utf8_lossy(bytes))),
            Probe::Json(value) => Document::Json(value),
            Probe::Yaml => Document::Yaml(decode_text(bytes, partial)?),
            Probe::Plain => Document::Plain(decode_text(bytes, partial)?),
        };
        debug!(format = %document.format(), size = bytes.len(), "Detected format");
        Ok(document)
    }

    pub(crate) fn format(&self) -> FormatTag {
        match self {
            Document::Pdf(_) => FormatTag::Pdf,
            Document::Html(_) => FormatTag::Html,
            Document::Json(_) => FormatTag::Json,
            Document::Yaml(_) => FormatTag::Yaml,
            Document::Plain(_) => FormatTag::Plain,
        }
    }

    /// Ordered text fragments in source order
    pub(crate) fn fragments(&self) -> Vec<String> {
        match self {
            Document::Pdf(bytes) => pdf_fragments(bytes),
            Document::Html(html) => html_fragments(html),
            Document::Json(value) => json_fragments(value),
            Document::Yaml(text) | Document::Plain(text) => text_fragments(text),
        }
    }
}

/// Strict UTF-8 decoding for formats that have no markup to fall back on
fn decode_text(bytes: &[u8], partial: bool) -> Result<String, RetrieveError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let decoded = if partial {
        sniff::complete_utf8(bytes)
    } else {
        std::str::from_utf8(bytes)
    };
    let text = decoded.map_err(|e| RetrieveError::Undecodable(e.to_string()))?;
    if text.contains('\0') {
        return Err(RetrieveError::Undecodable(
            "binary content (NUL bytes) is not supported".to_string(),
        ));
    }
    Ok(text.to_string())
}

/// Text of every page, in page order, concatenated without separator
fn pdf_fragments(bytes: &[u8]) -> Vec<String> {
    let document = match lopdf::Document::load_mem(bytes) {
        Ok(document) => document,
        Err(e) => {
            warn!(error = %e, "Failed to load PDF, no text extracted");
            return Vec::new();
        }
    };

    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => debug!(page = page_number, error = %e, "Skipping unreadable PDF page"),
        }
    }

    non_empty(text)
}

/// Paragraphs first, then innermost blocks, then innermost spans
///
/// The first tier that yields any text wins; tiers are never merged.
fn html_fragments(html: &Html) -> Vec<String> {
    let paragraphs: Vec<String> = paragraphs(html)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect();
    if !paragraphs.is_empty() {
        return paragraphs;
    }

    let blocks = innermost_texts(html, BLOCK_TAGS);
    if !blocks.is_empty() {
        debug!(count = blocks.len(), "No paragraphs, using block elements");
        return blocks;
    }

    let spans = innermost_texts(html, SPAN_TAGS);
    debug!(count = spans.len(), "No blocks, using span elements");
    spans
}

/// All `<p>` elements in document order
pub(crate) fn paragraphs(html: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    elements(html).filter(|el| el.value().name() == "p")
}

fn elements(html: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    html.root_element().descendants().filter_map(ElementRef::wrap)
}

/// Text of matching elements that contain no other matching element
fn innermost_texts(html: &Html, tags: &[&str]) -> Vec<String> {
    elements(html)
        .filter(|el| tags.contains(&el.value().name()))
        .filter(|el| {
            !el.descendants()
                .skip(1)
                .filter_map(ElementRef::wrap)
                .any(|inner| tags.contains(&inner.value().name()))
        })
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// Trimmed text content, ignoring script-like descendants
fn element_text(el: ElementRef<'_>) -> String {
    let mut text = String::new();
    push_text(el, &mut text);
    text.trim().to_string()
}

fn push_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            if !SKIP_TAGS.contains(&child_el.value().name()) {
                push_text(child_el, out);
            }
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
        }
    }
}

/// The parsed value as YAML block text, keys in parsed order
fn json_fragments(value: &serde_json::Value) -> Vec<String> {
    let rendered = match serde_yaml::to_string(value) {
        Ok(yaml) => yaml,
        Err(e) => {
            debug!(error = %e, "YAML rendering failed, using compact JSON");
            value.to_string()
        }
    };
    non_empty(rendered.trim_end().to_string())
}

fn text_fragments(text: &str) -> Vec<String> {
    non_empty(text.to_string())
}

fn non_empty(text: String) -> Vec<String> {
    if text.trim().is_empty() {
        Vec::new()
    } else {
        vec![text]
    }
}
