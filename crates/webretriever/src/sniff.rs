//! Format detection from leading bytes
//!
//! The server's Content-Type header is never consulted: the first matching
//! rule below decides, and anything unrecognized is plain text.
//!
//! 1. `%PDF-` signature
//! 2. HTML doctype, `<html`, or a fragment opening with a known HTML element
//!    (case-insensitive)
//! 3. `{` or `[` that parses as JSON
//! 4. `---` or `%YAML` that parses as YAML
//! 5. plain text

use crate::types::FormatTag;
use serde::Deserialize;
use std::str::Utf8Error;
use tracing::debug;

const PDF_SIGNATURE: &[u8] = b"%PDF-";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Elements that mark a headless HTML fragment such as `<p>Hello</p>`
const FRAGMENT_TAGS: &[&str] = &[
    "head", "body", "title", "meta", "link", "p", "div", "section", "article", "main", "header",
    "footer", "nav", "aside", "span", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li",
    "table", "blockquote", "pre", "figure", "img", "a", "br", "form",
];

/// Detection result, keeping the parsed JSON value so it is not parsed twice
#[derive(Debug)]
pub(crate) enum Probe {
    Pdf,
    Html,
    Json(serde_json::Value),
    Yaml,
    Plain,
}

impl Probe {
    pub(crate) fn format(&self) -> FormatTag {
        match self {
            Probe::Pdf => FormatTag::Pdf,
            Probe::Html => FormatTag::Html,
            Probe::Json(_) => FormatTag::Json,
            Probe::Yaml => FormatTag::Yaml,
            Probe::Plain => FormatTag::Plain,
        }
    }
}

/// Classify raw bytes into a [`FormatTag`]
///
/// Never fails: structural parse errors fall through to the next rule and
/// the worst case is [`FormatTag::Plain`].
pub fn detect(bytes: &[u8]) -> FormatTag {
    probe(bytes).format()
}

pub(crate) fn probe(bytes: &[u8]) -> Probe {
    if bytes.starts_with(PDF_SIGNATURE) {
        return Probe::Pdf;
    }

    let head = text_start(bytes);

    if starts_with_ignore_case(head, b"<!doctype html")
        || starts_with_ignore_case(head, b"<html")
        || opens_with_fragment_tag(head)
    {
        return Probe::Html;
    }

    if matches!(head.first(), Some(b'{') | Some(b'[')) {
        match serde_json::from_slice::<serde_json::Value>(head) {
            Ok(value) => return Probe::Json(value),
            Err(e) => debug!(error = %e, "JSON probe failed, falling through"),
        }
    }

    if head.starts_with(b"---") || head.starts_with(b"%YAML") {
        match complete_utf8(head) {
            Ok(text) if parses_as_yaml(text) => return Probe::Yaml,
            _ => debug!("YAML probe failed, falling through"),
        }
    }

    Probe::Plain
}

/// Skip a UTF-8 byte-order mark and leading ASCII whitespace
pub(crate) fn text_start(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

/// `<name` followed by `>`, `/`, whitespace or the end, with `name` a known element
fn opens_with_fragment_tag(head: &[u8]) -> bool {
    let Some(rest) = head.strip_prefix(b"<") else {
        return false;
    };
    let name_len = rest
        .iter()
        .position(|b| !b.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    let terminated = match rest.get(name_len) {
        None => true,
        Some(b) => *b == b'>' || *b == b'/' || b.is_ascii_whitespace(),
    };
    terminated
        && FRAGMENT_TAGS
            .iter()
            .any(|tag| rest[..name_len].eq_ignore_ascii_case(tag.as_bytes()))
}

fn starts_with_ignore_case(haystack: &[u8], prefix: &[u8]) -> bool {
    haystack.len() >= prefix.len() && haystack[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Decode UTF-8, tolerating only a final character cut off mid-sequence
///
/// Invalid bytes anywhere else are still an error.
pub(crate) fn complete_utf8(bytes: &[u8]) -> Result<&str, Utf8Error> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) if e.error_len().is_none() => std::str::from_utf8(&bytes[..e.valid_up_to()]),
        Err(e) => Err(e),
    }
}

/// Every document of the stream must parse
fn parses_as_yaml(text: &str) -> bool {
    serde_yaml::Deserializer::from_str(text)
        .all(|document| serde_yaml::Value::deserialize(document).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_pdf() {
        assert_eq!(detect(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n"), FormatTag::Pdf);
        // The signature must be at the very start
        assert_eq!(detect(b" %PDF-1.7"), FormatTag::Plain);
    }

    #[test]
    fn test_detect_html() {
        assert_eq!(detect(b"<!DOCTYPE html><html></html>"), FormatTag::Html);
        assert_eq!(detect(b"<!doctype HTML>"), FormatTag::Html);
        assert_eq!(detect(b"<HTML><body>hi</body></HTML>"), FormatTag::Html);
        assert_eq!(detect(b"\n\n  <html lang=\"en\">"), FormatTag::Html);
        assert_eq!(detect(b"\xEF\xBB\xBF<!DOCTYPE html>"), FormatTag::Html);
    }

    #[test]
    fn test_detect_html_fragment() {
        assert_eq!(detect(b"<p>Hello</p><p>World</p>"), FormatTag::Html);
        assert_eq!(detect(b"  <DIV class=\"x\">text</DIV>"), FormatTag::Html);
        assert_eq!(detect(b"<br/>"), FormatTag::Html);
    }

    #[test]
    fn test_unknown_markup_is_plain() {
        assert_eq!(detect(b"<pre-release> notes"), FormatTag::Plain);
        assert_eq!(detect(b"<para>docbook</para>"), FormatTag::Plain);
        assert_eq!(detect(b"<?xml version=\"1.0\"?><feed/>"), FormatTag::Plain);
        assert_eq!(detect(b"<3 you"), FormatTag::Plain);
        assert_eq!(detect(b"<"), FormatTag::Plain);
    }

    #[test]
    fn test_detect_json() {
        assert_eq!(detect(b"{\"a\": 1}"), FormatTag::Json);
        assert_eq!(detect(b"[1, 2, 3]"), FormatTag::Json);
        assert_eq!(detect(b"  \n{\"nested\": {\"b\": [true]}}\n"), FormatTag::Json);
    }

    #[test]
    fn test_broken_json_falls_through() {
        assert_eq!(detect(b"{not json"), FormatTag::Plain);
        assert_eq!(detect(b"[link](http://example.com)"), FormatTag::Plain);
    }

    #[test]
    fn test_detect_yaml() {
        assert_eq!(detect(b"---\ntitle: Hello\ntags: [a, b]\n"), FormatTag::Yaml);
        assert_eq!(detect(b"%YAML 1.1\n---\nkey: value\n"), FormatTag::Yaml);
        assert_eq!(detect(b"---\na: 1\n---\nb: 2\n"), FormatTag::Yaml);
    }

    #[test]
    fn test_broken_yaml_falls_through() {
        assert_eq!(detect(b"---\nkey: [unclosed\n"), FormatTag::Plain);
    }

    #[test]
    fn test_detect_plain() {
        assert_eq!(detect(b"Hello, World!"), FormatTag::Plain);
        assert_eq!(detect(b""), FormatTag::Plain);
        assert_eq!(detect(b"key: value"), FormatTag::Plain);
        assert_eq!(detect(&[0xFF, 0xFE, 0x00, 0x01]), FormatTag::Plain);
    }

    #[test]
    fn test_probe_keeps_json_value() {
        match probe(b"{\"a\": \"b\"}") {
            Probe::Json(value) => assert_eq!(value["a"], "b"),
            other => panic!("expected JSON probe, got {:?}", other),
        }
    }

    #[test]
    fn test_complete_utf8() {
        assert_eq!(complete_utf8(b"w\xC3\xB6rld").unwrap(), "wörld");
        assert_eq!(complete_utf8(b"w\xC3").unwrap(), "w");
        assert_eq!(complete_utf8(b"\xE6\x97").unwrap(), "");
        assert!(complete_utf8(b"a\xFFb").is_err());
    }

    #[test]
    fn test_text_start() {
        assert_eq!(text_start(b"\xEF\xBB\xBF  {}"), b"{}");
        assert_eq!(text_start(b"   "), b"");
    }
}
