//! Text extraction from raw macro markup.
//!
//! These work on the literal markup of an element rather than the parsed
//! tree, so they still succeed when a macro body was mangled on the way in.

use std::sync::LazyLock;

use regex::Regex;

use super::html_entities::decode_html_entities;

static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"ri:filename="([^"]+)""#).expect("valid regex"));

static LANGUAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"<ac:parameter[^>]*ac:name="language"[^>]*>([^<]+)</ac:parameter>"#).expect("valid regex")
});

static PLAIN_TEXT_BODY_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"<ac:plain-text-body>([\s\S]*?)</ac:plain-text-body>").expect("valid regex"));

static IMAGE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"<ac:image\b[^>]*?/>|<ac:image\b[^>]*>[\s\S]*?</ac:image>").expect("valid regex"));

/// Filename referenced by an image element, or an empty string.
pub fn filename_from_image_markup(markup: &str) -> String {
  FILENAME_RE
    .captures(markup)
    .map(|caps| caps[1].to_string())
    .unwrap_or_default()
}

/// Value of the `language` parameter of a code macro, or an empty string.
pub fn language_from_macro_markup(markup: &str) -> String {
  LANGUAGE_RE
    .captures(markup)
    .map(|caps| caps[1].trim().to_string())
    .unwrap_or_default()
}

/// Body of the macro's `ac:plain-text-body`, unescaped and without CDATA
/// wrappers.
///
/// Both the literal `<![CDATA[ ... ]]>` form and the commented
/// `<!--[CDATA[ ... ]]-->` form produced by lenient HTML parsers are
/// recognized.
pub fn code_body_from_macro_markup(markup: &str) -> String {
  let Some(caps) = PLAIN_TEXT_BODY_RE.captures(markup) else {
    return String::new();
  };

  let content = decode_html_entities(&caps[1]);
  let content = strip_wrapper(&content, "<!--[CDATA[", "]]-->");
  strip_wrapper(content, "<![CDATA[", "]]>").to_string()
}

/// Every `ac:image` element in document order, self-closing or not.
pub fn image_elements(html: &str) -> impl Iterator<Item = &str> {
  IMAGE_RE.find_iter(html).map(|m| m.as_str())
}

fn strip_wrapper<'a>(content: &'a str, open: &str, close: &str) -> &'a str {
  let content = content.strip_prefix(open).unwrap_or(content);
  content.strip_suffix(close).unwrap_or(content)
}
