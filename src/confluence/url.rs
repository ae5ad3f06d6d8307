//! URL construction for pages, attachments and download links.

use anyhow::{Context, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

/// Characters left untouched inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encode a value for use as one URL path segment.
pub fn escape_path_segment(value: &str) -> String {
  utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Percent-encode every segment of a `/`-separated relative path.
pub fn escape_path(path: &str) -> String {
  path.split('/').map(escape_path_segment).collect::<Vec<_>>().join("/")
}

/// Canonical browser URL of a page.
///
/// Produces `{base}/wiki/spaces/{space}/pages/{id}/{title}` with the title
/// percent-encoded.
///
/// # Errors
/// Returns the parse error when `base_url` is not an absolute URL.
pub fn page_url(base_url: &str, space_key: &str, page_id: &str, title: &str) -> Result<String, url::ParseError> {
  Url::parse(base_url)?;
  Ok(format!(
    "{}/wiki/spaces/{}/pages/{}/{}",
    base_url.trim_end_matches('/'),
    escape_path_segment(space_key),
    page_id,
    escape_path_segment(title)
  ))
}

/// Download URL of an attachment addressed by page and filename.
pub fn attachment_download_url(base_url: &str, page_id: &str, filename: &str) -> String {
  format!(
    "{}/wiki/download/attachments/{}/{}",
    base_url.trim_end_matches('/'),
    page_id,
    escape_path_segment(filename)
  )
}

/// Resolve an attachment download link against the site root.
///
/// Absolute links pass through. Relative links gain a leading slash, the
/// `/wiki` context path when they point at `/download/`, and `%20` for spaces.
///
/// # Errors
/// Fails when the combined URL does not parse.
pub fn normalize_download_link(base_url: &str, link: &str) -> Result<String> {
  if link.starts_with("http://") || link.starts_with("https://") {
    return Ok(link.to_string());
  }

  let mut path = if link.starts_with('/') {
    link.to_string()
  } else {
    format!("/{link}")
  };

  if path.starts_with("/download/") {
    path.insert_str(0, "/wiki");
  }

  let path = path.replace(' ', "%20");

  let mut base = base_url.trim_end_matches('/');
  if path.starts_with("/wiki/") {
    base = base.strip_suffix("/wiki").unwrap_or(base);
  }

  let full = format!("{base}{path}");
  let parsed = Url::parse(&full).with_context(|| format!("invalid attachment url {full}"))?;
  Ok(parsed.to_string())
}
