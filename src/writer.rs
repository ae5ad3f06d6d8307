//! Writing converted documents to disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::document::MarkdownDocument;

/// Sanitize a page title so it can be used as a filesystem name.
///
/// Anything other than alphanumerics, `-`, `_` and spaces becomes `_`. Runs of
/// spaces collapse to one. A title with nothing usable left yields `untitled`.
pub fn sanitize_filename(title: &str) -> String {
  let replaced: String = title
    .chars()
    .map(|c| {
      if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
        c
      } else {
        '_'
      }
    })
    .collect();

  let collapsed = replaced.split(' ').filter(|part| !part.is_empty()).collect::<Vec<_>>().join(" ");

  if collapsed.is_empty() {
    "untitled".to_string()
  } else {
    collapsed
  }
}

/// Serialize `doc` and write it to `<dir>/<sanitized title>.md`.
///
/// The directory is created when missing and an existing file is replaced.
/// Returns the path written.
pub fn write_document(doc: &MarkdownDocument, dir: &Path, include_frontmatter: bool) -> Result<PathBuf> {
  fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory {}", dir.display()))?;

  let filename = sanitize_filename(&doc.frontmatter().title);
  let output_path = dir.join(format!("{filename}.md"));

  fs::write(&output_path, doc.serialize(include_frontmatter))
    .with_context(|| format!("Failed to write markdown to {}", output_path.display()))?;

  debug!("Wrote {}", output_path.display());
  Ok(output_path)
}
