//! Pages and attachments served from local directories.
//!
//! Used when a space was exported ahead of time. Saved content responses sit
//! in one directory as `<page id>.json`, and attachment files sit in another
//! under their Confluence filenames, with any download URL mapped onto that
//! directory by its last path segment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use percent_encoding::percent_decode_str;
use tracing::trace;
use url::Url;

use super::api::{AttachmentDownloader, PageFetcher, error_from_response};
use super::models::{ApiPage, Page};

/// Load a saved content response.
///
/// A saved error body (one carrying `statusCode` but no `id`) is reported the
/// same way a live request would report it.
pub fn load_page_file(path: &Path) -> Result<ApiPage> {
  let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  let value: serde_json::Value =
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse page JSON in {}", path.display()))?;

  if value.get("id").is_none()
    && let Some(status) = value.get("statusCode").and_then(serde_json::Value::as_u64)
  {
    let status = u16::try_from(status).unwrap_or(u16::MAX);
    let err = error_from_response("get page", status, &raw);
    return Err(err.context(format!("{} holds an error response", path.display())));
  }

  serde_json::from_value(value).with_context(|| format!("Failed to parse page JSON in {}", path.display()))
}

/// A [`PageFetcher`] over a directory of saved `<page id>.json` responses.
///
/// Children are the `children.page` entries of the parent's response.
#[derive(Debug, Clone)]
pub struct DirectoryPageStore {
  root: PathBuf,
  files: HashMap<String, PathBuf>,
}

impl DirectoryPageStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      files: HashMap::new(),
    }
  }

  /// Serve `page_id` from `path` instead of `<root>/<page_id>.json`.
  pub fn with_file(mut self, page_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
    self.files.insert(page_id.into(), path.into());
    self
  }

  fn path_for(&self, page_id: &str) -> Result<PathBuf> {
    if let Some(path) = self.files.get(page_id) {
      return Ok(path.clone());
    }
    if page_id.is_empty() || !page_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
      bail!("invalid page id {page_id:?}");
    }
    Ok(self.root.join(format!("{page_id}.json")))
  }
}

impl PageFetcher for DirectoryPageStore {
  fn get_page(&self, page_id: &str) -> Result<Page> {
    let path = self.path_for(page_id)?;
    trace!("Loading page {page_id} from {}", path.display());
    Ok(Page::from(load_page_file(&path)?))
  }

  fn get_child_pages(&self, page_id: &str) -> Result<Vec<Page>> {
    let parent = load_page_file(&self.path_for(page_id)?)?;
    Ok(parent.children.page.results.into_iter().map(Page::from).collect())
  }
}

/// An [`AttachmentDownloader`] reading files from disk.
#[derive(Debug, Clone)]
pub struct DirectoryDownloader {
  base_url: String,
  root: PathBuf,
}

impl DirectoryDownloader {
  pub fn new(base_url: impl Into<String>, root: impl Into<PathBuf>) -> Self {
    Self {
      base_url: base_url.into(),
      root: root.into(),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Local file a download URL maps to.
  fn local_path(&self, url: &str) -> Result<PathBuf> {
    let parsed = Url::parse(url).with_context(|| format!("invalid download url {url}"))?;
    let Some(segment) = parsed.path_segments().and_then(|mut segments| segments.next_back()) else {
      bail!("download url {url} has no path");
    };

    let filename = percent_decode_str(segment).decode_utf8_lossy();
    if filename.is_empty() || filename == "." || filename == ".." {
      bail!("download url {url} does not name a file");
    }

    Ok(self.root.join(filename.as_ref()))
  }
}

impl AttachmentDownloader for DirectoryDownloader {
  fn base_url(&self) -> &str {
    &self.base_url
  }

  fn fetch(&self, url: &str) -> Result<Vec<u8>> {
    let path = self.local_path(url)?;
    trace!("Reading {} for {url}", path.display());
    std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))
  }
}
