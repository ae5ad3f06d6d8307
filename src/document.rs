//! The Markdown document produced for a converted page.
//!
//! A [`MarkdownDocument`] couples the rendered body with frontmatter metadata
//! and a manifest of the images the body links to. The manifest is filled by
//! the converter and later completed by an image downloader, which records
//! content type and size for each entry.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::confluence::Page;
use crate::confluence::url::page_url;
use crate::error::{ConvertError, Result};

/// Metadata written as YAML frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
  pub title: String,
  pub author: String,
  /// Last update of the page; omitted from the output when unknown.
  pub date: Option<DateTime<Utc>>,
  pub labels: Vec<String>,
  pub confluence: ConfluenceRef,
  /// Extra `key: value` lines appended after the Confluence block.
  pub custom: BTreeMap<String, String>,
}

/// Back-reference to the page a document was converted from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfluenceRef {
  pub page_id: String,
  pub space_key: String,
  pub version: u32,
  pub url: String,
}

/// An image attachment referenced by the document body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
  /// Attachment download URL on the Confluence site.
  pub original_url: String,
  /// Path the body links to, relative to the document.
  pub local_path: String,
  pub filename: String,
  /// Set once the image has been downloaded.
  pub content_type: Option<String>,
  /// Byte size, set once the image has been downloaded.
  pub size: Option<u64>,
}

/// A converted page: frontmatter, Markdown body and image manifest.
///
/// Frontmatter and content are fixed once conversion finishes. The image
/// manifest is the exception: downloaders receive it through
/// [`MarkdownDocument::images_mut`] and update entries in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkdownDocument {
  frontmatter: Frontmatter,
  content: String,
  images: Vec<ImageRef>,
}

impl MarkdownDocument {
  /// Builds an empty document carrying the page's metadata.
  ///
  /// # Errors
  /// [`ConvertError::InvalidBaseUrl`] when the page URL cannot be built from
  /// `base_url`.
  pub fn from_page(page: &Page, base_url: &str) -> Result<Self> {
    let url = page_url(base_url, &page.space_key, &page.id, &page.title).map_err(|source| {
      ConvertError::InvalidBaseUrl {
        base: base_url.to_string(),
        source,
      }
    })?;

    Ok(Self {
      frontmatter: Frontmatter {
        title: page.title.clone(),
        author: page.created_by.display_name.clone(),
        date: page.updated_at,
        labels: page.label_names(),
        confluence: ConfluenceRef {
          page_id: page.id.clone(),
          space_key: page.space_key.clone(),
          version: page.version,
          url,
        },
        custom: BTreeMap::new(),
      },
      content: String::new(),
      images: Vec::new(),
    })
  }

  /// Assembles a document from parts.
  pub fn new(frontmatter: Frontmatter, content: impl Into<String>, images: Vec<ImageRef>) -> Self {
    Self {
      frontmatter,
      content: content.into(),
      images,
    }
  }

  pub(crate) fn with_content(mut self, content: String, images: Vec<ImageRef>) -> Self {
    self.content = content;
    self.images = images;
    self
  }

  pub fn frontmatter(&self) -> &Frontmatter {
    &self.frontmatter
  }

  pub fn content(&self) -> &str {
    &self.content
  }

  pub fn images(&self) -> &[ImageRef] {
    &self.images
  }

  /// Mutable access to the image manifest for downloaders recording
  /// `content_type` and `size`.
  pub fn images_mut(&mut self) -> &mut [ImageRef] {
    &mut self.images
  }

  /// Adds a custom frontmatter field, replacing any previous value.
  pub fn set_custom_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.frontmatter.custom.insert(key.into(), value.into());
  }

  /// Render the document as text, optionally preceded by YAML frontmatter.
  pub fn serialize(&self, include_frontmatter: bool) -> String {
    if !include_frontmatter {
      return self.content.clone();
    }

    let fm = &self.frontmatter;
    let mut out = String::from("---\n");
    out.push_str(&format!("title: {}\n", quote(&fm.title)));
    out.push_str(&format!("author: {}\n", quote(&fm.author)));
    if let Some(date) = fm.date {
      out.push_str(&format!(
        "date: {}\n",
        quote(&date.to_rfc3339_opts(SecondsFormat::Secs, true))
      ));
    }

    if !fm.labels.is_empty() {
      out.push_str("labels:\n");
      for label in &fm.labels {
        out.push_str(&format!("  - {}\n", quote(label)));
      }
    }

    out.push_str("confluence:\n");
    out.push_str(&format!("  pageId: {}\n", quote(&fm.confluence.page_id)));
    out.push_str(&format!("  spaceKey: {}\n", quote(&fm.confluence.space_key)));
    out.push_str(&format!("  version: {}\n", quote(&fm.confluence.version.to_string())));
    out.push_str(&format!("  url: {}\n", quote(&fm.confluence.url)));

    for (key, value) in &fm.custom {
      out.push_str(&format!("{key}: {value}\n"));
    }

    out.push_str("---\n\n");
    out.push_str(&self.content);
    out
  }
}

/// Double-quoted scalar; JSON string escaping is valid YAML.
fn quote(value: &str) -> String {
  serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}
