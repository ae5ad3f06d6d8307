//! Markdown conversion for Confluence storage format.
//!
//! Storage format is a namespaced XHTML dialect. Conversion runs in stages:
//! CDATA sections are protected, the markup is made XML-safe and parsed with
//! `roxmltree`, the tree is rendered with Confluence elements routed through
//! a [`MacroDispatcher`], and the Markdown is normalized by
//! [`postprocess_markdown`].
//!
//! # Architecture
//!
//! - [`extract`] - regex extraction from raw macro markup
//! - [`html_entities`] - HTML entity handling around the XML parser
//! - [`dispatch`] - Confluence element classification and routing
//! - [`macros`] - structured macro handlers
//! - [`recover`] - repair of malformed markup
//! - [`tables`] - table flattening
//! - [`elements`] - generic HTML element rendering
//! - [`utils`] - XML helpers
//!
//! # Example
//!
//! ```
//! use confluence_md::markdown::{ConvertOptions, Converter};
//!
//! let converter = Converter::new(ConvertOptions::default());
//! let markdown = converter.convert_html("<h1>Title</h1><p><strong>Bold text</strong></p>");
//! assert_eq!(markdown, "# Title\n\n**Bold text**");
//! ```

use std::sync::LazyLock;
use std::time::Instant;

use regex::Regex;
use roxmltree::Document;
use tracing::{debug, error, trace, warn};

use crate::attachments::AttachmentResolver;
use crate::confluence::Page;
use crate::confluence::url::attachment_download_url;
use crate::document::{ImageRef, MarkdownDocument};

pub mod dispatch;
pub mod elements;
pub mod extract;
pub mod html_entities;
pub mod macros;
mod postprocess;
pub mod recover;
pub mod tables;
pub mod utils;

pub use dispatch::{AdmonitionKind, ConfluenceElement, MacroDispatcher, MacroKind, MacroOutcome};
pub use postprocess::postprocess_markdown;

static CDATA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<!\[CDATA\[([\s\S]*?)\]\]>").expect("valid regex"));

static VOID_TAG_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"<(br|hr|img|col)\b([^>]*?)\s*/?>").expect("valid regex"));

static VOID_CLOSE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"</(?:br|hr|img|col)\s*>").expect("valid regex"));

/// Options that control Markdown conversion behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
  /// Folder, relative to the document, that image links point into.
  pub image_folder: String,
  /// Emit YAML frontmatter when serializing documents.
  pub include_frontmatter: bool,
}

impl Default for ConvertOptions {
  fn default() -> Self {
    Self {
      image_folder: "assets".to_string(),
      include_frontmatter: true,
    }
  }
}

/// Converts storage-format HTML and whole pages to Markdown.
///
/// A converter carries the page being converted for diagram macros, so use
/// one instance per in-flight conversion.
pub struct Converter<'r> {
  options: ConvertOptions,
  dispatcher: MacroDispatcher<'r>,
}

impl<'r> Converter<'r> {
  pub fn new(options: ConvertOptions) -> Self {
    let dispatcher = MacroDispatcher::new(options.image_folder.clone());
    Self { options, dispatcher }
  }

  /// Install the resolver that diagram macros fetch attachments through.
  pub fn with_resolver(mut self, resolver: Box<dyn AttachmentResolver + 'r>) -> Self {
    self.dispatcher = self.dispatcher.with_resolver(resolver);
    self
  }

  pub fn options(&self) -> &ConvertOptions {
    &self.options
  }

  /// Convert a storage-format fragment to Markdown.
  ///
  /// Malformed markup never aborts the conversion. Unbalanced tags are
  /// repaired, and if the fragment still does not parse each top-level
  /// element is rendered on its own so the readable parts survive. Elements
  /// that cannot be parsed at all contribute their plain text.
  pub fn convert_html(&self, html: &str) -> String {
    let preprocessed = preprocess_cdata(html);
    let preprocessed = html_entities::preprocess_html_entities(&preprocessed);
    let preprocessed = VOID_TAG_RE.replace_all(&preprocessed, "<$1$2/>");
    let preprocessed = VOID_CLOSE_RE.replace_all(&preprocessed, "");

    let markdown = match self.render_markup(&preprocessed) {
      Ok(markdown) => markdown,
      Err(err) => {
        warn!("XML parse error, recovering what can be rendered: {err}");
        self.render_recovered(&preprocessed)
      }
    };

    postprocess_markdown(&markdown)
  }

  fn render_markup(&self, markup: &str) -> Result<String, roxmltree::Error> {
    let wrapped = utils::wrap_with_namespaces(markup);

    trace!(
      "Wrapped XML (first 500 chars):\n{}",
      wrapped.chars().take(500).collect::<String>()
    );

    let parse_start = Instant::now();
    let document = Document::parse(&wrapped)?;
    debug!(
      "Parsed Confluence storage document in {duration:?} (length: {length} chars)",
      duration = parse_start.elapsed(),
      length = wrapped.len()
    );

    Ok(elements::convert_children(document.root_element(), &self.dispatcher))
  }

  fn render_recovered(&self, markup: &str) -> String {
    let balanced = recover::balance_tags(markup);
    if let Ok(markdown) = self.render_markup(&balanced) {
      debug!("Parsed storage document after balancing tags");
      return markdown;
    }

    recover::top_level_fragments(&balanced)
      .into_iter()
      .map(|fragment| match self.render_markup(fragment) {
        Ok(markdown) => markdown,
        Err(err) => {
          error!("Unparsable fragment rendered as plain text: {err}");
          trace!("Fragment:\n{fragment}");
          format!("\n\n{}\n\n", recover::strip_tags(fragment))
        }
      })
      .collect()
  }

  /// Convert a page into a [`MarkdownDocument`].
  ///
  /// The page is the dispatcher's current page while its body renders, so
  /// diagram macros can resolve its attachments. Image references are collected from the raw
  /// body for a downloader to fetch later.
  ///
  /// # Errors
  /// Fails before rendering when the page does not validate or the page URL
  /// cannot be built from `base_url`.
  pub fn convert_page(&mut self, page: &Page, base_url: &str) -> crate::error::Result<MarkdownDocument> {
    page.validate()?;

    self.dispatcher.set_current_page(page.clone());
    let document = MarkdownDocument::from_page(page, base_url)?;

    let start = Instant::now();
    let content = self.convert_html(&page.body);
    self.dispatcher.clear_current_page();
    let images = extract_image_references(&page.body, &page.id, base_url, &self.options.image_folder);
    debug!(
      "Converted page {} ({} images) in {:?}",
      page.id,
      images.len(),
      start.elapsed()
    );

    Ok(document.with_content(content, images))
  }
}

/// Rewrites each CDATA section as an escaped `<pre data-cdata='true'>` block.
///
/// The escaping keeps the section's text intact through parsing; the code
/// macro reads it back from the placeholder.
pub fn preprocess_cdata(html: &str) -> String {
  CDATA_RE
    .replace_all(html, |caps: &regex::Captures| {
      let content = caps[1].replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;");
      format!("<pre data-cdata='true'>{content}</pre>")
    })
    .into_owned()
}

/// Image attachments referenced by `html`, in document order.
///
/// Images without a resolvable filename are skipped. Repeated references
/// produce repeated entries.
pub fn extract_image_references(html: &str, page_id: &str, base_url: &str, image_folder: &str) -> Vec<ImageRef> {
  extract::image_elements(html)
    .map(extract::filename_from_image_markup)
    .filter(|filename| !filename.is_empty())
    .map(|filename| ImageRef {
      original_url: attachment_download_url(base_url, page_id, &filename),
      local_path: format!("{image_folder}/{filename}"),
      filename,
      content_type: None,
      size: None,
    })
    .collect()
}
