//! Collaborator traits for reaching a Confluence site.
//!
//! Conversion itself never performs I/O. Callers plug a transport in through
//! these traits; the test suite uses in-memory fakes.

use anyhow::{Context, Result};

use super::models::{Attachment, Page};
use super::url::normalize_download_link;

/// Read access to pages.
pub trait PageFetcher {
  /// Fetch a page by ID.
  ///
  /// # Arguments
  /// * `page_id` - Unique Confluence identifier for the page to retrieve.
  ///
  /// # Returns
  /// The full `Page` record including body, labels and attachments.
  ///
  /// # Errors
  /// Transport failures and non-success responses. Implementations should
  /// surface the `message` field of the remote error body when one is sent.
  fn get_page(&self, page_id: &str) -> Result<Page>;

  /// Get direct child pages for a given page ID.
  ///
  /// # Arguments
  /// * `page_id` - Identifier of the parent page whose children should be
  ///   listed.
  fn get_child_pages(&self, page_id: &str) -> Result<Vec<Page>>;
}

/// Byte-level access to attachment and image downloads.
pub trait AttachmentDownloader {
  /// Site root used to absolutize relative download links.
  fn base_url(&self) -> &str;

  /// Fetch the body of an absolute URL.
  fn fetch(&self, url: &str) -> Result<Vec<u8>>;

  /// Download an attachment's content.
  ///
  /// The attachment's download link may be relative to the site root or miss
  /// the `/wiki` context path; it is normalized before fetching.
  fn download_bytes(&self, attachment: &Attachment) -> Result<Vec<u8>> {
    let url = normalize_download_link(self.base_url(), &attachment.download_link)?;
    self
      .fetch(&url)
      .with_context(|| format!("failed to download attachment {}", attachment.title))
  }
}

impl<T: AttachmentDownloader + ?Sized> AttachmentDownloader for &T {
  fn base_url(&self) -> &str {
    (**self).base_url()
  }

  fn fetch(&self, url: &str) -> Result<Vec<u8>> {
    (**self).fetch(url)
  }

  fn download_bytes(&self, attachment: &Attachment) -> Result<Vec<u8>> {
    (**self).download_bytes(attachment)
  }
}

/// Error payload sent by the REST API alongside non-success statuses.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
  #[serde(rename = "statusCode")]
  pub status_code: u16,
  pub message: String,
  pub reason: String,
}

/// Turn a failed response into an error, preferring the remote `message`.
///
/// Transports call this so every fetcher reports failures the same way.
pub fn error_from_response(operation: &str, status: u16, body: &str) -> anyhow::Error {
  match serde_json::from_str::<ApiErrorBody>(body) {
    Ok(parsed) if !parsed.message.is_empty() => anyhow::anyhow!("failed to {operation}: {}", parsed.message),
    _ => anyhow::anyhow!("failed to {operation}: HTTP {status} - {body}"),
  }
}
