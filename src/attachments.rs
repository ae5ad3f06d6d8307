//! Attachment lookup for macros that embed attachment content.
//!
//! Diagram macros reference attachments by filename and an optional
//! revision. [`AttachmentService`] picks the best candidate from the page's
//! attachment list and fetches its bytes through an
//! [`AttachmentDownloader`].

use tracing::debug;

use crate::confluence::{Attachment, AttachmentDownloader, Page};
use crate::error::AttachmentError;

/// Resolves attachment content for a page being converted.
pub trait AttachmentResolver {
  /// Fetch the content of the attachment `filename` on `page`.
  ///
  /// `revision` of `None` or `Some(0)` accepts any version.
  ///
  /// # Errors
  /// [`AttachmentError::NotFound`] when nothing matches, and
  /// [`AttachmentError::Download`] when the transport fails.
  fn resolve(&self, page: &Page, filename: &str, revision: Option<u32>) -> Result<Vec<u8>, AttachmentError>;
}

/// [`AttachmentResolver`] backed by an attachment downloader.
pub struct AttachmentService<D> {
  downloader: D,
}

impl<D: AttachmentDownloader> AttachmentService<D> {
  pub fn new(downloader: D) -> Self {
    Self { downloader }
  }
}

impl<D: AttachmentDownloader> AttachmentResolver for AttachmentService<D> {
  fn resolve(&self, page: &Page, filename: &str, revision: Option<u32>) -> Result<Vec<u8>, AttachmentError> {
    let attachment = select_attachment(&page.attachments, filename, revision)
      .ok_or_else(|| AttachmentError::NotFound(filename.to_string()))?;

    debug!(
      "Resolved {filename} to attachment {} (version {})",
      attachment.title, attachment.version
    );

    self
      .downloader
      .download_bytes(attachment)
      .map_err(|err| AttachmentError::Download {
        filename: filename.to_string(),
        reason: format!("{err:#}"),
      })
  }
}

/// Pick the attachment that best matches a macro reference.
///
/// Candidates must match by name and, when a revision is requested and the
/// attachment carries a version, by version. The highest
/// [`preference_score`] wins, with the higher version breaking ties.
pub fn select_attachment<'a>(
  attachments: &'a [Attachment],
  filename: &str,
  revision: Option<u32>,
) -> Option<&'a Attachment> {
  let requested = revision.filter(|rev| *rev > 0);

  let mut best: Option<(&Attachment, i32)> = None;
  for attachment in attachments {
    if !matches_filename(&attachment.title, filename) {
      continue;
    }
    if let Some(rev) = requested
      && attachment.version > 0
      && attachment.version != rev
    {
      continue;
    }

    let score = preference_score(attachment);
    let better = match best {
      None => true,
      Some((current, current_score)) => {
        score > current_score || (score == current_score && attachment.version > current.version)
      }
    };
    if better {
      best = Some((attachment, score));
    }
  }

  best.map(|(attachment, _)| attachment)
}

/// Case-insensitive title match; extensionless requests also match the
/// title with its extension removed.
fn matches_filename(title: &str, filename: &str) -> bool {
  if title.is_empty() || filename.is_empty() {
    return false;
  }

  let wanted = filename.to_lowercase();
  if title.to_lowercase() == wanted {
    return true;
  }

  if !filename.contains('.') {
    let (stem, _) = split_name_and_extension(title);
    return stem.to_lowercase() == wanted;
  }

  false
}

/// Text and diagram sources rank above rendered images.
pub fn preference_score(attachment: &Attachment) -> i32 {
  let mut score = 0;

  let media_type = attachment.media_type.to_lowercase();
  if media_type.contains("text") || media_type.contains("json") {
    score += 100;
  }
  if media_type.starts_with("image/") {
    score -= 100;
  }

  let (_, extension) = split_name_and_extension(&attachment.title);
  match extension.to_lowercase().as_str() {
    "mmd" | "mermaid" | "txt" | "md" | "json" => score += 80,
    "png" | "jpg" | "jpeg" | "gif" | "svg" => score -= 50,
    _ => {}
  }

  score
}

fn split_name_and_extension(name: &str) -> (&str, &str) {
  name.rsplit_once('.').unwrap_or((name, ""))
}
