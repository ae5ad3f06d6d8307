//! Image download for converted documents.
//!
//! The converter only records which images a document links to. This module
//! fetches each entry of the manifest, stores it next to the Markdown file and
//! completes the manifest with content type and size.

use std::path::{Component, Path};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::confluence::AttachmentDownloader;
use crate::document::MarkdownDocument;

/// Download every image in the document's manifest.
///
/// Each image is fetched from its `original_url` and written to
/// `output_dir/local_path`. Local paths that would escape `output_dir` are
/// rejected.
///
/// Returns the number of images written.
pub fn download_images(
  doc: &mut MarkdownDocument,
  downloader: &dyn AttachmentDownloader,
  output_dir: &Path,
) -> Result<usize> {
  let mut written = 0;

  for image in doc.images_mut() {
    let relative = Path::new(&image.local_path);
    if relative
      .components()
      .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir))
    {
      bail!("Refusing to write image outside the output directory: {}", image.local_path);
    }
    let target = output_dir.join(relative);

    if let Some(parent) = target.parent() {
      std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create image directory {}", parent.display()))?;
    }

    let bytes = downloader
      .fetch(&image.original_url)
      .with_context(|| format!("Failed to download image: {}", image.filename))?;

    std::fs::write(&target, &bytes).with_context(|| format!("Failed to write image {}", target.display()))?;

    debug!("Saved {} ({} bytes) to {}", image.filename, bytes.len(), target.display());
    image.content_type = Some(content_type_for(&image.filename).to_string());
    image.size = Some(bytes.len() as u64);
    written += 1;
  }

  if written > 0 {
    info!("Downloaded {written} image(s) into {}", output_dir.display());
  }

  Ok(written)
}

/// MIME type guessed from a file extension.
pub fn content_type_for(filename: &str) -> &'static str {
  let extension = filename
    .rsplit_once('.')
    .map(|(_, ext)| ext.to_ascii_lowercase())
    .unwrap_or_default();

  match extension.as_str() {
    "png" => "image/png",
    "jpg" | "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "svg" => "image/svg+xml",
    "webp" => "image/webp",
    "bmp" => "image/bmp",
    "ico" => "image/x-icon",
    "tif" | "tiff" => "image/tiff",
    _ => "application/octet-stream",
  }
}
