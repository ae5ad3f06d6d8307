//! Error types shared by the conversion pipeline.
//!
//! Validation failures abort a page before rendering starts. Attachment
//! failures stay local to the macro that requested the attachment and are
//! rendered as inline comments by the dispatcher.

use thiserror::Error;

/// A page or attachment is missing a field required for conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("page ID cannot be empty")]
  MissingPageId,
  #[error("page title cannot be empty")]
  MissingTitle,
  #[error("page content cannot be empty")]
  MissingContent,
  #[error("space key cannot be empty")]
  MissingSpaceKey,
  #[error("invalid attachment: {0}")]
  InvalidAttachment(Box<ValidationError>),
  #[error("attachment ID cannot be empty")]
  MissingAttachmentId,
  #[error("attachment title cannot be empty")]
  MissingAttachmentTitle,
  #[error("attachment media type cannot be empty")]
  MissingMediaType,
  #[error("attachment file size must be greater than 0")]
  EmptyAttachment,
  #[error("attachment download link cannot be empty")]
  MissingDownloadLink,
  #[error("invalid download link: {0}")]
  InvalidDownloadLink(String),
}

/// Failure to produce attachment content for a macro.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachmentError {
  /// No attachment on the page matched the requested name and revision.
  #[error("attachment {0} not found")]
  NotFound(String),
  /// The attachment was selected but fetching its bytes failed.
  #[error("failed to download attachment {filename}: {reason}")]
  Download { filename: String, reason: String },
}

/// Errors that prevent a page from being converted at all.
#[derive(Debug, Error)]
pub enum ConvertError {
  #[error("invalid page: {0}")]
  Validation(#[from] ValidationError),
  #[error("failed to generate page URL from base {base}: {source}")]
  InvalidBaseUrl {
    base: String,
    #[source]
    source: url::ParseError,
  },
}

/// Result alias for whole-page conversion.
pub type Result<T> = std::result::Result<T, ConvertError>;
