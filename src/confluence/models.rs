//! Page and attachment models plus the REST payloads they are read from.
//!
//! The `Api*` structs mirror the JSON returned by the content endpoint with
//! `expand=body.storage,version,space,history,metadata.labels,children.attachment`.
//! Everything downstream works with the flattened [`Page`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ValidationError;

/// A Confluence page ready for conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
  /// Numeric identifier assigned by Confluence.
  pub id: String,
  pub title: String,
  /// Key of the space that owns the page.
  pub space_key: String,
  pub version: u32,
  /// Storage-format XHTML body.
  pub body: String,
  pub labels: Vec<Label>,
  pub attachments: Vec<Attachment>,
  pub created_by: User,
  pub updated_by: User,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

/// A file attached to a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
  pub id: String,
  /// Filename shown in Confluence, used for matching macro references.
  pub title: String,
  pub media_type: String,
  pub file_size: u64,
  pub version: u32,
  /// Download locator, possibly relative to the site root.
  pub download_link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub account_id: String,
  pub display_name: String,
  pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
  pub id: String,
  pub name: String,
}

impl Page {
  /// Checks the fields conversion depends on, failing on the first problem.
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.id.is_empty() {
      return Err(ValidationError::MissingPageId);
    }
    if self.title.is_empty() {
      return Err(ValidationError::MissingTitle);
    }
    if self.body.is_empty() {
      return Err(ValidationError::MissingContent);
    }
    if self.space_key.is_empty() {
      return Err(ValidationError::MissingSpaceKey);
    }

    for attachment in &self.attachments {
      attachment
        .validate()
        .map_err(|err| ValidationError::InvalidAttachment(Box::new(err)))?;
    }

    Ok(())
  }

  /// Label names in page order.
  pub fn label_names(&self) -> Vec<String> {
    self.labels.iter().map(|label| label.name.clone()).collect()
  }
}

impl Attachment {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.id.is_empty() {
      return Err(ValidationError::MissingAttachmentId);
    }
    if self.title.is_empty() {
      return Err(ValidationError::MissingAttachmentTitle);
    }
    if self.media_type.is_empty() {
      return Err(ValidationError::MissingMediaType);
    }
    if self.file_size == 0 {
      return Err(ValidationError::EmptyAttachment);
    }
    if self.download_link.is_empty() {
      return Err(ValidationError::MissingDownloadLink);
    }

    match Url::parse(&self.download_link) {
      Ok(_) => Ok(()),
      Err(url::ParseError::RelativeUrlWithoutBase) if !self.download_link.starts_with(':') => Ok(()),
      Err(_) => Err(ValidationError::InvalidDownloadLink(self.download_link.clone())),
    }
  }
}

/// Content response from `GET /wiki/rest/api/content/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiPage {
  pub id: String,
  #[serde(rename = "type")]
  pub content_type: String,
  pub status: String,
  pub title: String,
  pub body: ApiBody,
  pub version: ApiVersion,
  pub space: ApiSpace,
  pub history: ApiHistory,
  pub metadata: ApiMetadata,
  pub children: ApiChildren,
  #[serde(rename = "_links")]
  pub links: ApiLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiBody {
  pub storage: ApiStorage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiStorage {
  pub value: String,
  pub representation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiVersion {
  pub number: u32,
  pub when: Option<DateTime<Utc>>,
  pub by: ApiUser,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiUser {
  #[serde(rename = "accountId")]
  pub account_id: String,
  #[serde(rename = "displayName")]
  pub display_name: String,
  pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSpace {
  pub key: String,
  pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiHistory {
  #[serde(rename = "createdDate")]
  pub created_date: Option<DateTime<Utc>>,
  #[serde(rename = "createdBy")]
  pub created_by: ApiUser,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiMetadata {
  pub labels: ApiResults<ApiLabel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiLabel {
  pub id: String,
  pub name: String,
  pub prefix: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiChildren {
  pub attachment: ApiResults<ApiAttachment>,
  pub page: ApiResults<ApiPage>,
}

/// Generic `{ "results": [...] }` wrapper used throughout the REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiResults<T> {
  pub results: Vec<T>,
}

impl<T> Default for ApiResults<T> {
  fn default() -> Self {
    Self { results: Vec::new() }
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiAttachment {
  pub id: String,
  pub title: String,
  pub version: ApiVersion,
  pub extensions: ApiAttachmentExtensions,
  #[serde(rename = "_links")]
  pub links: ApiLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiAttachmentExtensions {
  #[serde(rename = "mediaType")]
  pub media_type: String,
  #[serde(rename = "fileSize")]
  pub file_size: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiLinks {
  /// Site root, e.g. `https://example.atlassian.net/wiki`.
  pub base: Option<String>,
  pub webui: Option<String>,
  pub download: Option<String>,
}

impl From<ApiUser> for User {
  fn from(user: ApiUser) -> Self {
    Self {
      account_id: user.account_id,
      display_name: user.display_name,
      email: user.email,
    }
  }
}

impl From<ApiAttachment> for Attachment {
  fn from(attachment: ApiAttachment) -> Self {
    Self {
      id: attachment.id,
      title: attachment.title,
      media_type: attachment.extensions.media_type,
      file_size: attachment.extensions.file_size,
      version: attachment.version.number,
      download_link: attachment.links.download.unwrap_or_default(),
    }
  }
}

impl From<ApiPage> for Page {
  fn from(page: ApiPage) -> Self {
    Self {
      id: page.id,
      title: page.title,
      space_key: page.space.key,
      version: page.version.number,
      body: page.body.storage.value,
      labels: page
        .metadata
        .labels
        .results
        .into_iter()
        .map(|label| Label {
          id: label.id,
          name: label.name,
        })
        .collect(),
      attachments: page
        .children
        .attachment
        .results
        .into_iter()
        .map(Attachment::from)
        .collect(),
      created_by: page.history.created_by.into(),
      updated_by: page.version.by.into(),
      created_at: page.history.created_date,
      updated_at: page.version.when,
    }
  }
}
