//! Fake Confluence client for testing
//!
//! Serves pages, child listings and attachment bodies from memory so the
//! collaborator traits can be exercised without a network.

use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::{Result, anyhow};
use confluence_md::confluence::api::error_from_response;
use confluence_md::confluence::{ApiPage, AttachmentDownloader, Page, PageFetcher};

use crate::common::fixtures;

pub const BASE_URL: &str = "https://example.atlassian.net";

/// A fake Confluence client that returns predefined responses for testing
pub struct FakeConfluenceClient {
  pages: HashMap<String, Page>,
  child_pages: HashMap<String, Vec<String>>,
  files: HashMap<String, Vec<u8>>,
  requested: RefCell<Vec<String>>,
}

impl FakeConfluenceClient {
  /// Create a new fake client with no pages
  pub fn new() -> Self {
    Self {
      pages: HashMap::new(),
      child_pages: HashMap::new(),
      files: HashMap::new(),
      requested: RefCell::new(Vec::new()),
    }
  }

  /// Create a fake client with the fixture pages and their attachment bodies
  pub fn with_sample_pages() -> Self {
    let mut client = Self::new();

    client.add_page_from_json(fixtures::sample_page_response());
    client.add_page_from_json(fixtures::sample_complex_page_response());
    client.add_page_from_json(fixtures::sample_page_with_links_response());
    client.add_page_from_json(fixtures::sample_page_with_images_response());
    client.add_page_from_json(fixtures::sample_page_with_diagram_response());

    client.add_child_pages("123456", &["789012", "345678"]);
    client.add_child_pages("345678", &["456789"]);

    client.add_file(
      "https://example.atlassian.net/wiki/download/attachments/456789/architecture.png",
      b"png-bytes".to_vec(),
    );
    client.add_file(
      "https://example.atlassian.net/wiki/download/attachments/567890/checkout-flow.mmd?version=2",
      b"sequenceDiagram\n  Shopper->>Cart: checkout".to_vec(),
    );
    client.add_file(
      "https://example.atlassian.net/wiki/download/attachments/567890/checkout-flow.svg",
      b"<svg/>".to_vec(),
    );

    client
  }

  /// Add a page from a REST content response
  pub fn add_page_from_json(&mut self, json: serde_json::Value) {
    if let Ok(api_page) = serde_json::from_value::<ApiPage>(json) {
      let page = Page::from(api_page);
      self.pages.insert(page.id.clone(), page);
    }
  }

  pub fn add_page(&mut self, page: Page) {
    self.pages.insert(page.id.clone(), page);
  }

  /// Add child pages for a parent page
  pub fn add_child_pages(&mut self, parent_id: &str, child_ids: &[&str]) {
    self
      .child_pages
      .insert(parent_id.to_string(), child_ids.iter().map(|id| id.to_string()).collect());
  }

  /// Serve `bytes` for an absolute download URL
  pub fn add_file(&mut self, url: &str, bytes: Vec<u8>) {
    self.files.insert(url.to_string(), bytes);
  }

  /// URLs fetched so far, in order
  pub fn requested_urls(&self) -> Vec<String> {
    self.requested.borrow().clone()
  }
}

impl Default for FakeConfluenceClient {
  fn default() -> Self {
    Self::new()
  }
}

impl PageFetcher for FakeConfluenceClient {
  fn get_page(&self, page_id: &str) -> Result<Page> {
    self.pages.get(page_id).cloned().ok_or_else(|| {
      error_from_response(
        "get page",
        404,
        &fixtures::sample_not_found_error_response(page_id).to_string(),
      )
    })
  }

  fn get_child_pages(&self, page_id: &str) -> Result<Vec<Page>> {
    let child_ids = self.child_pages.get(page_id).cloned().unwrap_or_default();
    let mut children = Vec::new();

    for child_id in child_ids {
      match self.pages.get(&child_id) {
        Some(page) => children.push(page.clone()),
        // Listings may mention pages the fetcher cannot load.
        None => children.push(Page {
          id: child_id,
          ..Default::default()
        }),
      }
    }

    Ok(children)
  }
}

impl AttachmentDownloader for FakeConfluenceClient {
  fn base_url(&self) -> &str {
    BASE_URL
  }

  fn fetch(&self, url: &str) -> Result<Vec<u8>> {
    self.requested.borrow_mut().push(url.to_string());
    self
      .files
      .get(url)
      .cloned()
      .ok_or_else(|| anyhow!("failed to fetch {url}: HTTP 404"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fake_client_empty() {
    let client = FakeConfluenceClient::new();
    assert!(client.get_page("123456").is_err());
  }

  #[test]
  fn test_fake_client_with_samples() {
    let client = FakeConfluenceClient::with_sample_pages();

    let page = client.get_page("123456").unwrap();
    assert_eq!(page.id, "123456");
    assert_eq!(page.title, "Getting Started Guide");

    assert!(client.get_page("999999").is_err());
  }

  #[test]
  fn test_fake_client_serves_files() {
    let client = FakeConfluenceClient::with_sample_pages();
    let url = "https://example.atlassian.net/wiki/download/attachments/567890/checkout-flow.svg";

    assert_eq!(client.fetch(url).unwrap(), b"<svg/>");
    assert!(client.fetch("https://example.atlassian.net/missing").is_err());
    assert_eq!(client.requested_urls().len(), 2);
  }
}
