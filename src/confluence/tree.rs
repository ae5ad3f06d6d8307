//! Utilities for traversing Confluence page hierarchies.

use std::collections::HashSet;

use anyhow::{Result, anyhow};
use tracing::warn;

use super::api::PageFetcher;
use super::models::Page;

/// Represents a page tree with hierarchical children.
#[derive(Debug, Clone)]
pub struct PageTree {
  /// Metadata and storage content for the page at this node.
  pub page: Page,
  /// Descendant pages nested under this node.
  pub children: Vec<PageTree>,
  /// Zero-based depth where `0` is the original root.
  pub depth: usize,
}

impl PageTree {
  /// Pages in depth-first order, root first.
  pub fn pages(&self) -> Vec<&Page> {
    let mut pages = vec![&self.page];
    for child in &self.children {
      pages.extend(child.pages());
    }
    pages
  }
}

/// Build a page tree recursively from a root page.
///
/// # Arguments
/// * `fetcher` - Source of page and child metadata.
/// * `page_id` - Identifier of the root page to use as the tree entry point.
/// * `max_depth` - Optional maximum depth; `None` fetches the entire hierarchy.
///
/// # Errors
/// Fails when the root page cannot be fetched. Children that fail or repeat
/// an already visited page are logged and skipped.
pub fn get_page_tree(fetcher: &dyn PageFetcher, page_id: &str, max_depth: Option<usize>) -> Result<PageTree> {
  walk(fetcher, page_id, 0, max_depth, &mut HashSet::new())
}

fn walk(
  fetcher: &dyn PageFetcher,
  page_id: &str,
  depth: usize,
  max_depth: Option<usize>,
  visited: &mut HashSet<String>,
) -> Result<PageTree> {
  if !visited.insert(page_id.to_string()) {
    return Err(anyhow!("Circular reference detected: page {page_id} already visited"));
  }

  let page = fetcher.get_page(page_id)?;

  let mut children = Vec::new();
  if max_depth.is_none_or(|max| depth < max) {
    for child in fetcher.get_child_pages(page_id)? {
      match walk(fetcher, &child.id, depth + 1, max_depth, visited) {
        Ok(tree) => children.push(tree),
        Err(err) => warn!("Skipping child page {}: {err:#}", child.id),
      }
    }
  }

  Ok(PageTree { page, children, depth })
}
