//! Utility functions for XML/HTML parsing and manipulation.
//!
//! Provides helper functions for working with roxmltree nodes, including
//! namespace handling, attribute access, and text extraction.

use std::collections::BTreeSet;

use roxmltree::Node;

/// Synthetic namespace base URL for Confluence namespaces.
pub const SYNTHETIC_NS_BASE: &str = "https://confluence.example/";

/// Tag of the element that wraps every parsed fragment.
pub const ROOT_TAG: &str = "cdl-root";

/// Collects all text content from an element and its descendants.
///
/// Recursively walks the node tree so that nested inline markup is flattened
/// into a single string.
pub fn get_element_text(node: Node) -> String {
  let mut text = String::new();

  for child in node.children() {
    match child.node_type() {
      roxmltree::NodeType::Text => {
        if let Some(value) = child.text() {
          text.push_str(value);
        }
      }
      roxmltree::NodeType::Element => {
        text.push_str(&get_element_text(child));
      }
      _ => {}
    }
  }

  text
}

/// The literal markup of a node as it appeared in the parsed input.
pub fn raw_markup<'input>(node: Node<'_, 'input>) -> &'input str {
  let input = node.document().input_text();
  input.get(node.range()).unwrap_or_default()
}

/// Splits a qualified tag name into its namespace prefix and local name.
///
/// Names without a colon return `None` for the prefix.
pub fn split_qualified_name(name: &str) -> (Option<&str>, &str) {
  if let Some((prefix, local)) = name.split_once(':') {
    (Some(prefix), local)
  } else {
    (None, name)
  }
}

/// Wraps storage format markup with synthetic namespace declarations.
///
/// Confluence storage format frequently references namespaces such as `ac:`
/// or `ri:` without declaring them. The wrapper element allows `roxmltree`
/// to resolve those prefixes during parsing.
///
/// # Arguments
/// * `storage_content` - Raw storage format XML/HTML snippet from Confluence.
///
/// # Returns
/// A `String` containing the original content nested inside a synthetic root
/// element with namespace declarations.
pub fn wrap_with_namespaces(storage_content: &str) -> String {
  let mut prefixes = BTreeSet::new();

  for segment in storage_content.split('<').skip(1) {
    let segment = match segment.find('>') {
      Some(idx) => &segment[..idx],
      None => segment,
    };
    let segment = segment.trim_start_matches('/');

    if let Some((prefix, _)) = segment.split_once(':')
      && is_valid_prefix(prefix)
    {
      prefixes.insert(prefix);
    }

    for attr in segment.split_whitespace() {
      if let Some((name, _)) = attr.split_once('=')
        && let Some((prefix, _)) = name.split_once(':')
        && is_valid_prefix(prefix)
      {
        prefixes.insert(prefix);
      }
    }
  }

  let mut result = format!("<{ROOT_TAG}");
  for prefix in prefixes {
    result.push_str(&format!(" xmlns:{prefix}=\"{SYNTHETIC_NS_BASE}{prefix}\""));
  }
  result.push('>');
  result.push_str(storage_content);
  result.push_str(&format!("</{ROOT_TAG}>"));
  result
}

/// A prefix we may declare: ASCII word characters, never the reserved
/// `xml`/`xmlns` prefixes.
fn is_valid_prefix(prefix: &str) -> bool {
  !prefix.is_empty()
    && !prefix.eq_ignore_ascii_case("xml")
    && !prefix.eq_ignore_ascii_case("xmlns")
    && prefix
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Builds the tag name of a node as written, e.g. `ac:structured-macro`.
pub fn qualified_tag_name(node: Node) -> String {
  let tag = node.tag_name();
  let name = tag.name();
  match tag
    .namespace()
    .and_then(|namespace| namespace.strip_prefix(SYNTHETIC_NS_BASE))
  {
    Some(prefix) => format!("{prefix}:{name}"),
    None => name.to_string(),
  }
}

/// Tests whether a node matches an expected tag name with optional namespace.
///
/// # Arguments
/// * `node` - The element to check.
/// * `name` - The expected tag name, optionally including a prefix such as
///   `ac:rich-text-body`.
pub fn matches_tag(node: Node, name: &str) -> bool {
  if !node.is_element() {
    return false;
  }

  let (expected_prefix, expected_name) = split_qualified_name(name);
  let tag = node.tag_name();
  if tag.name() != expected_name {
    return false;
  }

  namespace_matches(expected_prefix, tag.namespace())
}

/// True when the node matches any of the given tag names.
pub fn matches_any_tag(node: Node, names: &[&str]) -> bool {
  names.iter().any(|name| matches_tag(node, name))
}

/// Retrieves an attribute value from a node, handling namespaced attributes.
///
/// # Returns
/// `Some(String)` containing the attribute value when present, otherwise
/// `None`.
pub fn get_attribute(node: Node, attr_name: &str) -> Option<String> {
  if !node.is_element() {
    return None;
  }

  let (expected_prefix, expected_name) = split_qualified_name(attr_name);

  node
    .attributes()
    .find(|attr| attr.name() == expected_name && namespace_matches(expected_prefix, attr.namespace()))
    .map(|attr| attr.value().to_string())
}

/// Like [`get_attribute`], treating empty values as absent.
pub fn non_empty_attribute(node: Node, attr_name: &str) -> Option<String> {
  get_attribute(node, attr_name).filter(|value| !value.is_empty())
}

fn namespace_matches(expected_prefix: Option<&str>, actual: Option<&str>) -> bool {
  match (expected_prefix, actual) {
    (Some(prefix), Some(actual)) => actual.strip_prefix(SYNTHETIC_NS_BASE) == Some(prefix),
    (None, None) => true,
    (Some(_), None) | (None, Some(_)) => false,
  }
}

/// Finds the first child element with a given tag name.
///
/// This helper understands the synthetic namespaces injected by
/// [`wrap_with_namespaces`].
pub fn find_child_by_tag<'a, 'input>(node: Node<'a, 'input>, tag_name: &str) -> Option<Node<'a, 'input>> {
  node.children().find(|child| matches_tag(*child, tag_name))
}

/// Finds the first descendant element (excluding `node`) with a given tag.
pub fn find_descendant_by_tag<'a, 'input>(node: Node<'a, 'input>, tag_name: &str) -> Option<Node<'a, 'input>> {
  node
    .descendants()
    .skip(1)
    .find(|child| matches_tag(*child, tag_name))
}

/// Finds a child element that matches both a tag name and attribute value.
pub fn find_child_by_tag_and_attr<'a, 'input>(
  node: Node<'a, 'input>,
  tag_name: &str,
  attr_name: &str,
  attr_value: &str,
) -> Option<Node<'a, 'input>> {
  node
    .children()
    .find(|child| matches_tag(*child, tag_name) && get_attribute(*child, attr_name).as_deref() == Some(attr_value))
}

/// Trimmed text of the macro parameter `name`, if present and non-empty.
///
/// Only direct `ac:parameter` children are considered, so parameters of
/// nested macros are never picked up.
pub fn macro_parameter(node: Node, name: &str) -> Option<String> {
  find_child_by_tag_and_attr(node, "ac:parameter", "ac:name", name)
    .map(|param| get_element_text(param).trim().to_string())
    .filter(|value| !value.is_empty())
}

/// True when the element has any direct `ac:parameter` child.
pub fn has_macro_parameters(node: Node) -> bool {
  find_child_by_tag(node, "ac:parameter").is_some()
}

/// True when `node` or any descendant is a `<br>`.
pub fn contains_line_break(node: Node) -> bool {
  node.descendants().any(|child| matches_tag(child, "br"))
}
