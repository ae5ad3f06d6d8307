//! Confluence macro conversion to Markdown.
//!
//! Handles structured macros (admonitions, code, diagrams, expand blocks,
//! status badges) along with task lists and page links that the generic
//! renderer falls back to.

use roxmltree::Node;
use tracing::debug;

use crate::markdown::utils::{
  find_child_by_tag, find_descendant_by_tag, get_attribute, get_element_text, matches_tag,
};

pub(crate) mod admonitions;
pub(crate) mod basic;
pub(crate) mod code;
pub(crate) mod expand;

/// Renders the `ac:rich-text-body` of a macro.
///
/// Direct children of the body are rendered one by one: text is trimmed,
/// paragraphs without children are dropped, and every other element goes
/// through `render`. The pieces are concatenated and the result trimmed.
pub(crate) fn nested_content(element: Node, render: &dyn Fn(Node) -> String) -> String {
  let Some(body) = find_descendant_by_tag(element, "ac:rich-text-body") else {
    return String::new();
  };

  let mut content = String::new();
  for child in body.children() {
    if child.is_text() {
      let text = child.text().unwrap_or_default().trim();
      if !text.is_empty() {
        content.push_str(text);
      }
    } else if child.is_element() {
      if matches_tag(child, "p") && !child.has_children() {
        continue;
      }
      content.push_str(&render(child));
    }
  }

  content.trim().to_string()
}

/// Converts Confluence task list macros to Markdown checkboxes.
///
/// # Arguments
/// * `element` - The `<ac:task-list>` node to convert.
///
/// # Returns
/// Markdown representing each task as a checkbox list item.
pub fn convert_task_list_to_markdown(element: Node) -> String {
  let mut result = String::new();

  for task in element.children().filter(|child| matches_tag(*child, "ac:task")) {
    let status = find_child_by_tag(task, "ac:task-status")
      .map(get_element_text)
      .unwrap_or_else(|| "incomplete".to_string());

    let body = find_child_by_tag(task, "ac:task-body")
      .map(get_element_text)
      .unwrap_or_default();

    let checkbox = if status.trim() == "complete" { "[x]" } else { "[ ]" };
    result.push_str(&format!("- {} {}\n", checkbox, body.trim()));
  }

  result.push('\n');
  result
}

/// Converts Confluence links that are not user mentions to Markdown.
///
/// Page links become wiki-style `[[Title]]` references, attachment links point
/// at the attachment filename, and anything else keeps its text.
pub fn convert_confluence_link_to_markdown(element: Node) -> String {
  if let Some(page_node) = find_child_by_tag(element, "ri:page") {
    let title = get_attribute(page_node, "ri:content-title").unwrap_or_default();
    debug!("Page link: title={title}");
    return format!("[[{title}]]");
  }

  if let Some(attachment_node) = find_child_by_tag(element, "ri:attachment") {
    let filename = get_attribute(attachment_node, "ri:filename").unwrap_or_default();

    if !filename.is_empty() {
      let link_text = find_child_by_tag(element, "ac:plain-text-link-body")
        .map(get_element_text)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| filename.clone());

      return format!("[{}]({filename})", link_text.trim());
    }
  }

  let text = get_element_text(element);
  if let Some(href) = get_attribute(element, "href") {
    return format!("[{text}]({href})");
  }

  text
}

#[cfg(test)]
mod tests {
  use roxmltree::Document;

  use super::*;
  use crate::markdown::utils::wrap_with_namespaces;

  // Simple converter for tests that doesn't do recursion
  fn simple_convert_node(node: Node) -> String {
    get_element_text(node)
  }

  fn with_first<R>(input: &str, tag: &str, f: impl FnOnce(Node) -> R) -> R {
    let wrapped = wrap_with_namespaces(input);
    let document = Document::parse(&wrapped).unwrap();
    let node = document.descendants().find(|node| matches_tag(*node, tag)).unwrap();
    f(node)
  }

  #[test]
  fn test_nested_content_skips_empty_paragraphs() {
    let input = r#"
      <ac:structured-macro ac:name="expand">
        <ac:rich-text-body>
          <p/>
          <p>First</p>
          loose text
          <p>Second</p>
        </ac:rich-text-body>
      </ac:structured-macro>
    "#;

    let output = with_first(input, "ac:structured-macro", |node| nested_content(node, &simple_convert_node));
    assert_eq!(output, "Firstloose textSecond");
  }

  #[test]
  fn test_nested_content_without_body() {
    let output = with_first(r#"<ac:structured-macro ac:name="info"/>"#, "ac:structured-macro", |node| {
      nested_content(node, &simple_convert_node)
    });
    assert_eq!(output, "");
  }

  #[test]
  fn test_convert_task_list() {
    let input = r#"
      <ac:task-list>
        <ac:task><ac:task-id>1</ac:task-id><ac:task-status>complete</ac:task-status><ac:task-body>Ship it</ac:task-body></ac:task>
        <ac:task><ac:task-id>2</ac:task-id><ac:task-status>incomplete</ac:task-status><ac:task-body>Write docs</ac:task-body></ac:task>
      </ac:task-list>
    "#;

    let output = with_first(input, "ac:task-list", convert_task_list_to_markdown);
    assert_eq!(output, "- [x] Ship it\n- [ ] Write docs\n\n");
  }

  #[test]
  fn test_convert_page_link() {
    let input = r#"<ac:link><ri:page ri:content-title="Release Notes"/></ac:link>"#;
    let output = with_first(input, "ac:link", convert_confluence_link_to_markdown);
    assert_eq!(output, "[[Release Notes]]");
  }

  #[test]
  fn test_convert_attachment_link() {
    let input = r#"<ac:link><ri:attachment ri:filename="report.pdf"/><ac:plain-text-link-body><![CDATA[Q3 report]]></ac:plain-text-link-body></ac:link>"#;
    let output = with_first(input, "ac:link", convert_confluence_link_to_markdown);
    assert_eq!(output, "[Q3 report](report.pdf)");
  }
}
