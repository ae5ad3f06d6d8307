use roxmltree::Node;

use super::nested_content;
use crate::markdown::dispatch::AdmonitionKind;

/// Converts an admonition macro (info, warning, note, tip) into a Markdown
/// blockquote headed by its emoji and label.
pub(crate) fn render(element: Node, kind: AdmonitionKind, render_node: &dyn Fn(Node) -> String) -> String {
  let content = nested_content(element, render_node);
  render_admonition_block(kind, &content)
}

/// Formats the blockquote for an admonition.
///
/// Single-line content shares the heading line; multi-line content starts on
/// the line after it, with blank lines kept as bare `>` markers.
pub(crate) fn render_admonition_block(kind: AdmonitionKind, content: &str) -> String {
  let prefix = format!("{} **{}:**", kind.emoji(), kind.label());

  if content.is_empty() {
    return format!("> {prefix}");
  }

  if !content.contains('\n') {
    return format!("> {prefix} {content}");
  }

  let mut result = format!("> {prefix}\n");
  for line in content.split('\n') {
    if line.trim().is_empty() {
      result.push_str(">\n");
    } else {
      result.push_str(&format!("> {line}\n"));
    }
  }

  result.trim_end_matches('\n').to_string()
}
