use roxmltree::Node;

use super::nested_content;

/// Renders `expand` and `details` macros by keeping only their body.
///
/// Markdown has no collapsible container, so the content is inlined and
/// followed by a blank line. An empty body renders as nothing.
pub(crate) fn render(element: Node, render_node: &dyn Fn(Node) -> String) -> String {
  let content = nested_content(element, render_node);
  if content.is_empty() {
    return String::new();
  }
  format!("{content}\n\n")
}

#[cfg(test)]
mod tests {
  use roxmltree::Document;

  use super::*;
  use crate::markdown::utils::{get_element_text, matches_tag, wrap_with_namespaces};

  fn render_first(input: &str) -> String {
    let wrapped = wrap_with_namespaces(input);
    let document = Document::parse(&wrapped).unwrap();
    let node = document
      .descendants()
      .find(|node| matches_tag(*node, "ac:structured-macro"))
      .unwrap();
    render(node, &get_element_text)
  }

  #[test]
  fn test_expand_keeps_body() {
    let input = r#"<ac:structured-macro ac:name="expand"><ac:parameter ac:name="title">More</ac:parameter><ac:rich-text-body><p>Hidden detail</p></ac:rich-text-body></ac:structured-macro>"#;
    assert_eq!(render_first(input), "Hidden detail\n\n");
  }

  #[test]
  fn test_empty_expand() {
    let input = r#"<ac:structured-macro ac:name="details"><ac:rich-text-body><p/></ac:rich-text-body></ac:structured-macro>"#;
    assert_eq!(render_first(input), "");
  }
}
