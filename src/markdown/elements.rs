//! Generic HTML element to Markdown rendering.
//!
//! Every element is first offered to the [`MacroDispatcher`]; standard HTML
//! (headings, paragraphs, lists, links, formatting, code blocks) and anything
//! the dispatcher declines is rendered here.

use roxmltree::{Node, NodeType};
use tracing::debug;

use super::dispatch::{ConfluenceElement, MacroDispatcher, MacroOutcome};
use super::macros::{convert_confluence_link_to_markdown, convert_task_list_to_markdown};
use super::tables::convert_table_to_markdown;
use super::utils::{get_attribute, get_element_text, matches_tag, qualified_tag_name};

fn looks_like_list_marker(line: &str) -> bool {
  let trimmed = line.trim_start();

  if trimmed.starts_with(['-', '*', '+']) {
    return trimmed.len() > 1 && trimmed.as_bytes()[1] == b' ';
  }

  let mut chars = trimmed.chars();
  let mut saw_digit = false;

  while let Some(ch) = chars.next() {
    if ch.is_ascii_digit() {
      saw_digit = true;
      continue;
    }

    if ch == '.' {
      return saw_digit && matches!(chars.next(), Some(' '));
    }

    break;
  }

  false
}

fn format_list_item(item: &str, prefix: &str) -> String {
  let mut formatted = String::new();
  let indentation = " ".repeat(prefix.chars().count());
  let mut wrote_first_line = false;

  for line in item.trim_end().lines() {
    if !wrote_first_line {
      if line.trim().is_empty() {
        continue;
      }

      let line_content = line.trim_start();

      if looks_like_list_marker(line_content) {
        formatted.push_str(prefix.trim_end());
        formatted.push('\n');
        formatted.push_str(&indentation);
      } else {
        formatted.push_str(prefix);
      }
      formatted.push_str(line_content);
      formatted.push('\n');

      wrote_first_line = true;
    } else if line.trim().is_empty() {
      formatted.push('\n');
    } else {
      formatted.push_str(&indentation);
      formatted.push_str(line);
      formatted.push('\n');
    }
  }

  if !wrote_first_line {
    formatted.push_str(prefix.trim_end());
    formatted.push('\n');
  }

  formatted
}

/// Renders the children of `node` and concatenates the results.
pub fn convert_children(node: Node, dispatcher: &MacroDispatcher) -> String {
  node.children().map(|child| render_node(child, dispatcher)).collect()
}

/// Renders a single node to Markdown.
///
/// Text is emitted as-is (the parser has already decoded entities), and
/// elements go through the dispatcher before the generic rules below.
pub fn render_node(node: Node, dispatcher: &MacroDispatcher) -> String {
  match node.node_type() {
    NodeType::Text => node.text().unwrap_or_default().to_string(),
    NodeType::Element => render_element(node, dispatcher),
    _ => String::new(),
  }
}

fn render_element(node: Node, dispatcher: &MacroDispatcher) -> String {
  let Some(element) = ConfluenceElement::classify(node) else {
    return render_html_element(node, dispatcher);
  };

  let text = match dispatcher.dispatch(&element, &|child| render_node(child, dispatcher)) {
    MacroOutcome::Handled(text) => text,
    MacroOutcome::Continue(text) => text + &convert_children(node, dispatcher),
    MacroOutcome::Unhandled => render_html_element(node, dispatcher),
  };

  if element.is_block() {
    format!("\n\n{text}\n\n")
  } else {
    text
  }
}

/// Default rendering for elements the dispatcher does not claim.
fn render_html_element(child: Node, dispatcher: &MacroDispatcher) -> String {
  let children = || convert_children(child, dispatcher);

  match child.tag_name().name() {
    "h1" => format!("\n# {}\n\n", children().trim()),
    "h2" => format!("\n## {}\n\n", children().trim()),
    "h3" => format!("\n### {}\n\n", children().trim()),
    "h4" => format!("\n#### {}\n\n", children().trim()),
    "h5" => format!("\n##### {}\n\n", children().trim()),
    "h6" => format!("\n###### {}\n\n", children().trim()),

    "p" => {
      let content = children();
      let trimmed = content.trim();
      if trimmed.is_empty() {
        String::new()
      } else {
        format!("{trimmed}\n\n")
      }
    }

    "strong" | "b" => format!("**{}**", children()),
    "em" | "i" | "u" => format!("_{}_", children()),
    "s" | "del" => format!("~~{}~~", children()),
    "code" => format!("`{}`", children()),

    "ul" => {
      let mut result = String::from("\n");
      for li in child.children().filter(|n| matches_tag(*n, "li")) {
        result.push_str(&format_list_item(&convert_children(li, dispatcher), "- "));
      }
      result.push('\n');
      result
    }
    "ol" => {
      let mut result = String::from("\n");
      for (index, li) in child.children().filter(|n| matches_tag(*n, "li")).enumerate() {
        let prefix = format!("{}. ", index + 1);
        result.push_str(&format_list_item(&convert_children(li, dispatcher), &prefix));
      }
      result.push('\n');
      result
    }

    "a" => {
      let href = get_attribute(child, "href").unwrap_or_default();
      format!("[{}]({href})", children().trim())
    }

    "br" => "\n".to_string(),
    "hr" => "\n---\n\n".to_string(),

    // CDATA placeholders only appear inside code macros, which read them directly.
    "pre" if get_attribute(child, "data-cdata").is_some() => String::new(),
    "pre" => format!("\n```\n{}\n```\n\n", get_element_text(child).trim()),

    "table" => convert_table_to_markdown(child),

    "link" if matches_tag(child, "ac:link") => convert_confluence_link_to_markdown(child),
    "task-list" if matches_tag(child, "ac:task-list") => convert_task_list_to_markdown(child),

    "url" if matches_tag(child, "ri:url") => String::new(),
    "parameter" if matches_tag(child, "ac:parameter") => String::new(),
    "plain-text-body" if matches_tag(child, "ac:plain-text-body") => String::new(),

    "time" => get_element_text(child),

    _ => {
      if !is_known_container(child) {
        debug!("Unknown tag: {}", qualified_tag_name(child));
      }
      children()
    }
  }
}

/// Containers whose content is rendered without markup of their own.
fn is_known_container(node: Node) -> bool {
  matches!(
    node.tag_name().name(),
    "div" | "span" | "section" | "li" | "tbody" | "thead" | "tfoot" | "tr" | "td" | "th" | "sup" | "sub"
  )
}
