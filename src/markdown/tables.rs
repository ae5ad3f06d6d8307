//! HTML table to Markdown table conversion.
//!
//! Confluence tables become pipe tables with one line per row. Cells holding
//! lists, several paragraphs, or line breaks are flattened onto a single line
//! with inline HTML so the row survives. Tables the Confluence path cannot
//! take fall back to [`convert_table_to_markdown`].

use roxmltree::Node;
use tracing::trace;

use super::dispatch::{ConfluenceElement, MacroDispatcher, MacroOutcome};
use super::utils::{contains_line_break, find_child_by_tag, get_element_text, matches_any_tag, matches_tag, raw_markup};

const SECTION_TAGS: &[&str] = &["thead", "tbody", "tfoot"];
const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const BLOCK_TAGS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6"];
const ALWAYS_COMPLEX_TAGS: &[&str] = &["ul", "ol", "div", "blockquote", "pre", "table"];
const PRESERVED_INLINE_TAGS: &[&str] = &["strong", "b", "em", "i", "code", "a"];

/// Convert a Confluence table into a Markdown pipe table.
///
/// Returns `None` when the table has no `tbody` or yields no rows, leaving
/// the element to the generic renderer.
pub(crate) fn convert_confluence_table(
  table: Node,
  dispatcher: &MacroDispatcher,
  render: &dyn Fn(Node) -> String,
) -> Option<String> {
  find_child_by_tag(table, "tbody")?;

  let mut rows: Vec<Vec<String>> = Vec::new();
  let mut header_rows: Vec<bool> = Vec::new();

  for tr in table_rows(table) {
    let cells: Vec<Node> = tr
      .children()
      .filter(|child| matches_tag(*child, "td") || matches_tag(*child, "th"))
      .collect();
    if cells.is_empty() {
      continue;
    }

    header_rows.push(cells.iter().all(|cell| matches_tag(*cell, "th")));
    rows.push(
      cells
        .into_iter()
        .map(|cell| render_cell(cell, dispatcher, render))
        .collect(),
    );
  }

  if rows.is_empty() {
    return None;
  }

  if let Some(index) = header_rows.iter().position(|is_header| *is_header)
    && index > 0
  {
    trace!("Header row {index} is not the first row; separator stays after row 0");
  }

  let column_count = rows.iter().map(Vec::len).max().unwrap_or_default();
  for row in &mut rows {
    row.resize(column_count, " ".to_string());
  }

  let mut result = String::new();
  for (index, row) in rows.iter().enumerate() {
    result.push_str("| ");
    result.push_str(&row.join(" | "));
    result.push_str(" |\n");

    if index == 0 {
      result.push('|');
      result.push_str(&"---|".repeat(column_count));
      result.push('\n');
    }
  }

  result.push('\n');
  Some(result)
}

/// `tr` elements of the table sections, in section order.
fn table_rows<'a, 'input>(table: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
  let mut rows = Vec::new();
  for section in SECTION_TAGS {
    for child in table.children().filter(|child| matches_tag(*child, section)) {
      rows.extend(child.children().filter(|row| matches_tag(*row, "tr")));
    }
  }
  rows
}

fn render_cell(cell: Node, dispatcher: &MacroDispatcher, render: &dyn Fn(Node) -> String) -> String {
  let content = if cell_is_complex(cell) {
    flatten_cell(cell, dispatcher, render)
  } else {
    let rendered: String = cell.children().map(render).collect();
    collapse_newlines(rendered.trim())
  };

  if content.is_empty() || content == "&nbsp;" {
    " ".to_string()
  } else {
    content
  }
}

/// Whether a cell needs flattening to fit on one Markdown line.
pub(crate) fn cell_is_complex(cell: Node) -> bool {
  let mut block_count = 0;

  for child in cell.children().filter(Node::is_element) {
    if matches_any_tag(child, ALWAYS_COMPLEX_TAGS) || matches_tag(child, "br") {
      return true;
    }
    if matches_any_tag(child, BLOCK_TAGS) {
      block_count += 1;
      if block_count > 1 || contains_line_break(child) {
        return true;
      }
    }
  }

  false
}

/// Flatten a complex cell onto one line, keeping inline formatting as HTML.
pub(crate) fn flatten_cell(cell: Node, dispatcher: &MacroDispatcher, render: &dyn Fn(Node) -> String) -> String {
  let mut out = String::new();
  flatten_into(cell, dispatcher, render, &mut out);

  let content = out.replace('\n', " ").replace('\r', "");
  content.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn flatten_into(node: Node, dispatcher: &MacroDispatcher, render: &dyn Fn(Node) -> String, out: &mut String) {
  for child in node.children() {
    if child.is_text() {
      out.push_str(child.text().unwrap_or_default());
      continue;
    }
    if !child.is_element() {
      continue;
    }

    if matches_any_tag(child, HEADING_TAGS) {
      out.push_str("<strong>");
      flatten_into(child, dispatcher, render, out);
      out.push_str("</strong>");
    } else if matches_tag(child, "br") {
      out.push_str("<br>");
    } else if matches_tag(child, "p") {
      if child.has_children() {
        flatten_into(child, dispatcher, render, out);
        if child.next_sibling().is_some() {
          out.push(' ');
        }
      }
    } else if matches_any_tag(child, PRESERVED_INLINE_TAGS) {
      out.push_str(raw_markup(child));
    } else if let Some(element) = ConfluenceElement::classify(child).filter(ConfluenceElement::is_inline_routed) {
      match dispatcher.dispatch(&element, render) {
        MacroOutcome::Handled(text) => out.push_str(&text),
        MacroOutcome::Continue(text) => {
          out.push_str(&text);
          flatten_into(child, dispatcher, render, out);
        }
        MacroOutcome::Unhandled => flatten_into(child, dispatcher, render, out),
      }
    } else {
      flatten_into(child, dispatcher, render, out);
    }
  }
}

fn collapse_newlines(text: &str) -> String {
  let mut result = String::with_capacity(text.len());
  let mut in_break = false;
  for ch in text.chars() {
    if ch == '\n' || ch == '\r' {
      if !in_break {
        result.push(' ');
        in_break = true;
      }
    } else {
      result.push(ch);
      in_break = false;
    }
  }
  result
}

/// Convert an HTML table element into Markdown table syntax.
///
/// Used for tables the Confluence path declines, such as tables without a
/// `tbody`. Cell text is whitespace-collapsed and the first row becomes the
/// header.
///
/// # Returns
/// A Markdown fragment beginning with a newline that contains the formatted
/// table, or an empty string when the table has no meaningful content.
pub fn convert_table_to_markdown(element: Node) -> String {
  let mut tr_elements = Vec::new();

  for child in element.children() {
    if matches_tag(child, "tr") {
      tr_elements.push(child);
    } else if matches_any_tag(child, SECTION_TAGS) {
      tr_elements.extend(child.children().filter(|n| matches_tag(*n, "tr")));
    }
  }

  let rows: Vec<Vec<String>> = tr_elements
    .into_iter()
    .map(|tr| {
      tr.children()
        .filter(|child| matches_tag(*child, "th") || matches_tag(*child, "td"))
        .map(|cell| get_element_text(cell).split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
    })
    .filter(|cells| !cells.is_empty())
    .collect();

  render_markdown_table(rows).unwrap_or_default()
}

/// Pretty-print Markdown tables with aligned columns.
///
/// The first row is treated as the header. Returns `None` when there is
/// nothing to render.
pub fn render_markdown_table(mut rows: Vec<Vec<String>>) -> Option<String> {
  let column_count = rows.iter().map(Vec::len).max()?;
  if column_count == 0 {
    return None;
  }

  for row in &mut rows {
    row.resize(column_count, String::new());
  }

  let mut column_widths = vec![0; column_count];
  for row in &rows {
    for (index, cell) in row.iter().enumerate() {
      column_widths[index] = column_widths[index].max(cell.chars().count());
    }
  }

  let mut result = String::new();
  result.push('\n');

  if let Some(first_row) = rows.first() {
    result.push_str(&format_row(first_row, &column_widths));

    result.push('|');
    for width in &column_widths {
      result.push(' ');
      result.push_str(&"-".repeat((*width).max(3)));
      result.push_str(" |");
    }
    result.push('\n');
  }

  for row in rows.iter().skip(1) {
    result.push_str(&format_row(row, &column_widths));
  }

  result.push('\n');
  Some(result)
}

fn format_row(row: &[String], column_widths: &[usize]) -> String {
  let mut line = String::from("|");

  for (cell, width) in row.iter().zip(column_widths) {
    let len = cell.chars().count();
    line.push(' ');
    line.push_str(cell);
    line.push_str(&" ".repeat((*width).max(3) - len.min((*width).max(3))));
    line.push_str(" |");
  }

  line.push('\n');
  line
}

#[cfg(test)]
mod tests {
  use roxmltree::Document;

  use super::*;
  use crate::markdown::elements::render_node;
  use crate::markdown::utils::wrap_with_namespaces;

  fn convert(input: &str) -> Option<String> {
    let wrapped = wrap_with_namespaces(input);
    let document = Document::parse(&wrapped).unwrap();
    let table = document.descendants().find(|n| matches_tag(*n, "table")).unwrap();
    let dispatcher = MacroDispatcher::new("assets");
    convert_confluence_table(table, &dispatcher, &|node| render_node(node, &dispatcher))
  }

  fn first_cell_is_complex(cell: &str) -> bool {
    let wrapped = wrap_with_namespaces(cell);
    let document = Document::parse(&wrapped).unwrap();
    let td = document.descendants().find(|n| matches_tag(*n, "td")).unwrap();
    cell_is_complex(td)
  }

  #[test]
  fn test_simple_table_with_header() {
    let output = convert(
      "<table><tbody><tr><th>H1</th><th>H2</th></tr><tr><td>a</td><td>b</td></tr></tbody></table>",
    )
    .unwrap();

    assert_eq!(output, "| H1 | H2 |\n|---|---|\n| a | b |\n\n");
    for line in output.lines().filter(|line| !line.is_empty()) {
      assert_eq!(line.matches('|').count(), 3);
    }
  }

  #[test]
  fn test_headerless_table_gets_separator() {
    let output = convert("<table><tbody><tr><td>key</td><td>value</td></tr><tr><td>k2</td><td>v2</td></tr></tbody></table>")
      .unwrap();
    assert_eq!(output, "| key | value |\n|---|---|\n| k2 | v2 |\n\n");
  }

  #[test]
  fn test_mixed_row_is_not_header() {
    let output = convert("<table><tbody><tr><th>Name</th><td>x</td></tr></tbody></table>").unwrap();
    assert_eq!(output, "| Name | x |\n|---|---|\n\n");
  }

  #[test]
  fn test_rows_padded_and_empty_cells_filled() {
    let output = convert(
      "<table><tbody><tr><th>A</th><th>B</th><th>C</th></tr><tr><td>1</td><td>\u{00A0}</td></tr><tr><td></td></tr></tbody></table>",
    )
    .unwrap();

    insta::assert_snapshot!(output, @r"
    | A | B | C |
    |---|---|---|
    | 1 |   |   |
    |   |   |   |
    ");
  }

  #[test]
  fn test_thead_rows_come_first() {
    let output = convert(
      "<table><tbody><tr><td>body</td></tr></tbody><thead><tr><th>head</th></tr></thead></table>",
    )
    .unwrap();
    assert_eq!(output, "| head |\n|---|\n| body |\n\n");
  }

  #[test]
  fn test_table_without_body_is_declined() {
    assert_eq!(convert("<table><tr><td>a</td></tr></table>"), None);
    assert_eq!(convert("<table><tbody></tbody></table>"), None);
  }

  #[test]
  fn test_complex_cell_detection() {
    assert!(first_cell_is_complex("<td><p>one</p><p>two</p></td>"));
    assert!(first_cell_is_complex("<td><ul><li>x</li></ul></td>"));
    assert!(first_cell_is_complex("<td>a<br/>b</td>"));
    assert!(first_cell_is_complex("<td><p>a<br/>b</p></td>"));
    assert!(!first_cell_is_complex("<td><p>one</p></td>"));
    assert!(!first_cell_is_complex("<td>plain <strong>bold</strong></td>"));
  }

  #[test]
  fn test_complex_cell_is_flattened() {
    let output = convert(
      "<table><tbody><tr><td><h3>Title</h3><p>First <strong>bold</strong></p><p>Second</p><ul><li>one</li><li>two</li></ul></td></tr></tbody></table>",
    )
    .unwrap();
    assert_eq!(
      output,
      "| <strong>Title</strong>First <strong>bold</strong> Second onetwo |\n|---|\n\n"
    );
  }

  #[test]
  fn test_flattened_cell_routes_confluence_elements() {
    let output = convert(
      r#"<table><tbody><tr><td><p>Owner <ac:link><ri:user ri:account-id="42"/></ac:link></p><p>Due <time datetime="2024-01-31"/></p></td></tr></tbody></table>"#,
    )
    .unwrap();
    assert_eq!(output, "| Owner @user(42) Due 2024-01-31 |\n|---|\n\n");
  }

  #[test]
  fn test_simple_cell_renders_markdown() {
    let output = convert("<table><tbody><tr><td><strong>Bold</strong> text</td></tr></tbody></table>").unwrap();
    assert_eq!(output, "| **Bold** text |\n|---|\n\n");
  }

  #[test]
  fn test_generic_table_rendering() {
    let wrapped = wrap_with_namespaces(
      "<table><tr><th>Header 1</th><th>Header 2</th></tr><tr><td>Cell 1</td><td>Cell 2</td></tr></table>",
    );
    let document = Document::parse(&wrapped).unwrap();
    let table = document.descendants().find(|n| matches_tag(*n, "table")).unwrap();

    insta::assert_snapshot!(convert_table_to_markdown(table), @r"
    | Header 1 | Header 2 |
    | -------- | -------- |
    | Cell 1   | Cell 2   |
    ");
  }
}
