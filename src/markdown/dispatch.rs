//! Routing of Confluence-specific elements to their Markdown handlers.
//!
//! [`ConfluenceElement::classify`] recognizes the element kinds that need
//! special treatment and pulls out the fields their handlers need.
//! [`MacroDispatcher::dispatch`] renders one of them and reports through
//! [`MacroOutcome`] whether the generic renderer should still apply its own
//! handling.

use roxmltree::Node;
use tracing::{debug, trace};

use super::extract::filename_from_image_markup;
use super::utils::{
  get_attribute, get_element_text, has_macro_parameters, matches_tag, non_empty_attribute, raw_markup,
};
use super::{macros, tables};
use crate::attachments::AttachmentResolver;
use crate::confluence::Page;
use crate::confluence::url::escape_path;

/// Result of handing an element to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroOutcome {
  /// The text fully replaces the element.
  Handled(String),
  /// Emit the text, then let the generic renderer process the element too.
  Continue(String),
  /// Not ours after all; the generic renderer takes over.
  Unhandled,
}

/// Callout macros rendered as labelled blockquotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmonitionKind {
  Info,
  Warning,
  Note,
  Tip,
}

impl AdmonitionKind {
  pub fn emoji(self) -> &'static str {
    match self {
      AdmonitionKind::Info => "\u{2139}\u{FE0F}",
      AdmonitionKind::Warning => "\u{26A0}\u{FE0F}",
      AdmonitionKind::Note => "\u{1F4DD}",
      AdmonitionKind::Tip => "\u{1F4A1}",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      AdmonitionKind::Info => "Info",
      AdmonitionKind::Warning => "Warning",
      AdmonitionKind::Note => "Note",
      AdmonitionKind::Tip => "Tip",
    }
  }
}

/// Structured macros by `ac:name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroKind {
  Admonition(AdmonitionKind),
  Code,
  MermaidCloud,
  /// `expand` and `details`: content kept, container dropped.
  Expand,
  Toc,
  Status,
  Children,
  Unsupported(String),
}

impl MacroKind {
  pub fn from_name(name: &str) -> Self {
    match name {
      "info" => MacroKind::Admonition(AdmonitionKind::Info),
      "warning" => MacroKind::Admonition(AdmonitionKind::Warning),
      "note" => MacroKind::Admonition(AdmonitionKind::Note),
      "tip" => MacroKind::Admonition(AdmonitionKind::Tip),
      "code" => MacroKind::Code,
      "mermaid-cloud" => MacroKind::MermaidCloud,
      "expand" | "details" => MacroKind::Expand,
      "toc" => MacroKind::Toc,
      "status" => MacroKind::Status,
      "children" => MacroKind::Children,
      "" => MacroKind::Unsupported("unknown".to_string()),
      other => MacroKind::Unsupported(other.to_string()),
    }
  }
}

/// A Confluence element recognized by the dispatcher.
#[derive(Debug, Clone)]
pub enum ConfluenceElement<'a, 'input> {
  /// `ac:image`; an empty filename means the attachment could not be named.
  Image { filename: String },
  /// `ac:emoticon` / `ac:emoji`.
  Emoticon {
    fallback: Option<String>,
    shortname: Option<String>,
    name: Option<String>,
  },
  /// `ac:link`; `account_id` is set for user mentions.
  Link {
    node: Node<'a, 'input>,
    account_id: Option<String>,
  },
  /// `ac:inline-comment-marker`.
  InlineComment { text: String, reference: Option<String> },
  /// `ac:placeholder` with its trimmed instruction text.
  Placeholder { text: String },
  /// `<time>`.
  Time { datetime: Option<String> },
  /// `ac:structured-macro`.
  Macro { node: Node<'a, 'input>, kind: MacroKind },
  /// `<table>`.
  Table { node: Node<'a, 'input> },
}

impl<'a, 'input> ConfluenceElement<'a, 'input> {
  /// Recognize an element, or `None` for ordinary HTML.
  pub fn classify(node: Node<'a, 'input>) -> Option<Self> {
    if !node.is_element() {
      return None;
    }

    if matches_tag(node, "ac:image") {
      let filename = non_empty_attribute(node, "ri:filename")
        .unwrap_or_else(|| filename_from_image_markup(raw_markup(node)));
      return Some(ConfluenceElement::Image { filename });
    }

    if matches_tag(node, "ac:emoticon") || matches_tag(node, "ac:emoji") {
      return Some(ConfluenceElement::Emoticon {
        fallback: non_empty_attribute(node, "ac:emoji-fallback"),
        shortname: non_empty_attribute(node, "ac:emoji-shortname"),
        name: non_empty_attribute(node, "ac:name"),
      });
    }

    if matches_tag(node, "ac:link") {
      let account_id = node
        .children()
        .filter(|child| matches_tag(*child, "ri:user"))
        .find_map(|user| non_empty_attribute(user, "ri:account-id"));
      return Some(ConfluenceElement::Link { node, account_id });
    }

    if matches_tag(node, "ac:inline-comment-marker") {
      return Some(ConfluenceElement::InlineComment {
        text: get_element_text(node),
        reference: non_empty_attribute(node, "ac:ref"),
      });
    }

    if matches_tag(node, "ac:placeholder") {
      return Some(ConfluenceElement::Placeholder {
        text: get_element_text(node).trim().to_string(),
      });
    }

    if matches_tag(node, "time") {
      return Some(ConfluenceElement::Time {
        datetime: non_empty_attribute(node, "datetime"),
      });
    }

    if matches_tag(node, "ac:structured-macro") {
      let name = get_attribute(node, "ac:name").unwrap_or_default();
      return Some(ConfluenceElement::Macro {
        node,
        kind: MacroKind::from_name(&name),
      });
    }

    if matches_tag(node, "table") {
      return Some(ConfluenceElement::Table { node });
    }

    None
  }

  /// Whether the rendered output stands as its own Markdown block.
  pub fn is_block(&self) -> bool {
    match self {
      ConfluenceElement::Macro { kind, .. } => *kind != MacroKind::Status,
      ConfluenceElement::Table { .. } => true,
      _ => false,
    }
  }

  /// Elements that table-cell flattening hands to the dispatcher.
  pub fn is_inline_routed(&self) -> bool {
    !matches!(
      self,
      ConfluenceElement::Image { .. } | ConfluenceElement::Table { .. }
    )
  }
}

/// Renders Confluence elements, holding the context some handlers need.
///
/// The current page is per-conversion state: set it before converting a
/// page and do not share one dispatcher between concurrent conversions.
pub struct MacroDispatcher<'r> {
  image_folder: String,
  resolver: Option<Box<dyn AttachmentResolver + 'r>>,
  current_page: Option<Page>,
}

impl<'r> MacroDispatcher<'r> {
  pub fn new(image_folder: impl Into<String>) -> Self {
    Self {
      image_folder: image_folder.into(),
      resolver: None,
      current_page: None,
    }
  }

  /// Install the resolver used by diagram macros.
  pub fn with_resolver(mut self, resolver: Box<dyn AttachmentResolver + 'r>) -> Self {
    self.resolver = Some(resolver);
    self
  }

  pub fn set_current_page(&mut self, page: Page) {
    self.current_page = Some(page);
  }

  pub fn clear_current_page(&mut self) {
    self.current_page = None;
  }

  pub fn current_page(&self) -> Option<&Page> {
    self.current_page.as_ref()
  }

  pub fn image_folder(&self) -> &str {
    &self.image_folder
  }

  /// Render a recognized element.
  ///
  /// `render` converts a single child node with the generic renderer and is
  /// used by handlers that nest arbitrary content.
  pub fn dispatch(&self, element: &ConfluenceElement, render: &dyn Fn(Node) -> String) -> MacroOutcome {
    match element {
      ConfluenceElement::Image { filename } => MacroOutcome::Handled(self.image_markdown(filename)),
      ConfluenceElement::Emoticon {
        fallback,
        shortname,
        name,
      } => MacroOutcome::Continue(emoticon_text(fallback, shortname, name)),
      ConfluenceElement::Link { account_id, .. } => match account_id {
        Some(id) => MacroOutcome::Handled(format!("@user({id})")),
        None => MacroOutcome::Unhandled,
      },
      ConfluenceElement::InlineComment { text, reference } => {
        let mut out = text.clone();
        if let Some(reference) = reference {
          out.push_str(&format!("<!-- comment-ref: {reference} -->"));
        }
        MacroOutcome::Handled(out)
      }
      ConfluenceElement::Placeholder { text } => {
        if text.is_empty() {
          MacroOutcome::Handled(String::new())
        } else {
          MacroOutcome::Handled(format!("<!-- {text} -->"))
        }
      }
      ConfluenceElement::Time { datetime } => match datetime {
        Some(datetime) => MacroOutcome::Handled(datetime.clone()),
        None => MacroOutcome::Unhandled,
      },
      ConfluenceElement::Macro { node, kind } => self.dispatch_macro(*node, kind, render),
      ConfluenceElement::Table { node } => match tables::convert_confluence_table(*node, self, render) {
        Some(table) => MacroOutcome::Handled(table),
        None => {
          trace!("Table has no body rows, using generic table rendering");
          MacroOutcome::Unhandled
        }
      },
    }
  }

  fn dispatch_macro(&self, node: Node, kind: &MacroKind, render: &dyn Fn(Node) -> String) -> MacroOutcome {
    debug!("Rendering macro: {kind:?}");

    let text = match kind {
      MacroKind::Admonition(admonition) => macros::admonitions::render(node, *admonition, render),
      MacroKind::Code => macros::code::render_code(node),
      MacroKind::MermaidCloud => macros::code::render_mermaid(node, self.resolver.as_deref(), self.current_page()),
      MacroKind::Expand => macros::expand::render(node, render),
      MacroKind::Toc => {
        let placeholder = "<!-- Table of Contents -->".to_string();
        // Parameterized tocs are containers whose parameter text must not leak.
        return if has_macro_parameters(node) {
          MacroOutcome::Handled(placeholder)
        } else {
          MacroOutcome::Continue(placeholder)
        };
      }
      MacroKind::Status => macros::basic::render_status(node),
      MacroKind::Children => "<!-- Child Pages -->".to_string(),
      MacroKind::Unsupported(name) => {
        debug!("Unsupported macro: {name}");
        format!("<!-- Unsupported macro: {name} -->")
      }
    };

    MacroOutcome::Handled(text)
  }

  fn image_markdown(&self, filename: &str) -> String {
    if filename.is_empty() {
      return "<!-- Image attachment not found -->".to_string();
    }

    let local_path = if self.image_folder.is_empty() {
      filename.to_string()
    } else {
      format!("{}/{filename}", self.image_folder.trim_end_matches('/'))
    };

    format!("![{filename}]({})", escape_path(&local_path))
  }
}

fn emoticon_text(fallback: &Option<String>, shortname: &Option<String>, name: &Option<String>) -> String {
  if let Some(fallback) = fallback {
    format!("{fallback} ")
  } else if let Some(shortname) = shortname {
    format!("{shortname} ")
  } else if let Some(name) = name {
    format!(":{name}:")
  } else {
    ":emoji: ".to_string()
  }
}

#[cfg(test)]
mod tests {
  use roxmltree::Document;

  use super::*;
  use crate::markdown::utils::wrap_with_namespaces;

  fn first_element<'a, 'input>(document: &'a Document<'input>, tag: &str) -> Node<'a, 'input> {
    document.descendants().find(|node| matches_tag(*node, tag)).unwrap()
  }

  fn dispatch_first(input: &str, tag: &str) -> MacroOutcome {
    let wrapped = wrap_with_namespaces(input);
    let document = Document::parse(&wrapped).unwrap();
    let node = first_element(&document, tag);
    let element = ConfluenceElement::classify(node).unwrap();
    let dispatcher = MacroDispatcher::new("assets");
    dispatcher.dispatch(&element, &get_element_text)
  }

  #[test]
  fn test_macro_kind_from_name() {
    assert_eq!(MacroKind::from_name("tip"), MacroKind::Admonition(AdmonitionKind::Tip));
    assert_eq!(MacroKind::from_name("details"), MacroKind::Expand);
    assert_eq!(MacroKind::from_name(""), MacroKind::Unsupported("unknown".to_string()));
    assert_eq!(MacroKind::from_name("jira"), MacroKind::Unsupported("jira".to_string()));
  }

  #[test]
  fn test_classify_ignores_plain_html() {
    let document = Document::parse("<p>text</p>").unwrap();
    assert!(ConfluenceElement::classify(document.root_element()).is_none());
  }

  #[test]
  fn test_image_from_attribute() {
    let outcome = dispatch_first(r#"<ac:image ri:filename="my chart.png"/>"#, "ac:image");
    assert_eq!(
      outcome,
      MacroOutcome::Handled("![my chart.png](assets/my%20chart.png)".to_string())
    );
  }

  #[test]
  fn test_image_from_attachment_child() {
    let outcome = dispatch_first(
      r#"<ac:image ac:height="250"><ri:attachment ri:filename="arch.png" /></ac:image>"#,
      "ac:image",
    );
    assert_eq!(outcome, MacroOutcome::Handled("![arch.png](assets/arch.png)".to_string()));
  }

  #[test]
  fn test_image_without_filename() {
    let outcome = dispatch_first(r#"<ac:image><ri:url ri:value="https://x/y.png"/></ac:image>"#, "ac:image");
    assert_eq!(
      outcome,
      MacroOutcome::Handled("<!-- Image attachment not found -->".to_string())
    );
  }

  #[test]
  fn test_emoticon_always_continues() {
    let cases = [
      (r#"<ac:emoticon ac:name="smile" ac:emoji-fallback="🙂"/>"#, "🙂 "),
      (r#"<ac:emoticon ac:name="smile" ac:emoji-shortname=":slight_smile:"/>"#, ":slight_smile: "),
      (r#"<ac:emoticon ac:name="tick"/>"#, ":tick:"),
      (r#"<ac:emoticon/>"#, ":emoji: "),
    ];

    for (input, expected) in cases {
      assert_eq!(
        dispatch_first(input, "ac:emoticon"),
        MacroOutcome::Continue(expected.to_string())
      );
    }
  }

  #[test]
  fn test_user_link() {
    let outcome = dispatch_first(r#"<ac:link><ri:user ri:account-id="5b10ac8d"/></ac:link>"#, "ac:link");
    assert_eq!(outcome, MacroOutcome::Handled("@user(5b10ac8d)".to_string()));
  }

  #[test]
  fn test_page_link_is_unhandled() {
    let outcome = dispatch_first(r#"<ac:link><ri:page ri:content-title="Home"/></ac:link>"#, "ac:link");
    assert_eq!(outcome, MacroOutcome::Unhandled);
  }

  #[test]
  fn test_inline_comment() {
    let outcome = dispatch_first(
      r#"<ac:inline-comment-marker ac:ref="abc-123">flagged text</ac:inline-comment-marker>"#,
      "ac:inline-comment-marker",
    );
    assert_eq!(
      outcome,
      MacroOutcome::Handled("flagged text<!-- comment-ref: abc-123 -->".to_string())
    );
  }

  #[test]
  fn test_placeholder() {
    let outcome = dispatch_first("<ac:placeholder> Type here </ac:placeholder>", "ac:placeholder");
    assert_eq!(outcome, MacroOutcome::Handled("<!-- Type here -->".to_string()));

    let outcome = dispatch_first("<ac:placeholder>  </ac:placeholder>", "ac:placeholder");
    assert_eq!(outcome, MacroOutcome::Handled(String::new()));
  }

  #[test]
  fn test_time() {
    let outcome = dispatch_first(r#"<time datetime="2024-05-01"/>"#, "time");
    assert_eq!(outcome, MacroOutcome::Handled("2024-05-01".to_string()));

    let outcome = dispatch_first("<time>tomorrow</time>", "time");
    assert_eq!(outcome, MacroOutcome::Unhandled);
  }

  #[test]
  fn test_toc_continue_depends_on_parameters() {
    let outcome = dispatch_first(r#"<ac:structured-macro ac:name="toc"/>"#, "ac:structured-macro");
    assert_eq!(outcome, MacroOutcome::Continue("<!-- Table of Contents -->".to_string()));

    let outcome = dispatch_first(
      r#"<ac:structured-macro ac:name="toc"><ac:parameter ac:name="maxLevel">3</ac:parameter></ac:structured-macro>"#,
      "ac:structured-macro",
    );
    assert_eq!(outcome, MacroOutcome::Handled("<!-- Table of Contents -->".to_string()));
  }

  #[test]
  fn test_children_and_unsupported_macros() {
    let outcome = dispatch_first(r#"<ac:structured-macro ac:name="children"/>"#, "ac:structured-macro");
    assert_eq!(outcome, MacroOutcome::Handled("<!-- Child Pages -->".to_string()));

    let outcome = dispatch_first(r#"<ac:structured-macro ac:name="jira"/>"#, "ac:structured-macro");
    assert_eq!(outcome, MacroOutcome::Handled("<!-- Unsupported macro: jira -->".to_string()));

    let outcome = dispatch_first("<ac:structured-macro/>", "ac:structured-macro");
    assert_eq!(outcome, MacroOutcome::Handled("<!-- Unsupported macro: unknown -->".to_string()));
  }

  #[test]
  fn test_block_classification() {
    let wrapped = wrap_with_namespaces(
      r#"<ac:structured-macro ac:name="status"/><ac:structured-macro ac:name="info"/><table/>"#,
    );
    let document = Document::parse(&wrapped).unwrap();
    let blocks: Vec<bool> = document
      .root_element()
      .children()
      .filter_map(ConfluenceElement::classify)
      .map(|element| element.is_block())
      .collect();
    assert_eq!(blocks, vec![false, true, true]);
  }
}
