use roxmltree::Node;
use tracing::{debug, warn};

use crate::attachments::AttachmentResolver;
use crate::confluence::Page;
use crate::markdown::extract::{code_body_from_macro_markup, language_from_macro_markup};
use crate::markdown::utils::{
  find_child_by_tag, get_attribute, get_element_text, macro_parameter, matches_tag, raw_markup,
};

/// Builds a fenced code block from a Confluence code macro element.
///
/// The body comes from the CDATA section of `ac:plain-text-body` when the
/// pre-parse pass preserved one, otherwise from the macro's raw markup.
pub(crate) fn render_code(element: Node) -> String {
  let markup = raw_markup(element);
  let language = language_from_macro_markup(markup);

  if !language.is_empty() {
    debug!("Code block language: {language}");
  }

  let body = preserved_cdata_body(element).unwrap_or_else(|| code_body_from_macro_markup(markup));
  let code = body.trim_start_matches(['\n', '\r']).trim_end();

  format_fenced_block(&language, code)
}

/// Embeds a Mermaid diagram stored as a page attachment.
///
/// Every failure mode renders as an HTML comment so the rest of the page
/// still converts.
pub(crate) fn render_mermaid(
  element: Node,
  resolver: Option<&dyn AttachmentResolver>,
  page: Option<&Page>,
) -> String {
  let Some(filename) = macro_parameter(element, "filename") else {
    return "<!-- Mermaid macro missing filename -->".to_string();
  };
  let revision = macro_parameter(element, "revision").and_then(|value| parse_revision(&filename, &value));

  let (Some(resolver), Some(page)) = (resolver, page) else {
    debug!("No attachment source for mermaid diagram {filename}");
    return format!("<!-- Mermaid attachment {filename} unavailable -->");
  };

  let bytes = match resolver.resolve(page, &filename, revision) {
    Ok(bytes) => bytes,
    Err(err) => {
      warn!("Failed to load mermaid diagram {filename}: {err}");
      return format!("<!-- Failed to load mermaid {filename}: {err} -->");
    }
  };

  let diagram = String::from_utf8_lossy(&bytes);
  let diagram = diagram.trim();
  if diagram.is_empty() {
    return "<!-- Empty mermaid macro -->".to_string();
  }

  format!("```mermaid\n{diagram}\n```\n")
}

/// A malformed revision is ignored, so the latest attachment is used.
fn parse_revision(filename: &str, value: &str) -> Option<u32> {
  match value.trim().parse::<u32>() {
    Ok(revision) => Some(revision),
    Err(err) => {
      debug!("Ignoring revision {value:?} of mermaid diagram {filename}: {err}");
      None
    }
  }
}

/// Text of the `<pre data-cdata>` placeholder inside `ac:plain-text-body`.
///
/// An empty placeholder still counts as the body.
fn preserved_cdata_body(element: Node) -> Option<String> {
  let body = find_child_by_tag(element, "ac:plain-text-body")?;
  body
    .descendants()
    .find(|node| matches_tag(*node, "pre") && get_attribute(*node, "data-cdata").is_some())
    .map(get_element_text)
}

/// Fences `code`, lengthening the fence past any backtick run inside it.
pub(crate) fn format_fenced_block(language: &str, code: &str) -> String {
  let fence = "`".repeat(longest_backtick_run(code).max(2) + 1);
  format!("{fence}{language}\n{code}\n{fence}\n")
}

fn longest_backtick_run(text: &str) -> usize {
  let mut longest = 0;
  let mut current = 0;
  for ch in text.chars() {
    if ch == '`' {
      current += 1;
      longest = longest.max(current);
    } else {
      current = 0;
    }
  }
  longest
}
