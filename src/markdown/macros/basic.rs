use roxmltree::Node;

use crate::markdown::utils::macro_parameter;

/// Renders the Confluence status macro as an emphasized badge.
///
/// Known colours get a matching circle emoji; anything else falls back to a
/// bracketed title. A status without a title renders as nothing.
pub(crate) fn render_status(element: Node) -> String {
  let title = macro_parameter(element, "title").unwrap_or_default();
  if title.is_empty() {
    return String::new();
  }

  let colour = macro_parameter(element, "colour").unwrap_or_default();
  match status_emoji(&colour) {
    Some(emoji) => format!("{emoji} **{title}**"),
    None => format!("**[{title}]**"),
  }
}

fn status_emoji(colour: &str) -> Option<&'static str> {
  match colour.to_lowercase().as_str() {
    "red" => Some("\u{1F534}"),
    "yellow" => Some("\u{1F7E1}"),
    "green" => Some("\u{1F7E2}"),
    "blue" => Some("\u{1F535}"),
    "grey" | "gray" => Some("\u{26AA}"),
    _ => None,
  }
}
