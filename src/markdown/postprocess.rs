//! Cleanup passes over rendered Markdown.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static EXCESS_NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

static NESTED_LIST_GAP_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(\n\s*(?:[-*+]\s|\d+\.\s)[^\n]*)\n\s*\n(\s{2,}(?:[-*+]\s|\d+\.\s))").expect("valid regex")
});

static PAGE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\[([^\]]+)\]\(/wiki/spaces/([^/]+)/pages/(\d+)/[^)]+\)").expect("valid regex")
});

/// Normalize whitespace and rewrite internal page links.
///
/// Runs of blank lines collapse to one, blank lines between a list item and
/// its nested items are removed, `/wiki/spaces/<KEY>/pages/<ID>/...` links
/// become `confluence://pageId/<ID>`, and the result is trimmed.
pub fn postprocess_markdown(markdown: &str) -> String {
  let markdown = EXCESS_NEWLINES_RE.replace_all(markdown, "\n\n");
  let markdown = fix_nested_list_spacing(&markdown);
  let markdown = rewrite_page_links(&markdown);
  markdown.trim().to_string()
}

/// Repeats until no list gap remains, since each pass can expose a new one.
fn fix_nested_list_spacing(markdown: &str) -> String {
  let mut current = markdown.to_string();
  loop {
    let next = match NESTED_LIST_GAP_RE.replace_all(&current, "$1\n$2") {
      Cow::Borrowed(_) => return current,
      Cow::Owned(next) => next,
    };
    if next == current {
      return current;
    }
    current = next;
  }
}

fn rewrite_page_links(markdown: &str) -> Cow<'_, str> {
  PAGE_LINK_RE.replace_all(markdown, "[$1](confluence://pageId/$3)")
}
