//! Recovery for storage markup that the XML parser rejects.
//!
//! Confluence bodies are not always well-formed: a paragraph left open inside
//! a macro, a stray closing tag, a duplicated attribute. Rather than lose the
//! whole page, the converter first balances the tags and, if the document
//! still does not parse, renders each top-level fragment on its own.

use std::sync::LazyLock;

use regex::Regex;

static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"<!--[\s\S]*?-->|<(/)?([A-Za-z][\w:.\-]*)((?:[^>"']|"[^"]*"|'[^']*')*?)(/)?>"#).expect("valid regex")
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

enum Token<'a> {
  Text(&'a str),
  Open { name: &'a str, raw: &'a str },
  Close { name: &'a str, raw: &'a str },
  Other(&'a str),
}

fn tokenize(markup: &str) -> Vec<Token<'_>> {
  let mut tokens = Vec::new();
  let mut last = 0;

  for caps in MARKUP_RE.captures_iter(markup) {
    let Some(whole) = caps.get(0) else { continue };
    if whole.start() > last {
      tokens.push(Token::Text(&markup[last..whole.start()]));
    }
    last = whole.end();

    let raw = whole.as_str();
    let token = match caps.get(2) {
      None => Token::Other(raw),
      Some(name) if caps.get(1).is_some() => Token::Close { name: name.as_str(), raw },
      Some(_) if caps.get(4).is_some() => Token::Other(raw),
      Some(name) => Token::Open { name: name.as_str(), raw },
    };
    tokens.push(token);
  }

  if last < markup.len() {
    tokens.push(Token::Text(&markup[last..]));
  }
  tokens
}

/// Close elements left open and drop closing tags that match nothing.
///
/// A closing tag for an element further up the stack implicitly closes
/// everything opened after it, as an HTML parser would.
pub fn balance_tags(markup: &str) -> String {
  let mut result = String::with_capacity(markup.len());
  let mut open: Vec<&str> = Vec::new();

  for token in tokenize(markup) {
    match token {
      Token::Text(raw) | Token::Other(raw) => result.push_str(raw),
      Token::Open { name, raw } => {
        open.push(name);
        result.push_str(raw);
      }
      Token::Close { name, raw } => {
        let Some(depth) = open.iter().rposition(|candidate| *candidate == name) else {
          continue;
        };
        for unclosed in open.drain(depth + 1..).rev() {
          result.push_str(&format!("</{unclosed}>"));
        }
        open.pop();
        result.push_str(raw);
      }
    }
  }

  for unclosed in open.into_iter().rev() {
    result.push_str(&format!("</{unclosed}>"));
  }
  result
}

/// Split balanced markup into its top-level elements and text runs.
pub fn top_level_fragments(markup: &str) -> Vec<&str> {
  let mut fragments = Vec::new();
  let mut depth = 0usize;
  let mut start = 0;
  let mut offset = 0;

  for token in tokenize(markup) {
    let closes = matches!(token, Token::Close { .. });
    let raw = match token {
      Token::Text(raw) | Token::Other(raw) => raw,
      Token::Open { raw, .. } => {
        if depth == 0 && offset > start {
          fragments.push(&markup[start..offset]);
          start = offset;
        }
        depth += 1;
        raw
      }
      Token::Close { raw, .. } => {
        depth = depth.saturating_sub(1);
        raw
      }
    };
    offset += raw.len();

    if depth == 0 && closes {
      fragments.push(&markup[start..offset]);
      start = offset;
    }
  }

  if offset > start {
    fragments.push(&markup[start..offset]);
  }
  fragments.retain(|fragment| !fragment.trim().is_empty());
  fragments
}

/// Text of a fragment with its tags removed, for markup nothing else can read.
pub fn strip_tags(markup: &str) -> String {
  let text = TAG_RE.replace_all(markup, " ");
  let text = html_escape::decode_html_entities(&text);
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}
