//! HTML entity handling around the XML parser.
//!
//! `roxmltree` only knows XML's five predefined entities, while storage
//! format happily uses any HTML5 name such as `&nbsp;` or `&eacute;`. Markup
//! is therefore made XML-safe before parsing, and raw markup pulled out by the
//! extractors is unescaped with [`decode_html_entities`]. Named references are
//! looked up in the full HTML5 table of `html_escape`.

use std::borrow::Cow;

const XML_ENTITIES: &[(&str, char)] = &[("amp", '&'), ("lt", '<'), ("gt", '>'), ("quot", '"'), ("apos", '\'')];

/// Make storage markup acceptable to an XML parser.
///
/// Named HTML entities become literal characters, XML entities and numeric
/// references are kept, and any other `&` is escaped as `&amp;`.
pub fn preprocess_html_entities(text: &str) -> String {
  let mut result = String::with_capacity(text.len());
  let mut rest = text;

  while let Some(pos) = rest.find('&') {
    result.push_str(&rest[..pos]);
    rest = &rest[pos..];

    let consumed = entity_at(rest).and_then(|(body, len)| {
      if is_xml_entity(body) || decode_numeric_entity(body).is_some() {
        result.push_str(&rest[..len]);
        return Some(len);
      }
      let decoded = decode_named(&rest[..len])?;
      // A few HTML5 names (`&AMP;`, `&LT;`) decode to XML-significant characters.
      for ch in decoded.chars() {
        match ch {
          '&' => result.push_str("&amp;"),
          '<' => result.push_str("&lt;"),
          '>' => result.push_str("&gt;"),
          _ => result.push(ch),
        }
      }
      Some(len)
    });

    match consumed {
      Some(len) => rest = &rest[len..],
      None => {
        result.push_str("&amp;");
        rest = &rest[1..];
      }
    }
  }

  result.push_str(rest);
  result
}

/// Decode named and numeric HTML entities in a single pass.
///
/// Non-breaking spaces decode to plain spaces so they do not leak into
/// Markdown output. Unknown references are left untouched.
pub fn decode_html_entities(text: &str) -> String {
  let mut result = String::with_capacity(text.len());
  let mut rest = text;

  while let Some(pos) = rest.find('&') {
    result.push_str(&rest[..pos]);
    rest = &rest[pos..];

    let decoded = entity_at(rest).and_then(|(body, len)| {
      let text = match lookup_named(XML_ENTITIES, body).or_else(|| decode_numeric_entity(body)) {
        Some(ch) => ch.to_string(),
        None => decode_named(&rest[..len])?.into_owned(),
      };
      Some((text, len))
    });

    match decoded {
      Some((text, len)) => {
        result.push_str(&text.replace('\u{00A0}', " "));
        rest = &rest[len..];
      }
      None => {
        result.push('&');
        rest = &rest[1..];
      }
    }
  }

  result.push_str(rest);
  result
}

/// Splits `&body;` at the start of `text`, returning the body and the full
/// reference length.
fn entity_at(text: &str) -> Option<(&str, usize)> {
  let candidate = text.strip_prefix('&')?;
  let end = candidate.find(';')?;
  let body = &candidate[..end];
  if body.is_empty() || body.len() > 32 || !body.chars().all(|c| c.is_ascii_alphanumeric() || c == '#') {
    return None;
  }
  Some((body, end + 2))
}

fn is_xml_entity(body: &str) -> bool {
  lookup_named(XML_ENTITIES, body).is_some()
}

/// Decode a complete `&name;` reference, or `None` when the name is unknown.
fn decode_named(reference: &str) -> Option<Cow<'_, str>> {
  let decoded = html_escape::decode_html_entities(reference);
  if decoded == reference { None } else { Some(decoded) }
}

fn lookup_named(table: &[(&str, char)], body: &str) -> Option<char> {
  table.iter().find(|(name, _)| *name == body).map(|(_, ch)| *ch)
}

/// Decode the body of a numeric reference such as `#128075` or `#x1F44B`.
fn decode_numeric_entity(body: &str) -> Option<char> {
  let digits = body.strip_prefix('#')?;

  let (radix, digits) = match digits.strip_prefix(['x', 'X']) {
    Some(hex) => (16, hex),
    None => (10, digits),
  };

  if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
    return None;
  }

  u32::from_str_radix(digits, radix).ok().and_then(char::from_u32)
}
