//! A forgiving reader for the CSS text of template-literal styles.
//!
//! Interpolations are replaced by placeholder tokens before parsing, so the reader sees
//! plain text and hands back declarations, nested blocks and bare interpolations (mixins)
//! in source order.

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

#[derive(Clone, Debug, PartialEq)]
pub enum CssNode {
  Declaration { property: String, value: String },
  Block { prelude: String, children: Vec<CssNode> },
  Mixin(usize),
}

/// A run of text or a reference to the interpolation at an index.
#[derive(Clone, Debug, PartialEq)]
pub enum TextPart {
  Text(String),
  Hole(usize),
}

pub fn placeholder(index: usize) -> String {
  format!("{OPEN}{index}{CLOSE}")
}

/// Splits text back into literal runs and interpolation references.
pub fn split_placeholders(text: &str) -> Vec<TextPart> {
  let mut parts = Vec::new();
  let mut rest = text;

  while let Some(start) = rest.find(OPEN) {
    let Some(length) = rest[start..].find(CLOSE) else {
      break;
    };
    let Ok(index) = rest[start + OPEN.len_utf8()..start + length].parse::<usize>() else {
      break;
    };
    if start > 0 {
      parts.push(TextPart::Text(rest[..start].to_string()));
    }
    parts.push(TextPart::Hole(index));
    rest = &rest[start + length + CLOSE.len_utf8()..];
  }

  if !rest.is_empty() {
    parts.push(TextPart::Text(rest.to_string()));
  }
  parts
}

/// Parses CSS text into declarations, blocks and mixins.
pub fn parse_css_text(text: &str) -> Vec<CssNode> {
  let chars: Vec<char> = text.chars().collect();
  let mut reader = Reader { chars, position: 0 };
  reader.block()
}

struct Reader {
  chars: Vec<char>,
  position: usize,
}

impl Reader {
  fn block(&mut self) -> Vec<CssNode> {
    let mut nodes = Vec::new();
    let mut buffer = String::new();
    let mut parens = 0usize;
    let mut quote: Option<char> = None;

    while let Some(ch) = self.next() {
      if let Some(open) = quote {
        buffer.push(ch);
        if ch == '\\' {
          if let Some(escaped) = self.next() {
            buffer.push(escaped);
          }
        } else if ch == open {
          quote = None;
        }
        continue;
      }

      match ch {
        '/' if self.peek() == Some('*') => self.skip_comment(),
        '"' | '\'' => {
          quote = Some(ch);
          buffer.push(ch);
        }
        '(' => {
          parens += 1;
          buffer.push(ch);
        }
        ')' => {
          parens = parens.saturating_sub(1);
          buffer.push(ch);
        }
        ';' if parens == 0 => finish_statement(&mut buffer, &mut nodes),
        '{' if parens == 0 => {
          let prelude = buffer.trim().to_string();
          buffer.clear();
          let children = self.block();
          peel_mixins(&prelude, &mut nodes);
          nodes.push(CssNode::Block {
            prelude: strip_leading_mixins(&prelude),
            children,
          });
        }
        '}' if parens == 0 => {
          finish_statement(&mut buffer, &mut nodes);
          return nodes;
        }
        '\n' if parens == 0 && (is_only_mixins(&buffer) || self.ends_declaration(&buffer)) => {
          finish_statement(&mut buffer, &mut nodes)
        }
        _ => buffer.push(ch),
      }
    }

    finish_statement(&mut buffer, &mut nodes);
    nodes
  }

  /// A newline ends a complete declaration when the next line starts another one, so
  /// semicolons can be left out between declarations. Continuation lines such as the rows
  /// of `grid-template-areas` do not start with `property:`.
  fn ends_declaration(&self, buffer: &str) -> bool {
    let statement = strip_leading_mixins(buffer);
    if statement.ends_with(',') {
      return false;
    }
    let has_value = find_property_colon(&statement)
      .is_some_and(|colon| !statement[colon + 1..].trim().is_empty());
    has_value && self.next_line_is_declaration()
  }

  fn next_line_is_declaration(&self) -> bool {
    let rest: String = self.chars[self.position.min(self.chars.len())..]
      .iter()
      .skip_while(|ch| ch.is_whitespace())
      .take_while(|ch| **ch != '\n')
      .collect();

    let name_length = rest
      .char_indices()
      .find(|(index, ch)| {
        let allowed = ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_';
        !allowed || (*index == 0 && ch.is_ascii_digit())
      })
      .map_or(rest.len(), |(index, _)| index);
    if name_length == 0 {
      return false;
    }
    let after = rest[name_length..].trim_start();
    after.starts_with(':') && !after.contains('{')
  }

  fn next(&mut self) -> Option<char> {
    let ch = self.chars.get(self.position).copied();
    self.position += 1;
    ch
  }

  fn peek(&self) -> Option<char> {
    self.chars.get(self.position).copied()
  }

  fn skip_comment(&mut self) {
    self.position += 1;
    while let Some(ch) = self.next() {
      if ch == '*' && self.peek() == Some('/') {
        self.position += 1;
        return;
      }
    }
  }
}

fn finish_statement(buffer: &mut String, nodes: &mut Vec<CssNode>) {
  let statement = std::mem::take(buffer);
  let statement = statement.trim();
  if statement.is_empty() {
    return;
  }

  peel_mixins(statement, nodes);
  let rest = strip_leading_mixins(statement);
  if rest.is_empty() {
    return;
  }

  match find_property_colon(&rest) {
    Some(colon) => nodes.push(CssNode::Declaration {
      property: rest[..colon].trim().to_string(),
      value: rest[colon + 1..].trim().to_string(),
    }),
    None => tracing::debug!(statement = %rest, "ignoring CSS statement without a property"),
  }
}

// The first colon outside parentheses separates property from value.
fn find_property_colon(statement: &str) -> Option<usize> {
  let mut parens = 0usize;
  for (index, ch) in statement.char_indices() {
    match ch {
      '(' => parens += 1,
      ')' => parens = parens.saturating_sub(1),
      ':' if parens == 0 => return Some(index),
      _ => {}
    }
  }
  None
}

fn leading_mixins(text: &str) -> (Vec<usize>, &str) {
  let mut holes = Vec::new();
  let mut rest = text.trim_start();
  loop {
    let parts = split_placeholders(rest);
    match parts.first() {
      Some(TextPart::Hole(index)) => {
        let token = placeholder(*index);
        let after = &rest[token.len()..];
        // A placeholder glued to following text is part of that text, e.g. `${prop}: red`.
        if !after.is_empty() && !after.starts_with(char::is_whitespace) {
          break;
        }
        holes.push(*index);
        rest = after.trim_start();
      }
      _ => break,
    }
  }
  (holes, rest)
}

fn peel_mixins(text: &str, nodes: &mut Vec<CssNode>) {
  let (holes, _) = leading_mixins(text);
  nodes.extend(holes.into_iter().map(CssNode::Mixin));
}

fn strip_leading_mixins(text: &str) -> String {
  leading_mixins(text).1.trim().to_string()
}

fn is_only_mixins(buffer: &str) -> bool {
  let (holes, rest) = leading_mixins(buffer);
  !holes.is_empty() && rest.is_empty()
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  fn declaration(property: &str, value: &str) -> CssNode {
    CssNode::Declaration {
      property: property.into(),
      value: value.into(),
    }
  }

  #[test]
  fn reads_declarations_and_blocks() {
    let nodes = parse_css_text(
      "
        color: red;
        /* comment; with semicolon */
        background: url(data:image/png;base64,abc);
        :hover { color: blue }
        @media (min-width: 30rem) {
          content: 'a;b';
        }
      ",
    );

    assert_eq!(
      nodes,
      vec![
        declaration("color", "red"),
        declaration("background", "url(data:image/png;base64,abc)"),
        CssNode::Block {
          prelude: ":hover".into(),
          children: vec![declaration("color", "blue")],
        },
        CssNode::Block {
          prelude: "@media (min-width: 30rem)".into(),
          children: vec![declaration("content", "'a;b'")],
        },
      ]
    );
  }

  #[test]
  fn keeps_mixins_in_position() {
    let text = format!(
      "color: red;\n{}\nfont-size: {}px;\n{};",
      placeholder(0),
      placeholder(1),
      placeholder(2)
    );

    assert_eq!(
      parse_css_text(&text),
      vec![
        declaration("color", "red"),
        CssNode::Mixin(0),
        declaration("font-size", &format!("{}px", placeholder(1))),
        CssNode::Mixin(2),
      ]
    );
  }

  #[test]
  fn peels_mixins_glued_to_declarations() {
    let text = format!("{} color: red", placeholder(0));

    assert_eq!(
      parse_css_text(&text),
      vec![CssNode::Mixin(0), declaration("color", "red")]
    );
  }

  #[test]
  fn keeps_multiline_values() {
    let nodes = parse_css_text("grid-template-areas:\n  'a b'\n  'c d';");

    assert_eq!(nodes, vec![declaration("grid-template-areas", "'a b'\n  'c d'")]);
  }

  #[test]
  fn splits_declarations_on_newlines() {
    let nodes = parse_css_text("color: red\nfont-size: 12px\n\n  line-height: 1.5\n");

    assert_eq!(
      nodes,
      vec![
        declaration("color", "red"),
        declaration("font-size", "12px"),
        declaration("line-height", "1.5"),
      ]
    );
  }

  #[test]
  fn keeps_multiline_selectors_together() {
    let nodes = parse_css_text("color: red;\na:hover,\nb:focus {\n  color: blue\n}");

    assert_eq!(
      nodes,
      vec![
        declaration("color", "red"),
        CssNode::Block {
          prelude: "a:hover,\nb:focus".into(),
          children: vec![declaration("color", "blue")],
        },
      ]
    );
  }

  #[test]
  fn splits_placeholders() {
    let text = format!("calc(100% - {}px)", placeholder(3));

    assert_eq!(
      split_placeholders(&text),
      vec![
        TextPart::Text("calc(100% - ".into()),
        TextPart::Hole(3),
        TextPart::Text("px)".into()),
      ]
    );
  }
}
