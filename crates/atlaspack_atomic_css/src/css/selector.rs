/// Where a declaration lives: nested selector segments and enclosing at-rules, outermost
/// first. The empty path is the element itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorPath {
  pub selectors: Vec<String>,
  pub at_rules: Vec<String>,
}

impl SelectorPath {
  pub fn with_selector(&self, segment: &str) -> Self {
    let mut path = self.clone();
    path.selectors.push(collapse(segment));
    path
  }

  pub fn with_at_rule(&self, at_rule: &str) -> Self {
    let mut path = self.clone();
    path.at_rules.push(collapse(at_rule));
    path
  }

  /// The selector with `&` standing for the element, e.g. `&:hover::before`.
  pub fn selector(&self) -> String {
    self.selectors.iter().fold(String::from("&"), |parent, segment| {
      if segment.contains('&') {
        segment.replace('&', &parent)
      } else if is_pseudo(segment) {
        format!("{parent}{segment}")
      } else {
        format!("{parent} {segment}")
      }
    })
  }

  /// At-rules as they enter the class name hash: `media(min-width: 30rem)`, concatenated.
  pub fn at_rule_label(&self) -> Option<String> {
    if self.at_rules.is_empty() {
      return None;
    }
    Some(
      self
        .at_rules
        .iter()
        .map(|at_rule| {
          let (name, params) = split_at_rule(at_rule);
          format!("{name}{params}")
        })
        .collect(),
    )
  }

  /// At-rules as they are printed around a rule: `@media (min-width:30rem)`.
  pub fn printed_at_rules(&self) -> Vec<String> {
    self
      .at_rules
      .iter()
      .map(|at_rule| {
        let (name, params) = split_at_rule(at_rule);
        if params.is_empty() {
          format!("@{name}")
        } else {
          format!("@{name} {}", normalize_at_query(params))
        }
      })
      .collect()
  }
}

pub fn is_pseudo(selector: &str) -> bool {
  selector.starts_with(':')
}

pub fn is_at_rule(key: &str) -> bool {
  key.starts_with('@')
}

/// Splits `@media screen` into `("media", "screen")`.
pub fn split_at_rule(at_rule: &str) -> (&str, &str) {
  let body = at_rule.trim().trim_start_matches('@');
  match body.find(|ch: char| ch.is_whitespace() || ch == '(') {
    Some(index) => (&body[..index], body[index..].trim()),
    None => (body, ""),
  }
}

/// Splits a selector list at top-level commas.
pub fn split_selector_list(selector: &str) -> Vec<String> {
  let mut parts = Vec::new();
  let mut current = String::new();
  let mut depth = 0usize;
  let mut quote: Option<char> = None;

  for ch in selector.chars() {
    match (quote, ch) {
      (Some(open), _) => {
        if ch == open {
          quote = None;
        }
        current.push(ch);
      }
      (None, '"' | '\'') => {
        quote = Some(ch);
        current.push(ch);
      }
      (None, '(' | '[') => {
        depth += 1;
        current.push(ch);
      }
      (None, ')' | ']') => {
        depth = depth.saturating_sub(1);
        current.push(ch);
      }
      (None, ',') if depth == 0 => {
        parts.push(current.trim().to_string());
        current.clear();
      }
      _ => current.push(ch),
    }
  }
  parts.push(current.trim().to_string());
  parts.retain(|part| !part.is_empty());
  parts
}

/// Tightens an at-rule query: `( min-width : 30rem )` becomes `(min-width:30rem)`.
pub fn normalize_at_query(query: &str) -> String {
  let query = collapse(query);
  let mut out = String::with_capacity(query.len());
  let mut chars = query.chars().peekable();

  while let Some(ch) = chars.next() {
    match ch {
      '(' => {
        out.push(ch);
        while chars.peek() == Some(&' ') {
          chars.next();
        }
      }
      ')' | ':' | ',' => {
        if out.ends_with(' ') {
          out.pop();
        }
        out.push(ch);
        if ch != ')' {
          while chars.peek() == Some(&' ') {
            chars.next();
          }
        }
      }
      _ => out.push(ch),
    }
  }
  out
}

fn collapse(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn resolves_nested_selectors() {
    let root = SelectorPath::default();
    assert_eq!(root.selector(), "&");
    assert_eq!(root.with_selector(":hover").selector(), "&:hover");
    assert_eq!(
      root.with_selector("&:hover").with_selector(":before").selector(),
      "&:hover:before"
    );
    assert_eq!(root.with_selector("div").selector(), "& div");
    assert_eq!(root.with_selector("> span").selector(), "& > span");
    assert_eq!(
      root.with_selector(".dark &").with_selector("&:focus").selector(),
      ".dark &:focus"
    );
  }

  #[test]
  fn labels_and_prints_at_rules() {
    let path = SelectorPath::default()
      .with_at_rule("@media (min-width: 30rem)")
      .with_at_rule("@starting-style");

    assert_eq!(
      path.at_rule_label().as_deref(),
      Some("media(min-width: 30rem)starting-style")
    );
    assert_eq!(
      path.printed_at_rules(),
      vec!["@media (min-width:30rem)".to_string(), "@starting-style".to_string()]
    );
    assert_eq!(SelectorPath::default().at_rule_label(), None);
  }

  #[test]
  fn splits_selector_lists_at_top_level() {
    assert_eq!(
      split_selector_list("&:hover, &:is(a, b), [data-x=\"1,2\"]"),
      vec!["&:hover", "&:is(a, b)", "[data-x=\"1,2\"]"]
    );
  }

  #[test]
  fn normalizes_queries() {
    assert_eq!(
      normalize_at_query("screen and ( min-width : 500px ) , print"),
      "screen and (min-width:500px),print"
    );
  }
}
