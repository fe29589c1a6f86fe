//! Splits static shorthand values into their longhands so each side can be overridden on
//! its own. Anything that cannot be split losslessly stays one declaration.

use super::table::constituents;

pub(crate) const GLOBAL_VALUES: &[&str] = &["inherit", "initial", "unset", "revert", "revert-layer"];

const BORDER_STYLES: &[&str] = &[
  "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];
const OUTLINE_STYLES: &[&str] = &["auto"];
const WIDTH_KEYWORDS: &[&str] = &["thin", "medium", "thick"];

/// Longhand `(property, value)` pairs for a static shorthand value, or `None` to keep the
/// declaration as written.
pub fn expand_shorthand(property: &str, value: &str) -> Option<Vec<(String, String)>> {
  let value = value.trim();
  if value.is_empty() || value.contains("var(") {
    return None;
  }
  let tokens = split_tokens(value)?;
  let longhands = constituents(property);
  if longhands.is_empty() {
    return None;
  }

  if let [keyword] = tokens.as_slice() {
    if GLOBAL_VALUES.contains(&keyword.to_ascii_lowercase().as_str()) {
      return Some(pairs(longhands, std::iter::repeat(keyword.as_str())));
    }
  }

  match property {
    "margin" | "padding" | "inset" | "scroll-margin" | "scroll-padding" | "border-width"
    | "border-style" | "border-color" => box_sides(longhands, &tokens),
    "border-radius" => {
      if tokens.iter().any(|token| token.contains('/')) {
        None
      } else {
        box_sides(longhands, &tokens)
      }
    }
    "margin-block" | "margin-inline" | "padding-block" | "padding-inline" | "inset-block"
    | "inset-inline" | "scroll-margin-block" | "scroll-margin-inline" | "scroll-padding-block"
    | "scroll-padding-inline" | "overflow" | "overscroll-behavior" | "gap" | "place-items"
    | "place-self" => pair(longhands, &tokens),
    "place-content" => {
      if let [only] = tokens.as_slice() {
        if matches!(only.as_str(), "left" | "right" | "baseline") {
          return None;
        }
      }
      pair(longhands, &tokens)
    }
    "flex-flow" => flex_flow(&tokens),
    "border" | "border-top" | "border-right" | "border-bottom" | "border-left" | "border-block"
    | "border-inline" | "border-block-start" | "border-block-end" | "border-inline-start"
    | "border-inline-end" | "column-rule" => line(property, &tokens),
    "outline" => outline(&tokens),
    _ => None,
  }
}

fn pairs<'v>(properties: &[&str], values: impl Iterator<Item = &'v str>) -> Vec<(String, String)> {
  properties
    .iter()
    .zip(values)
    .map(|(property, value)| (property.to_string(), value.to_string()))
    .collect()
}

/// `top right bottom left` with the usual 1 to 4 value fallbacks.
fn box_sides(longhands: &[&str], tokens: &[String]) -> Option<Vec<(String, String)>> {
  if tokens.len() > 4 || longhands.len() != 4 {
    return None;
  }
  let top = tokens[0].as_str();
  let right = tokens.get(1).map_or(top, String::as_str);
  let bottom = tokens.get(2).map_or(top, String::as_str);
  let left = tokens.get(3).map_or(right, String::as_str);
  Some(pairs(longhands, [top, right, bottom, left].into_iter()))
}

fn pair(longhands: &[&str], tokens: &[String]) -> Option<Vec<(String, String)>> {
  if tokens.len() > 2 || longhands.len() != 2 {
    return None;
  }
  let first = tokens[0].as_str();
  let second = tokens.get(1).map_or(first, String::as_str);
  Some(pairs(longhands, [first, second].into_iter()))
}

fn flex_flow(tokens: &[String]) -> Option<Vec<(String, String)>> {
  let mut direction = None;
  let mut wrap = None;
  for token in tokens {
    let slot = match token.as_str() {
      "row" | "row-reverse" | "column" | "column-reverse" => &mut direction,
      "nowrap" | "wrap" | "wrap-reverse" => &mut wrap,
      _ => return None,
    };
    if slot.replace(token.as_str()).is_some() {
      return None;
    }
  }
  Some(vec![
    ("flex-direction".to_string(), direction.unwrap_or("row").to_string()),
    ("flex-wrap".to_string(), wrap.unwrap_or("nowrap").to_string()),
  ])
}

#[derive(Default)]
struct LineParts<'t> {
  width: Option<&'t str>,
  style: Option<&'t str>,
  color: Option<&'t str>,
}

// Classifies up to three tokens as width, style and color. Repeats are rejected.
fn line_parts<'t>(tokens: &'t [String], styles: &[&str]) -> Option<LineParts<'t>> {
  if tokens.len() > 3 {
    return None;
  }
  let mut parts = LineParts::default();
  for token in tokens {
    let lower = token.to_ascii_lowercase();
    let slot = if BORDER_STYLES.contains(&lower.as_str()) || styles.contains(&lower.as_str()) {
      &mut parts.style
    } else if WIDTH_KEYWORDS.contains(&lower.as_str()) || is_length(token) {
      &mut parts.width
    } else {
      &mut parts.color
    };
    if slot.replace(token.as_str()).is_some() {
      return None;
    }
  }
  Some(parts)
}

/// `border`, `border-*` and `column-rule`: width, style and color.
fn line(property: &str, tokens: &[String]) -> Option<Vec<(String, String)>> {
  let parts = line_parts(tokens, &[])?;
  let width = parts.width.unwrap_or("medium");
  let style = parts.style.unwrap_or("none");
  let color = parts.color.unwrap_or("currentcolor");

  // `border-block` and `border-inline` set both of their sides.
  let sides: Vec<&str> = match property {
    "border-block" | "border-inline" => constituents(property).to_vec(),
    _ => vec![property],
  };
  let mut out = Vec::with_capacity(sides.len() * 3);
  for side in sides {
    let prefix = if side == "border" { "border".to_string() } else { side.to_string() };
    out.push((format!("{prefix}-width"), width.to_string()));
    out.push((format!("{prefix}-style"), style.to_string()));
    out.push((format!("{prefix}-color"), color.to_string()));
  }
  Some(out)
}

fn outline(tokens: &[String]) -> Option<Vec<(String, String)>> {
  let parts = line_parts(tokens, OUTLINE_STYLES)?;
  Some(vec![
    ("outline-color".to_string(), parts.color.unwrap_or("currentcolor").to_string()),
    ("outline-style".to_string(), parts.style.unwrap_or("none").to_string()),
    ("outline-width".to_string(), parts.width.unwrap_or("medium").to_string()),
  ])
}

fn is_length(token: &str) -> bool {
  let token = token.trim_start_matches(['+', '-']);
  let digits = token
    .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
    .unwrap_or(token.len());
  if digits == 0 {
    return token.starts_with("calc(");
  }
  let unit = &token[digits..];
  unit.is_empty() || unit.chars().all(|ch| ch.is_ascii_alphabetic())
}

/// Splits a value at top-level whitespace. `None` when the value is a comma-separated list.
fn split_tokens(value: &str) -> Option<Vec<String>> {
  let mut tokens = Vec::new();
  let mut current = String::new();
  let mut depth = 0usize;
  let mut quote: Option<char> = None;

  for ch in value.chars() {
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
      (None, '(') => {
        depth += 1;
        current.push(ch);
      }
      (None, ')') => {
        depth = depth.saturating_sub(1);
        current.push(ch);
      }
      (None, ',') if depth == 0 => return None,
      (None, ch) if ch.is_whitespace() && depth == 0 => {
        if !current.is_empty() {
          tokens.push(std::mem::take(&mut current));
        }
      }
      _ => current.push(ch),
    }
  }
  if !current.is_empty() {
    tokens.push(current);
  }
  Some(tokens)
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  fn expand(property: &str, value: &str) -> Vec<String> {
    expand_shorthand(property, value)
      .unwrap_or_default()
      .into_iter()
      .map(|(property, value)| format!("{property}:{value}"))
      .collect()
  }

  #[test]
  fn expands_box_sides() {
    assert_eq!(
      expand("padding", "0 4px"),
      vec!["padding-top:0", "padding-right:4px", "padding-bottom:0", "padding-left:4px"]
    );
    assert_eq!(
      expand("margin", "1px 2px 3px"),
      vec!["margin-top:1px", "margin-right:2px", "margin-bottom:3px", "margin-left:2px"]
    );
    assert_eq!(
      expand("border-radius", "4px"),
      vec![
        "border-top-left-radius:4px",
        "border-top-right-radius:4px",
        "border-bottom-right-radius:4px",
        "border-bottom-left-radius:4px",
      ]
    );
    assert_eq!(expand_shorthand("border-radius", "4px / 2px"), None);
  }

  #[test]
  fn expands_pairs() {
    assert_eq!(
      expand("overflow", "hidden auto"),
      vec!["overflow-x:hidden", "overflow-y:auto"]
    );
    assert_eq!(expand("gap", "8px"), vec!["row-gap:8px", "column-gap:8px"]);
    assert_eq!(
      expand("margin-inline", "auto"),
      vec!["margin-inline-start:auto", "margin-inline-end:auto"]
    );
    assert_eq!(expand_shorthand("place-content", "left"), None);
  }

  #[test]
  fn expands_lines_with_defaults() {
    assert_eq!(
      expand("border", "1px solid red"),
      vec!["border-width:1px", "border-style:solid", "border-color:red"]
    );
    assert_eq!(
      expand("border-top", "none"),
      vec![
        "border-top-width:medium",
        "border-top-style:none",
        "border-top-color:currentcolor",
      ]
    );
    assert_eq!(
      expand("outline", "red dotted 2px"),
      vec!["outline-color:red", "outline-style:dotted", "outline-width:2px"]
    );
    assert_eq!(expand_shorthand("border", "1px 2px"), None);
  }

  #[test]
  fn expands_flex_flow() {
    assert_eq!(
      expand("flex-flow", "column"),
      vec!["flex-direction:column", "flex-wrap:nowrap"]
    );
    assert_eq!(expand_shorthand("flex-flow", "sideways"), None);
  }

  #[test]
  fn spreads_global_keywords() {
    assert_eq!(
      expand("overflow", "inherit"),
      vec!["overflow-x:inherit", "overflow-y:inherit"]
    );
  }

  #[test]
  fn keeps_opaque_values() {
    assert_eq!(expand_shorthand("padding", "var(--space)"), None);
    assert_eq!(expand_shorthand("transition", "opacity 1s, color 2s"), None);
    assert_eq!(expand_shorthand("font", "12px/1.5 sans-serif"), None);
    assert_eq!(expand_shorthand("flex", "1"), None);
    assert_eq!(expand_shorthand("color", "red"), None);
  }
}
