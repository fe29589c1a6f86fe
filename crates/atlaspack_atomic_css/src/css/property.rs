use once_cell::sync::Lazy;
use regex::Regex;

// Latin-1 uppercase ranges, skipping the multiplication sign.
const UPPER_A_GRAVE: char = '\u{00C0}';
const UPPER_O_DIAERESIS: char = '\u{00D6}';
const UPPER_O_SLASH: char = '\u{00D8}';
const UPPER_THORN: char = '\u{00DE}';

/// Properties whose numeric values are never given a `px` unit.
const UNITLESS_PROPERTIES: &[&str] = &[
  "-webkit-line-clamp",
  "animation-iteration-count",
  "base-palette",
  "border-image-outset",
  "border-image-slice",
  "border-image-width",
  "box-flex",
  "box-flex-group",
  "box-ordinal-group",
  "column-count",
  "columns",
  "fill-opacity",
  "flex",
  "flex-grow",
  "flex-negative",
  "flex-order",
  "flex-positive",
  "flex-shrink",
  "flood-opacity",
  "font-size-adjust",
  "font-weight",
  "grid-area",
  "grid-column",
  "grid-column-end",
  "grid-column-span",
  "grid-column-start",
  "grid-row",
  "grid-row-end",
  "grid-row-span",
  "grid-row-start",
  "line-clamp",
  "line-height",
  "opacity",
  "order",
  "orphans",
  "stop-opacity",
  "stroke-dasharray",
  "stroke-dashoffset",
  "stroke-miterlimit",
  "stroke-opacity",
  "stroke-width",
  "tab-size",
  "widows",
  "z-index",
  "zoom",
];

/// `content` values that are keywords or functions and must stay unquoted.
const CONTENT_KEYWORDS: &[&str] = &[
  "none",
  "normal",
  "inherit",
  "initial",
  "unset",
  "revert",
  "revert-layer",
  "open-quote",
  "close-quote",
  "no-open-quote",
  "no-close-quote",
];

const CONTENT_FUNCTIONS: &[&str] = &[
  "attr(",
  "counter(",
  "counters(",
  "url(",
  "linear-gradient(",
  "image-set(",
  "var(",
];

static IMPORTANT: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?i)\s*!\s*important\s*$").expect("valid important pattern"));

/// Converts a camelCase property to kebab-case. Custom properties are left untouched.
pub fn kebab_case(property: &str) -> String {
  if property.starts_with("--") {
    return property.to_string();
  }

  let mut result = String::with_capacity(property.len() + 4);
  for ch in property.chars() {
    if matches!(ch, 'A'..='Z' | UPPER_A_GRAVE..=UPPER_O_DIAERESIS | UPPER_O_SLASH..=UPPER_THORN) {
      result.push('-');
      result.extend(ch.to_lowercase());
    } else {
      result.push(ch);
    }
  }
  result
}

pub fn is_unitless(property: &str) -> bool {
  property.starts_with("--") || UNITLESS_PROPERTIES.contains(&property)
}

/// Prints a number the way it appears in minified CSS: `1.5`, `.5`, `-0.25` as `-.25`.
pub fn format_number(value: f64) -> String {
  let value = if value == 0.0 { 0.0 } else { value };
  let mut text = value.to_string();
  if let Some(stripped) = text.strip_prefix("0.") {
    text = format!(".{stripped}");
  } else if let Some(stripped) = text.strip_prefix("-0.") {
    text = format!("-.{stripped}");
  }
  text
}

/// CSS text for a numeric value of `property` (kebab-case), adding `px` where a length is meant.
pub fn number_value(property: &str, value: f64) -> String {
  if value == 0.0 || is_unitless(property) {
    format_number(value)
  } else {
    format!("{}px", format_number(value))
  }
}

/// Splits a trailing `!important` off a value.
pub fn split_important(value: &str) -> (String, bool) {
  match IMPORTANT.find(value) {
    Some(found) => (value[..found.start()].trim().to_string(), true),
    None => (value.trim().to_string(), false),
  }
}

/// Quotes bare `content` values so they render as strings.
pub fn normalize_content_value(value: &str) -> String {
  let value = value.trim();
  if value.is_empty() {
    return "\"\"".to_string();
  }
  if value.starts_with('"') || value.starts_with('\'') {
    return value.to_string();
  }
  let lower = value.to_ascii_lowercase();
  if CONTENT_KEYWORDS.contains(&lower.as_str())
    || CONTENT_FUNCTIONS.iter().any(|function| lower.starts_with(function))
  {
    return value.to_string();
  }
  format!("\"{value}\"")
}

/// Collapses whitespace runs outside of strings to one space and trims the ends.
pub fn collapse_whitespace(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  let mut quote: Option<char> = None;
  let mut pending_space = false;

  for ch in value.trim().chars() {
    match quote {
      Some(open) => {
        out.push(ch);
        if ch == open {
          quote = None;
        }
      }
      None if ch.is_whitespace() => pending_space = true,
      None => {
        if pending_space && !out.is_empty() {
          out.push(' ');
        }
        pending_space = false;
        if ch == '"' || ch == '\'' {
          quote = Some(ch);
        }
        out.push(ch);
      }
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn kebab_cases_properties() {
    assert_eq!(kebab_case("backgroundColor"), "background-color");
    assert_eq!(kebab_case("WebkitLineClamp"), "-webkit-line-clamp");
    assert_eq!(kebab_case("--myColor"), "--myColor");
    assert_eq!(kebab_case("color"), "color");
  }

  #[test]
  fn adds_px_to_lengths_only() {
    assert_eq!(number_value("font-size", 12.0), "12px");
    assert_eq!(number_value("margin", 0.0), "0");
    assert_eq!(number_value("margin", -0.0), "0");
    assert_eq!(number_value("line-height", 1.5), "1.5");
    assert_eq!(number_value("opacity", 0.5), ".5");
    assert_eq!(number_value("z-index", 10.0), "10");
    assert_eq!(number_value("--gap", 4.0), "4");
    assert_eq!(number_value("top", -0.25), "-.25px");
  }

  #[test]
  fn splits_important() {
    assert_eq!(split_important("red !important"), ("red".to_string(), true));
    assert_eq!(split_important("red!IMPORTANT "), ("red".to_string(), true));
    assert_eq!(split_important(" red "), ("red".to_string(), false));
  }

  #[test]
  fn quotes_content_values() {
    assert_eq!(normalize_content_value(""), "\"\"");
    assert_eq!(normalize_content_value("hello"), "\"hello\"");
    assert_eq!(normalize_content_value("'x'"), "'x'");
    assert_eq!(normalize_content_value("none"), "none");
    assert_eq!(normalize_content_value("open-quote"), "open-quote");
    assert_eq!(normalize_content_value("attr(data-label)"), "attr(data-label)");
    assert_eq!(normalize_content_value("counter(item)"), "counter(item)");
  }

  #[test]
  fn collapses_whitespace_outside_strings() {
    assert_eq!(
      collapse_whitespace("\n  1px\n   solid   'a  b' "),
      "1px solid 'a  b'"
    );
  }
}
