//! Dynamic declaration values become CSS custom properties set from the element's `style`.

use indexmap::IndexMap;
use swc_core::ecma::ast::Expr;

use crate::ast::{call_expr, ident_expr, print_expr, str_expr};
use crate::hash::hash;
use crate::normalize::ValuePart;

/// Runtime helper that coerces a value into a custom property value.
pub const IX: &str = "ix";

const CSS_UNITS: &[&str] = &[
  "em", "ex", "cap", "ch", "ic", "rem", "lh", "rlh", "vw", "vh", "vi", "vb", "vmin", "vmax", "cm",
  "mm", "Q", "in", "pc", "pt", "px", "deg", "grad", "rad", "turn", "s", "ms", "Hz", "kHz", "dpi",
  "dpcm", "dppx", "x", "fr", "%",
];

const SUFFIX_TERMINATORS: &[char] = &[';', ',', '\n', ' ', ')'];

#[derive(Clone, Debug)]
pub struct CssVariableBinding {
  /// `--_` followed by the hash of the expression and its affixes.
  pub name: String,
  pub expr: Box<Expr>,
  /// Text applied before the runtime value, such as `-` in `-${x}px`.
  pub prefix: Option<String>,
  /// Text applied after the runtime value, such as `px` in `${x}px`.
  pub suffix: Option<String>,
}

impl CssVariableBinding {
  /// True when the runtime value is concatenated with static text.
  pub fn needs_string_coercion(&self) -> bool {
    self.prefix.is_some() || self.suffix.is_some()
  }

  /// `ix(expr)`, `ix(expr, suffix)` or `ix(expr, suffix, prefix)`.
  pub fn runtime_value(&self) -> Expr {
    let mut args = vec![(*self.expr).clone()];
    match (&self.suffix, &self.prefix) {
      (Some(suffix), Some(prefix)) => {
        args.push(str_expr(suffix));
        args.push(str_expr(prefix));
      }
      (Some(suffix), None) => args.push(str_expr(suffix)),
      (None, Some(prefix)) => {
        args.push(str_expr(""));
        args.push(str_expr(prefix));
      }
      (None, None) => {}
    }
    call_expr(ident_expr(IX), args)
  }
}

/// Collects the custom properties of one usage site.
///
/// Bindings are keyed by variable name, so the same expression used twice with the same
/// affixes shares one entry in the style object.
#[derive(Debug, Default)]
pub struct VariableBinder {
  bindings: IndexMap<String, CssVariableBinding>,
}

impl VariableBinder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replaces each hole of a declaration value with a `var()` reference.
  ///
  /// Returns the CSS value text and the bindings this declaration uses.
  pub fn bind(&mut self, parts: &[ValuePart], property: &str) -> (String, Vec<CssVariableBinding>) {
    let mut css = String::new();
    let mut used = Vec::new();
    let mut index = 0;

    while index < parts.len() {
      match &parts[index] {
        ValuePart::Text(text) => css.push_str(text),
        ValuePart::Hole(expr) => {
          let after = match parts.get(index + 1) {
            Some(ValuePart::Text(text)) => {
              index += 1;
              text.as_str()
            }
            _ => "",
          };
          let affixes = split_affixes(&css, after);
          css = affixes.before;

          let binding = self.binding(expr, affixes.prefix, affixes.suffix);
          tracing::trace!(property, name = %binding.name, "bound css variable");
          css.push_str("var(");
          css.push_str(&binding.name);
          css.push(')');
          css.push_str(&affixes.after);
          used.push(binding);
        }
      }
      index += 1;
    }

    (css, used)
  }

  fn binding(
    &mut self,
    expr: &Expr,
    prefix: Option<String>,
    suffix: Option<String>,
  ) -> CssVariableBinding {
    let name = variable_name(expr, prefix.as_deref(), suffix.as_deref());
    self
      .bindings
      .entry(name.clone())
      .or_insert_with(|| CssVariableBinding {
        name,
        expr: Box::new(expr.clone()),
        prefix,
        suffix,
      })
      .clone()
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }

  /// Bindings in first-use order.
  pub fn into_bindings(self) -> Vec<CssVariableBinding> {
    self.bindings.into_values().collect()
  }
}

/// The custom property name for a runtime expression.
pub fn variable_name(expr: &Expr, prefix: Option<&str>, suffix: Option<&str>) -> String {
  let mut input = String::new();
  if let Some(prefix) = prefix {
    input.push_str(prefix);
  }
  input.push_str(&canonical_source(expr));
  if let Some(suffix) = suffix {
    input.push_str(suffix);
  }
  format!("--_{}", hash(&input))
}

// Single-line expressions hash the same however they were spaced.
fn canonical_source(expr: &Expr) -> String {
  let printed = print_expr(expr);
  if printed.contains('\n') || printed.contains("/*") || printed.contains("//") {
    return printed;
  }
  printed.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct Affixes {
  before: String,
  after: String,
  prefix: Option<String>,
  suffix: Option<String>,
}

/// Moves the text that must travel with the runtime value out of the CSS around a hole.
fn split_affixes(before: &str, after: &str) -> Affixes {
  if before.ends_with("url(") && after.starts_with(')') {
    return Affixes {
      before: before[..before.len() - "url(".len()].to_string(),
      after: after[1..].to_string(),
      prefix: Some("url(".to_string()),
      suffix: Some(")".to_string()),
    };
  }

  let (before, prefix) = match before.chars().last() {
    Some(ch @ ('"' | '\'' | '-')) => (&before[..before.len() - 1], Some(ch.to_string())),
    _ => (before, None),
  };
  let (after, suffix) = split_suffix(after);

  Affixes {
    before: before.to_string(),
    after: after.to_string(),
    prefix,
    suffix,
  }
}

fn split_suffix(after: &str) -> (&str, Option<String>) {
  for unit in CSS_UNITS {
    if let Some(rest) = after.strip_prefix(unit) {
      let terminated = rest
        .chars()
        .next()
        .map_or(true, |ch| SUFFIX_TERMINATORS.contains(&ch));
      if terminated {
        return (rest, Some(unit.to_string()));
      }
    }
  }
  match after.chars().next() {
    Some(ch @ ('"' | '\'')) => (&after[1..], Some(ch.to_string())),
    _ => (after, None),
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::ast::{ident_expr, member_expr};

  fn text(value: &str) -> ValuePart {
    ValuePart::Text(value.to_string())
  }

  fn hole(name: &str) -> ValuePart {
    ValuePart::Hole(Box::new(ident_expr(name)))
  }

  #[test]
  fn moves_units_into_the_runtime_suffix() {
    let mut binder = VariableBinder::new();
    let (css, bindings) = binder.bind(&[hole("width"), text("px")], "width");

    assert_eq!(bindings.len(), 1);
    assert_eq!(css, format!("var({})", bindings[0].name));
    assert_eq!(bindings[0].suffix.as_deref(), Some("px"));
    assert_eq!(print_expr(&bindings[0].runtime_value()), r#"ix(width, "px")"#);
  }

  #[test]
  fn keeps_surrounding_css_static() {
    let mut binder = VariableBinder::new();
    let (css, bindings) = binder.bind(
      &[text("calc(100% - "), hole("gutter"), text("px)")],
      "width",
    );

    assert_eq!(css, format!("calc(100% - var({}))", bindings[0].name));
    assert_eq!(bindings[0].prefix, None);
    assert_eq!(bindings[0].suffix.as_deref(), Some("px"));
  }

  #[test]
  fn negated_values_get_their_own_variable() {
    let mut binder = VariableBinder::new();
    let (_, plain) = binder.bind(&[hole("offset"), text("px")], "margin-top");
    let (css, negated) = binder.bind(&[text("-"), hole("offset"), text("px")], "margin-bottom");

    assert_ne!(plain[0].name, negated[0].name);
    assert_eq!(css, format!("var({})", negated[0].name));
    assert_eq!(
      print_expr(&negated[0].runtime_value()),
      r#"ix(offset, "px", "-")"#
    );
  }

  #[test]
  fn shares_variables_within_a_usage() {
    let mut binder = VariableBinder::new();
    binder.bind(&[hole("color")], "color");
    binder.bind(&[hole("color")], "border-color");
    binder.bind(&[text("1px solid "), hole("color")], "outline");

    let bindings = binder.into_bindings();
    assert_eq!(bindings.len(), 1);
    assert_eq!(print_expr(&bindings[0].runtime_value()), "ix(color)");
  }

  #[test]
  fn binds_each_hole_separately() {
    let mut binder = VariableBinder::new();
    let (css, bindings) = binder.bind(
      &[hole("x"), text("px "), hole("y"), text("em")],
      "transform-origin",
    );

    assert_eq!(bindings.len(), 2);
    assert_eq!(
      css,
      format!("var({}) var({})", bindings[0].name, bindings[1].name)
    );
    assert_eq!(bindings[1].suffix.as_deref(), Some("em"));
  }

  #[test]
  fn wraps_urls_and_quotes() {
    let mut binder = VariableBinder::new();
    let (css, bindings) = binder.bind(&[text("url("), hole("src"), text(")")], "background-image");
    assert_eq!(css, format!("var({})", bindings[0].name));
    assert_eq!(
      print_expr(&bindings[0].runtime_value()),
      r#"ix(src, ")", "url(")"#
    );

    let (css, bindings) = binder.bind(&[text("\""), hole("label"), text("\"")], "content");
    assert_eq!(css, format!("var({})", bindings[0].name));
    assert!(bindings[0].needs_string_coercion());
  }

  #[test]
  fn names_are_stable_across_spacing() {
    let spaced = member_expr(ident_expr("props"), "size");
    assert_eq!(
      variable_name(&spaced, None, None),
      variable_name(&member_expr(ident_expr("props"), "size"), None, None)
    );
    assert!(variable_name(&spaced, None, None).starts_with("--_"));
  }
}
