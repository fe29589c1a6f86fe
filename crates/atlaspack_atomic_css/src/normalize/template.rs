use swc_core::common::{Span, Spanned};
use swc_core::ecma::ast::{Expr, Tpl};

use super::{Guard, Normalizer, ValuePart};
use crate::ast::unwrap_expr;
use crate::css::text::{parse_css_text, placeholder, split_placeholders, CssNode, TextPart};
use crate::css::{is_at_rule, split_selector_list, SelectorPath};
use crate::errors::{CompileError, ErrorKind};
use crate::evaluate::StaticValue;

impl<'a, 'e> Normalizer<'a, 'e> {
  /// Normalizes the CSS text of a template literal, with its interpolations as holes.
  pub(super) fn template(&mut self, tpl: &Tpl, path: &SelectorPath, guard: &Guard) -> Result<(), CompileError> {
    let mut text = String::new();
    for (index, quasi) in tpl.quasis.iter().enumerate() {
      text.push_str(&quasi.raw);
      if index < tpl.exprs.len() {
        text.push_str(&placeholder(index));
      }
    }
    self.css_text(&text, &tpl.exprs, tpl.span, path, guard)
  }

  pub(super) fn css_text(
    &mut self,
    text: &str,
    holes: &[Box<Expr>],
    span: Span,
    path: &SelectorPath,
    guard: &Guard,
  ) -> Result<(), CompileError> {
    let nodes = parse_css_text(text);
    self.css_nodes(&nodes, holes, span, path, guard)
  }

  fn css_nodes(
    &mut self,
    nodes: &[CssNode],
    holes: &[Box<Expr>],
    span: Span,
    path: &SelectorPath,
    guard: &Guard,
  ) -> Result<(), CompileError> {
    for node in nodes {
      match node {
        CssNode::Declaration { property, value } => {
          self.text_declaration(property, value, holes, span, path, guard)?
        }
        CssNode::Block { prelude, children } => {
          let prelude = self.static_text(prelude, holes, ErrorKind::DynamicSelector)?;
          if is_at_rule(&prelude) {
            self.css_nodes(children, holes, span, &path.with_at_rule(&prelude), guard)?;
          } else {
            for selector in split_selector_list(&prelude) {
              self.css_nodes(children, holes, span, &path.with_selector(&selector), guard)?;
            }
          }
        }
        CssNode::Mixin(index) => {
          if let Some(mixin) = holes.get(*index) {
            self.style(mixin, path, guard)?;
          }
        }
      }
    }
    Ok(())
  }

  fn text_declaration(
    &mut self,
    property: &str,
    value: &str,
    holes: &[Box<Expr>],
    span: Span,
    path: &SelectorPath,
    guard: &Guard,
  ) -> Result<(), CompileError> {
    let property = self.static_text(property, holes, ErrorKind::StaticPropertyKey)?;
    let property = property.trim().to_ascii_lowercase();
    let parts = split_placeholders(value);

    // `color: ${expr};` keeps the conditional structure of `expr`.
    if let [TextPart::Hole(index)] = parts.as_slice() {
      if let Some(hole) = holes.get(*index) {
        return self.declaration_expr(&property, hole, path, guard);
      }
    }

    let mut value = Vec::with_capacity(parts.len());
    for part in parts {
      match part {
        TextPart::Text(text) => value.push(ValuePart::Text(text)),
        TextPart::Hole(index) => {
          let Some(hole) = holes.get(index) else {
            continue;
          };
          match self.evaluator.evaluate(hole) {
            StaticValue::Nullish => {}
            folded => match folded.to_js_string() {
              Some(text) => value.push(ValuePart::Text(text)),
              None => value.push(self.hole(hole)?),
            },
          }
        }
      }
    }
    self.finish_declaration(&property, value, span, path, guard)
  }

  // Text that must be known at compile time, such as a property name or a selector.
  fn static_text(&mut self, text: &str, holes: &[Box<Expr>], kind: ErrorKind) -> Result<String, CompileError> {
    let mut out = String::with_capacity(text.len());
    for part in split_placeholders(text) {
      match part {
        TextPart::Text(text) => out.push_str(&text),
        TextPart::Hole(index) => {
          let Some(hole) = holes.get(index) else {
            continue;
          };
          match self.evaluator.evaluate(unwrap_expr(hole)).to_js_string() {
            Some(text) => out.push_str(&text),
            None => return Err(CompileError::new(kind, hole.span())),
          }
        }
      }
    }
    Ok(out)
  }
}
