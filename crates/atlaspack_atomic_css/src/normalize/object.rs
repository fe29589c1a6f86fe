use std::borrow::Cow;

use indexmap::IndexMap;
use swc_core::common::{Span, Spanned};
use swc_core::ecma::ast::{
  ArrowExpr, BinaryOp, Callee, Expr, ObjectLit, Prop, PropName, PropOrSpread,
};

use super::{Branch, Guard, Normalizer, StyleContext, StyleDeclaration, ValuePart};
use crate::ast::{arrow_body_expr, static_prop_name, unwrap_expr};
use crate::css::{
  collapse_whitespace, is_at_rule, kebab_case, normalize_content_value, number_value,
  split_at_rule, split_important, split_selector_list, SelectorPath,
};
use crate::errors::{CompileError, ErrorKind};
use crate::evaluate::{Slot, StaticValue, TemplatePart};
use crate::scope::StyleApi;

/// At-rules whose bare key holds an object of queries, e.g. `'@media': { 'screen': {} }`.
pub(super) const GROUPED_AT_RULES: &[&str] = &["container", "document", "layer", "media", "scope", "supports"];

/// The value side of an object entry, either still an expression or already evaluated.
pub(super) enum EntryValue<'v> {
  Expr(&'v Expr),
  Value(StaticValue),
}

impl<'a, 'e> Normalizer<'a, 'e> {
  pub(super) fn object(&mut self, object: &ObjectLit, path: &SelectorPath, guard: &Guard) -> Result<(), CompileError> {
    for prop in &object.props {
      match prop {
        PropOrSpread::Spread(spread) => self.spread(&spread.expr, path, guard)?,
        PropOrSpread::Prop(prop) => {
          let (key, value) = self.prop_entry(prop)?;
          self.entry(&key, EntryValue::Expr(&value), prop.span(), path, guard)?;
        }
      }
    }
    Ok(())
  }

  pub(super) fn object_value(
    &mut self,
    map: &IndexMap<String, Slot>,
    span: Span,
    path: &SelectorPath,
    guard: &Guard,
  ) -> Result<(), CompileError> {
    for (key, slot) in map {
      let value = match slot {
        Slot::Static(value) => EntryValue::Value(value.clone()),
        Slot::Dynamic(expr) => EntryValue::Expr(expr),
      };
      self.entry(key, value, span, path, guard)?;
    }
    Ok(())
  }

  /// The key and value of a plain property. Methods and accessors are rejected.
  pub(super) fn prop_entry<'p>(&mut self, prop: &'p Prop) -> Result<(String, Cow<'p, Expr>), CompileError> {
    match prop {
      Prop::KeyValue(kv) => Ok((self.prop_key(&kv.key)?, Cow::Borrowed(&*kv.value))),
      Prop::Shorthand(ident) => Ok((ident.sym.to_string(), Cow::Owned(Expr::Ident(ident.clone())))),
      _ => Err(CompileError::at(ErrorKind::NoObjectMethod, prop)),
    }
  }

  fn prop_key(&mut self, key: &PropName) -> Result<String, CompileError> {
    if let Some(name) = static_prop_name(key) {
      return Ok(name);
    }
    let PropName::Computed(computed) = key else {
      return Err(CompileError::at(ErrorKind::StaticPropertyKey, key));
    };
    match self.evaluator.evaluate(&computed.expr).to_js_string() {
      Some(name) => Ok(name),
      None if self.context.is_strict() => Err(CompileError::at(ErrorKind::StaticPropertyKey, key)),
      None => Err(CompileError::at(ErrorKind::DynamicSelector, key)),
    }
  }

  pub(super) fn entry(
    &mut self,
    key: &str,
    value: EntryValue<'_>,
    span: Span,
    path: &SelectorPath,
    guard: &Guard,
  ) -> Result<(), CompileError> {
    if is_at_rule(key) {
      return self.at_rule(key, value, span, path, guard);
    }
    if !self.is_nested(key, &value) {
      return self.declaration(key, value, span, path, guard);
    }

    for selector in split_selector_list(key) {
      let nested = path.with_selector(&selector);
      match &value {
        EntryValue::Expr(expr) => self.style(expr, &nested, guard)?,
        EntryValue::Value(value) => self.static_style(value.clone(), span, &nested, guard)?,
      }
    }
    Ok(())
  }

  fn at_rule(
    &mut self,
    key: &str,
    value: EntryValue<'_>,
    span: Span,
    path: &SelectorPath,
    guard: &Guard,
  ) -> Result<(), CompileError> {
    let (name, params) = split_at_rule(key);
    if !params.is_empty() || !GROUPED_AT_RULES.contains(&name) {
      return self.at_rule_block(key, value, span, path, guard);
    }

    // `'@media': { '(min-width: 30rem)': {...} }` is `'@media (min-width: 30rem)': {...}`.
    match value {
      EntryValue::Expr(expr) => match unwrap_expr(expr) {
        Expr::Object(queries) => {
          for query in &queries.props {
            let PropOrSpread::Prop(query) = query else {
              return Err(CompileError::at(ErrorKind::NoSpreadElement, query));
            };
            let (params, styles) = self.prop_entry(query)?;
            let at_rule = format!("{} {}", key.trim(), params);
            self.at_rule_block(&at_rule, EntryValue::Expr(&styles), query.span(), path, guard)?;
          }
          Ok(())
        }
        other => match self.evaluator.evaluate(other) {
          StaticValue::Object(queries) => self.grouped_at_rule_value(key, &queries, other.span(), path, guard),
          _ => Err(CompileError::at(ErrorKind::AtRuleValueType, other)),
        },
      },
      EntryValue::Value(StaticValue::Object(queries)) => {
        self.grouped_at_rule_value(key, &queries, span, path, guard)
      }
      EntryValue::Value(_) => Err(CompileError::new(ErrorKind::AtRuleValueType, span)),
    }
  }

  fn grouped_at_rule_value(
    &mut self,
    key: &str,
    queries: &IndexMap<String, Slot>,
    span: Span,
    path: &SelectorPath,
    guard: &Guard,
  ) -> Result<(), CompileError> {
    for (params, slot) in queries {
      let at_rule = format!("{} {}", key.trim(), params);
      let value = match slot {
        Slot::Static(value) => EntryValue::Value(value.clone()),
        Slot::Dynamic(expr) => EntryValue::Expr(expr),
      };
      self.at_rule_block(&at_rule, value, span, path, guard)?;
    }
    Ok(())
  }

  pub(super) fn at_rule_block(
    &mut self,
    at_rule: &str,
    value: EntryValue<'_>,
    span: Span,
    path: &SelectorPath,
    guard: &Guard,
  ) -> Result<(), CompileError> {
    let nested = path.with_at_rule(at_rule);
    match value {
      EntryValue::Expr(expr) => match unwrap_expr(expr) {
        Expr::Lit(_) | Expr::Tpl(_) => Err(CompileError::at(ErrorKind::AtRuleValueType, expr)),
        _ => self.style(expr, &nested, guard),
      },
      EntryValue::Value(value @ (StaticValue::Object(_) | StaticValue::Array(_))) => {
        self.static_style(value, span, &nested, guard)
      }
      EntryValue::Value(_) => Err(CompileError::new(ErrorKind::AtRuleValueType, span)),
    }
  }

  // Whether an entry holds nested styles rather than a declaration value.
  fn is_nested(&mut self, key: &str, value: &EntryValue<'_>) -> bool {
    let expr = match value {
      EntryValue::Value(value) => return matches!(value, StaticValue::Object(_) | StaticValue::Array(_)),
      EntryValue::Expr(expr) => unwrap_expr(expr),
    };
    match expr {
      Expr::Object(_) | Expr::Array(_) | Expr::TaggedTpl(_) => true,
      Expr::Lit(_) | Expr::Tpl(_) | Expr::Arrow(_) | Expr::Fn(_) | Expr::Unary(_) => false,
      Expr::Call(call) if self.is_css_call(&call.callee) => true,
      Expr::Cond(cond) => {
        looks_like_selector(key) || self.is_nested(key, &EntryValue::Expr(&cond.cons))
      }
      Expr::Bin(bin) if is_logical(bin.op) => {
        looks_like_selector(key) || self.is_nested(key, &EntryValue::Expr(&bin.right))
      }
      Expr::Bin(_) => false,
      _ => {
        looks_like_selector(key)
          || matches!(
            self.evaluator.evaluate(expr),
            StaticValue::Object(_) | StaticValue::Array(_)
          )
      }
    }
  }

  fn is_css_call(&self, callee: &Callee) -> bool {
    match callee {
      Callee::Expr(callee) => self.evaluator.scope().style_api_of(callee) == Some(StyleApi::Css),
      _ => false,
    }
  }

  fn declaration(
    &mut self,
    key: &str,
    value: EntryValue<'_>,
    span: Span,
    path: &SelectorPath,
    guard: &Guard,
  ) -> Result<(), CompileError> {
    let property = kebab_case(key);
    match value {
      EntryValue::Expr(expr) => self.declaration_expr(&property, expr, path, guard),
      EntryValue::Value(value) => {
        let parts = match value {
          StaticValue::String(text) => vec![ValuePart::Text(text)],
          StaticValue::Number(number) => vec![ValuePart::Text(number_value(&property, number))],
          StaticValue::Nullish | StaticValue::Boolean(_) => return Ok(()),
          _ => {
            return Err(
              CompileError::new(ErrorKind::UnsupportedNode, span)
                .with_message(format!("This value cannot be used for `{property}`.")),
            )
          }
        };
        self.finish_declaration(&property, parts, span, path, guard)
      }
    }
  }

  /// Lowers the value expression of `property`, splitting conditional values into guarded
  /// declarations.
  pub(super) fn declaration_expr(
    &mut self,
    property: &str,
    expr: &Expr,
    path: &SelectorPath,
    guard: &Guard,
  ) -> Result<(), CompileError> {
    let span = expr.span();
    let expr = unwrap_expr(expr);

    match expr {
      Expr::Cond(cond) => match self.evaluator.evaluate(&cond.test).truthiness() {
        Some(true) => return self.declaration_expr(property, &cond.cons, path, guard),
        Some(false) => return self.declaration_expr(property, &cond.alt, path, guard),
        None if self.is_scalar(&cond.cons) && self.is_scalar(&cond.alt) => {
          let id = self.guard_id();
          let consequent = self.guarded(guard, &cond.test, Branch::Consequent, id);
          self.declaration_expr(property, &cond.cons, path, &consequent)?;
          let alternate = self.guarded(guard, &cond.test, Branch::Alternate, id);
          return self.declaration_expr(property, &cond.alt, path, &alternate);
        }
        None => {}
      },
      Expr::Bin(bin) if bin.op == BinaryOp::LogicalAnd => {
        if !self.evaluator.evaluate(&bin.left).is_resolved() && self.is_scalar(&bin.right) {
          let id = self.guard_id();
          let truthy = self.guarded(guard, &bin.left, Branch::Truthy, id);
          return self.declaration_expr(property, &bin.right, path, &truthy);
        }
      }
      Expr::Arrow(arrow) => {
        let body = self.function_body(arrow);
        return self.declaration_expr(property, &body, path, guard);
      }
      _ => {}
    }

    let parts = match self.evaluator.evaluate(expr) {
      StaticValue::String(text) => vec![ValuePart::Text(text)],
      StaticValue::Number(number) => vec![ValuePart::Text(number_value(property, number))],
      StaticValue::Nullish | StaticValue::Boolean(_) => return Ok(()),
      StaticValue::Object(_) | StaticValue::Array(_) | StaticValue::Function(_) => {
        return Err(
          CompileError::at(ErrorKind::UnsupportedNode, expr)
            .with_message(format!("This value cannot be used for `{property}`.")),
        )
      }
      StaticValue::Unresolvable => self.dynamic_parts(expr)?,
    };
    self.finish_declaration(property, parts, span, path, guard)
  }

  // A value that folds to something a declaration can hold, or a nested conditional of them.
  fn is_scalar(&mut self, expr: &Expr) -> bool {
    let expr = unwrap_expr(expr);
    match self.evaluator.evaluate(expr) {
      StaticValue::String(_) | StaticValue::Number(_) | StaticValue::Nullish | StaticValue::Boolean(false) => true,
      StaticValue::Unresolvable => match expr {
        Expr::Cond(cond) => self.is_scalar(&cond.cons) && self.is_scalar(&cond.alt),
        _ => false,
      },
      _ => false,
    }
  }

  fn dynamic_parts(&mut self, expr: &Expr) -> Result<Vec<ValuePart>, CompileError> {
    if let Expr::Tpl(tpl) = expr {
      let mut parts = Vec::new();
      for part in self.evaluator.evaluate_template(tpl) {
        match part {
          TemplatePart::Text(text) => parts.push(ValuePart::Text(text)),
          TemplatePart::Dynamic(hole) => parts.push(self.hole(&hole)?),
        }
      }
      return Ok(parts);
    }
    Ok(vec![self.hole(expr)?])
  }

  /// A runtime part of a value. Functions become the value they return.
  pub(super) fn hole(&mut self, expr: &Expr) -> Result<ValuePart, CompileError> {
    let expr = unwrap_expr(expr);
    match expr {
      Expr::Arrow(arrow) => {
        let body = self.function_body(arrow);
        match self.evaluator.evaluate(&body).to_js_string() {
          Some(text) => Ok(ValuePart::Text(text)),
          None => Ok(ValuePart::Hole(Box::new(body))),
        }
      }
      Expr::Fn(_) | Expr::Class(_) => Err(
        CompileError::at(ErrorKind::UnsupportedNode, expr)
          .with_message("Use an arrow function for dynamic values."),
      ),
      Expr::Ident(ident) if self.evaluator.binding(ident).is_none() && &*ident.sym != "undefined" => Err(
        CompileError::at(ErrorKind::UnresolvedIdentifier, ident)
          .with_message(format!("`{}` is not defined.", ident.sym)),
      ),
      _ => Ok(ValuePart::Hole(Box::new(expr.clone()))),
    }
  }

  // Styled interpolations receive the component props; elsewhere the body runs as is.
  fn function_body(&mut self, arrow: &ArrowExpr) -> Expr {
    if self.context == StyleContext::Styled {
      self.props_function_body(arrow)
    } else {
      arrow_body_expr(arrow)
    }
  }

  pub(super) fn finish_declaration(
    &mut self,
    property: &str,
    mut parts: Vec<ValuePart>,
    span: Span,
    path: &SelectorPath,
    guard: &Guard,
  ) -> Result<(), CompileError> {
    let mut important = false;
    if let Some(ValuePart::Text(last)) = parts.last_mut() {
      let (value, is_important) = split_important(last);
      if is_important {
        let leading = last[..last.len() - last.trim_start().len()].to_string();
        *last = format!("{leading}{value}");
        important = true;
      }
    }
    if let Some(ValuePart::Text(first)) = parts.first_mut() {
      *first = first.trim_start().to_string();
    }
    if let Some(ValuePart::Text(last)) = parts.last_mut() {
      *last = last.trim_end().to_string();
    }
    parts.retain(|part| !matches!(part, ValuePart::Text(text) if text.is_empty()));

    let is_static = parts.iter().all(|part| matches!(part, ValuePart::Text(_)));
    if is_static {
      let text: String = parts
        .iter()
        .map(|part| match part {
          ValuePart::Text(text) => text.as_str(),
          ValuePart::Hole(_) => "",
        })
        .collect();
      let text = collapse_whitespace(&text);
      let text = if property == "content" {
        normalize_content_value(&text)
      } else if text.is_empty() {
        return Ok(());
      } else {
        text
      };
      parts = vec![ValuePart::Text(text)];
    }

    self.push_declaration(StyleDeclaration {
      path: path.clone(),
      property: property.to_string(),
      value: parts,
      important,
      guard: guard.clone(),
      order: 0,
      span,
    });
    Ok(())
  }
}

fn is_logical(op: BinaryOp) -> bool {
  matches!(
    op,
    BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalescing
  )
}

/// Keys that can only mean a nested selector, never a property.
fn looks_like_selector(key: &str) -> bool {
  let key = key.trim();
  key.contains('&')
    || key.contains(char::is_whitespace)
    || key.contains(',')
    || key.starts_with([':', '[', '>', '+', '~', '.', '#', '*'])
}

#[cfg(test)]
mod tests {
  use super::looks_like_selector;

  #[test]
  fn recognizes_selector_keys() {
    assert!(looks_like_selector("&:hover"));
    assert!(looks_like_selector(":focus-visible"));
    assert!(looks_like_selector("> div"));
    assert!(looks_like_selector("div span"));
    assert!(looks_like_selector("[data-open]"));
    assert!(!looks_like_selector("color"));
    assert!(!looks_like_selector("--custom-color"));
    assert!(!looks_like_selector("backgroundColor"));
  }
}
