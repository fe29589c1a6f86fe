use std::collections::HashSet;

use swc_core::common::Spanned;
use swc_core::ecma::ast::{Expr, ObjectLit, PropOrSpread};

use super::object::{EntryValue, GROUPED_AT_RULES};
use super::{Guard, Normalizer};
use crate::ast::{static_prop_name, unwrap_expr};
use crate::css::{is_at_rule, is_pseudo, split_at_rule, SelectorPath};
use crate::errors::{CompileError, ErrorKind};
use crate::evaluate::StaticValue;

const SELECTORS_KEY: &str = "selectors";

impl<'a, 'e> Normalizer<'a, 'e> {
  /// Normalizes one `cssMap` variant. The variant must be an object known at compile time.
  pub(super) fn variant(&mut self, variant: &Expr) -> Result<(), CompileError> {
    let root = SelectorPath::default();
    match unwrap_expr(variant) {
      Expr::Object(object) => self.strict_object(object, &root, &Vec::new()),
      other => match self.evaluator.evaluate(other) {
        value @ StaticValue::Object(_) if value.is_fully_static() => {
          self.static_style(value, other.span(), &root, &Vec::new())
        }
        _ => Err(CompileError::at(ErrorKind::StaticVariantObject, other)),
      },
    }
  }

  /// The top level of a cssMap variant or an xcss object.
  ///
  /// Pseudo-classes must be written as `&:hover`, nested selectors live in a single
  /// `selectors` block merged after the plain properties, and each selector or at-rule may
  /// only appear once.
  pub(super) fn strict_object(
    &mut self,
    object: &ObjectLit,
    path: &SelectorPath,
    guard: &Guard,
  ) -> Result<(), CompileError> {
    let mut selectors: Option<&ObjectLit> = None;
    for prop in &object.props {
      let PropOrSpread::Prop(prop) = prop else {
        continue;
      };
      let Some(kv) = prop.as_key_value() else {
        continue;
      };
      if static_prop_name(&kv.key).as_deref() != Some(SELECTORS_KEY) {
        continue;
      }
      if selectors.is_some() {
        return Err(CompileError::at(ErrorKind::DuplicateSelectorsBlock, prop));
      }
      match unwrap_expr(&kv.value) {
        Expr::Object(block) => selectors = Some(block),
        other => return Err(CompileError::at(ErrorKind::SelectorsBlockValueType, other)),
      }
    }

    let mut seen = HashSet::new();
    let merged = selectors.map(|block| block.props.as_slice()).unwrap_or_default();
    for prop in object.props.iter().chain(merged) {
      let PropOrSpread::Prop(prop) = prop else {
        return Err(CompileError::at(ErrorKind::NoSpreadElement, prop));
      };
      let (key, value) = self.prop_entry(prop)?;
      if key == SELECTORS_KEY {
        continue;
      }
      if is_pseudo(&key) {
        return Err(CompileError::at(ErrorKind::UseSelectorsWithAmpersand, prop));
      }

      if is_at_rule(&key) {
        let (name, params) = split_at_rule(&key);
        if params.is_empty() && GROUPED_AT_RULES.contains(&name) {
          let Expr::Object(queries) = unwrap_expr(&value) else {
            return Err(CompileError::at(ErrorKind::AtRuleValueType, &*value));
          };
          for query in &queries.props {
            let PropOrSpread::Prop(query) = query else {
              return Err(CompileError::at(ErrorKind::NoSpreadElement, query));
            };
            let (params, styles) = self.prop_entry(query)?;
            let at_rule = format!("{} {}", key.trim(), params);
            if !seen.insert(at_rule.clone()) {
              return Err(CompileError::at(ErrorKind::DuplicateAtRule, query));
            }
            self.at_rule_block(&at_rule, EntryValue::Expr(&styles), query.span(), path, guard)?;
          }
          continue;
        }
        if !seen.insert(key.clone()) {
          return Err(CompileError::at(ErrorKind::DuplicateAtRule, prop));
        }
      } else if matches!(unwrap_expr(&value), Expr::Object(_)) && !seen.insert(key.clone()) {
        return Err(CompileError::at(ErrorKind::DuplicateSelector, prop));
      }

      self.entry(&key, EntryValue::Expr(&value), prop.span(), path, guard)?;
    }
    Ok(())
  }
}
