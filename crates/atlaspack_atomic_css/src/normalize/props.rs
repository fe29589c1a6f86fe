use std::collections::HashMap;

use indexmap::IndexSet;
use swc_core::common::DUMMY_SP;
use swc_core::ecma::ast::{
  ArrowExpr, BinExpr, BinaryOp, Expr, Id, IdentName, KeyValueProp, MemberProp, ObjectPatProp, Pat,
  Prop, PropName,
};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use super::Normalizer;
use crate::ast::{arrow_body_expr, ident_expr, member_expr, parenthesize, static_prop_name};

/// The name styled components give their props inside the generated render function.
pub const PROPS_IDENTIFIER: &str = "__cmplp";

impl<'a, 'e> Normalizer<'a, 'e> {
  /// The value a styled interpolation returns, with its parameter rewritten to read from the
  /// component props. Props it reads are recorded as consumed.
  pub(super) fn props_function_body(&mut self, arrow: &ArrowExpr) -> Expr {
    let mut body = arrow_body_expr(arrow);
    let Some(param) = arrow.params.first() else {
      return body;
    };

    let mut renamer = PropsRenamer::default();
    renamer.bind(param, ident_expr(PROPS_IDENTIFIER), None);
    body.visit_mut_with(&mut renamer);
    self.consumed_props.extend(renamer.consumed);
    body
  }
}

#[derive(Default)]
struct PropsRenamer {
  /// The parameter itself, or a rest element: reads through it name props directly.
  props: Vec<Id>,
  /// Destructured names, with the expression they stand for and the prop they come from.
  replacements: HashMap<Id, (Expr, String)>,
  consumed: IndexSet<String>,
}

impl PropsRenamer {
  fn bind(&mut self, pat: &Pat, source: Expr, prop: Option<&str>) {
    match pat {
      Pat::Ident(binding) => match prop {
        None => self.props.push(binding.to_id()),
        Some(prop) => {
          self
            .replacements
            .insert(binding.to_id(), (source, prop.to_string()));
        }
      },
      Pat::Assign(assign) => {
        // `{ size = 8 }` reads `(props.size ?? 8)`.
        let source = match prop {
          Some(_) => with_default(source, (*assign.right).clone()),
          None => source,
        };
        self.bind(&assign.left, source, prop);
      }
      Pat::Object(object) => {
        for member in &object.props {
          match member {
            ObjectPatProp::KeyValue(kv) => {
              let Some(key) = static_prop_name(&kv.key) else {
                continue;
              };
              let prop = prop.map(str::to_string).unwrap_or_else(|| key.clone());
              self.bind(&kv.value, member_expr(source.clone(), &key), Some(&prop));
            }
            ObjectPatProp::Assign(assign) => {
              let key = assign.key.sym.to_string();
              let prop = prop.map(str::to_string).unwrap_or_else(|| key.clone());
              let mut value = member_expr(source.clone(), &key);
              if let Some(default) = &assign.value {
                value = with_default(value, (**default).clone());
              }
              self.replacements.insert(assign.key.to_id(), (value, prop));
            }
            ObjectPatProp::Rest(rest) => {
              if prop.is_none() {
                self.bind(&rest.arg, source.clone(), None);
              }
            }
          }
        }
      }
      _ => {}
    }
  }

  fn replacement(&mut self, id: &Id) -> Option<Expr> {
    if self.props.contains(id) {
      return Some(ident_expr(PROPS_IDENTIFIER));
    }
    let (expr, prop) = self.replacements.get(id)?;
    self.consumed.insert(prop.clone());
    Some(expr.clone())
  }
}

fn with_default(value: Expr, default: Expr) -> Expr {
  parenthesize(Expr::Bin(BinExpr {
    span: DUMMY_SP,
    op: BinaryOp::NullishCoalescing,
    left: Box::new(value),
    right: Box::new(default),
  }))
}

impl VisitMut for PropsRenamer {
  fn visit_mut_expr(&mut self, expr: &mut Expr) {
    if let Expr::Member(member) = expr {
      if let (Expr::Ident(obj), MemberProp::Ident(prop)) = (&*member.obj, &member.prop) {
        if self.props.contains(&obj.to_id()) {
          self.consumed.insert(prop.sym.to_string());
        }
      }
    }

    if let Expr::Ident(ident) = expr {
      if let Some(replacement) = self.replacement(&ident.to_id()) {
        *expr = replacement;
        return;
      }
    }
    expr.visit_mut_children_with(self);
  }

  fn visit_mut_prop(&mut self, prop: &mut Prop) {
    // `{ color }` must keep its key when `color` is rewritten.
    if let Prop::Shorthand(ident) = prop {
      if let Some(value) = self.replacement(&ident.to_id()) {
        *prop = Prop::KeyValue(KeyValueProp {
          key: PropName::Ident(IdentName::new(ident.sym.clone(), DUMMY_SP)),
          value: Box::new(value),
        });
        return;
      }
    }
    prop.visit_mut_children_with(self);
  }
}
