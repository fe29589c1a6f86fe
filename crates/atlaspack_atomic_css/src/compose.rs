//! Builds the runtime expressions an element needs: the `ax([...])` class list and the
//! `style` object carrying custom properties.

use swc_core::common::DUMMY_SP;
use swc_core::ecma::ast::{Expr, ObjectLit, PropOrSpread, SpreadElement};

use crate::ast::{
  and_expr, array_expr, call_expr, cond_expr, ident_expr, is_nullish_expr, key_value_prop,
  not_expr, str_expr,
};
use crate::normalize::{Branch, GuardTerm};
use crate::variables::CssVariableBinding;

/// Runtime helper that joins class fragments, keeping the last class of each group.
pub const AX: &str = "ax";

/// A class name, or an expression producing one at runtime, under the guard it was declared
/// with.
#[derive(Clone, Debug)]
pub struct ClassFragment {
  pub guard: Vec<GuardTerm>,
  pub class: FragmentClass,
}

#[derive(Clone, Debug)]
pub enum FragmentClass {
  Atomic(String),
  Runtime(Box<Expr>),
}

#[derive(Clone, Debug)]
pub enum ConditionalClassExpr {
  /// Space-joined class names.
  Literal(Vec<String>),
  Runtime(Box<Expr>),
  /// `test && inner`
  And(Box<Expr>, Box<ConditionalClassExpr>),
  /// `test ? consequent : alternate`, where both sides are literals.
  Ternary(Box<Expr>, Vec<String>, Vec<String>),
}

impl ConditionalClassExpr {
  pub fn to_expr(&self) -> Expr {
    match self {
      ConditionalClassExpr::Literal(classes) => str_expr(&classes.join(" ")),
      ConditionalClassExpr::Runtime(expr) => (**expr).clone(),
      ConditionalClassExpr::And(test, inner) => and_expr((**test).clone(), inner.to_expr()),
      ConditionalClassExpr::Ternary(test, consequent, alternate) => cond_expr(
        (**test).clone(),
        str_expr(&consequent.join(" ")),
        str_expr(&alternate.join(" ")),
      ),
    }
  }
}

/// Groups fragments into class expressions, keeping source order.
///
/// Consecutive fragments under the same conditional share one expression, so
/// `primary && { color, fontSize }` becomes `primary && "_a _b"` and a ternary with static
/// branches becomes `test ? "_a" : "_b"`.
pub fn class_exprs(fragments: &[ClassFragment]) -> Vec<ConditionalClassExpr> {
  group(fragments, 0)
}

fn group(fragments: &[ClassFragment], depth: usize) -> Vec<ConditionalClassExpr> {
  let mut out = Vec::new();
  let mut index = 0;

  while index < fragments.len() {
    let fragment = &fragments[index];
    let Some(term) = fragment.guard.get(depth) else {
      match &fragment.class {
        FragmentClass::Atomic(class_name) => match out.last_mut() {
          Some(ConditionalClassExpr::Literal(classes)) => classes.push(class_name.clone()),
          _ => out.push(ConditionalClassExpr::Literal(vec![class_name.clone()])),
        },
        FragmentClass::Runtime(expr) => out.push(ConditionalClassExpr::Runtime(expr.clone())),
      }
      index += 1;
      continue;
    };

    let end = fragments[index..]
      .iter()
      .position(|other| other.guard.get(depth).map(|other| other.id) != Some(term.id))
      .map_or(fragments.len(), |offset| index + offset);
    let run = &fragments[index..end];
    out.extend(conditional(term, run, depth));
    index = end;
  }

  out
}

// A run of fragments that all sit under the same conditional at `depth`.
fn conditional(
  term: &GuardTerm,
  run: &[ClassFragment],
  depth: usize,
) -> Vec<ConditionalClassExpr> {
  let branch_of = |fragment: &ClassFragment| fragment.guard[depth].branch;

  if matches!(term.branch, Branch::Consequent | Branch::Alternate) {
    let consequent: Vec<ClassFragment> = run
      .iter()
      .filter(|fragment| branch_of(fragment) == Branch::Consequent)
      .cloned()
      .collect();
    let alternate: Vec<ClassFragment> = run
      .iter()
      .filter(|fragment| branch_of(fragment) == Branch::Alternate)
      .cloned()
      .collect();
    let consequent = group(&consequent, depth + 1);
    let alternate = group(&alternate, depth + 1);

    if let (Some(consequent), Some(alternate)) = (literal(&consequent), literal(&alternate)) {
      return vec![ConditionalClassExpr::Ternary(
        term.test.clone(),
        consequent,
        alternate,
      )];
    }

    let test = (*term.test).clone();
    let mut out = guarded(test.clone(), consequent);
    out.extend(guarded(not_expr(test), alternate));
    return out;
  }

  let inner = group(run, depth + 1);
  guarded(condition(term), inner)
}

// Some when the expressions are at most one literal, which a ternary branch can hold.
fn literal(exprs: &[ConditionalClassExpr]) -> Option<Vec<String>> {
  match exprs {
    [] => Some(Vec::new()),
    [ConditionalClassExpr::Literal(classes)] => Some(classes.clone()),
    _ => None,
  }
}

fn guarded(test: Expr, inner: Vec<ConditionalClassExpr>) -> Vec<ConditionalClassExpr> {
  inner
    .into_iter()
    .map(|expr| ConditionalClassExpr::And(Box::new(test.clone()), Box::new(expr)))
    .collect()
}

/// The runtime test under which a guard term applies.
pub fn condition(term: &GuardTerm) -> Expr {
  let test = (*term.test).clone();
  match term.branch {
    Branch::Truthy | Branch::Consequent => test,
    Branch::Falsy | Branch::Alternate => not_expr(test),
    Branch::Nullish => is_nullish_expr(test),
  }
}

/// `ax([...])` over the fragments, with the author's class name last.
pub fn compose(fragments: &[ClassFragment], pass_through: Option<Expr>) -> Expr {
  ax_call(&class_exprs(fragments), pass_through)
}

pub fn ax_call(exprs: &[ConditionalClassExpr], pass_through: Option<Expr>) -> Expr {
  let mut items: Vec<Expr> = exprs.iter().map(ConditionalClassExpr::to_expr).collect();
  items.extend(pass_through);
  call_expr(ident_expr(AX), vec![array_expr(items)])
}

/// The element's `style` value: the author's style spread first, then the custom
/// properties. `None` when there is nothing to set.
pub fn build_style_object(
  bindings: &[CssVariableBinding],
  pass_through: Option<Expr>,
) -> Option<Expr> {
  if bindings.is_empty() {
    return pass_through;
  }

  let mut props = Vec::with_capacity(bindings.len() + 1);
  if let Some(style) = pass_through {
    props.push(PropOrSpread::Spread(SpreadElement {
      dot3_token: DUMMY_SP,
      expr: Box::new(style),
    }));
  }
  for binding in bindings {
    props.push(key_value_prop(&binding.name, binding.runtime_value()));
  }
  Some(Expr::Object(ObjectLit {
    span: DUMMY_SP,
    props,
  }))
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::ast::{ident_expr, member_expr, print_expr};

  fn term(id: usize, test: &str, branch: Branch) -> GuardTerm {
    GuardTerm {
      id,
      test: Box::new(ident_expr(test)),
      branch,
    }
  }

  fn atomic(class_name: &str, guard: Vec<GuardTerm>) -> ClassFragment {
    ClassFragment {
      guard,
      class: FragmentClass::Atomic(class_name.to_string()),
    }
  }

  fn composed(fragments: &[ClassFragment]) -> String {
    print_expr(&compose(fragments, None))
  }

  #[test]
  fn joins_unconditional_classes() {
    let exprs = class_exprs(&[atomic("_a", vec![]), atomic("_b", vec![])]);

    assert_eq!(exprs.len(), 1);
    assert_eq!(print_expr(&exprs[0].to_expr()), r#""_a _b""#);
  }

  #[test]
  fn guards_logical_runs() {
    let primary = term(1, "primary", Branch::Truthy);
    let printed = composed(&[
      atomic("_a", vec![]),
      atomic("_b", vec![primary.clone()]),
      atomic("_c", vec![primary]),
    ]);

    assert!(printed.contains(r#""_a""#), "{printed}");
    assert!(printed.contains(r#"primary && "_b _c""#), "{printed}");
  }

  #[test]
  fn uses_ternaries_for_literal_branches() {
    let printed = composed(&[
      atomic("_a", vec![term(1, "disabled", Branch::Consequent)]),
      atomic("_b", vec![term(1, "disabled", Branch::Alternate)]),
    ]);
    assert!(printed.contains(r#"disabled ? "_a" : "_b""#), "{printed}");

    let printed = composed(&[atomic("_a", vec![term(1, "disabled", Branch::Consequent)])]);
    assert!(printed.contains(r#"disabled ? "_a" : """#), "{printed}");
  }

  #[test]
  fn negates_or_and_nullish_guards() {
    let printed = composed(&[
      atomic("_a", vec![term(1, "open", Branch::Falsy)]),
      atomic("_b", vec![term(2, "size", Branch::Nullish)]),
    ]);

    assert!(printed.contains(r#"!open && "_a""#), "{printed}");
    assert!(printed.contains(r#"(size == null) && "_b""#), "{printed}");
  }

  #[test]
  fn nests_guards() {
    let outer = term(1, "a", Branch::Truthy);
    let printed = composed(&[
      atomic("_x", vec![outer.clone(), term(2, "b", Branch::Truthy)]),
      ClassFragment {
        guard: vec![outer],
        class: FragmentClass::Runtime(Box::new(member_expr(ident_expr("map"), "primary"))),
      },
    ]);

    assert!(printed.contains(r#"a && (b && "_x")"#), "{printed}");
    assert!(printed.contains("a && map.primary"), "{printed}");
  }

  #[test]
  fn puts_the_authors_class_name_last() {
    let expr = compose(
      &[atomic("_a", vec![])],
      Some(member_expr(ident_expr("props"), "className")),
    );
    let printed = print_expr(&expr);

    assert!(printed.ends_with("props.className])"), "{printed}");
  }

  #[test]
  fn builds_style_objects() {
    assert!(build_style_object(&[], None).is_none());

    let binding = CssVariableBinding {
      name: "--_abc".to_string(),
      expr: Box::new(ident_expr("width")),
      prefix: None,
      suffix: Some("px".to_string()),
    };
    let style = build_style_object(&[binding], Some(ident_expr("style"))).unwrap();
    let printed = print_expr(&style);

    assert!(printed.contains("...style"), "{printed}");
    assert!(printed.contains(r#""--_abc": ix(width, "px")"#), "{printed}");
    assert!(printed.find("...style") < printed.find("--_abc"));
  }
}
