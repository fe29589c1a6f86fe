use indexmap::{IndexMap, IndexSet};
use swc_core::common::DUMMY_SP;
use swc_core::ecma::ast::{
  ArrayLit, ArrowExpr, Callee, Expr, Id, JSXElement, JSXElementChild, JSXElementName, JSXExpr,
  KeyValueProp, MemberProp, ObjectPatProp, Pat, Prop, PropName, IdentName,
};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use super::jsx::expr_child;
use super::StyleTransformer;
use crate::ast::{arrow_body_expr, ident_expr, static_prop_name, unwrap_expr};
use crate::compose::build_style_object;
use crate::scope::StyleApi;
use crate::variables::CssVariableBinding;

/// Where the render function receives `css` and `style` from.
#[derive(Debug, Default)]
struct RenderParams {
  css: Option<Id>,
  style: Option<Id>,
  /// `(props) => props.css(...)`
  object: Option<Id>,
}

impl RenderParams {
  fn from_arrow(arrow: &ArrowExpr) -> Option<Self> {
    let mut params = RenderParams::default();
    match arrow.params.first()? {
      Pat::Object(object) => {
        for prop in &object.props {
          let (key, local) = match prop {
            ObjectPatProp::KeyValue(kv) => match (&*kv.value, static_prop_name(&kv.key)) {
              (Pat::Ident(local), Some(key)) => (key, local.id.to_id()),
              _ => continue,
            },
            ObjectPatProp::Assign(assign) => (assign.key.sym.to_string(), assign.key.to_id()),
            ObjectPatProp::Rest(_) => continue,
          };
          match key.as_str() {
            "css" => params.css = Some(local),
            "style" => params.style = Some(local),
            _ => {}
          }
        }
      }
      Pat::Ident(object) => params.object = Some(object.id.to_id()),
      _ => return None,
    }
    Some(params)
  }

  fn is(&self, expr: &Expr, name: &str, local: &Option<Id>) -> bool {
    match unwrap_expr(expr) {
      Expr::Ident(ident) => local.as_ref() == Some(&ident.to_id()),
      Expr::Member(member) => match (&*member.obj, &member.prop) {
        (Expr::Ident(object), MemberProp::Ident(prop)) => {
          self.object.as_ref() == Some(&object.to_id()) && &*prop.sym == name
        }
        _ => false,
      },
      _ => false,
    }
  }

  fn is_css(&self, expr: &Expr) -> bool {
    self.is(expr, "css", &self.css)
  }

  fn is_style(&self, expr: &Expr) -> bool {
    self.is(expr, "style", &self.style)
  }
}

/// Compiles every `css(...)` call in the render function body.
struct CssCalls<'t, 'a> {
  transformer: &'t mut StyleTransformer<'a>,
  params: &'t RenderParams,
  sheets: IndexSet<String>,
  variables: IndexMap<String, CssVariableBinding>,
}

impl CssCalls<'_, '_> {
  fn styles(&self, expr: &Expr) -> Option<Expr> {
    match expr {
      Expr::Call(call) => {
        let Callee::Expr(callee) = &call.callee else {
          return None;
        };
        if !self.params.is_css(callee) {
          return None;
        }
        match call.args.as_slice() {
          [arg] if arg.spread.is_none() => Some((*arg.expr).clone()),
          args => Some(Expr::Array(ArrayLit {
            span: call.span,
            elems: args.iter().cloned().map(Some).collect(),
          })),
        }
      }
      Expr::TaggedTpl(tagged) if self.params.is_css(&tagged.tag) => {
        Some(Expr::Tpl((*tagged.tpl).clone()))
      }
      _ => None,
    }
  }
}

impl VisitMut for CssCalls<'_, '_> {
  fn visit_mut_expr(&mut self, expr: &mut Expr) {
    if self.transformer.error.is_some() {
      return;
    }
    let Some(styles) = self.styles(expr) else {
      expr.visit_mut_children_with(self);
      return;
    };

    let Some(usage) = self.transformer.record(|transformer| {
      transformer
        .compiler
        .compile_css(&mut transformer.evaluator, &styles)
    }) else {
      return;
    };
    self.transformer.runtime.ax = true;
    *expr = usage.class_name_expr(None);
    self.sheets.extend(usage.sheets);
    for variable in usage.variables {
      self.variables.entry(variable.name.clone()).or_insert(variable);
    }
  }
}

/// Replaces `style` references with the collected custom properties.
struct StyleReferences<'p> {
  params: &'p RenderParams,
  style: Expr,
}

impl VisitMut for StyleReferences<'_> {
  fn visit_mut_expr(&mut self, expr: &mut Expr) {
    if self.params.is_style(expr) {
      *expr = self.style.clone();
      return;
    }
    expr.visit_mut_children_with(self);
  }

  fn visit_mut_prop(&mut self, prop: &mut Prop) {
    if let Prop::Shorthand(ident) = prop {
      if self.params.style.as_ref() == Some(&ident.to_id()) {
        *prop = Prop::KeyValue(KeyValueProp {
          key: PropName::Ident(IdentName::new(ident.sym.clone(), DUMMY_SP)),
          value: Box::new(self.style.clone()),
        });
        return;
      }
    }
    prop.visit_mut_children_with(self);
  }
}

impl StyleTransformer<'_> {
  fn is_class_names(&self, element: &JSXElement) -> bool {
    match &element.opening.name {
      JSXElementName::Ident(name) => {
        self.graph.style_api(&name.to_id()) == Some(StyleApi::ClassNames)
      }
      _ => false,
    }
  }

  /// Rewrites `<ClassNames>{({ css, style }) => ...}</ClassNames>` into the render function's
  /// output wrapped with the style sheets it uses.
  pub(super) fn class_names(&mut self, element: &mut JSXElement) -> bool {
    if !self.is_class_names(element) {
      return false;
    }
    let Some(mut arrow) = element.children.iter().find_map(|child| match child {
      JSXElementChild::JSXExprContainer(container) => match &container.expr {
        JSXExpr::Expr(expr) => match unwrap_expr(expr) {
          Expr::Arrow(arrow) => Some(arrow.clone()),
          _ => None,
        },
        JSXExpr::JSXEmptyExpr(_) => None,
      },
      _ => None,
    }) else {
      return false;
    };
    let Some(params) = RenderParams::from_arrow(&arrow) else {
      return false;
    };

    let mut calls = CssCalls {
      transformer: self,
      params: &params,
      sheets: IndexSet::new(),
      variables: IndexMap::new(),
    };
    arrow.body.visit_mut_with(&mut calls);
    let sheets: Vec<String> = calls.sheets.into_iter().collect();
    let variables: Vec<CssVariableBinding> = calls.variables.into_values().collect();
    if self.error.is_some() {
      return true;
    }

    if !variables.is_empty() {
      self.runtime.ix = true;
    }
    let style = build_style_object(&variables, None).unwrap_or_else(|| ident_expr("undefined"));
    arrow.body.visit_mut_with(&mut StyleReferences {
      params: &params,
      style,
    });
    arrow.body.visit_mut_with(self);

    let node = match arrow_body_expr(&arrow) {
      Expr::JSXElement(element) => JSXElementChild::JSXElement(element),
      Expr::JSXFragment(fragment) => JSXElementChild::JSXFragment(fragment),
      Expr::Paren(paren) => match *paren.expr {
        Expr::JSXElement(element) => JSXElementChild::JSXElement(element),
        other => expr_child(other),
      },
      other => expr_child(other),
    };
    tracing::debug!(sheets = sheets.len(), variables = variables.len(), "rewrote ClassNames");
    *element = self.style_wrapper(node, None, &sheets);
    true
  }
}
