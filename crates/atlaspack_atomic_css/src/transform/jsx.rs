use indexmap::IndexSet;
use swc_core::common::DUMMY_SP;
use swc_core::ecma::ast::{
  Expr, IdentName, JSXAttr, JSXAttrName, JSXAttrOrSpread, JSXAttrValue, JSXClosingElement,
  JSXElement, JSXElementChild, JSXElementName, JSXExpr, JSXExprContainer, JSXOpeningElement,
};
use swc_core::ecma::visit::VisitMutWith;

use super::StyleTransformer;
use crate::ast::{array_expr, ident, ident_expr, str_expr};
use crate::compose::ConditionalClassExpr;
use crate::usage::CompiledUsage;

pub const CC: &str = "CC";
pub const CS: &str = "CS";

pub fn jsx_name(name: &str) -> JSXElementName {
  JSXElementName::Ident(ident(name))
}

pub fn jsx_attr(name: &str, value: Expr) -> JSXAttrOrSpread {
  JSXAttrOrSpread::JSXAttr(JSXAttr {
    span: DUMMY_SP,
    name: JSXAttrName::Ident(IdentName::new(name.into(), DUMMY_SP)),
    value: Some(JSXAttrValue::JSXExprContainer(expr_container(value))),
  })
}

pub fn expr_container(expr: Expr) -> JSXExprContainer {
  JSXExprContainer {
    span: DUMMY_SP,
    expr: JSXExpr::Expr(Box::new(expr)),
  }
}

pub fn expr_child(expr: Expr) -> JSXElementChild {
  JSXElementChild::JSXExprContainer(expr_container(expr))
}

pub fn jsx_element(
  name: &str,
  attrs: Vec<JSXAttrOrSpread>,
  children: Vec<JSXElementChild>,
) -> JSXElement {
  let self_closing = children.is_empty();
  JSXElement {
    span: DUMMY_SP,
    opening: JSXOpeningElement {
      span: DUMMY_SP,
      name: jsx_name(name),
      attrs,
      self_closing,
      type_args: None,
    },
    closing: (!self_closing).then(|| JSXClosingElement {
      span: DUMMY_SP,
      name: jsx_name(name),
    }),
    children,
  }
}

/// The expression an attribute evaluates to. `None` for valueless and empty attributes.
pub fn attr_value_expr(value: Option<&JSXAttrValue>) -> Option<Expr> {
  match value? {
    JSXAttrValue::Lit(lit) => Some(Expr::Lit(lit.clone())),
    JSXAttrValue::JSXExprContainer(container) => match &container.expr {
      JSXExpr::Expr(expr) => Some((**expr).clone()),
      JSXExpr::JSXEmptyExpr(_) => None,
    },
    JSXAttrValue::JSXElement(element) => Some(Expr::JSXElement(element.clone())),
    JSXAttrValue::JSXFragment(fragment) => Some(Expr::JSXFragment(fragment.clone())),
  }
}

fn attr_name(attr: &JSXAttrOrSpread) -> Option<&str> {
  match attr {
    JSXAttrOrSpread::JSXAttr(JSXAttr {
      name: JSXAttrName::Ident(name),
      ..
    }) => Some(&*name.sym),
    _ => None,
  }
}

/// Removes the first attribute matching `predicate` and returns its value.
pub fn take_attr(
  element: &mut JSXElement,
  predicate: impl Fn(&str) -> bool,
) -> Option<(String, Option<JSXAttrValue>)> {
  let index = element
    .opening
    .attrs
    .iter()
    .position(|attr| attr_name(attr).is_some_and(&predicate))?;
  match element.opening.attrs.remove(index) {
    JSXAttrOrSpread::JSXAttr(attr) => {
      let name = match &attr.name {
        JSXAttrName::Ident(name) => name.sym.to_string(),
        JSXAttrName::JSXNamespacedName(name) => name.name.sym.to_string(),
      };
      Some((name, attr.value))
    }
    JSXAttrOrSpread::SpreadElement(_) => None,
  }
}

/// Attributes named `xcss` or ending in `Xcss`, such as `innerXcss`.
pub fn is_xcss_attr(name: &str) -> bool {
  name.to_ascii_lowercase().ends_with("xcss")
}

impl StyleTransformer<'_> {
  /// `<CC><CS nonce>{[_, _2]}</CS>{node}</CC>`, carrying the node's `key`.
  pub(super) fn compiled_template(&mut self, mut node: JSXElement, sheets: &[String]) -> JSXElement {
    let key = take_attr(&mut node, |name| name == "key").map(|(_, value)| value);
    self.style_wrapper(JSXElementChild::JSXElement(Box::new(node)), key, sheets)
  }

  pub(super) fn style_wrapper(
    &mut self,
    node: JSXElementChild,
    key: Option<Option<JSXAttrValue>>,
    sheets: &[String],
  ) -> JSXElement {
    self.runtime.cc = true;

    let mut cs_attrs = Vec::new();
    if let Some(nonce) = &self.config.nonce {
      cs_attrs.push(jsx_attr("nonce", ident_expr(nonce)));
    }
    let sheet_idents = sheets
      .iter()
      .map(|sheet| Expr::Ident(self.sheets.hoist(sheet)))
      .collect();
    let cs = jsx_element(CS, cs_attrs, vec![expr_child(array_expr(sheet_idents))]);

    let mut cc_attrs = Vec::new();
    if let Some(value) = key {
      cc_attrs.push(JSXAttrOrSpread::JSXAttr(JSXAttr {
        span: DUMMY_SP,
        name: JSXAttrName::Ident(IdentName::new("key".into(), DUMMY_SP)),
        value,
      }));
    }
    jsx_element(CC, cc_attrs, vec![JSXElementChild::JSXElement(Box::new(cs)), node])
  }

  /// Rewrites an element carrying a `css` prop. Returns false when it has none.
  pub(super) fn css_prop(&mut self, element: &mut JSXElement) -> bool {
    let Some((_, value)) = take_attr(element, |name| name == "css") else {
      return false;
    };
    let Some(styles) = attr_value_expr(value.as_ref()) else {
      return true;
    };
    let Some(usage) = self.record(|transformer| {
      transformer
        .compiler
        .compile_css(&mut transformer.evaluator, &styles)
    }) else {
      return true;
    };

    element.visit_mut_children_with(self);
    self.apply_usage(element, &usage);
    *element = self.compiled_template(element.clone(), &usage.sheets);
    true
  }

  /// Rewrites `xcss` props into the class names they resolve to. The props themselves are
  /// kept for the receiving component to apply.
  pub(super) fn xcss_props(&mut self, element: &mut JSXElement) -> bool {
    if !self.config.process_xcss {
      return false;
    }
    let names: Vec<String> = element
      .opening
      .attrs
      .iter()
      .filter_map(attr_name)
      .filter(|name| is_xcss_attr(name))
      .map(str::to_string)
      .collect();
    if names.is_empty() {
      return false;
    }

    let mut sheets = IndexSet::new();
    for name in names {
      let Some((name, value)) = take_attr(element, |attr| attr == name) else {
        continue;
      };
      let Some(styles) = attr_value_expr(value.as_ref()) else {
        element.opening.attrs.push(JSXAttrOrSpread::JSXAttr(JSXAttr {
          span: DUMMY_SP,
          name: JSXAttrName::Ident(IdentName::new(name.as_str().into(), DUMMY_SP)),
          value,
        }));
        continue;
      };
      let Some(usage) = self.record(|transformer| {
        transformer
          .compiler
          .compile_xcss(&mut transformer.evaluator, &styles)
      }) else {
        return true;
      };

      let class_names = match (usage.static_class_name(), usage.class_names.as_slice()) {
        (Some(class_name), _) => str_expr(&class_name),
        (None, [ConditionalClassExpr::Runtime(expr)]) => (**expr).clone(),
        (None, _) => {
          self.runtime.ax = true;
          usage.class_name_expr(None)
        }
      };
      element.opening.attrs.push(jsx_attr(&name, class_names));
      sheets.extend(usage.sheets);
    }
    element.visit_mut_children_with(self);

    if !sheets.is_empty() {
      let sheets: Vec<String> = sheets.into_iter().collect();
      *element = self.compiled_template(element.clone(), &sheets);
    }
    true
  }

  /// Merges the compiled class names and variables into the element's `className` and
  /// `style` attributes.
  fn apply_usage(&mut self, element: &mut JSXElement, usage: &CompiledUsage) {
    let class_name = take_attr(element, |name| name == "className")
      .and_then(|(_, value)| attr_value_expr(value.as_ref()));
    self.runtime.ax = true;
    element
      .opening
      .attrs
      .push(jsx_attr("className", usage.class_name_expr(class_name)));

    if usage.variables.is_empty() {
      return;
    }
    let style = take_attr(element, |name| name == "style")
      .and_then(|(_, value)| attr_value_expr(value.as_ref()));
    if let Some(style) = usage.style_expr(style) {
      self.runtime.ix = true;
      element.opening.attrs.push(jsx_attr("style", style));
    }
  }
}
