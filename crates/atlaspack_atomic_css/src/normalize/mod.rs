//! Lowers the authoring syntaxes (objects, CSS text, arrays, conditionals and mixins) into one
//! ordered list of [`StyleItem`]s.
//!
//! Declarations keep the conditional structure they were written under as a [`Guard`], so
//! class-name composition can rebuild the same short-circuits at runtime.

use std::collections::HashSet;

use indexmap::IndexSet;
use swc_core::common::{Span, Spanned};
use swc_core::ecma::ast::{
  BinaryOp, CallExpr, Callee, Expr, ExprOrSpread, Id, Ident, Lit, MemberExpr, TaggedTpl, Tpl,
};

use crate::ast::unwrap_expr;
use crate::css::SelectorPath;
use crate::errors::{CompileError, ErrorKind};
use crate::evaluate::{Evaluator, Slot, StaticValue, MAX_EVALUATION_DEPTH};
use crate::scope::{BindingKind, StyleApi};

mod css_map;
mod object;
mod props;
mod template;

pub use props::PROPS_IDENTIFIER;

/// Which authoring surface the styles come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleContext {
  /// `css()`, the `css` prop and `ClassNames`.
  Css,
  /// `styled.tag(...)`, where arrow functions receive the component props.
  Styled,
  /// A `cssMap` variant.
  CssMap,
  /// The `xcss` prop.
  Xcss,
}

impl StyleContext {
  /// cssMap and xcss reject shorthand selector forms and spreads.
  pub fn is_strict(&self) -> bool {
    matches!(self, StyleContext::CssMap | StyleContext::Xcss)
  }
}

/// How a declaration depends on the expression it is nested under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Branch {
  /// `test && styles`
  Truthy,
  /// `test || styles`
  Falsy,
  /// `test ?? styles`
  Nullish,
  /// `test ? styles : ...`
  Consequent,
  /// `test ? ... : styles`
  Alternate,
}

#[derive(Clone, Debug)]
pub struct GuardTerm {
  /// Identifies the conditional expression this term came from.
  pub id: usize,
  pub test: Box<Expr>,
  pub branch: Branch,
}

pub type Guard = Vec<GuardTerm>;

/// The identity of a guard, used to decide which declarations compete with each other.
pub fn guard_key(guard: &[GuardTerm]) -> Vec<(usize, Branch)> {
  guard.iter().map(|term| (term.id, term.branch)).collect()
}

/// Literal text or a runtime hole inside a declaration value.
#[derive(Clone, Debug)]
pub enum ValuePart {
  Text(String),
  Hole(Box<Expr>),
}

#[derive(Clone, Debug)]
pub struct StyleDeclaration {
  pub path: SelectorPath,
  /// Kebab-case property name.
  pub property: String,
  pub value: Vec<ValuePart>,
  pub important: bool,
  pub guard: Guard,
  pub order: usize,
  pub span: Span,
}

impl StyleDeclaration {
  /// The value text when no part of it is dynamic.
  pub fn static_value(&self) -> Option<String> {
    let mut text = String::new();
    for part in &self.value {
      match part {
        ValuePart::Text(part) => text.push_str(part),
        ValuePart::Hole(_) => return None,
      }
    }
    Some(text)
  }

  pub fn is_dynamic(&self) -> bool {
    self
      .value
      .iter()
      .any(|part| matches!(part, ValuePart::Hole(_)))
  }
}

#[derive(Clone, Debug)]
pub enum StyleItem {
  Declaration(StyleDeclaration),
  /// A class name computed at runtime, such as a cssMap variant lookup.
  ClassReference {
    expr: Box<Expr>,
    guard: Guard,
    order: usize,
    /// The cssMap binding the class comes from, if known.
    css_map: Option<Id>,
  },
}

impl StyleItem {
  pub fn guard(&self) -> &[GuardTerm] {
    match self {
      StyleItem::Declaration(declaration) => &declaration.guard,
      StyleItem::ClassReference { guard, .. } => guard,
    }
  }

  pub fn order(&self) -> usize {
    match self {
      StyleItem::Declaration(declaration) => declaration.order,
      StyleItem::ClassReference { order, .. } => *order,
    }
  }
}

#[derive(Debug, Default)]
pub struct NormalizedStyles {
  pub items: Vec<StyleItem>,
  /// Component props read by styled interpolations, in first-use order.
  pub consumed_props: IndexSet<String>,
}

/// The arguments of a `styled.tag` call.
pub enum StyledInput<'i> {
  Args(&'i [ExprOrSpread]),
  Template(&'i Tpl),
}

/// Normalizes a `css()` argument, a `css` prop, an `xcss` prop or a `ClassNames` call.
pub fn normalize_css(
  evaluator: &mut Evaluator<'_>,
  expr: &Expr,
  context: StyleContext,
) -> Result<NormalizedStyles, CompileError> {
  let mut normalizer = Normalizer::new(evaluator, context);
  if context == StyleContext::Xcss {
    normalizer.xcss(expr)?;
  } else {
    normalizer.style(expr, &SelectorPath::default(), &Vec::new())?;
  }
  Ok(normalizer.finish())
}

/// Normalizes the styles passed to a styled component factory.
pub fn normalize_styled(
  evaluator: &mut Evaluator<'_>,
  input: StyledInput<'_>,
) -> Result<NormalizedStyles, CompileError> {
  let mut normalizer = Normalizer::new(evaluator, StyleContext::Styled);
  let root = SelectorPath::default();
  match input {
    StyledInput::Args(args) => {
      for arg in args {
        normalizer.style(&arg.expr, &root, &Vec::new())?;
      }
    }
    StyledInput::Template(tpl) => normalizer.template(tpl, &root, &Vec::new())?,
  }
  Ok(normalizer.finish())
}

/// Normalizes one variant of a `cssMap` call.
pub fn normalize_css_map_variant(
  evaluator: &mut Evaluator<'_>,
  variant: &Expr,
) -> Result<NormalizedStyles, CompileError> {
  let mut normalizer = Normalizer::new(evaluator, StyleContext::CssMap);
  normalizer.variant(variant)?;
  Ok(normalizer.finish())
}

pub(crate) struct Normalizer<'a, 'e> {
  evaluator: &'e mut Evaluator<'a>,
  context: StyleContext,
  items: Vec<StyleItem>,
  next_guard: usize,
  consumed_props: IndexSet<String>,
  /// Bindings whose initializers are being normalized right now.
  following: HashSet<Id>,
  depth: usize,
}

impl<'a, 'e> Normalizer<'a, 'e> {
  fn new(evaluator: &'e mut Evaluator<'a>, context: StyleContext) -> Self {
    Normalizer {
      evaluator,
      context,
      items: Vec::new(),
      next_guard: 0,
      consumed_props: IndexSet::new(),
      following: HashSet::new(),
      depth: 0,
    }
  }

  fn finish(self) -> NormalizedStyles {
    tracing::trace!(items = self.items.len(), "normalized styles");
    NormalizedStyles {
      items: self.items,
      consumed_props: self.consumed_props,
    }
  }

  fn guarded(&self, guard: &Guard, test: &Expr, branch: Branch, id: usize) -> Guard {
    let mut guard = guard.clone();
    guard.push(GuardTerm {
      id,
      test: Box::new(test.clone()),
      branch,
    });
    guard
  }

  fn guard_id(&mut self) -> usize {
    self.next_guard += 1;
    self.next_guard
  }

  /// Normalizes any expression standing in a style position.
  fn style(&mut self, expr: &Expr, path: &SelectorPath, guard: &Guard) -> Result<(), CompileError> {
    if self.depth >= MAX_EVALUATION_DEPTH {
      return Err(
        CompileError::at(ErrorKind::UnsupportedNode, expr)
          .with_message("Styles are nested too deeply to be evaluated."),
      );
    }
    self.depth += 1;
    let result = self.style_expr(expr, path, guard);
    self.depth -= 1;
    result
  }

  fn style_expr(&mut self, expr: &Expr, path: &SelectorPath, guard: &Guard) -> Result<(), CompileError> {
    let expr = unwrap_expr(expr);
    match expr {
      Expr::Object(object) => {
        if self.context.is_strict() && path.selectors.is_empty() && path.at_rules.is_empty() {
          self.strict_object(object, path, guard)
        } else {
          self.object(object, path, guard)
        }
      }
      Expr::Tpl(tpl) => self.template(tpl, path, guard),
      Expr::Lit(Lit::Str(str)) => self.css_text(&str.value, &[], str.span, path, guard),
      Expr::Lit(Lit::Null(_) | Lit::Bool(_)) => Ok(()),
      Expr::TaggedTpl(tagged) => self.tagged_template(tagged, path, guard),
      Expr::Array(array) => {
        for element in array.elems.iter().flatten() {
          if element.spread.is_some() {
            self.spread(&element.expr, path, guard)?;
          } else {
            self.style(&element.expr, path, guard)?;
          }
        }
        Ok(())
      }
      Expr::Cond(cond) => match self.evaluator.evaluate(&cond.test).truthiness() {
        Some(true) => self.style(&cond.cons, path, guard),
        Some(false) => self.style(&cond.alt, path, guard),
        None => {
          let id = self.guard_id();
          let consequent = self.guarded(guard, &cond.test, Branch::Consequent, id);
          self.style(&cond.cons, path, &consequent)?;
          let alternate = self.guarded(guard, &cond.test, Branch::Alternate, id);
          self.style(&cond.alt, path, &alternate)
        }
      },
      Expr::Bin(bin)
        if matches!(
          bin.op,
          BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalescing
        ) =>
      {
        let left = self.evaluator.evaluate(&bin.left);
        let branch = match bin.op {
          BinaryOp::LogicalAnd => Branch::Truthy,
          BinaryOp::LogicalOr => Branch::Falsy,
          _ => Branch::Nullish,
        };
        let applies = match branch {
          Branch::Truthy => left.truthiness(),
          Branch::Falsy => left.truthiness().map(|truthy| !truthy),
          _ => match left {
            StaticValue::Unresolvable => None,
            StaticValue::Nullish => Some(true),
            _ => Some(false),
          },
        };
        match applies {
          Some(true) => self.style(&bin.right, path, guard),
          Some(false) if branch == Branch::Truthy => Ok(()),
          // `styles || fallback` applies the left side when it is truthy.
          Some(false) => self.style(&bin.left, path, guard),
          None => {
            let id = self.guard_id();
            let guard = self.guarded(guard, &bin.left, branch, id);
            self.style(&bin.right, path, &guard)
          }
        }
      }
      Expr::Ident(ident) => self.style_ident(ident, path, guard),
      Expr::Member(member) => self.style_member(member, path, guard),
      Expr::Call(call) => self.style_call(call, path, guard),
      Expr::Arrow(arrow) if self.context == StyleContext::Styled => {
        let body = self.props_function_body(arrow);
        self.style(&body, path, guard)
      }
      Expr::Arrow(_) | Expr::Fn(_) | Expr::Class(_) => Err(
        CompileError::at(ErrorKind::UnsupportedNode, expr)
          .with_message("Functions and classes cannot be used as styles here."),
      ),
      _ => {
        let value = self.evaluator.evaluate(expr);
        self.style_value(value, expr, path, guard)
      }
    }
  }

  fn style_ident(&mut self, ident: &Ident, path: &SelectorPath, guard: &Guard) -> Result<(), CompileError> {
    let Some(binding) = self.evaluator.binding(ident) else {
      if &*ident.sym == "undefined" {
        return Ok(());
      }
      return Err(
        CompileError::at(ErrorKind::UnresolvedIdentifier, ident)
          .with_message(format!("`{}` is not defined.", ident.sym)),
      );
    };

    if self.is_css_map_init(binding.init.as_deref()) {
      return Err(CompileError::at(ErrorKind::UseVariantOfCssMap, ident));
    }

    let id = ident.to_id();
    if self.following.contains(&id) {
      return Err(
        CompileError::at(ErrorKind::UnresolvedIdentifier, ident)
          .with_message(format!("`{}` refers to itself.", ident.sym)),
      );
    }
    let follow = binding.is_foldable()
      && binding.path.is_empty()
      && binding.import.is_none()
      && binding.kind != BindingKind::Function;
    if let (true, Some(init)) = (follow, binding.init.as_deref()) {
      self.following.insert(id.clone());
      let result = self.style(init, path, guard);
      self.following.remove(&id);
      return result;
    }

    let expr = Expr::Ident(ident.clone());
    let value = self.evaluator.evaluate(&expr);
    self.style_value(value, &expr, path, guard)
  }

  fn style_member(&mut self, member: &MemberExpr, path: &SelectorPath, guard: &Guard) -> Result<(), CompileError> {
    if let Some(css_map) = self.css_map_object(&member.obj) {
      let order = self.items.len();
      self.items.push(StyleItem::ClassReference {
        expr: Box::new(Expr::Member(member.clone())),
        guard: guard.clone(),
        order,
        css_map: Some(css_map),
      });
      return Ok(());
    }
    if let Expr::Member(inner) = unwrap_expr(&member.obj) {
      if self.css_map_object(&inner.obj).is_some() {
        return Err(CompileError::at(ErrorKind::NestedVariantAccess, member));
      }
    }

    let expr = Expr::Member(member.clone());
    let value = self.evaluator.evaluate(&expr);
    self.style_value(value, &expr, path, guard)
  }

  fn style_call(&mut self, call: &CallExpr, path: &SelectorPath, guard: &Guard) -> Result<(), CompileError> {
    if let Callee::Expr(callee) = &call.callee {
      if self.evaluator.scope().style_api_of(callee) == Some(StyleApi::Css) {
        for arg in &call.args {
          self.style(&arg.expr, path, guard)?;
        }
        return Ok(());
      }
    }

    let expr = Expr::Call(call.clone());
    let value = self.evaluator.evaluate(&expr);
    self.style_value(value, &expr, path, guard)
  }

  fn tagged_template(&mut self, tagged: &TaggedTpl, path: &SelectorPath, guard: &Guard) -> Result<(), CompileError> {
    if self.evaluator.scope().style_api_of(&tagged.tag) == Some(StyleApi::Css) {
      return self.template(&tagged.tpl, path, guard);
    }
    Err(
      CompileError::at(ErrorKind::UnsupportedNode, tagged)
        .with_message("Only `css` tagged templates can be used as styles."),
    )
  }

  /// Normalizes an evaluated value standing in a style position.
  fn style_value(
    &mut self,
    value: StaticValue,
    origin: &Expr,
    path: &SelectorPath,
    guard: &Guard,
  ) -> Result<(), CompileError> {
    match value {
      StaticValue::Unresolvable if self.context == StyleContext::Xcss => {
        let order = self.items.len();
        self.items.push(StyleItem::ClassReference {
          expr: Box::new(origin.clone()),
          guard: guard.clone(),
          order,
          css_map: None,
        });
        Ok(())
      }
      value => self.static_style(value, origin.span(), path, guard),
    }
  }

  /// Normalizes an evaluated value that has no expression of its own.
  fn static_style(
    &mut self,
    value: StaticValue,
    span: Span,
    path: &SelectorPath,
    guard: &Guard,
  ) -> Result<(), CompileError> {
    match value {
      StaticValue::Object(map) => self.object_value(&map, span, path, guard),
      StaticValue::Array(slots) => {
        for slot in slots {
          match slot {
            Slot::Static(value) => self.static_style(value, span, path, guard)?,
            Slot::Dynamic(expr) => self.style(&expr, path, guard)?,
          }
        }
        Ok(())
      }
      StaticValue::String(text) => self.css_text(&text, &[], span, path, guard),
      StaticValue::Nullish | StaticValue::Boolean(_) => Ok(()),
      StaticValue::Number(_) | StaticValue::Function(_) | StaticValue::Unresolvable => Err(
        CompileError::new(ErrorKind::UnsupportedNode, span)
          .with_message("This expression could not be statically evaluated to a style."),
      ),
    }
  }

  fn spread(&mut self, expr: &Expr, path: &SelectorPath, guard: &Guard) -> Result<(), CompileError> {
    match unwrap_expr(expr) {
      Expr::Object(_) | Expr::Array(_) | Expr::Cond(_) | Expr::Bin(_) | Expr::TaggedTpl(_) => {
        self.style(expr, path, guard)
      }
      Expr::Ident(ident) => match self.evaluator.binding(ident) {
        Some(binding) if binding.is_foldable() && binding.init.is_some() => {
          self.style(expr, path, guard)
        }
        _ => self.spread_value(expr, path, guard),
      },
      _ => self.spread_value(expr, path, guard),
    }
  }

  fn spread_value(&mut self, expr: &Expr, path: &SelectorPath, guard: &Guard) -> Result<(), CompileError> {
    match self.evaluator.evaluate(expr) {
      value @ (StaticValue::Object(_) | StaticValue::Array(_) | StaticValue::Nullish) => {
        self.style_value(value, expr, path, guard)
      }
      _ => Err(CompileError::at(ErrorKind::UnresolvedSpread, expr)),
    }
  }

  fn xcss(&mut self, expr: &Expr) -> Result<(), CompileError> {
    let root = SelectorPath::default();
    match unwrap_expr(expr) {
      Expr::Object(_) | Expr::Member(_) | Expr::Cond(_) | Expr::Bin(_) | Expr::Array(_) => {
        self.style(expr, &root, &Vec::new())
      }
      Expr::Ident(ident) => match self.evaluator.binding(ident) {
        Some(binding) if self.is_css_map_init(binding.init.as_deref()) => {
          Err(CompileError::at(ErrorKind::UseVariantOfCssMap, ident))
        }
        _ => {
          let value = self.evaluator.evaluate(expr);
          self.style_value(value, expr, &root, &Vec::new())
        }
      },
      _ => {
        let value = self.evaluator.evaluate(expr);
        self.style_value(value, expr, &root, &Vec::new())
      }
    }
  }

  fn is_css_map_init(&self, init: Option<&Expr>) -> bool {
    let Some(Expr::Call(call)) = init.map(unwrap_expr) else {
      return false;
    };
    match &call.callee {
      Callee::Expr(callee) => self.evaluator.scope().style_api_of(callee) == Some(StyleApi::CssMap),
      _ => false,
    }
  }

  // The binding id when `expr` names a `cssMap(...)` result.
  fn css_map_object(&self, expr: &Expr) -> Option<Id> {
    let Expr::Ident(ident) = unwrap_expr(expr) else {
      return None;
    };
    let binding = self.evaluator.binding(ident)?;
    self
      .is_css_map_init(binding.init.as_deref())
      .then(|| ident.to_id())
  }

  fn push_declaration(&mut self, mut declaration: StyleDeclaration) {
    declaration.order = self.items.len();
    self.items.push(StyleItem::Declaration(declaration));
  }
}

#[cfg(test)]
mod tests;
