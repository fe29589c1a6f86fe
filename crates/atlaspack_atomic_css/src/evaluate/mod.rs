//! Bounded compile-time evaluation of style expressions.
//!
//! Evaluation never fails: anything that cannot be proven constant comes back as
//! [`StaticValue::Unresolvable`] and stays a runtime expression.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use swc_core::ecma::ast::{
  ArrayLit, BinExpr, BinaryOp, CallExpr, Callee, Decl, Expr, Id, Ident, Lit, MemberExpr,
  MemberProp, ObjectLit, ObjectPatProp, OptChainBase, Pat, Prop, PropName, PropOrSpread, Stmt,
  Tpl, VarDeclKind,
};

use crate::ast::{static_prop_name, unwrap_expr};
use crate::resolver::ModuleResolver;
use crate::scope::{pattern_ids, BindingKind, ImportedName, PathStep, ScopeBinding, ScopeGraph};

mod operators;
mod value;

pub use operators::{fold_binary, fold_unary};
pub use value::{js_number, FunctionBody, FunctionValue, Slot, StaticValue};

pub const MAX_EVALUATION_DEPTH: usize = 64;
pub const MAX_CALL_DEPTH: usize = 8;

/// A piece of a template literal after folding its interpolations.
#[derive(Clone, Debug)]
pub enum TemplatePart {
  Text(String),
  Dynamic(Box<Expr>),
}

pub type TemplateParts = Vec<TemplatePart>;

pub struct Evaluator<'a> {
  scope: &'a ScopeGraph,
  resolver: Option<&'a dyn ModuleResolver>,
  in_flight: HashSet<Id>,
  locals: Vec<HashMap<Id, StaticValue>>,
  depth: usize,
  call_depth: usize,
}

impl<'a> Evaluator<'a> {
  pub fn new(scope: &'a ScopeGraph, resolver: Option<&'a dyn ModuleResolver>) -> Self {
    Evaluator {
      scope,
      resolver,
      in_flight: HashSet::new(),
      locals: Vec::new(),
      depth: 0,
      call_depth: 0,
    }
  }

  pub fn scope(&self) -> &'a ScopeGraph {
    self.scope
  }

  pub fn evaluate(&mut self, expr: &Expr) -> StaticValue {
    if self.depth >= MAX_EVALUATION_DEPTH {
      tracing::debug!("evaluation depth exceeded");
      return StaticValue::Unresolvable;
    }
    self.depth += 1;
    let value = self.evaluate_inner(unwrap_expr(expr));
    self.depth -= 1;
    value
  }

  /// Folds each interpolation of a template, keeping the ones that stay dynamic.
  pub fn evaluate_template(&mut self, tpl: &Tpl) -> TemplateParts {
    let mut parts = Vec::new();
    for (index, quasi) in tpl.quasis.iter().enumerate() {
      let text = quasi
        .cooked
        .as_ref()
        .map(|cooked| cooked.to_string())
        .unwrap_or_else(|| quasi.raw.to_string());
      push_text(&mut parts, text);

      let Some(expr) = tpl.exprs.get(index) else {
        continue;
      };
      match self.evaluate(expr).to_js_string() {
        Some(text) => push_text(&mut parts, text),
        None => parts.push(TemplatePart::Dynamic(expr.clone())),
      }
    }
    parts
  }

  /// The binding an identifier refers to, if it was declared in this module.
  pub fn binding(&self, ident: &Ident) -> Option<&'a ScopeBinding> {
    self.scope.binding(&ident.to_id())
  }

  fn evaluate_inner(&mut self, expr: &Expr) -> StaticValue {
    match expr {
      Expr::Lit(lit) => evaluate_lit(lit),
      Expr::Tpl(tpl) => {
        let parts = self.evaluate_template(tpl);
        match parts.as_slice() {
          [] => StaticValue::String(String::new()),
          [TemplatePart::Text(text)] => StaticValue::String(text.clone()),
          _ => StaticValue::Unresolvable,
        }
      }
      Expr::Ident(ident) => self.evaluate_ident(ident),
      Expr::Object(object) => self.evaluate_object(object),
      Expr::Array(array) => self.evaluate_array(array),
      Expr::Member(member) => self.evaluate_member(member, false),
      Expr::OptChain(chain) => match &*chain.base {
        OptChainBase::Member(member) => self.evaluate_member(member, chain.optional),
        OptChainBase::Call(_) => StaticValue::Unresolvable,
      },
      Expr::Bin(bin) => self.evaluate_binary(bin),
      Expr::Unary(unary) => {
        let arg = self.evaluate(&unary.arg);
        fold_unary(unary.op, &arg)
      }
      Expr::Cond(cond) => match self.evaluate(&cond.test).truthiness() {
        Some(true) => self.evaluate(&cond.cons),
        Some(false) => self.evaluate(&cond.alt),
        None => StaticValue::Unresolvable,
      },
      Expr::Call(call) => self.evaluate_call(call),
      Expr::Arrow(arrow) if !arrow.is_async && !arrow.is_generator => {
        StaticValue::Function(FunctionValue::from_arrow(arrow))
      }
      Expr::Fn(function) => FunctionValue::from_function(&function.function)
        .map(StaticValue::Function)
        .unwrap_or(StaticValue::Unresolvable),
      _ => StaticValue::Unresolvable,
    }
  }

  fn evaluate_ident(&mut self, ident: &Ident) -> StaticValue {
    let id = ident.to_id();
    if let Some(value) = self.locals.iter().rev().find_map(|frame| frame.get(&id)) {
      return value.clone();
    }

    let Some(binding) = self.scope.binding(&id) else {
      return match &*ident.sym {
        "undefined" => StaticValue::Nullish,
        _ => StaticValue::Unresolvable,
      };
    };
    if !binding.is_foldable() || self.in_flight.contains(&id) {
      return StaticValue::Unresolvable;
    }

    self.in_flight.insert(id.clone());
    let value = self.evaluate_binding(binding);
    self.in_flight.remove(&id);

    tracing::trace!(name = %ident.sym, resolved = value.is_resolved(), "evaluated binding");
    value
  }

  fn evaluate_binding(&mut self, binding: &ScopeBinding) -> StaticValue {
    if let Some(import) = &binding.import {
      let export = match &import.imported {
        ImportedName::Default => "default",
        ImportedName::Named(name) => name.as_str(),
        ImportedName::Namespace => return StaticValue::Unresolvable,
      };
      return self.evaluate_import(&import.source, export);
    }

    let Some(init) = binding.init.as_deref() else {
      return match binding.kind {
        BindingKind::Let | BindingKind::Var => StaticValue::Nullish,
        _ => StaticValue::Unresolvable,
      };
    };

    let mut value = self.evaluate(init);
    for step in &binding.path {
      value = apply_step(&value, step);
    }
    if matches!(value, StaticValue::Nullish) {
      if let Some(default) = binding.default.as_deref() {
        value = self.evaluate(default);
      }
    }
    value
  }

  // Foreign constants are self-contained once inlined, so only fully static results count.
  fn evaluate_import(&mut self, source: &str, export: &str) -> StaticValue {
    let Some(resolver) = self.resolver else {
      return StaticValue::Unresolvable;
    };
    let Some(expr) = resolver.resolve(source, export) else {
      tracing::debug!(source, export, "import could not be resolved");
      return StaticValue::Unresolvable;
    };
    let value = self.evaluate(&expr);
    if value.is_fully_static() {
      value
    } else {
      StaticValue::Unresolvable
    }
  }

  fn evaluate_object(&mut self, object: &ObjectLit) -> StaticValue {
    let mut map = IndexMap::new();
    for prop in &object.props {
      match prop {
        PropOrSpread::Spread(spread) => match self.evaluate(&spread.expr) {
          StaticValue::Object(inner) => map.extend(inner),
          StaticValue::Nullish => {}
          _ => return StaticValue::Unresolvable,
        },
        PropOrSpread::Prop(prop) => match &**prop {
          Prop::KeyValue(key_value) => {
            let Some(key) = self.property_key(&key_value.key) else {
              return StaticValue::Unresolvable;
            };
            let slot = self.slot(&key_value.value);
            map.insert(key, slot);
          }
          Prop::Shorthand(ident) => {
            let key = ident.sym.to_string();
            let slot = self.slot(&Expr::Ident(ident.clone()));
            map.insert(key, slot);
          }
          _ => return StaticValue::Unresolvable,
        },
      }
    }
    StaticValue::Object(map)
  }

  fn evaluate_array(&mut self, array: &ArrayLit) -> StaticValue {
    let mut items = Vec::new();
    for element in &array.elems {
      match element {
        None => items.push(Slot::Static(StaticValue::Nullish)),
        Some(element) if element.spread.is_some() => match self.evaluate(&element.expr) {
          StaticValue::Array(inner) => items.extend(inner),
          _ => return StaticValue::Unresolvable,
        },
        Some(element) => items.push(self.slot(&element.expr)),
      }
    }
    StaticValue::Array(items)
  }

  fn slot(&mut self, expr: &Expr) -> Slot {
    match self.evaluate(expr) {
      StaticValue::Unresolvable => Slot::Dynamic(Box::new(expr.clone())),
      value => Slot::Static(value),
    }
  }

  fn property_key(&mut self, key: &PropName) -> Option<String> {
    match key {
      PropName::Computed(computed) => self.evaluate(&computed.expr).to_js_string(),
      key => static_prop_name(key),
    }
  }

  fn evaluate_member(&mut self, member: &MemberExpr, optional: bool) -> StaticValue {
    if let Some(value) = self.evaluate_namespace_member(member) {
      return value;
    }

    let object = self.evaluate(&member.obj);
    if optional && matches!(object, StaticValue::Nullish) {
      return StaticValue::Nullish;
    }
    let key = match &member.prop {
      MemberProp::Ident(ident) => ident.sym.to_string(),
      MemberProp::Computed(computed) => match self.evaluate(&computed.expr).to_js_string() {
        Some(key) => key,
        None => return StaticValue::Unresolvable,
      },
      MemberProp::PrivateName(_) => return StaticValue::Unresolvable,
    };
    property(&object, &key)
  }

  // `tokens.primary` where `tokens` is `import * as tokens`.
  fn evaluate_namespace_member(&mut self, member: &MemberExpr) -> Option<StaticValue> {
    let Expr::Ident(object) = unwrap_expr(&member.obj) else {
      return None;
    };
    let import = self.binding(object)?.import.as_ref()?;
    if import.imported != ImportedName::Namespace {
      return None;
    }
    let value = match &member.prop {
      MemberProp::Ident(name) => self.evaluate_import(&import.source, &name.sym),
      _ => StaticValue::Unresolvable,
    };
    Some(value)
  }

  fn evaluate_binary(&mut self, bin: &BinExpr) -> StaticValue {
    match bin.op {
      BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
        let left = self.evaluate(&bin.left);
        let Some(truthy) = left.truthiness() else {
          return StaticValue::Unresolvable;
        };
        if truthy == (bin.op == BinaryOp::LogicalOr) {
          left
        } else {
          self.evaluate(&bin.right)
        }
      }
      BinaryOp::NullishCoalescing => match self.evaluate(&bin.left) {
        StaticValue::Nullish => self.evaluate(&bin.right),
        StaticValue::Unresolvable => StaticValue::Unresolvable,
        left => left,
      },
      op => {
        let left = self.evaluate(&bin.left);
        if !left.is_resolved() {
          return StaticValue::Unresolvable;
        }
        let right = self.evaluate(&bin.right);
        fold_binary(op, &left, &right)
      }
    }
  }

  fn evaluate_call(&mut self, call: &CallExpr) -> StaticValue {
    let Callee::Expr(callee) = &call.callee else {
      return StaticValue::Unresolvable;
    };
    let StaticValue::Function(function) = self.evaluate(callee) else {
      return StaticValue::Unresolvable;
    };
    if self.call_depth >= MAX_CALL_DEPTH {
      tracing::debug!("call depth exceeded");
      return StaticValue::Unresolvable;
    }

    let mut args = Vec::with_capacity(call.args.len());
    for arg in &call.args {
      if arg.spread.is_some() {
        return StaticValue::Unresolvable;
      }
      let value = self.evaluate(&arg.expr);
      if !value.is_fully_static() {
        return StaticValue::Unresolvable;
      }
      args.push(value);
    }

    self.call_depth += 1;
    self.locals.push(HashMap::new());
    for (index, param) in function.params.iter().enumerate() {
      let arg = args.get(index).cloned().unwrap_or(StaticValue::Nullish);
      self.bind_pattern(param, arg);
    }
    let value = match &function.body {
      FunctionBody::Expr(expr) => self.evaluate(expr),
      FunctionBody::Block(block) => self.evaluate_body(&block.stmts),
    };
    self.locals.pop();
    self.call_depth -= 1;

    if value.is_fully_static() {
      value
    } else {
      StaticValue::Unresolvable
    }
  }

  // Only `const` declarations followed by a `return` are interpreted.
  fn evaluate_body(&mut self, stmts: &[Stmt]) -> StaticValue {
    for stmt in stmts {
      match stmt {
        Stmt::Decl(Decl::Var(var)) if var.kind == VarDeclKind::Const => {
          for declarator in &var.decls {
            let value = match declarator.init.as_deref() {
              Some(init) => self.evaluate(init),
              None => StaticValue::Unresolvable,
            };
            self.bind_pattern(&declarator.name, value);
          }
        }
        Stmt::Return(ret) => {
          return match ret.arg.as_deref() {
            Some(arg) => self.evaluate(arg),
            None => StaticValue::Nullish,
          };
        }
        Stmt::Empty(_) => {}
        _ => return StaticValue::Unresolvable,
      }
    }
    StaticValue::Nullish
  }

  fn bind_pattern(&mut self, pat: &Pat, value: StaticValue) {
    match pat {
      Pat::Ident(binding) => self.bind_local(binding.id.to_id(), value),
      Pat::Assign(assign) => {
        let value = match value {
          StaticValue::Nullish => self.evaluate(&assign.right),
          value => value,
        };
        self.bind_pattern(&assign.left, value);
      }
      Pat::Object(object) => {
        let mut picked = Vec::new();
        for prop in &object.props {
          match prop {
            ObjectPatProp::KeyValue(key_value) => match self.property_key(&key_value.key) {
              Some(key) => {
                let inner = property(&value, &key);
                picked.push(key);
                self.bind_pattern(&key_value.value, inner);
              }
              None => self.bind_unresolvable(&key_value.value),
            },
            ObjectPatProp::Assign(assign) => {
              let key = assign.key.sym.to_string();
              let mut inner = property(&value, &key);
              if matches!(inner, StaticValue::Nullish) {
                if let Some(default) = assign.value.as_deref() {
                  inner = self.evaluate(default);
                }
              }
              picked.push(key);
              self.bind_local(assign.key.to_id(), inner);
            }
            ObjectPatProp::Rest(rest) => {
              let inner = apply_step(&value, &PathStep::RestOfObject(picked.clone()));
              self.bind_pattern(&rest.arg, inner);
            }
          }
        }
      }
      Pat::Array(array) => {
        for (index, element) in array.elems.iter().enumerate() {
          match element {
            Some(Pat::Rest(rest)) => {
              let inner = apply_step(&value, &PathStep::RestOfArray(index));
              self.bind_pattern(&rest.arg, inner);
            }
            Some(element) => {
              let inner = apply_step(&value, &PathStep::Index(index));
              self.bind_pattern(element, inner);
            }
            None => {}
          }
        }
      }
      Pat::Rest(rest) => self.bind_pattern(&rest.arg, value),
      Pat::Expr(_) | Pat::Invalid(_) => {}
    }
  }

  fn bind_unresolvable(&mut self, pat: &Pat) {
    for id in pattern_ids(pat) {
      self.bind_local(id, StaticValue::Unresolvable);
    }
  }

  fn bind_local(&mut self, id: Id, value: StaticValue) {
    if let Some(frame) = self.locals.last_mut() {
      frame.insert(id, value);
    }
  }
}

fn evaluate_lit(lit: &Lit) -> StaticValue {
  match lit {
    Lit::Str(str) => StaticValue::String(str.value.to_string()),
    Lit::Num(num) => StaticValue::Number(num.value),
    Lit::Bool(bool) => StaticValue::Boolean(bool.value),
    Lit::Null(_) => StaticValue::Nullish,
    _ => StaticValue::Unresolvable,
  }
}

fn push_text(parts: &mut TemplateParts, text: String) {
  if text.is_empty() {
    return;
  }
  match parts.last_mut() {
    Some(TemplatePart::Text(last)) => last.push_str(&text),
    _ => parts.push(TemplatePart::Text(text)),
  }
}

/// Reads `key` off a value the way a JavaScript property access would.
pub fn property(value: &StaticValue, key: &str) -> StaticValue {
  match value {
    StaticValue::Object(map) => map
      .get(key)
      .map(Slot::value)
      .unwrap_or(StaticValue::Nullish),
    StaticValue::Array(items) => match key {
      "length" => StaticValue::Number(items.len() as f64),
      _ => match key.parse::<usize>() {
        Ok(index) => items
          .get(index)
          .map(Slot::value)
          .unwrap_or(StaticValue::Nullish),
        Err(_) => StaticValue::Unresolvable,
      },
    },
    StaticValue::String(text) => match key {
      "length" => StaticValue::Number(text.encode_utf16().count() as f64),
      _ => match key.parse::<usize>() {
        Ok(index) => text
          .chars()
          .nth(index)
          .map(|ch| StaticValue::String(ch.to_string()))
          .unwrap_or(StaticValue::Nullish),
        Err(_) => StaticValue::Unresolvable,
      },
    },
    _ => StaticValue::Unresolvable,
  }
}

fn apply_step(value: &StaticValue, step: &PathStep) -> StaticValue {
  match step {
    PathStep::Key(key) => property(value, key),
    PathStep::Index(index) => property(value, &index.to_string()),
    PathStep::RestOfObject(picked) => match value {
      StaticValue::Object(map) => StaticValue::Object(
        map
          .iter()
          .filter(|(key, _)| !picked.contains(key))
          .map(|(key, slot)| (key.clone(), slot.clone()))
          .collect(),
      ),
      _ => StaticValue::Unresolvable,
    },
    PathStep::RestOfArray(from) => match value {
      StaticValue::Array(items) => StaticValue::Array(items.iter().skip(*from).cloned().collect()),
      _ => StaticValue::Unresolvable,
    },
  }
}
