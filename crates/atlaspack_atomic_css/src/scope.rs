//! One upfront pass over a module that records every binding and whether it is ever
//! reassigned or mutated.
//!
//! The module must have been through the swc `resolver` pass so that each binding has a
//! unique [`Id`], which makes shadowing in nested functions a non-issue.

use std::collections::{HashMap, HashSet};

use swc_core::common::{Span, Spanned};
use swc_core::ecma::ast::{
  ArrowExpr, AssignExpr, AssignTarget, AssignTargetPat, CatchClause, ClassDecl, Expr, FnDecl,
  FnExpr, Id, ImportDecl, ImportSpecifier, MemberExpr, Module, ModuleExportName, ObjectPatProp,
  Param, Pat, SimpleAssignTarget, UpdateExpr, VarDecl, VarDeclKind,
};
use swc_core::ecma::visit::{Visit, VisitWith};

use crate::ast::static_prop_name;
use crate::config::AtomicCssConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
  Const,
  Let,
  Var,
  Function,
  Class,
  Import,
  Param,
  Destructured,
}

/// One step from a destructuring source to the bound value.
#[derive(Clone, Debug, PartialEq)]
pub enum PathStep {
  Key(String),
  Index(usize),
  /// `...rest` in an object pattern, minus the keys picked before it.
  RestOfObject(Vec<String>),
  /// `...rest` in an array pattern, from this index on.
  RestOfArray(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ImportedName {
  Default,
  Named(String),
  Namespace,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportSource {
  pub source: String,
  pub imported: ImportedName,
}

#[derive(Clone, Debug)]
pub struct ScopeBinding {
  pub kind: BindingKind,
  /// The initializer, or for destructured bindings the destructured source.
  pub init: Option<Box<Expr>>,
  pub path: Vec<PathStep>,
  /// Default value from the destructuring pattern.
  pub default: Option<Box<Expr>>,
  pub import: Option<ImportSource>,
  pub is_reassigned: bool,
  pub span: Span,
}

impl ScopeBinding {
  /// Whether the bound value can be folded at compile time.
  pub fn is_foldable(&self) -> bool {
    match self.kind {
      BindingKind::Param | BindingKind::Class => false,
      _ => !self.is_reassigned,
    }
  }
}

/// The style-authoring API a local name was imported as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleApi {
  Css,
  CssMap,
  Styled,
  ClassNames,
}

impl StyleApi {
  fn from_export(name: &str) -> Option<Self> {
    match name {
      "css" => Some(StyleApi::Css),
      "cssMap" => Some(StyleApi::CssMap),
      "styled" => Some(StyleApi::Styled),
      "ClassNames" => Some(StyleApi::ClassNames),
      _ => None,
    }
  }
}

#[derive(Debug, Default)]
pub struct ScopeGraph {
  bindings: HashMap<Id, ScopeBinding>,
  style_imports: HashMap<Id, StyleApi>,
}

impl ScopeGraph {
  #[tracing::instrument(level = "debug", skip_all)]
  pub fn build(module: &Module, config: &AtomicCssConfig) -> Self {
    let mut collector = Collector::default();
    module.visit_with(&mut collector);

    let mut bindings = collector.bindings;
    for id in &collector.reassigned {
      if let Some(binding) = bindings.get_mut(id) {
        binding.is_reassigned = true;
      }
    }

    let style_imports = bindings
      .iter()
      .filter_map(|(id, binding)| {
        let import = binding.import.as_ref()?;
        if !config.is_style_source(&import.source) {
          return None;
        }
        match &import.imported {
          ImportedName::Named(name) => StyleApi::from_export(name).map(|api| (id.clone(), api)),
          _ => None,
        }
      })
      .collect::<HashMap<_, _>>();

    tracing::debug!(
      bindings = bindings.len(),
      style_imports = style_imports.len(),
      "built scope graph"
    );
    ScopeGraph {
      bindings,
      style_imports,
    }
  }

  pub fn binding(&self, id: &Id) -> Option<&ScopeBinding> {
    self.bindings.get(id)
  }

  pub fn style_api(&self, id: &Id) -> Option<StyleApi> {
    self.style_imports.get(id).copied()
  }

  /// The style API an identifier expression was imported as.
  pub fn style_api_of(&self, expr: &Expr) -> Option<StyleApi> {
    match expr {
      Expr::Ident(ident) => self.style_api(&ident.to_id()),
      _ => None,
    }
  }

  pub fn has_style_imports(&self) -> bool {
    !self.style_imports.is_empty()
  }

  pub fn style_imports(&self) -> impl Iterator<Item = (&Id, StyleApi)> + '_ {
    self.style_imports.iter().map(|(id, api)| (id, *api))
  }

  #[cfg(test)]
  pub(crate) fn bindings_named(&self, name: &str) -> Vec<(&Id, &ScopeBinding)> {
    self
      .bindings
      .iter()
      .filter(|(id, _)| &*id.0 == name)
      .collect()
  }
}

#[derive(Default)]
struct Collector {
  bindings: HashMap<Id, ScopeBinding>,
  reassigned: HashSet<Id>,
}

impl Collector {
  fn insert(&mut self, id: Id, binding: ScopeBinding) {
    self.bindings.insert(id, binding);
  }

  fn declare_pattern(
    &mut self,
    pat: &Pat,
    kind: BindingKind,
    source: Option<&Expr>,
    path: Vec<PathStep>,
    default: Option<&Expr>,
  ) {
    match pat {
      Pat::Ident(binding) => {
        let kind = if path.is_empty() || kind == BindingKind::Param {
          kind
        } else {
          BindingKind::Destructured
        };
        self.insert(
          binding.id.to_id(),
          ScopeBinding {
            kind,
            init: source.map(|expr| Box::new(expr.clone())),
            path,
            default: default.map(|expr| Box::new(expr.clone())),
            import: None,
            is_reassigned: false,
            span: binding.span,
          },
        );
      }
      Pat::Assign(assign) => {
        self.declare_pattern(&assign.left, kind, source, path, Some(&assign.right));
      }
      Pat::Object(object) => {
        let mut picked = Vec::new();
        for prop in &object.props {
          match prop {
            ObjectPatProp::KeyValue(key_value) => {
              let Some(key) = static_prop_name(&key_value.key) else {
                self.declare_opaque(&key_value.value, kind);
                continue;
              };
              picked.push(key.clone());
              let mut next = path.clone();
              next.push(PathStep::Key(key));
              self.declare_pattern(&key_value.value, kind, source, next, None);
            }
            ObjectPatProp::Assign(assign) => {
              let key = assign.key.sym.to_string();
              picked.push(key.clone());
              let mut next = path.clone();
              next.push(PathStep::Key(key));
              let pat = Pat::Ident(assign.key.clone());
              self.declare_pattern(&pat, kind, source, next, assign.value.as_deref());
            }
            ObjectPatProp::Rest(rest) => {
              let mut next = path.clone();
              next.push(PathStep::RestOfObject(picked.clone()));
              self.declare_pattern(&rest.arg, kind, source, next, None);
            }
          }
        }
      }
      Pat::Array(array) => {
        for (index, element) in array.elems.iter().enumerate() {
          let Some(element) = element else {
            continue;
          };
          let mut next = path.clone();
          match element {
            Pat::Rest(rest) => {
              next.push(PathStep::RestOfArray(index));
              self.declare_pattern(&rest.arg, kind, source, next, None);
            }
            _ => {
              next.push(PathStep::Index(index));
              self.declare_pattern(element, kind, source, next, None);
            }
          }
        }
      }
      Pat::Rest(rest) => self.declare_pattern(&rest.arg, kind, source, path, default),
      Pat::Expr(_) | Pat::Invalid(_) => {}
    }
  }

  // Bindings whose value cannot be traced, e.g. behind a computed destructuring key.
  fn declare_opaque(&mut self, pat: &Pat, kind: BindingKind) {
    let kind = if kind == BindingKind::Param {
      kind
    } else {
      BindingKind::Destructured
    };
    for id in pattern_ids(pat) {
      self.insert(
        id,
        ScopeBinding {
          kind,
          init: None,
          path: Vec::new(),
          default: None,
          import: None,
          is_reassigned: true,
          span: pat.span(),
        },
      );
    }
  }

  fn declare_params<'a>(&mut self, params: impl Iterator<Item = &'a Pat>) {
    for pat in params {
      for id in pattern_ids(pat) {
        self.insert(
          id,
          ScopeBinding {
            kind: BindingKind::Param,
            init: None,
            path: Vec::new(),
            default: None,
            import: None,
            is_reassigned: false,
            span: pat.span(),
          },
        );
      }
    }
  }

  fn mark_target_pattern(&mut self, pat: &Pat) {
    self.reassigned.extend(pattern_ids(pat));
  }
}

pub(crate) fn pattern_ids(pat: &Pat) -> Vec<Id> {
  let mut ids = Vec::new();
  collect_pattern_ids(pat, &mut ids);
  ids
}

fn collect_pattern_ids(pat: &Pat, ids: &mut Vec<Id>) {
  match pat {
    Pat::Ident(binding) => ids.push(binding.id.to_id()),
    Pat::Assign(assign) => collect_pattern_ids(&assign.left, ids),
    Pat::Rest(rest) => collect_pattern_ids(&rest.arg, ids),
    Pat::Array(array) => array
      .elems
      .iter()
      .flatten()
      .for_each(|element| collect_pattern_ids(element, ids)),
    Pat::Object(object) => {
      for prop in &object.props {
        match prop {
          ObjectPatProp::KeyValue(key_value) => collect_pattern_ids(&key_value.value, ids),
          ObjectPatProp::Assign(assign) => ids.push(assign.key.to_id()),
          ObjectPatProp::Rest(rest) => collect_pattern_ids(&rest.arg, ids),
        }
      }
    }
    Pat::Expr(expr) => {
      if let Some(id) = root_ident(expr) {
        ids.push(id);
      }
    }
    Pat::Invalid(_) => {}
  }
}

// The object at the bottom of a member chain, e.g. `theme` in `theme.colors.primary`.
fn root_ident(expr: &Expr) -> Option<Id> {
  match expr {
    Expr::Ident(ident) => Some(ident.to_id()),
    Expr::Member(MemberExpr { obj, .. }) => root_ident(obj),
    Expr::Paren(paren) => root_ident(&paren.expr),
    _ => None,
  }
}

impl Visit for Collector {
  fn visit_var_decl(&mut self, decl: &VarDecl) {
    let kind = match decl.kind {
      VarDeclKind::Const => BindingKind::Const,
      VarDeclKind::Let => BindingKind::Let,
      VarDeclKind::Var => BindingKind::Var,
    };
    for declarator in &decl.decls {
      self.declare_pattern(
        &declarator.name,
        kind,
        declarator.init.as_deref(),
        Vec::new(),
        None,
      );
    }
    decl.visit_children_with(self);
  }

  fn visit_fn_decl(&mut self, decl: &FnDecl) {
    self.insert(
      decl.ident.to_id(),
      ScopeBinding {
        kind: BindingKind::Function,
        init: Some(Box::new(Expr::Fn(FnExpr {
          ident: Some(decl.ident.clone()),
          function: decl.function.clone(),
        }))),
        path: Vec::new(),
        default: None,
        import: None,
        is_reassigned: false,
        span: decl.ident.span,
      },
    );
    decl.visit_children_with(self);
  }

  fn visit_class_decl(&mut self, decl: &ClassDecl) {
    self.insert(
      decl.ident.to_id(),
      ScopeBinding {
        kind: BindingKind::Class,
        init: None,
        path: Vec::new(),
        default: None,
        import: None,
        is_reassigned: false,
        span: decl.ident.span,
      },
    );
    decl.visit_children_with(self);
  }

  fn visit_import_decl(&mut self, decl: &ImportDecl) {
    let source = decl.src.value.to_string();
    for specifier in &decl.specifiers {
      let (local, imported) = match specifier {
        ImportSpecifier::Named(named) => {
          let imported = match &named.imported {
            Some(ModuleExportName::Ident(ident)) => ident.sym.to_string(),
            Some(ModuleExportName::Str(str)) => str.value.to_string(),
            None => named.local.sym.to_string(),
          };
          let imported = if imported == "default" {
            ImportedName::Default
          } else {
            ImportedName::Named(imported)
          };
          (&named.local, imported)
        }
        ImportSpecifier::Default(default) => (&default.local, ImportedName::Default),
        ImportSpecifier::Namespace(namespace) => (&namespace.local, ImportedName::Namespace),
      };
      self.insert(
        local.to_id(),
        ScopeBinding {
          kind: BindingKind::Import,
          init: None,
          path: Vec::new(),
          default: None,
          import: Some(ImportSource {
            source: source.clone(),
            imported,
          }),
          is_reassigned: false,
          span: local.span,
        },
      );
    }
  }

  fn visit_param(&mut self, param: &Param) {
    self.declare_params(std::iter::once(&param.pat));
    param.visit_children_with(self);
  }

  fn visit_arrow_expr(&mut self, arrow: &ArrowExpr) {
    self.declare_params(arrow.params.iter());
    arrow.visit_children_with(self);
  }

  fn visit_catch_clause(&mut self, clause: &CatchClause) {
    self.declare_params(clause.param.iter());
    clause.visit_children_with(self);
  }

  fn visit_assign_expr(&mut self, assign: &AssignExpr) {
    match &assign.left {
      AssignTarget::Simple(SimpleAssignTarget::Ident(binding)) => {
        self.reassigned.insert(binding.id.to_id());
      }
      AssignTarget::Simple(SimpleAssignTarget::Member(member)) => {
        self.reassigned.extend(root_ident(&member.obj));
      }
      AssignTarget::Simple(_) => {}
      AssignTarget::Pat(AssignTargetPat::Array(array)) => {
        self.mark_target_pattern(&Pat::Array(array.clone()));
      }
      AssignTarget::Pat(AssignTargetPat::Object(object)) => {
        self.mark_target_pattern(&Pat::Object(object.clone()));
      }
      AssignTarget::Pat(AssignTargetPat::Invalid(_)) => {}
    }
    assign.visit_children_with(self);
  }

  fn visit_update_expr(&mut self, update: &UpdateExpr) {
    self.reassigned.extend(root_ident(&update.arg));
    update.visit_children_with(self);
  }
}
