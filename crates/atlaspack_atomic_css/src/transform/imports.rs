use std::collections::HashSet;

use indexmap::IndexMap;
use swc_core::atoms::Atom;
use swc_core::common::DUMMY_SP;
use swc_core::ecma::ast::{
  Decl, Id, Ident, ImportDecl, ImportNamedSpecifier, ImportPhase, ImportSpecifier, Module,
  ModuleDecl, ModuleExportName, ModuleItem, Stmt, Str, VarDecl, VarDeclKind, VarDeclarator,
};
use swc_core::ecma::visit::{Visit, VisitWith};

use crate::ast::{ident, str_expr};
use crate::compose::AX;
use crate::scope::ScopeGraph;
use crate::variables::IX;

use super::jsx::{CC, CS};

/// Names every identifier in the module uses, so generated names never collide.
pub fn used_names(module: &Module) -> HashSet<Atom> {
  struct Names(HashSet<Atom>);

  impl Visit for Names {
    fn visit_ident(&mut self, ident: &Ident) {
      self.0.insert(ident.sym.clone());
    }
  }

  let mut names = Names(HashSet::new());
  module.visit_with(&mut names);
  names.0
}

/// Hoists each distinct rule text into a module-level `const`.
#[derive(Debug)]
pub struct SheetHoister {
  sheets: IndexMap<String, Ident>,
  taken: HashSet<Atom>,
  counter: usize,
}

impl SheetHoister {
  pub fn new(taken: HashSet<Atom>) -> Self {
    SheetHoister {
      sheets: IndexMap::new(),
      taken,
      counter: 0,
    }
  }

  /// The identifier holding `sheet`: `_`, `_2`, `_3` and so on.
  pub fn hoist(&mut self, sheet: &str) -> Ident {
    if let Some(existing) = self.sheets.get(sheet) {
      return existing.clone();
    }

    let name = loop {
      self.counter += 1;
      let name = if self.counter == 1 {
        "_".to_string()
      } else {
        format!("_{}", self.counter)
      };
      if !self.taken.contains(&Atom::from(name.as_str())) {
        break name;
      }
    };
    let hoisted = ident(&name);
    self.sheets.insert(sheet.to_string(), hoisted.clone());
    hoisted
  }

  pub fn is_empty(&self) -> bool {
    self.sheets.is_empty()
  }

  /// `const _ = "._syaz5scu{color:red}";` for every hoisted sheet, in first-use order.
  pub fn declarations(&self) -> Vec<ModuleItem> {
    self
      .sheets
      .iter()
      .map(|(sheet, name)| {
        ModuleItem::Stmt(Stmt::Decl(Decl::Var(Box::new(VarDecl {
          span: DUMMY_SP,
          ctxt: Default::default(),
          kind: VarDeclKind::Const,
          declare: false,
          decls: vec![VarDeclarator {
            span: DUMMY_SP,
            name: name.clone().into(),
            init: Some(Box::new(str_expr(sheet))),
            definite: false,
          }],
        }))))
      })
      .collect()
  }
}

/// Runtime helpers the rewritten module references.
#[derive(Debug, Default)]
pub struct RuntimeImports {
  pub ax: bool,
  pub ix: bool,
  /// `CC` and `CS` are always used together.
  pub cc: bool,
  pub forward_ref: bool,
}

impl RuntimeImports {
  fn names(&self) -> Vec<&'static str> {
    let mut names = Vec::new();
    if self.ax {
      names.push(AX);
    }
    if self.ix {
      names.push(IX);
    }
    if self.cc {
      names.push(CC);
      names.push(CS);
    }
    names
  }

  pub fn is_empty(&self) -> bool {
    !self.ax && !self.ix && !self.cc && !self.forward_ref
  }
}

/// The local name `forwardRef` is available under: an existing `react` import, or a fresh
/// name the caller has to import.
pub fn forward_ref_ident(module: &Module, taken: &HashSet<Atom>) -> (Ident, bool) {
  for item in &module.body {
    let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
      continue;
    };
    if &*import.src.value != "react" || import.type_only {
      continue;
    }
    for specifier in &import.specifiers {
      if let ImportSpecifier::Named(named) = specifier {
        if imported_name(named) == "forwardRef" && !named.is_type_only {
          return (named.local.clone(), true);
        }
      }
    }
  }

  let name = if taken.contains(&Atom::from("forwardRef")) {
    "__cmplf"
  } else {
    "forwardRef"
  };
  (ident(name), false)
}

fn imported_name(named: &ImportNamedSpecifier) -> &str {
  match &named.imported {
    Some(ModuleExportName::Ident(ident)) => &*ident.sym,
    Some(ModuleExportName::Str(str)) => &*str.value,
    None => &*named.local.sym,
  }
}

fn named_specifier(local: Ident, imported: Option<&str>) -> ImportSpecifier {
  ImportSpecifier::Named(ImportNamedSpecifier {
    span: DUMMY_SP,
    local,
    imported: imported.map(|name| ModuleExportName::Ident(ident(name))),
    is_type_only: false,
  })
}

fn import_decl(source: &str, specifiers: Vec<ImportSpecifier>) -> ModuleItem {
  ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl {
    span: DUMMY_SP,
    specifiers,
    src: Box::new(Str {
      span: DUMMY_SP,
      value: source.into(),
      raw: None,
    }),
    type_only: false,
    with: None,
    phase: ImportPhase::Evaluation,
  }))
}

/// Adds `specifier` to an existing value import of `source`. False when there is none.
fn add_to_existing_import(module: &mut Module, source: &str, specifier: &ImportSpecifier) -> bool {
  let local = match specifier {
    ImportSpecifier::Named(named) => named.local.sym.clone(),
    _ => return false,
  };
  for item in &mut module.body {
    let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
      continue;
    };
    if &*import.src.value != source || import.type_only {
      continue;
    }
    if import
      .specifiers
      .iter()
      .any(|existing| matches!(existing, ImportSpecifier::Namespace(_)))
    {
      continue;
    }
    let already_imported = import.specifiers.iter().any(|existing| {
      matches!(existing, ImportSpecifier::Named(named) if named.local.sym == local)
    });
    if !already_imported {
      import.specifiers.push(specifier.clone());
    }
    return true;
  }
  false
}

/// Imports the runtime helpers and `forwardRef`, reusing existing import declarations.
pub fn append_runtime_imports(
  module: &mut Module,
  runtime: &RuntimeImports,
  runtime_source: &str,
  forward_ref: Option<&Ident>,
) {
  let mut prepended = Vec::new();

  let runtime_specifiers: Vec<ImportSpecifier> = runtime
    .names()
    .into_iter()
    .map(|name| named_specifier(ident(name), None))
    .filter(|specifier| !add_to_existing_import(module, runtime_source, specifier))
    .collect();
  if !runtime_specifiers.is_empty() {
    prepended.push(import_decl(runtime_source, runtime_specifiers));
  }

  if let Some(local) = forward_ref {
    let imported = (&*local.sym != "forwardRef").then_some("forwardRef");
    let specifier = named_specifier(local.clone(), imported);
    if !add_to_existing_import(module, "react", &specifier) {
      prepended.insert(0, import_decl("react", vec![specifier]));
    }
  }

  if !prepended.is_empty() {
    prepended.append(&mut module.body);
    module.body = prepended;
  }
}

/// Drops style-API specifiers the rewritten module no longer references, and import
/// declarations left with no specifiers.
pub fn remove_unused_style_imports(module: &mut Module, graph: &ScopeGraph) {
  let style_ids: HashSet<Id> = graph.style_imports().map(|(id, _)| id.clone()).collect();
  if style_ids.is_empty() {
    return;
  }
  let referenced = referenced_ids(module);

  module.body.retain_mut(|item| {
    let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
      return true;
    };
    let before = import.specifiers.len();
    import.specifiers.retain(|specifier| {
      let ImportSpecifier::Named(named) = specifier else {
        return true;
      };
      let id = named.local.to_id();
      !style_ids.contains(&id) || referenced.contains(&id)
    });
    before == 0 || !import.specifiers.is_empty()
  });
}

// Identifiers referenced outside of import declarations.
fn referenced_ids(module: &Module) -> HashSet<Id> {
  struct References(HashSet<Id>);

  impl Visit for References {
    fn visit_import_decl(&mut self, _: &ImportDecl) {}

    fn visit_ident(&mut self, ident: &Ident) {
      self.0.insert(ident.to_id());
    }
  }

  let mut references = References(HashSet::new());
  module.visit_with(&mut references);
  references.0
}

/// Inserts `items` after the leading import declarations.
pub fn insert_after_imports(module: &mut Module, items: Vec<ModuleItem>) {
  if items.is_empty() {
    return;
  }
  let index = module
    .body
    .iter()
    .position(|item| !matches!(item, ModuleItem::ModuleDecl(ModuleDecl::Import(_))))
    .unwrap_or(module.body.len());
  module.body.splice(index..index, items);
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::config::AtomicCssConfig;
  use crate::test_utils::parse_resolved;

  fn import_sources(module: &Module) -> Vec<String> {
    module
      .body
      .iter()
      .filter_map(|item| match item {
        ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
          let names: Vec<String> = import
            .specifiers
            .iter()
            .filter_map(|specifier| match specifier {
              ImportSpecifier::Named(named) => Some(named.local.sym.to_string()),
              _ => None,
            })
            .collect();
          Some(format!("{}: {}", import.src.value, names.join(",")))
        }
        _ => None,
      })
      .collect()
  }

  #[test]
  fn names_sheets_in_first_use_order() {
    let mut hoister = SheetHoister::new(HashSet::new());

    assert_eq!(&*hoister.hoist(".a{color:red}").sym, "_");
    assert_eq!(&*hoister.hoist(".b{color:blue}").sym, "_2");
    assert_eq!(&*hoister.hoist(".a{color:red}").sym, "_");
    assert_eq!(hoister.declarations().len(), 2);
  }

  #[test]
  fn skips_names_taken_by_the_module() {
    let taken: HashSet<Atom> = ["_".into(), "_3".into()].into_iter().collect();
    let mut hoister = SheetHoister::new(taken);

    assert_eq!(&*hoister.hoist(".a{color:red}").sym, "_2");
    assert_eq!(&*hoister.hoist(".b{color:blue}").sym, "_4");
  }

  #[test]
  fn merges_runtime_helpers_into_existing_import() {
    let mut parsed = parse_resolved(
      "import { ix } from '@compiled/react/runtime';\nimport React from 'react';\nconst value = 1;",
    );
    let runtime = RuntimeImports {
      ax: true,
      ix: true,
      cc: true,
      forward_ref: false,
    };

    append_runtime_imports(&mut parsed.module, &runtime, "@compiled/react/runtime", None);

    assert_eq!(
      import_sources(&parsed.module),
      vec!["@compiled/react/runtime: ix,ax,CC,CS", "react: "]
    );
  }

  #[test]
  fn reuses_an_existing_forward_ref_import() {
    let parsed = parse_resolved("import { forwardRef as fr } from 'react';");
    let (local, imported) = forward_ref_ident(&parsed.module, &used_names(&parsed.module));

    assert!(imported);
    assert_eq!(&*local.sym, "fr");
  }

  #[test]
  fn removes_style_imports_that_are_no_longer_referenced() {
    let mut parsed = parse_resolved(
      r#"
        import { css, styled } from '@compiled/react';
        import { useState } from 'react';
        const Box = styled.div({});
        useState();
      "#,
    );
    let graph = ScopeGraph::build(&parsed.module, &AtomicCssConfig::default());

    remove_unused_style_imports(&mut parsed.module, &graph);

    assert_eq!(
      import_sources(&parsed.module),
      vec!["@compiled/react: styled", "react: useState"]
    );
  }
}
