//! Cross-module constant resolution.
//!
//! The engine never touches the filesystem on its own. When an identifier is bound to an
//! import, it asks the configured [`ModuleResolver`] for the initializer of the imported
//! binding. A `None` answer simply makes the value unresolvable.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use swc_core::common::SourceMap;
use swc_core::ecma::ast::{
  Decl, DefaultDecl, ExportSpecifier, Expr, FnExpr, Id, Module, ModuleDecl, ModuleExportName, ModuleItem,
  Pat, Stmt, VarDeclKind,
};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::parse::parse_module;

pub trait ModuleResolver: Send + Sync {
  /// Returns the initializer of `export` in the module named by `specifier`.
  fn resolve(&self, specifier: &str, export: &str) -> Option<Expr>;
}

impl<F> ModuleResolver for F
where
  F: Fn(&str, &str) -> Option<Expr> + Send + Sync,
{
  fn resolve(&self, specifier: &str, export: &str) -> Option<Expr> {
    self(specifier, export)
  }
}

/// Resolves imports against module sources held in memory.
#[derive(Default)]
pub struct SourceModuleResolver {
  sources: HashMap<String, String>,
}

impl SourceModuleResolver {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_module(mut self, specifier: impl Into<String>, source: impl Into<String>) -> Self {
    self.sources.insert(specifier.into(), source.into());
    self
  }
}

impl ModuleResolver for SourceModuleResolver {
  fn resolve(&self, specifier: &str, export: &str) -> Option<Expr> {
    let source = self.sources.get(specifier)?;
    find_export_in_source(specifier, source, export)
  }
}

/// Resolves relative specifiers against a fixed directory on disk.
pub struct FsModuleResolver {
  root: PathBuf,
}

const EXTENSIONS: [&str; 4] = ["ts", "tsx", "js", "jsx"];

impl FsModuleResolver {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    FsModuleResolver { root: root.into() }
  }

  fn locate(&self, specifier: &str) -> Option<PathBuf> {
    let base = self.root.join(specifier);
    if base.is_file() {
      return Some(base);
    }
    EXTENSIONS
      .iter()
      .map(|ext| with_extension(&base, ext))
      .chain(EXTENSIONS.iter().map(|ext| base.join(format!("index.{ext}"))))
      .find(|candidate| candidate.is_file())
  }
}

fn with_extension(base: &Path, ext: &str) -> PathBuf {
  let mut path = base.as_os_str().to_owned();
  path.push(".");
  path.push(ext);
  PathBuf::from(path)
}

impl ModuleResolver for FsModuleResolver {
  fn resolve(&self, specifier: &str, export: &str) -> Option<Expr> {
    let Some(path) = self.locate(specifier) else {
      tracing::debug!(specifier, "module not found under resolver root");
      return None;
    };
    let source = match fs::read_to_string(&path) {
      Ok(source) => source,
      Err(error) => {
        tracing::debug!(?path, %error, "failed to read module");
        return None;
      }
    };
    find_export_in_source(&path.to_string_lossy(), &source, export)
  }
}

fn find_export_in_source(filename: &str, source: &str, export: &str) -> Option<Expr> {
  let source_map = SourceMap::default();
  let module = match parse_module(&source_map, filename, source) {
    Ok(module) => module,
    Err(error) => {
      tracing::debug!(filename, error, "failed to parse module for constant resolution");
      return None;
    }
  };
  let constants = ModuleConstants::collect(&module);
  let mut expr = constants.export(&module, export)?;
  constants.inline_into(&mut expr);
  Some(expr)
}

/// Top-level `const` initializers of a foreign module.
struct ModuleConstants {
  consts: HashMap<Id, Expr>,
}

const MAX_INLINE_DEPTH: usize = 8;

impl ModuleConstants {
  fn collect(module: &Module) -> Self {
    let mut consts = HashMap::new();
    for item in &module.body {
      let decl = match item {
        ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => var,
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => match &export.decl {
          Decl::Var(var) => var,
          _ => continue,
        },
        _ => continue,
      };
      if decl.kind != VarDeclKind::Const {
        continue;
      }
      for declarator in &decl.decls {
        if let (Pat::Ident(name), Some(init)) = (&declarator.name, &declarator.init) {
          consts.insert(name.id.to_id(), (**init).clone());
        }
      }
    }
    ModuleConstants { consts }
  }

  fn export(&self, module: &Module, export: &str) -> Option<Expr> {
    for item in &module.body {
      let ModuleItem::ModuleDecl(decl) = item else {
        continue;
      };
      match decl {
        ModuleDecl::ExportDecl(export_decl) => {
          match &export_decl.decl {
            Decl::Var(var) => {
              for declarator in &var.decls {
                if let (Pat::Ident(name), Some(init)) = (&declarator.name, &declarator.init) {
                  if &*name.id.sym == export {
                    return Some((**init).clone());
                  }
                }
              }
            }
            Decl::Fn(function) if &*function.ident.sym == export => {
              return Some(Expr::Fn(FnExpr {
                ident: Some(function.ident.clone()),
                function: function.function.clone(),
              }));
            }
            _ => {}
          }
        }
        ModuleDecl::ExportDefaultExpr(default) if export == "default" => {
          return Some((*default.expr).clone());
        }
        ModuleDecl::ExportDefaultDecl(default) if export == "default" => {
          if let DefaultDecl::Fn(function) = &default.decl {
            return Some(Expr::Fn(function.clone()));
          }
        }
        ModuleDecl::ExportNamed(named) if named.src.is_none() => {
          for specifier in &named.specifiers {
            let ExportSpecifier::Named(named) = specifier else {
              continue;
            };
            let exported = named.exported.as_ref().unwrap_or(&named.orig);
            if export_name(exported) != export {
              continue;
            }
            if let ModuleExportName::Ident(local) = &named.orig {
              return self.consts.get(&local.to_id()).cloned();
            }
          }
        }
        _ => {}
      }
    }
    None
  }

  fn inline_into(&self, expr: &mut Expr) {
    expr.visit_mut_with(&mut ConstantInliner {
      constants: self,
      depth: 0,
    });
  }
}

fn export_name(name: &ModuleExportName) -> &str {
  match name {
    ModuleExportName::Ident(ident) => &ident.sym,
    ModuleExportName::Str(str) => &str.value,
  }
}

struct ConstantInliner<'a> {
  constants: &'a ModuleConstants,
  depth: usize,
}

impl VisitMut for ConstantInliner<'_> {
  fn visit_mut_expr(&mut self, expr: &mut Expr) {
    if let Expr::Ident(ident) = expr {
      if self.depth < MAX_INLINE_DEPTH {
        if let Some(init) = self.constants.consts.get(&ident.to_id()) {
          *expr = init.clone();
          self.depth += 1;
          expr.visit_mut_with(self);
          self.depth -= 1;
          return;
        }
      }
    }
    expr.visit_mut_children_with(self);
  }
}

#[cfg(test)]
mod tests {
  use swc_core::common::DUMMY_SP;
  use swc_core::ecma::ast::{Lit, Prop, PropOrSpread, Str};

  use super::*;

  fn string_value(expr: &Expr) -> Option<String> {
    match expr {
      Expr::Lit(Lit::Str(str)) => Some(str.value.to_string()),
      _ => None,
    }
  }

  #[test]
  fn resolves_exported_constants() {
    let resolver = SourceModuleResolver::new().with_module(
      "./colors",
      "const base = 'blue';\nexport const primary = base;\nconst hidden = 'red';\nexport { hidden as danger };\n",
    );

    assert_eq!(
      resolver.resolve("./colors", "primary").as_ref().and_then(string_value),
      Some("blue".into())
    );
    assert_eq!(
      resolver.resolve("./colors", "danger").as_ref().and_then(string_value),
      Some("red".into())
    );
    assert!(resolver.resolve("./colors", "missing").is_none());
    assert!(resolver.resolve("./unknown", "primary").is_none());
  }

  #[test]
  fn inlines_constants_inside_objects() {
    let resolver = SourceModuleResolver::new().with_module(
      "./theme",
      "const space = 8;\nexport default { gutter: space };\n",
    );

    let Some(Expr::Object(object)) = resolver.resolve("./theme", "default") else {
      panic!("expected an object");
    };
    let PropOrSpread::Prop(prop) = &object.props[0] else {
      panic!("expected a property");
    };
    let Prop::KeyValue(key_value) = &**prop else {
      panic!("expected a key value property");
    };
    assert!(matches!(&*key_value.value, Expr::Lit(Lit::Num(num)) if num.value == 8.0));
  }

  #[test]
  fn accepts_closures() {
    let resolver = |specifier: &str, _export: &str| {
      (specifier == "tokens").then(|| {
        Expr::Lit(Lit::Str(Str {
          span: DUMMY_SP,
          value: "red".into(),
          raw: None,
        }))
      })
    };

    assert!(resolver.resolve("tokens", "color").is_some());
    assert!(resolver.resolve("other", "color").is_none());
  }
}
