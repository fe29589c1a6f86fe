//! Rewrites a module's style usages into atomic class names and runtime helpers.
//!
//! Each usage site is compiled by [`StyleCompiler`] against one shared rule cache, so the
//! rules of the whole file come out deduplicated. The rewritten code references `ax`, `ix`,
//! `CC` and `CS` from the configured runtime module, and every rule text is hoisted into a
//! module-level `const` that `CS` injects.

mod class_names;
mod imports;
mod jsx;
mod styled;

use swc_core::common::{SourceMap, DUMMY_SP};
use swc_core::ecma::ast::{
  Callee, Expr, Id, Ident, JSXElement, Module, ObjectLit, Pat, VarDeclarator,
};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::ast::{key_value_prop, null_expr, str_expr, unwrap_expr};
use crate::config::AtomicCssConfig;
use crate::errors::CompileError;
use crate::evaluate::Evaluator;
use crate::scope::{ScopeGraph, StyleApi};
use crate::usage::{CompiledCssMap, StyleCompiler};

use imports::{
  append_runtime_imports, forward_ref_ident, insert_after_imports, remove_unused_style_imports,
  used_names, RuntimeImports, SheetHoister,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformOutput {
  /// Every rule the file's usages produced, deduplicated and in injection order.
  pub style_rules: Vec<String>,
  /// False when the module had nothing to compile and was left untouched.
  pub transformed: bool,
}

/// Compiles every style usage in `module` and rewrites it in place.
///
/// The first compile error aborts the file. The module must have been through the swc
/// `resolver` pass.
#[tracing::instrument(level = "debug", skip_all)]
pub fn transform_module(
  module: &mut Module,
  source_map: &SourceMap,
  config: &AtomicCssConfig,
) -> Result<TransformOutput, CompileError> {
  let graph = ScopeGraph::build(module, config);
  if !graph.has_style_imports() && !config.process_xcss {
    tracing::debug!("no style imports");
    return Ok(TransformOutput::default());
  }

  let taken = used_names(module);
  let (forward_ref, forward_ref_imported) = forward_ref_ident(module, &taken);
  let mut transformer = StyleTransformer {
    config,
    graph: &graph,
    evaluator: Evaluator::new(&graph, config.resolver.as_deref()),
    compiler: StyleCompiler::new(config),
    sheets: SheetHoister::new(taken),
    runtime: RuntimeImports::default(),
    forward_ref,
    error: None,
    transformed: false,
  };

  module.visit_mut_with(&mut CssMapDeclarations {
    transformer: &mut transformer,
  });
  if transformer.error.is_none() {
    module.visit_mut_with(&mut transformer);
  }

  if let Some(error) = transformer.error.take() {
    tracing::debug!(kind = %error.kind, "compile failed");
    return Err(if config.show_code_frames {
      error.with_code_frame(source_map)
    } else {
      error
    });
  }
  if !transformer.transformed {
    return Ok(TransformOutput::default());
  }

  let style_rules: Vec<String> = transformer
    .compiler
    .cache()
    .sorted_rules()
    .into_iter()
    .map(|rule| rule.css.clone())
    .collect();
  let StyleTransformer {
    sheets,
    runtime,
    forward_ref,
    ..
  } = transformer;
  let forward_ref = (runtime.forward_ref && !forward_ref_imported).then_some(forward_ref);

  remove_unused_style_imports(module, &graph);
  if !sheets.is_empty() {
    insert_after_imports(module, sheets.declarations());
  }
  if !runtime.is_empty() {
    append_runtime_imports(
      module,
      &runtime,
      &config.runtime_import_source,
      forward_ref.as_ref(),
    );
  }

  tracing::debug!(rules = style_rules.len(), "transformed module");
  Ok(TransformOutput {
    style_rules,
    transformed: true,
  })
}

pub(crate) struct StyleTransformer<'a> {
  config: &'a AtomicCssConfig,
  graph: &'a ScopeGraph,
  evaluator: Evaluator<'a>,
  compiler: StyleCompiler,
  sheets: SheetHoister,
  runtime: RuntimeImports,
  forward_ref: Ident,
  error: Option<CompileError>,
  transformed: bool,
}

impl StyleTransformer<'_> {
  /// Runs `compile`, keeping the first error for the caller of [`transform_module`].
  fn record<T>(
    &mut self,
    compile: impl FnOnce(&mut Self) -> Result<T, CompileError>,
  ) -> Option<T> {
    match compile(self) {
      Ok(value) => Some(value),
      Err(error) => {
        if self.error.is_none() {
          self.error = Some(error);
        }
        None
      }
    }
  }

  fn is_api_call(&self, expr: &Expr, api: StyleApi) -> bool {
    match expr {
      Expr::Call(call) => match &call.callee {
        Callee::Expr(callee) => self.graph.style_api_of(unwrap_expr(callee)) == Some(api),
        _ => false,
      },
      Expr::TaggedTpl(tagged) => self.graph.style_api_of(unwrap_expr(&tagged.tag)) == Some(api),
      _ => false,
    }
  }

  /// `{ primary: "_syaz5scu", ... }` for a compiled `cssMap`.
  fn css_map_object(&mut self, compiled: &CompiledCssMap) -> Expr {
    self.transformed = true;
    Expr::Object(ObjectLit {
      span: DUMMY_SP,
      props: compiled
        .variants
        .iter()
        .map(|(name, variant)| key_value_prop(name, str_expr(&variant.class_name)))
        .collect(),
    })
  }

  fn css_map(&mut self, binding: Option<Id>, expr: &Expr) -> Option<Expr> {
    let Expr::Call(call) = expr else {
      return None;
    };
    let compiled = self.record(|transformer| {
      transformer
        .compiler
        .compile_css_map(&mut transformer.evaluator, binding, call)
    })?;
    Some(self.css_map_object(&compiled))
  }

  fn rewrite_expr(&mut self, expr: &Expr) -> Option<Expr> {
    if let Some(component) = self.styled_component(expr) {
      return Some(component);
    }
    if self.is_api_call(expr, StyleApi::CssMap) {
      return self.css_map(None, expr);
    }
    // Styles that reached an element were inlined where they were used.
    if self.is_api_call(expr, StyleApi::Css) {
      return Some(null_expr());
    }
    None
  }
}

impl VisitMut for StyleTransformer<'_> {
  fn visit_mut_jsx_element(&mut self, element: &mut JSXElement) {
    if self.error.is_some() {
      return;
    }
    if self.class_names(element) || self.css_prop(element) || self.xcss_props(element) {
      self.transformed = true;
      return;
    }
    element.visit_mut_children_with(self);
  }

  fn visit_mut_expr(&mut self, expr: &mut Expr) {
    if self.error.is_some() {
      return;
    }
    if let Some(rewritten) = self.rewrite_expr(expr) {
      *expr = rewritten;
      self.transformed = true;
      return;
    }
    expr.visit_mut_children_with(self);
  }
}

/// Compiles `const styles = cssMap({...})` first, so usages anywhere in the file know the
/// sheets behind `styles.primary`.
struct CssMapDeclarations<'t, 'a> {
  transformer: &'t mut StyleTransformer<'a>,
}

impl VisitMut for CssMapDeclarations<'_, '_> {
  fn visit_mut_var_declarator(&mut self, declarator: &mut VarDeclarator) {
    if self.transformer.error.is_some() {
      return;
    }
    let (Pat::Ident(name), Some(init)) = (&declarator.name, &declarator.init) else {
      declarator.visit_mut_children_with(self);
      return;
    };
    if !self.transformer.is_api_call(unwrap_expr(init), StyleApi::CssMap) {
      declarator.visit_mut_children_with(self);
      return;
    }

    let binding = name.id.to_id();
    if let Some(object) = self.transformer.css_map(Some(binding), unwrap_expr(init)) {
      declarator.init = Some(Box::new(object));
    }
  }
}

#[cfg(test)]
mod tests;
