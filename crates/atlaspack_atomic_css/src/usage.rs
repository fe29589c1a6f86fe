//! Compiles one style usage site end to end: normalization, shorthand expansion, override
//! resolution, variable binding, atomic rule interning and class-name composition.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use swc_core::ecma::ast::{CallExpr, Expr, Id, Prop, PropName, PropOrSpread};

use crate::ast::{static_prop_name, unwrap_expr};
use crate::atomic::{sort_for_injection, AtomicRule, AtomicRuleKey, StyleSheetCache};
use crate::compose::{
  ax_call, build_style_object, class_exprs, ClassFragment, ConditionalClassExpr, FragmentClass,
};
use crate::config::AtomicCssConfig;
use crate::errors::{CompileError, ErrorKind};
use crate::evaluate::Evaluator;
use crate::html_attributes::is_html_attribute;
use crate::normalize::{
  normalize_css, normalize_css_map_variant, normalize_styled, NormalizedStyles, StyleContext,
  StyleItem, StyledInput,
};
use crate::shorthand::{expand_declarations, resolve_overrides};
use crate::variables::{CssVariableBinding, VariableBinder};

/// Everything the host needs to rewrite one usage site.
#[derive(Clone, Debug, Default)]
pub struct CompiledUsage {
  /// Rule texts to inject, deduplicated and in injection order.
  pub sheets: Vec<String>,
  pub class_names: Vec<ConditionalClassExpr>,
  pub variables: Vec<CssVariableBinding>,
  /// Props read by style interpolations that must not reach the DOM element.
  pub excluded_props: Vec<String>,
}

impl CompiledUsage {
  /// `ax([...])` with `pass_through` as the last fragment.
  pub fn class_name_expr(&self, pass_through: Option<Expr>) -> Expr {
    ax_call(&self.class_names, pass_through)
  }

  /// The `style` value, or `None` when there are no variables and nothing to pass through.
  pub fn style_expr(&self, pass_through: Option<Expr>) -> Option<Expr> {
    build_style_object(&self.variables, pass_through)
  }

  /// The class names as a single string when none of them is conditional.
  pub fn static_class_name(&self) -> Option<String> {
    match self.class_names.as_slice() {
      [] => Some(String::new()),
      [ConditionalClassExpr::Literal(classes)] => Some(classes.join(" ")),
      _ => None,
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompiledVariant {
  pub class_name: String,
  pub sheets: Vec<String>,
}

/// A `cssMap` call compiled to one class string per variant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledCssMap {
  pub variants: IndexMap<String, CompiledVariant>,
}

impl CompiledCssMap {
  /// The sheets of every variant, deduplicated.
  pub fn sheets(&self) -> Vec<String> {
    let sheets: IndexSet<&String> = self
      .variants
      .values()
      .flat_map(|variant| &variant.sheets)
      .collect();
    sheets.into_iter().cloned().collect()
  }
}

/// Compiles the usage sites of one file against a shared rule cache.
#[derive(Debug)]
pub struct StyleCompiler {
  cache: StyleSheetCache,
  css_maps: HashMap<Id, CompiledCssMap>,
}

impl StyleCompiler {
  pub fn new(config: &AtomicCssConfig) -> Self {
    StyleCompiler {
      cache: StyleSheetCache::new(config.class_hash_prefix()),
      css_maps: HashMap::new(),
    }
  }

  pub fn cache(&self) -> &StyleSheetCache {
    &self.cache
  }

  /// A `css()` call, a `css` prop or a `ClassNames` call.
  #[tracing::instrument(level = "debug", skip_all)]
  pub fn compile_css(
    &mut self,
    evaluator: &mut Evaluator<'_>,
    expr: &Expr,
  ) -> Result<CompiledUsage, CompileError> {
    let normalized = normalize_css(evaluator, expr, StyleContext::Css)?;
    self.compile(normalized, StyleContext::Css)
  }

  #[tracing::instrument(level = "debug", skip_all)]
  pub fn compile_xcss(
    &mut self,
    evaluator: &mut Evaluator<'_>,
    expr: &Expr,
  ) -> Result<CompiledUsage, CompileError> {
    let normalized = normalize_css(evaluator, expr, StyleContext::Xcss)?;
    self.compile(normalized, StyleContext::Xcss)
  }

  #[tracing::instrument(level = "debug", skip_all)]
  pub fn compile_styled(
    &mut self,
    evaluator: &mut Evaluator<'_>,
    input: StyledInput<'_>,
  ) -> Result<CompiledUsage, CompileError> {
    let normalized = normalize_styled(evaluator, input)?;
    self.compile(normalized, StyleContext::Styled)
  }

  /// Compiles `cssMap({...})` and remembers it under `binding`, so usages that reference
  /// its variants inject its sheets.
  #[tracing::instrument(level = "debug", skip_all)]
  pub fn compile_css_map(
    &mut self,
    evaluator: &mut Evaluator<'_>,
    binding: Option<Id>,
    call: &CallExpr,
  ) -> Result<CompiledCssMap, CompileError> {
    let object = match call.args.as_slice() {
      [arg] if arg.spread.is_none() => match unwrap_expr(&arg.expr) {
        Expr::Object(object) => object,
        _ => return Err(CompileError::at(ErrorKind::CssMapArgument, call)),
      },
      _ => return Err(CompileError::at(ErrorKind::CssMapArgument, call)),
    };

    let mut compiled = CompiledCssMap::default();
    for prop in &object.props {
      let prop = match prop {
        PropOrSpread::Spread(spread) => {
          return Err(CompileError::new(ErrorKind::NoSpreadElement, spread.dot3_token))
        }
        PropOrSpread::Prop(prop) => prop,
      };
      let Prop::KeyValue(kv) = &**prop else {
        return Err(CompileError::at(ErrorKind::NoObjectMethod, prop));
      };
      let name = match &kv.key {
        PropName::Computed(computed) => match evaluator.evaluate(&computed.expr).to_js_string() {
          Some(name) => name,
          None => return Err(CompileError::at(ErrorKind::StaticPropertyKey, &kv.key)),
        },
        key => static_prop_name(key).unwrap_or_default(),
      };

      let normalized = normalize_css_map_variant(evaluator, &kv.value)?;
      let variant = self.compile_variant(normalized)?;
      tracing::trace!(variant = %name, class_name = %variant.class_name, "compiled cssMap variant");
      compiled.variants.insert(name, variant);
    }

    if let Some(binding) = binding {
      self.css_maps.insert(binding, compiled.clone());
    }
    Ok(compiled)
  }

  fn compile_variant(&mut self, normalized: NormalizedStyles) -> Result<CompiledVariant, CompileError> {
    let items = resolve_overrides(expand_declarations(normalized.items));
    let mut class_names = Vec::with_capacity(items.len());
    let mut rules = Vec::with_capacity(items.len());

    for item in items {
      let declaration = match item {
        StyleItem::Declaration(declaration) if declaration.guard.is_empty() => declaration,
        StyleItem::Declaration(declaration) => {
          return Err(CompileError::new(ErrorKind::StaticVariantObject, declaration.span))
        }
        StyleItem::ClassReference { expr, .. } => {
          return Err(CompileError::at(ErrorKind::StaticVariantObject, &*expr))
        }
      };
      let Some(value) = declaration.static_value() else {
        return Err(CompileError::new(ErrorKind::StaticVariantObject, declaration.span));
      };

      let rule = self.cache.intern(AtomicRuleKey {
        path: declaration.path,
        property: declaration.property,
        value,
        important: declaration.important,
      });
      class_names.push(rule.class_name.clone());
      rules.push(rule.clone());
    }

    Ok(CompiledVariant {
      class_name: class_names.join(" "),
      sheets: sheets_of(&rules),
    })
  }

  fn compile(
    &mut self,
    normalized: NormalizedStyles,
    context: StyleContext,
  ) -> Result<CompiledUsage, CompileError> {
    let items = resolve_overrides(expand_declarations(normalized.items));
    let mut binder = VariableBinder::new();
    let mut fragments = Vec::with_capacity(items.len());
    let mut rules: Vec<AtomicRule> = Vec::new();
    let mut map_sheets = Vec::new();

    for item in items {
      match item {
        StyleItem::Declaration(declaration) => {
          if context == StyleContext::Xcss && declaration.is_dynamic() {
            return Err(
              CompileError::new(ErrorKind::UnsupportedNode, declaration.span)
                .with_message("Object given to the xcss prop must be static."),
            );
          }
          let (value, _) = binder.bind(&declaration.value, &declaration.property);
          let rule = self.cache.intern(AtomicRuleKey {
            path: declaration.path,
            property: declaration.property,
            value,
            important: declaration.important,
          });
          fragments.push(ClassFragment {
            guard: declaration.guard,
            class: FragmentClass::Atomic(rule.class_name.clone()),
          });
          rules.push(rule.clone());
        }
        StyleItem::ClassReference {
          expr,
          guard,
          css_map,
          ..
        } => {
          if let Some(map) = css_map.as_ref().and_then(|id| self.css_maps.get(id)) {
            map_sheets.extend(map.sheets());
          }
          fragments.push(ClassFragment {
            guard,
            class: FragmentClass::Runtime(expr),
          });
        }
      }
    }

    let mut sheets: IndexSet<String> = sheets_of(&rules).into_iter().collect();
    sheets.extend(map_sheets);

    let excluded_props = normalized
      .consumed_props
      .into_iter()
      .filter(|prop| !is_html_attribute(prop))
      .collect();

    let usage = CompiledUsage {
      sheets: sheets.into_iter().collect(),
      class_names: class_exprs(&fragments),
      variables: binder.into_bindings(),
      excluded_props,
    };
    tracing::debug!(
      sheets = usage.sheets.len(),
      variables = usage.variables.len(),
      "compiled style usage"
    );
    Ok(usage)
  }
}

fn sheets_of(rules: &[AtomicRule]) -> Vec<String> {
  let mut seen = IndexSet::new();
  for rule in sort_for_injection(rules) {
    seen.insert(rule.css.clone());
  }
  seen.into_iter().collect()
}
