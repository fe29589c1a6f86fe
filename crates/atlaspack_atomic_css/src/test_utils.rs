use swc_core::common::sync::Lrc;
use swc_core::common::SourceMap;
use swc_core::ecma::ast::{Expr, Module};

use crate::config::AtomicCssConfig;
use crate::errors::{CompileError, TransformError};
use crate::parse::{parse_module, resolve_module};
use crate::scope::{ScopeBinding, ScopeGraph};

pub const TEST_FILENAME: &str = "component.tsx";

pub struct Parsed {
  pub module: Module,
  #[allow(unused)]
  pub source_map: Lrc<SourceMap>,
}

/// Parses `code` and runs the swc resolver over it.
pub fn parse_resolved(code: &str) -> Parsed {
  let source_map: Lrc<SourceMap> = Default::default();
  let mut module = parse_module(&source_map, TEST_FILENAME, code).unwrap();
  resolve_module(&mut module, true);
  Parsed { module, source_map }
}

/// The only binding called `name`.
pub fn find_binding<'a>(graph: &'a ScopeGraph, name: &str) -> &'a ScopeBinding {
  let bindings = graph.bindings_named(name);
  assert_eq!(bindings.len(), 1, "expected exactly one binding named {name}");
  bindings[0].1
}

pub fn init_of(graph: &ScopeGraph, name: &str) -> Expr {
  let binding = find_binding(graph, name);
  *binding
    .init
    .clone()
    .unwrap_or_else(|| panic!("{name} has no initializer"))
}

pub fn test_config() -> AtomicCssConfig {
  AtomicCssConfig {
    show_code_frames: false,
    ..Default::default()
  }
}

/// Transforms `code` and returns the printed module.
pub fn transform(code: &str) -> String {
  transform_with(code, &test_config())
}

pub fn transform_with(code: &str, config: &AtomicCssConfig) -> String {
  match crate::transform_code(code, TEST_FILENAME, config) {
    Ok(output) => output,
    Err(error) => panic!("transform failed: {error}"),
  }
}

/// Transforms `code`, expecting a compile error.
pub fn transform_error(code: &str) -> CompileError {
  match crate::transform_code(code, TEST_FILENAME, &test_config()) {
    Ok(output) => panic!("expected a compile error, got:\n{output}"),
    Err(TransformError::Compile(error)) => error,
    Err(error) => panic!("expected a compile error, got {error}"),
  }
}
