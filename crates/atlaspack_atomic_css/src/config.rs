use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::errors::ConfigError;
use crate::resolver::ModuleResolver;

/// Package that supplies the style-authoring API when no custom source is configured.
pub const DEFAULT_IMPORT_SOURCE: &str = "@compiled/react";
pub const DEFAULT_RUNTIME_IMPORT_SOURCE: &str = "@compiled/react/runtime";

static CSS_IDENTIFIER: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^-?[_a-zA-Z]+[_a-zA-Z0-9-]*$").expect("valid identifier pattern"));

#[derive(Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AtomicCssConfig {
  /// Module specifiers, besides `@compiled/react`, that export the style-authoring API.
  pub import_sources: Vec<String>,
  /// Security nonce applied to injected style elements.
  pub nonce: Option<String>,
  /// Mixed into every class name hash. Must be a valid CSS identifier.
  pub class_hash_prefix: Option<String>,
  /// Render an excerpt of the offending source under compile errors.
  pub show_code_frames: bool,
  /// Module the `ax`, `ix`, `CC` and `CS` helpers are imported from.
  pub runtime_import_source: String,
  /// Compile `xcss` props on JSX elements.
  pub process_xcss: bool,
  /// Resolves constants imported from other modules.
  #[serde(skip)]
  pub resolver: Option<Arc<dyn ModuleResolver>>,
}

impl Default for AtomicCssConfig {
  fn default() -> Self {
    AtomicCssConfig {
      import_sources: Vec::new(),
      nonce: None,
      class_hash_prefix: None,
      show_code_frames: true,
      runtime_import_source: DEFAULT_RUNTIME_IMPORT_SOURCE.into(),
      process_xcss: true,
      resolver: None,
    }
  }
}

impl fmt::Debug for AtomicCssConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AtomicCssConfig")
      .field("import_sources", &self.import_sources)
      .field("nonce", &self.nonce)
      .field("class_hash_prefix", &self.class_hash_prefix)
      .field("show_code_frames", &self.show_code_frames)
      .field("runtime_import_source", &self.runtime_import_source)
      .field("process_xcss", &self.process_xcss)
      .field("resolver", &self.resolver.is_some())
      .finish()
  }
}

impl AtomicCssConfig {
  pub fn with_resolver(mut self, resolver: impl ModuleResolver + 'static) -> Self {
    self.resolver = Some(Arc::new(resolver));
    self
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if let Some(prefix) = &self.class_hash_prefix {
      if !CSS_IDENTIFIER.is_match(prefix) {
        return Err(ConfigError::InvalidClassHashPrefix(prefix.clone()));
      }
    }
    Ok(())
  }

  /// Whether `specifier` supplies `css`, `cssMap`, `styled` or `ClassNames`.
  pub fn is_style_source(&self, specifier: &str) -> bool {
    specifier == DEFAULT_IMPORT_SOURCE || self.import_sources.iter().any(|s| s == specifier)
  }

  pub fn class_hash_prefix(&self) -> &str {
    self.class_hash_prefix.as_deref().unwrap_or("")
  }
}
