use std::fmt;

use serde::Serialize;
use swc_core::common::{SourceMap, Span, Spanned};

/// Categories of fatal compile errors.
///
/// Anything the evaluator merely cannot prove constant is not an error: it becomes a CSS
/// variable binding. These kinds are reserved for authoring mistakes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
  UnsupportedNode,
  UnresolvedIdentifier,
  UnresolvedSpread,
  DynamicSelector,
  StaticPropertyKey,
  AtRuleValueType,
  SelectorsBlockValueType,
  DuplicateSelector,
  DuplicateSelectorsBlock,
  DuplicateAtRule,
  UseSelectorsWithAmpersand,
  NoSpreadElement,
  NoObjectMethod,
  UseVariantOfCssMap,
  NestedVariantAccess,
  StaticVariantObject,
  CssMapArgument,
}

impl ErrorKind {
  pub fn code(&self) -> &'static str {
    match self {
      ErrorKind::UnsupportedNode => "UNSUPPORTED_NODE",
      ErrorKind::UnresolvedIdentifier => "UNRESOLVED_IDENTIFIER",
      ErrorKind::UnresolvedSpread => "UNRESOLVED_SPREAD",
      ErrorKind::DynamicSelector => "DYNAMIC_SELECTOR",
      ErrorKind::StaticPropertyKey => "STATIC_PROPERTY_KEY",
      ErrorKind::AtRuleValueType => "AT_RULE_VALUE_TYPE",
      ErrorKind::SelectorsBlockValueType => "SELECTORS_BLOCK_VALUE_TYPE",
      ErrorKind::DuplicateSelector => "DUPLICATE_SELECTOR",
      ErrorKind::DuplicateSelectorsBlock => "DUPLICATE_SELECTORS_BLOCK",
      ErrorKind::DuplicateAtRule => "DUPLICATE_AT_RULE",
      ErrorKind::UseSelectorsWithAmpersand => "USE_SELECTORS_WITH_AMPERSAND",
      ErrorKind::NoSpreadElement => "NO_SPREAD_ELEMENT",
      ErrorKind::NoObjectMethod => "NO_OBJECT_METHOD",
      ErrorKind::UseVariantOfCssMap => "USE_VARIANT_OF_CSS_MAP",
      ErrorKind::NestedVariantAccess => "NESTED_VARIANT_ACCESS",
      ErrorKind::StaticVariantObject => "STATIC_VARIANT_OBJECT",
      ErrorKind::CssMapArgument => "CSS_MAP_ARGUMENT",
    }
  }

  /// Message used when the call site has nothing more specific to say.
  pub fn default_message(&self) -> &'static str {
    match self {
      ErrorKind::UnsupportedNode => "This expression cannot be used as a style.",
      ErrorKind::UnresolvedIdentifier => {
        "This identifier is not declared in the module and cannot be used as a style."
      }
      ErrorKind::UnresolvedSpread => "The spread target could not be statically resolved.",
      ErrorKind::DynamicSelector => "Selectors must be statically known at build time.",
      ErrorKind::StaticPropertyKey => "Property key may only be a static string.",
      ErrorKind::AtRuleValueType => "Value of at-rule block must be an object.",
      ErrorKind::SelectorsBlockValueType => "Value of `selectors` key must be an object.",
      ErrorKind::DuplicateSelector => "Cannot declare a selector more than once in CSS Map.",
      ErrorKind::DuplicateSelectorsBlock => {
        "Duplicate `selectors` key found in cssMap; expected either zero `selectors` keys or one."
      }
      ErrorKind::DuplicateAtRule => "Cannot declare an at-rule more than once in CSS Map.",
      ErrorKind::UseSelectorsWithAmpersand => {
        "This selector is applied to the parent element, and so you need to specify the ampersand symbol (&) directly before it. For example, `:hover` should be written as `&:hover`."
      }
      ErrorKind::NoSpreadElement => "Spread element is not supported in CSS Map.",
      ErrorKind::NoObjectMethod => "Object method is not supported in CSS Map.",
      ErrorKind::UseVariantOfCssMap => {
        "You must use the variant of a CSS Map object (e.g. `styles.root`), not the root object itself (e.g. `styles`)."
      }
      ErrorKind::NestedVariantAccess => {
        "Only the variants of a CSS Map object can be accessed (e.g. `styles.root`), not their contents."
      }
      ErrorKind::StaticVariantObject => "The variant object must be statically defined.",
      ErrorKind::CssMapArgument => "cssMap function can only receive one object argument.",
    }
  }

  pub fn hints(&self) -> Vec<String> {
    let hints: &[&str] = match self {
      ErrorKind::UnresolvedIdentifier => &[
        "Declare the value in this module or import it.",
        "Runtime values must come from props, e.g. `(props) => props.color`.",
      ],
      ErrorKind::DynamicSelector => &["Use a string literal like `'&:hover'` as the selector."],
      ErrorKind::StaticPropertyKey => &[
        "Change `[dynamicKey]: { ... }` to `'&:hover': { ... }`.",
        "Property keys must be string literals, not variables or computed properties.",
      ],
      ErrorKind::UseSelectorsWithAmpersand => &[
        "Change `:hover` to `'&:hover'`.",
        "The `&` symbol represents the parent element.",
      ],
      ErrorKind::DuplicateSelector => &[
        "Remove or merge the duplicate selector declaration.",
        "Each selector can only be defined once per variant.",
      ],
      ErrorKind::DuplicateAtRule => &[
        "Remove or merge the duplicate at-rule declaration.",
        "Each at-rule can only be defined once per variant.",
      ],
      ErrorKind::NoSpreadElement => &["Replace `...otherStyles` with explicit property declarations."],
      ErrorKind::NoObjectMethod => {
        &["Replace object method syntax `color() { }` with a property like `color: 'value'`."]
      }
      ErrorKind::StaticVariantObject => &[
        "Remove props, conditionals and other runtime values from the variant object.",
        "For dynamic styles, use `css()` instead of `cssMap()`.",
      ],
      _ => &[],
    };
    hints.iter().map(|hint| hint.to_string()).collect()
  }
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

/// A fatal error raised while compiling one style usage.
///
/// Errors abort the compile of the whole file. The optional code frame is rendered with
/// [`CompileError::with_code_frame`] once a source map is available.
#[derive(Clone, Debug, PartialEq, thiserror::Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{}", render(.kind, .message, .code_frame))]
pub struct CompileError {
  pub kind: ErrorKind,
  pub message: String,
  #[serde(skip)]
  pub span: Span,
  pub hints: Vec<String>,
  pub code_frame: Option<String>,
}

fn render(kind: &ErrorKind, message: &str, code_frame: &Option<String>) -> String {
  match code_frame {
    Some(frame) => format!("[{kind}] {message}\n\n{frame}"),
    None => format!("[{kind}] {message}"),
  }
}

impl CompileError {
  pub fn new(kind: ErrorKind, span: Span) -> Self {
    CompileError {
      kind,
      message: kind.default_message().to_string(),
      span,
      hints: kind.hints(),
      code_frame: None,
    }
  }

  pub fn at(kind: ErrorKind, node: &impl Spanned) -> Self {
    Self::new(kind, node.span())
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = message.into();
    self
  }

  /// Attaches an excerpt of the offending line with a caret under the span.
  pub fn with_code_frame(mut self, source_map: &SourceMap) -> Self {
    self.code_frame = code_frame(source_map, self.span);
    self
  }
}

fn code_frame(source_map: &SourceMap, span: Span) -> Option<String> {
  if span.is_dummy() {
    return None;
  }

  let start = source_map.lookup_char_pos(span.lo);
  let end = source_map.lookup_char_pos(span.hi);
  let line = start.file.get_line(start.line - 1)?;
  let line = line.trim_end();

  let column = start.col.0;
  let width = if end.line == start.line {
    end.col.0.saturating_sub(column).max(1)
  } else {
    line.chars().count().saturating_sub(column).max(1)
  };

  let gutter = start.line.to_string();
  let padding = " ".repeat(gutter.len());
  Some(format!(
    "> {gutter} | {line}\n  {padding} | {}{}",
    " ".repeat(column),
    "^".repeat(width)
  ))
}

/// Invalid configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("classHashPrefix {0:?} is not a valid CSS identifier")]
  InvalidClassHashPrefix(String),
}

/// Failures of the end-to-end `transform_code` helper.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
  #[error("failed to parse {filename}: {message}")]
  Parse { filename: String, message: String },
  #[error(transparent)]
  Compile(#[from] CompileError),
  #[error(transparent)]
  Config(#[from] ConfigError),
  #[error("failed to print transformed code: {0}")]
  Emit(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use swc_core::common::{BytePos, FileName, SourceMap};

  use super::*;

  #[test]
  fn renders_message_with_kind() {
    let error = CompileError::new(ErrorKind::DuplicateSelector, Span::default());

    assert_eq!(
      error.to_string(),
      "[DUPLICATE_SELECTOR] Cannot declare a selector more than once in CSS Map."
    );
    assert_eq!(error.hints.len(), 2);
  }

  #[test]
  fn renders_code_frame_under_span() {
    let source_map = SourceMap::default();
    let file = source_map.new_source_file(
      FileName::Anon.into(),
      "const a = 1;\nconst styles = css({ color: foo });\n".into(),
    );
    let offset = "const a = 1;\nconst styles = css({ color: ".len() as u32;
    let lo = file.start_pos + BytePos(offset);
    let span = Span::new(lo, lo + BytePos(3));

    let error = CompileError::new(ErrorKind::UnresolvedIdentifier, span)
      .with_message("`foo` is not defined.")
      .with_code_frame(&source_map);

    assert_eq!(
      error.code_frame.as_deref(),
      Some(concat!(
        "> 2 | const styles = css({ color: foo });\n",
        "    |                             ^^^"
      ))
    );
  }

  #[test]
  fn skips_code_frame_for_dummy_span() {
    let source_map = SourceMap::default();
    let error = CompileError::new(ErrorKind::UnsupportedNode, Span::default())
      .with_code_frame(&source_map);

    assert_eq!(error.code_frame, None);
  }
}
