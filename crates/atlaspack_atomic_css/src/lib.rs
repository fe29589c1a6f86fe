//! Static evaluation and atomic class extraction for CSS-in-JS.
//!
//! Style declarations written with `css`, `cssMap`, `styled`, `ClassNames` and the `css` /
//! `xcss` JSX props are evaluated at build time into atomic rules: one class per
//! declaration, named by hashing its selector path, property and value. Values that only
//! exist at runtime become CSS custom properties set through the element's `style`.
//!
//! [`transform_module`] rewrites a parsed, resolved module in place. [`transform_code`] is
//! the string-in, string-out wrapper around it.

pub mod ast;
pub mod atomic;
pub mod compose;
pub mod config;
pub mod css;
pub mod errors;
pub mod evaluate;
pub mod hash;
pub mod html_attributes;
pub mod normalize;
pub mod parse;
pub mod resolver;
pub mod scope;
pub mod shorthand;
pub mod transform;
pub mod usage;
pub mod variables;

#[cfg(test)]
mod test_utils;

use swc_core::common::sync::Lrc;
use swc_core::common::SourceMap;
use swc_core::ecma::ast::{EsVersion, Module};
use swc_core::ecma::codegen::text_writer::JsWriter;
use swc_core::ecma::codegen::{Config as CodegenConfig, Emitter, Node};

pub use config::AtomicCssConfig;
pub use errors::{CompileError, ConfigError, ErrorKind, TransformError};
pub use resolver::{FsModuleResolver, ModuleResolver, SourceModuleResolver};
pub use transform::{transform_module, TransformOutput};
pub use usage::{CompiledCssMap, CompiledUsage, StyleCompiler};

/// Parses, transforms and prints one file.
///
/// Files without style usages come back reprinted but otherwise unchanged.
#[tracing::instrument(level = "debug", skip(code, config))]
pub fn transform_code(
  code: &str,
  filename: &str,
  config: &AtomicCssConfig,
) -> Result<String, TransformError> {
  config.validate()?;

  let source_map: Lrc<SourceMap> = Default::default();
  let mut module =
    parse::parse_module(&source_map, filename, code).map_err(|message| TransformError::Parse {
      filename: filename.to_string(),
      message,
    })?;
  let typescript = filename.ends_with(".ts") || filename.ends_with(".tsx");
  parse::resolve_module(&mut module, typescript);

  let output = transform_module(&mut module, &source_map, config)?;
  tracing::debug!(
    transformed = output.transformed,
    rules = output.style_rules.len(),
    "transformed file"
  );
  Ok(module_to_source(&module, source_map)?)
}

fn module_to_source(module: &Module, source_map: Lrc<SourceMap>) -> Result<String, std::io::Error> {
  let mut buffer = Vec::new();
  {
    let writer = JsWriter::new(source_map.clone(), "\n", &mut buffer, None);
    let mut cfg = CodegenConfig::default();
    cfg.target = EsVersion::Es2022;
    let mut emitter = Emitter {
      cfg,
      comments: None,
      cm: source_map,
      wr: writer,
    };
    module.emit_with(&mut emitter)?;
  }
  Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
  use indoc::indoc;
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::test_utils::{transform, transform_error, transform_with, test_config};

  #[test]
  fn leaves_files_without_style_imports_alone() {
    let config = AtomicCssConfig {
      process_xcss: false,
      ..test_config()
    };
    let output = transform_with("const a = 1;\n", &config);

    assert_eq!(output, "const a = 1;\n");
  }

  #[test]
  fn reports_parse_errors_with_the_filename() {
    let error = transform_code("const = ;", "broken.js", &test_config()).unwrap_err();

    assert!(matches!(error, TransformError::Parse { ref filename, .. } if filename == "broken.js"));
  }

  #[test]
  fn rejects_invalid_configuration() {
    let config = AtomicCssConfig {
      class_hash_prefix: Some("9lives".into()),
      ..test_config()
    };
    let error = transform_code("const a = 1;", "a.js", &config).unwrap_err();

    assert!(matches!(error, TransformError::Config(_)));
  }

  #[test]
  fn compiles_a_static_css_prop() {
    let output = transform(indoc! {r#"
      import { css } from '@compiled/react';

      const styles = css({ color: 'red' });

      export const App = () => <div css={styles} />;
    "#});

    assert!(output.contains(r#"const _ = "._syaz5scu{color:red}";"#), "{output}");
    assert!(output.contains(r#"className={ax(["_syaz5scu"])}"#), "{output}");
    assert!(output.contains("<CS>{[_]}</CS>"), "{output}");
    assert!(output.contains("const styles = null;"), "{output}");
    assert!(
      output.contains(r#"import { ax, CC, CS } from "@compiled/react/runtime";"#),
      "{output}"
    );
    assert!(!output.contains("@compiled/react\""), "{output}");
  }

  #[test]
  fn binds_props_to_css_variables() {
    let output = transform(indoc! {r#"
      import { css } from '@compiled/react';

      export const Box = ({ width }) => <div css={{ width: `${width}px` }} />;
    "#});

    assert!(output.contains("ix(width, \"px\")"), "{output}");
    assert!(output.contains("style={{"), "{output}");
    assert!(output.contains("{width:var(--_"), "{output}");
    assert!(output.contains("import { ax, ix, CC, CS }"), "{output}");
  }

  #[test]
  fn keeps_existing_class_names_and_styles_last() {
    let output = transform(indoc! {r#"
      import { css } from '@compiled/react';

      export const Box = ({ size, className, style }) => (
        <div className={className} style={style} css={{ fontSize: size }} />
      );
    "#});

    assert!(output.contains(", className])}"), "{output}");
    assert!(output.contains("...style,"), "{output}");
  }

  #[test]
  fn carries_the_key_onto_the_wrapper() {
    let output = transform(indoc! {r#"
      import { css } from '@compiled/react';

      export const List = ({ items }) => items.map((item) => (
        <li key={item.id} css={{ color: 'blue' }}>{item.label}</li>
      ));
    "#});

    assert!(output.contains("<CC key={item.id}>"), "{output}");
    assert!(!output.contains("<li key"), "{output}");
  }

  #[test]
  fn applies_the_configured_nonce() {
    let config = AtomicCssConfig {
      nonce: Some("__webpack_nonce__".into()),
      ..test_config()
    };
    let output = transform_with(
      indoc! {r#"
        import { css } from '@compiled/react';
        export const A = () => <div css={{ color: 'red' }} />;
      "#},
      &config,
    );

    assert!(output.contains("<CS nonce={__webpack_nonce__}>"), "{output}");
  }

  #[test]
  fn guards_conditional_styles() {
    let output = transform(indoc! {r#"
      import { css } from '@compiled/react';

      const base = css({ color: 'red' });
      const active = css({ color: 'blue' });

      export const Tab = ({ isActive }) => <button css={[base, isActive && active]} />;
    "#});

    assert!(output.contains("isActive && \"_syaz13q2\""), "{output}");
  }

  #[test]
  fn builds_styled_components() {
    let output = transform(indoc! {r#"
      import { styled } from '@compiled/react';

      export const Button = styled.button({
        color: (props) => props.textColor,
        padding: 8,
      });
    "#});

    assert!(output.contains("import { forwardRef } from \"react\";"), "{output}");
    assert!(
      output.contains(r#"forwardRef(({ as: C = "button", style: __cmpls, ...__cmplp }, __cmplr)"#),
      "{output}"
    );
    assert!(output.contains("Please use 'ref' instead of 'innerRef'."), "{output}");
    assert!(output.contains("const { textColor, ...__cmpldp } = __cmplp;"), "{output}");
    assert!(output.contains("<C {...__cmpldp}"), "{output}");
    assert!(output.contains("ix(__cmplp.textColor)"), "{output}");
    assert!(output.contains("__cmplp.className])"), "{output}");
    assert!(!output.contains("styled"), "{output}");
  }

  #[test]
  fn forwards_every_prop_to_wrapped_components() {
    let output = transform(indoc! {r#"
      import { styled } from '@compiled/react';
      import { Link } from './link';

      export const StyledLink = styled(Link)`
        color: ${({ tone }) => tone};
      `;
    "#});

    assert!(output.contains("as: C = Link"), "{output}");
    assert!(output.contains("<C {...__cmplp}"), "{output}");
    assert!(!output.contains("__cmpldp"), "{output}");
  }

  #[test]
  fn reuses_an_imported_forward_ref() {
    let output = transform(indoc! {r#"
      import { forwardRef } from 'react';
      import { styled } from '@compiled/react';

      export const Box = styled.div({ color: 'red' });
      export const Other = forwardRef(() => null);
    "#});

    assert_eq!(output.matches("import { forwardRef }").count(), 1, "{output}");
  }

  #[test]
  fn compiles_css_maps_into_class_name_objects() {
    let output = transform(indoc! {r#"
      import { css, cssMap } from '@compiled/react';

      const styles = cssMap({
        primary: { color: 'red' },
        secondary: { color: 'blue' },
      });

      export const Button = ({ appearance }) => <button css={styles[appearance]} />;
    "#});

    assert!(output.contains(r#""primary": "_syaz5scu""#), "{output}");
    assert!(output.contains("styles[appearance]"), "{output}");
    assert!(output.contains("<CS>{[_, _2]}</CS>"), "{output}");
  }

  #[test]
  fn rewrites_class_names_render_props() {
    let output = transform(indoc! {r#"
      import { ClassNames } from '@compiled/react';

      export const Card = ({ color }) => (
        <ClassNames>
          {({ css, style }) => <div style={style} className={css({ color, padding: 4 })} />}
        </ClassNames>
      );
    "#});

    assert!(!output.contains("ClassNames"), "{output}");
    assert!(output.contains("className={ax(["), "{output}");
    assert!(output.contains("ix(color)"), "{output}");
    assert!(output.contains("<CC>"), "{output}");
  }

  #[test]
  fn class_names_without_variables_pass_undefined_styles() {
    let output = transform(indoc! {r#"
      import { ClassNames } from '@compiled/react';

      export const Card = () => (
        <ClassNames>
          {({ css, style }) => <div style={style} className={css`color: red;`} />}
        </ClassNames>
      );
    "#});

    assert!(output.contains("style={undefined}"), "{output}");
    assert!(output.contains("_syaz5scu"), "{output}");
  }

  #[test]
  fn compiles_static_xcss_props() {
    let output = transform(indoc! {r#"
      import { cssMap } from '@compiled/react';

      const styles = cssMap({ root: { color: 'red' } });

      export const Page = () => <Button xcss={{ color: 'red' }} innerXcss={styles.root} />;
    "#});

    assert!(output.contains(r#"xcss={"_syaz5scu"}"#), "{output}");
    assert!(output.contains("innerXcss={styles.root}"), "{output}");
    assert!(output.contains("<CS>{[_]}</CS>"), "{output}");
  }

  #[test]
  fn sorts_the_style_payload() {
    let source = indoc! {r#"
      import { css } from '@compiled/react';

      export const A = () => (
        <a css={{ '@media (min-width: 500px)': { color: 'red' }, '&:hover': { color: 'blue' }, padding: 0, color: 'green' }} />
      );
    "#};
    let source_map: Lrc<SourceMap> = Default::default();
    let mut module = parse::parse_module(&source_map, "a.tsx", source).unwrap();
    parse::resolve_module(&mut module, true);

    let output = transform_module(&mut module, &source_map, &test_config()).unwrap();

    assert!(output.transformed);
    assert_eq!(output.style_rules.len(), 7);
    assert!(output.style_rules[..5]
      .iter()
      .all(|rule| !rule.contains(":hover") && !rule.starts_with('@')));
    assert!(output.style_rules[5].contains(":hover"));
    assert!(output.style_rules[6].starts_with("@media"));
  }

  #[test]
  fn fails_the_file_on_the_first_compile_error() {
    let error = transform_error(indoc! {r#"
      import { css } from '@compiled/react';

      export const A = () => <div css={{ color: missing }} />;
    "#});

    assert_eq!(error.kind, ErrorKind::UnresolvedIdentifier);
    assert_eq!(error.code_frame, None);
  }

  #[test]
  fn renders_code_frames_when_enabled() {
    let config = AtomicCssConfig::default();
    let error = transform_code(
      "import { cssMap } from '@compiled/react';\nconst s = cssMap({ a: { ...other } });\n",
      "a.js",
      &config,
    )
    .unwrap_err();

    let TransformError::Compile(error) = error else {
      panic!("expected a compile error, got {error}");
    };
    assert!(error.code_frame.is_some(), "{error}");
    assert!(error.to_string().contains("> 2 |"), "{error}");
  }
}
