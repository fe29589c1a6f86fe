use indoc::indoc;
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

use crate::config::AtomicCssConfig;
use crate::errors::ErrorKind;
use crate::resolver::SourceModuleResolver;
use crate::test_utils::{test_config, transform, transform_error, transform_with};

#[test]
fn shares_hoisted_sheets_between_usages() {
  let output = transform(indoc! {r#"
    import { css } from '@compiled/react';

    export const A = () => <div css={{ color: 'red' }} />;
    export const B = () => <span css={{ color: 'red', margin: 0 }} />;
  "#});

  assert_eq!(output.matches(r#""._syaz5scu{color:red}""#).count(), 1, "{output}");
  assert!(output.contains("<CS>{[_]}</CS>"), "{output}");
  assert!(output.contains("const _2 = "), "{output}");
}

#[test]
fn does_not_shadow_existing_underscore_bindings() {
  let output = transform(indoc! {r#"
    import { css } from '@compiled/react';
    import _ from 'lodash';

    export const A = () => <div css={{ color: _.noop() ? 'red' : 'blue' }} />;
  "#});

  assert!(output.contains("import _ from"), "{output}");
  assert!(output.contains("const _2 = "), "{output}");
  assert!(!output.contains("const _ = "), "{output}");
}

#[test]
fn compiles_nested_css_props() {
  let output = transform(indoc! {r#"
    import { css } from '@compiled/react';

    export const Card = () => (
      <section css={{ padding: 8 }}>
        <h1 css={{ fontWeight: 'bold' }}>Title</h1>
      </section>
    );
  "#});

  assert_eq!(output.matches("<CC>").count(), 2, "{output}");
  assert!(output.contains("font-weight:bold"), "{output}");
  assert!(!output.contains("css={"), "{output}");
}

#[test]
fn uses_ternaries_for_static_branches() {
  let output = transform(indoc! {r#"
    import { css } from '@compiled/react';

    export const Tab = ({ selected }) => (
      <div css={selected ? { color: 'red' } : { color: 'blue' }} />
    );
  "#});

  assert!(
    output.contains(r#"selected ? "_syaz5scu" : "_syaz13q2""#),
    "{output}"
  );
}

#[test]
fn keeps_css_imports_that_are_still_referenced() {
  let output = transform(indoc! {r#"
    import { css, styled } from '@compiled/react';

    export const Box = styled.div({ color: 'red' });
    export const helper = (value) => value(css);
  "#});

  assert!(output.contains("import { css } from"), "{output}");
  assert!(!output.contains("styled"), "{output}");
}

#[test]
fn supports_custom_import_sources() {
  let config = AtomicCssConfig {
    import_sources: vec!["@atlaskit/css".into()],
    ..test_config()
  };
  let output = transform_with(
    indoc! {r#"
      import { css } from '@atlaskit/css';

      export const A = () => <div css={css({ color: 'red' })} />;
    "#},
    &config,
  );

  assert!(output.contains("_syaz5scu"), "{output}");
  assert!(!output.contains("@atlaskit/css"), "{output}");
}

#[test]
fn ignores_css_from_other_packages() {
  let config = AtomicCssConfig {
    process_xcss: false,
    ..test_config()
  };
  let output = transform_with(
    indoc! {r#"
      import { css } from 'other-lib';

      export const styles = css({ color: 'red' });
    "#},
    &config,
  );

  assert!(output.contains("css({"), "{output}");
  assert!(!output.contains("@compiled/react/runtime"), "{output}");
}

#[test]
fn folds_constants_imported_from_other_modules() {
  let config = test_config().with_resolver(
    SourceModuleResolver::new().with_module("./colors", "export const brand = 'red';"),
  );
  let output = transform_with(
    indoc! {r#"
      import { css } from '@compiled/react';
      import { brand } from './colors';

      export const A = () => <div css={{ color: brand }} />;
    "#},
    &config,
  );

  assert!(output.contains("_syaz5scu"), "{output}");
  assert!(!output.contains("style={"), "{output}");
}

#[test]
fn uses_the_configured_runtime_source() {
  let config = AtomicCssConfig {
    runtime_import_source: "@acme/runtime".into(),
    ..test_config()
  };
  let output = transform_with(
    indoc! {r#"
      import { css } from '@compiled/react';
      export const A = () => <div css={{ color: 'red' }} />;
    "#},
    &config,
  );

  assert!(output.contains(r#"from "@acme/runtime""#), "{output}");
}

#[test]
fn prefixes_class_hashes() {
  let plain = transform(indoc! {r#"
    import { css } from '@compiled/react';
    export const A = () => <div css={{ color: 'red' }} />;
  "#});
  let config = AtomicCssConfig {
    class_hash_prefix: Some("app".into()),
    ..test_config()
  };
  let prefixed = transform_with(
    indoc! {r#"
      import { css } from '@compiled/react';
      export const A = () => <div css={{ color: 'red' }} />;
    "#},
    &config,
  );

  assert!(plain.contains("_syaz5scu"), "{plain}");
  assert!(!prefixed.contains("_syaz5scu"), "{prefixed}");
  assert!(prefixed.contains("5scu{color:red}"), "{prefixed}");
}

#[test]
fn styled_templates_bind_prop_interpolations() {
  let output = transform(indoc! {r#"
    import { styled } from '@compiled/react';

    export const Title = styled.h1`
      font-size: ${(props) => props.size}px;
      color: ${({ isError }) => (isError ? 'red' : 'black')};
    `;
  "#});

  assert!(output.contains(r#"ix(__cmplp.size, "px")"#), "{output}");
  assert!(output.contains("const { size, isError, ...__cmpldp } = __cmplp;"), "{output}");
}

#[test]
fn keeps_runtime_class_references_from_css_maps() {
  let output = transform(indoc! {r#"
    import { css, cssMap } from '@compiled/react';

    const variants = cssMap({
      primary: { color: 'red' },
      danger: { color: 'blue', '&:hover': { color: 'green' } },
    });

    export const Button = ({ variant, disabled }) => (
      <button css={[{ padding: 4 }, disabled && variants[variant]]} />
    );
  "#});

  assert!(output.contains("disabled && variants[variant]"), "{output}");
  assert!(output.contains(r#""danger": ""#), "{output}");
  assert!(output.contains(":hover{color:green}"), "{output}");
}

#[test]
fn rejects_whole_css_maps_in_style_positions() {
  let error = transform_error(indoc! {r#"
    import { css, cssMap } from '@compiled/react';

    const variants = cssMap({ primary: { color: 'red' } });

    export const Button = () => <button css={variants} />;
  "#});

  assert_eq!(error.kind, ErrorKind::UseVariantOfCssMap);
}

#[test]
fn rejects_styles_that_contain_themselves() {
  let error = transform_error(indoc! {r#"
    import { css } from '@compiled/react';

    var styles = [styles, { color: 'red' }];
    export const A = () => <div css={styles} />;
  "#});

  assert_eq!(error.kind, ErrorKind::UnresolvedIdentifier);
}

#[test]
fn rejects_dynamic_xcss() {
  let error = transform_error(indoc! {r#"
    export const Button = ({ color }) => <Box xcss={{ color }} />;
  "#});

  assert_eq!(error.kind, ErrorKind::UnsupportedNode);
}

#[test]
fn leaves_xcss_alone_when_disabled() {
  let config = AtomicCssConfig {
    process_xcss: false,
    ..test_config()
  };
  let output = transform_with(
    "export const A = () => <Box xcss={{ color: 'red' }} />;\n",
    &config,
  );

  assert!(output.contains("xcss={{"), "{output}");
  assert!(!output.contains("<CC>"), "{output}");
}

#[test]
fn class_names_block_bodies_render_inline() {
  let output = transform(indoc! {r#"
    import { ClassNames } from '@compiled/react';

    export const Card = () => (
      <ClassNames>
        {({ css }) => {
          const className = css({ color: 'red' });
          return <div className={className} />;
        }}
      </ClassNames>
    );
  "#});

  assert!(output.contains(r#"const className = ax(["_syaz5scu"]);"#), "{output}");
  assert!(output.contains("<CC>"), "{output}");
  assert!(!output.contains("ClassNames"), "{output}");
}

#[test]
#[traced_test]
fn logs_each_compiled_usage() {
  transform(indoc! {r#"
    import { css } from '@compiled/react';
    export const A = () => <div css={{ color: 'red' }} />;
  "#});

  assert!(logs_contain("compiled style usage"));
  assert!(logs_contain("transformed module"));
}
