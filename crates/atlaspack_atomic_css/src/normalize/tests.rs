use pretty_assertions::assert_eq;

use super::*;
use crate::ast::print_expr;
use crate::config::AtomicCssConfig;
use crate::scope::ScopeGraph;
use crate::test_utils::{init_of, parse_resolved};

fn describe(items: &[StyleItem]) -> Vec<String> {
  items
    .iter()
    .map(|item| match item {
      StyleItem::Declaration(declaration) => {
        let mut line = String::new();
        for at_rule in &declaration.path.at_rules {
          line.push_str(at_rule);
          line.push(' ');
        }
        line.push_str(&declaration.path.selector());
        line.push_str(&format!(" {}: ", declaration.property));
        for part in &declaration.value {
          match part {
            ValuePart::Text(text) => line.push_str(text),
            ValuePart::Hole(expr) => line.push_str(&format!("${{{}}}", print_expr(expr))),
          }
        }
        if declaration.important {
          line.push_str(" !important");
        }
        for term in &declaration.guard {
          line.push_str(&format!(" [{:?} {}]", term.branch, print_expr(&term.test)));
        }
        line
      }
      StyleItem::ClassReference { expr, .. } => format!("class {}", print_expr(expr)),
    })
    .collect()
}

fn normalize(code: &str, context: StyleContext) -> Result<NormalizedStyles, CompileError> {
  let parsed = parse_resolved(code);
  let graph = ScopeGraph::build(&parsed.module, &AtomicCssConfig::default());
  let styles = init_of(&graph, "styles");
  let mut evaluator = Evaluator::new(&graph, None);
  normalize_css(&mut evaluator, &styles, context)
}

fn css(code: &str) -> Vec<String> {
  match normalize(code, StyleContext::Css) {
    Ok(normalized) => describe(&normalized.items),
    Err(error) => panic!("normalize failed: {error}"),
  }
}

fn css_error(code: &str, context: StyleContext) -> ErrorKind {
  match normalize(code, context) {
    Ok(normalized) => panic!("expected an error, got {:?}", describe(&normalized.items)),
    Err(error) => error.kind,
  }
}

#[test]
fn normalizes_object_styles() {
  let items = css(
    r#"
      import { css } from '@compiled/react';
      const styles = css({
        fontSize: 12,
        lineHeight: 1.5,
        backgroundColor: 'red',
        '&:hover': { color: 'blue' },
        ':focus': { outline: 'none' },
        '@media (min-width: 500px)': { margin: '0 auto' },
      });
    "#,
  );

  assert_eq!(
    items,
    vec![
      "& font-size: 12px",
      "& line-height: 1.5",
      "& background-color: red",
      "&:hover color: blue",
      "&:focus outline: none",
      "@media (min-width: 500px) & margin: 0 auto",
    ]
  );
}

#[test]
fn reads_template_literal_css() {
  let items = css(
    r#"
      import { css } from '@compiled/react';
      const size = 8;
      const styles = css`
        padding: ${size * 2}px;
        color: red !important;
        & > span, & > a {
          display: block;
        }
      `;
    "#,
  );

  assert_eq!(
    items,
    vec![
      "& padding: 16px",
      "& color: red !important",
      "& > span display: block",
      "& > a display: block",
    ]
  );
}

#[test]
fn reads_template_declarations_without_semicolons() {
  let items = css(
    r#"
      import { css } from '@compiled/react';
      const styles = css`
        color: red
        font-size: 12px
      `;
    "#,
  );

  assert_eq!(items, vec!["& color: red", "& font-size: 12px"]);
}

#[test]
fn keeps_source_order_across_arrays_and_spreads() {
  let items = css(
    r#"
      import { css } from '@compiled/react';
      const base = { color: 'red' };
      const extra = css({ margin: 0 });
      const styles = [base, { ...extra, padding: '4px' }, 'font-weight: bold;'];
    "#,
  );

  assert_eq!(
    items,
    vec![
      "& color: red",
      "& margin: 0",
      "& padding: 4px",
      "& font-weight: bold",
    ]
  );
}

#[test]
fn guards_conditional_styles() {
  let items = css(
    r#"
      import { css } from '@compiled/react';
      function Button({ primary, disabled }) {
        const styles = [
          { color: 'black' },
          primary && { color: 'white' },
          disabled ? { opacity: 0.5 } : { opacity: 1 },
        ];
        return styles;
      }
    "#,
  );

  assert_eq!(
    items,
    vec![
      "& color: black",
      "& color: white [Truthy primary]",
      "& opacity: .5 [Consequent disabled]",
      "& opacity: 1 [Alternate disabled]",
    ]
  );
}

#[test]
fn splits_conditional_values() {
  let items = css(
    r#"
      import { css } from '@compiled/react';
      function Button({ primary }) {
        const styles = { color: primary ? 'white' : 'black' };
        return styles;
      }
    "#,
  );

  assert_eq!(
    items,
    vec![
      "& color: white [Consequent primary]",
      "& color: black [Alternate primary]",
    ]
  );
}

#[test]
fn folds_statically_known_conditions() {
  let items = css(
    r#"
      import { css } from '@compiled/react';
      const large = true;
      const styles = css({ fontSize: large ? 20 : 12, color: large && 'red' });
    "#,
  );

  assert_eq!(items, vec!["& font-size: 20px", "& color: red"]);
}

#[test]
fn keeps_dynamic_values_as_holes() {
  let items = css(
    r#"
      import { css } from '@compiled/react';
      function Box({ width, color }) {
        const styles = { width: `${width}px`, color };
        return styles;
      }
    "#,
  );

  assert_eq!(items, vec!["& width: ${width}px", "& color: ${color}"]);
}

#[test]
fn collapses_grouped_at_rules() {
  let items = css(
    r#"
      import { css } from '@compiled/react';
      const styles = css({
        '@media': {
          'screen and (min-width: 30rem)': { color: 'red' },
        },
      });
    "#,
  );

  assert_eq!(items, vec!["@media screen and (min-width: 30rem) & color: red"]);
}

#[test]
fn quotes_content_values() {
  let items = css(
    r#"
      import { css } from '@compiled/react';
      const styles = css({ '&::after': { content: 'hello' }, '&::before': { content: '' } });
    "#,
  );

  assert_eq!(
    items,
    vec![r#"&::after content: "hello""#, r#"&::before content: """#]
  );
}

#[test]
fn references_css_map_variants() {
  let items = describe(
    &normalize(
      r#"
        import { cssMap } from '@compiled/react';
        const variants = cssMap({ primary: { color: 'red' } });
        function Button({ variant }) {
          const styles = [{ padding: 0 }, variants[variant]];
          return styles;
        }
      "#,
      StyleContext::Css,
    )
    .unwrap()
    .items,
  );

  assert_eq!(items, vec!["& padding: 0", "class variants[variant]"]);
}

#[test]
fn rejects_unsupported_styles() {
  assert_eq!(
    css_error(
      "import { css } from '@compiled/react'; const styles = css({ ...unknown });",
      StyleContext::Css
    ),
    ErrorKind::UnresolvedSpread
  );
  assert_eq!(
    css_error(
      "import { css } from '@compiled/react'; const styles = notDeclared;",
      StyleContext::Css
    ),
    ErrorKind::UnresolvedIdentifier
  );
  assert_eq!(
    css_error(
      "import { css } from '@compiled/react'; const styles = css({ '@media screen': 'red' });",
      StyleContext::Css
    ),
    ErrorKind::AtRuleValueType
  );
  assert_eq!(
    css_error(
      "import { css } from '@compiled/react'; const styles = css({ color() { return 'red'; } });",
      StyleContext::Css
    ),
    ErrorKind::NoObjectMethod
  );
}

#[test]
fn stops_at_styles_that_refer_to_themselves() {
  assert_eq!(
    css_error("var styles = [styles, { color: 'red' }];", StyleContext::Css),
    ErrorKind::UnresolvedIdentifier
  );
  assert_eq!(
    css_error(
      "const base = [other]; const other = [base]; const styles = [base];",
      StyleContext::Css
    ),
    ErrorKind::UnresolvedIdentifier
  );
}

#[test]
fn limits_style_nesting_depth() {
  let nested = format!("{}{{ color: 'red' }}{}", "[".repeat(80), "]".repeat(80));
  assert_eq!(
    css_error(&format!("const styles = {nested};"), StyleContext::Css),
    ErrorKind::UnsupportedNode
  );

  let shallow = format!("{}{{ color: 'red' }}{}", "[".repeat(8), "]".repeat(8));
  assert_eq!(
    css(&format!("const styles = {shallow};")),
    vec!["& color: red"]
  );
}

#[test]
fn enforces_strict_objects_in_xcss() {
  assert_eq!(
    css_error("const styles = { ':hover': { color: 'red' } };", StyleContext::Xcss),
    ErrorKind::UseSelectorsWithAmpersand
  );
  assert_eq!(
    css_error(
      "const styles = { selectors: {}, selectors: {} };",
      StyleContext::Xcss
    ),
    ErrorKind::DuplicateSelectorsBlock
  );
  assert_eq!(
    css_error("const styles = { selectors: 'x' };", StyleContext::Xcss),
    ErrorKind::SelectorsBlockValueType
  );
  assert_eq!(
    css_error(
      "const styles = { '&:hover': { color: 'red' }, selectors: { '&:hover': { color: 'blue' } } };",
      StyleContext::Xcss
    ),
    ErrorKind::DuplicateSelector
  );
  assert_eq!(
    css_error(
      "const styles = { '@media': { screen: {} }, '@media screen': {} };",
      StyleContext::Xcss
    ),
    ErrorKind::DuplicateAtRule
  );
}

#[test]
fn merges_selectors_blocks_after_properties() {
  let normalized = normalize(
    "const styles = { selectors: { '&:hover': { color: 'blue' } }, color: 'red' };",
    StyleContext::Xcss,
  )
  .unwrap();

  assert_eq!(
    describe(&normalized.items),
    vec!["& color: red", "&:hover color: blue"]
  );
}

#[test]
fn records_props_consumed_by_styled_interpolations() {
  let parsed = parse_resolved(
    r#"
      import { styled } from '@compiled/react';
      const Button = styled.button`
        color: ${(props) => props.textColor};
        ${({ primary }) => primary && 'font-weight: bold;'}
      `;
    "#,
  );
  let graph = ScopeGraph::build(&parsed.module, &AtomicCssConfig::default());
  let Expr::TaggedTpl(tagged) = init_of(&graph, "Button") else {
    panic!("expected a tagged template");
  };
  let mut evaluator = Evaluator::new(&graph, None);
  let normalized = normalize_styled(&mut evaluator, StyledInput::Template(&tagged.tpl)).unwrap();

  assert_eq!(
    describe(&normalized.items),
    vec![
      "& color: ${__cmplp.textColor}",
      "& font-weight: bold [Truthy __cmplp.primary]",
    ]
  );
  assert_eq!(
    normalized.consumed_props.into_iter().collect::<Vec<_>>(),
    vec!["textColor", "primary"]
  );
}
