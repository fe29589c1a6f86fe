use swc_core::common::{SyntaxContext, DUMMY_SP};
use swc_core::ecma::ast::{
  ArrowExpr, AssignPat, AssignPatProp, BindingIdent, BlockStmt, BlockStmtOrExpr, Callee, Decl,
  Expr, IdentName, IfStmt, JSXAttrOrSpread, KeyValuePatProp, Lit, MemberProp, NewExpr, ObjectPat,
  ObjectPatProp, Pat, PropName, RestPat, ReturnStmt, SpreadElement, Stmt, ThrowStmt, VarDecl,
  VarDeclKind, VarDeclarator,
};

use super::jsx::{jsx_attr, jsx_element};
use super::StyleTransformer;
use crate::ast::{call_expr, expr_or_spread, ident, ident_expr, member_expr, str_expr, unwrap_expr};
use crate::normalize::{StyledInput, PROPS_IDENTIFIER};
use crate::scope::StyleApi;
use crate::usage::CompiledUsage;

pub const STYLE_IDENTIFIER: &str = "__cmpls";
pub const REF_IDENTIFIER: &str = "__cmplr";
pub const DOM_PROPS_IDENTIFIER: &str = "__cmpldp";
const COMPONENT_IDENTIFIER: &str = "C";

/// What a styled component renders.
#[derive(Clone, Debug)]
pub enum StyledTag {
  /// `styled.div`, `styled('div')`
  Intrinsic(String),
  /// `styled(Button)`
  Component(Box<Expr>),
}

impl StyledTag {
  fn to_expr(&self) -> Expr {
    match self {
      StyledTag::Intrinsic(name) => str_expr(name),
      StyledTag::Component(expr) => (**expr).clone(),
    }
  }
}

fn binding(name: &str) -> Pat {
  Pat::Ident(BindingIdent {
    id: ident(name),
    type_ann: None,
  })
}

fn key_value_pat(key: &str, value: Pat) -> ObjectPatProp {
  ObjectPatProp::KeyValue(KeyValuePatProp {
    key: PropName::Ident(IdentName::new(key.into(), DUMMY_SP)),
    value: Box::new(value),
  })
}

fn rest_pat(name: &str) -> ObjectPatProp {
  ObjectPatProp::Rest(RestPat {
    span: DUMMY_SP,
    dot3_token: DUMMY_SP,
    arg: Box::new(binding(name)),
    type_ann: None,
  })
}

fn object_pat(props: Vec<ObjectPatProp>) -> Pat {
  Pat::Object(ObjectPat {
    span: DUMMY_SP,
    props,
    optional: false,
    type_ann: None,
  })
}

/// `({ as: C = tag, style: __cmpls, ...__cmplp }, __cmplr)`
fn component_params(tag: &StyledTag) -> Vec<Pat> {
  let as_prop = Pat::Assign(AssignPat {
    span: DUMMY_SP,
    left: Box::new(binding(COMPONENT_IDENTIFIER)),
    right: Box::new(tag.to_expr()),
  });
  vec![
    object_pat(vec![
      key_value_pat("as", as_prop),
      key_value_pat("style", binding(STYLE_IDENTIFIER)),
      rest_pat(PROPS_IDENTIFIER),
    ]),
    binding(REF_IDENTIFIER),
  ]
}

/// `if (__cmplp.innerRef) { throw new Error("Please use 'ref' instead of 'innerRef'."); }`
fn inner_ref_guard() -> Stmt {
  let error = Expr::New(NewExpr {
    span: DUMMY_SP,
    ctxt: SyntaxContext::empty(),
    callee: Box::new(ident_expr("Error")),
    args: Some(vec![expr_or_spread(str_expr(
      "Please use 'ref' instead of 'innerRef'.",
    ))]),
    type_args: None,
  });
  Stmt::If(IfStmt {
    span: DUMMY_SP,
    test: Box::new(member_expr(ident_expr(PROPS_IDENTIFIER), "innerRef")),
    cons: Box::new(Stmt::Block(BlockStmt {
      span: DUMMY_SP,
      ctxt: SyntaxContext::empty(),
      stmts: vec![Stmt::Throw(ThrowStmt {
        span: DUMMY_SP,
        arg: Box::new(error),
      })],
    })),
    alt: None,
  })
}

/// `const { isPrimary, ...__cmpldp } = __cmplp;`
fn omit_props(excluded: &[String]) -> Stmt {
  let mut props: Vec<ObjectPatProp> = excluded
    .iter()
    .map(|prop| {
      ObjectPatProp::Assign(AssignPatProp {
        span: DUMMY_SP,
        key: BindingIdent {
          id: ident(prop),
          type_ann: None,
        },
        value: None,
      })
    })
    .collect();
  props.push(rest_pat(DOM_PROPS_IDENTIFIER));

  Stmt::Decl(Decl::Var(Box::new(VarDecl {
    span: DUMMY_SP,
    ctxt: SyntaxContext::empty(),
    kind: VarDeclKind::Const,
    declare: false,
    decls: vec![VarDeclarator {
      span: DUMMY_SP,
      name: object_pat(props),
      init: Some(Box::new(ident_expr(PROPS_IDENTIFIER))),
      definite: false,
    }],
  })))
}

impl StyleTransformer<'_> {
  /// The tag of a styled factory: `styled.div`, `styled('div')` or `styled(Button)`.
  fn styled_tag(&self, callee: &Expr) -> Option<StyledTag> {
    match unwrap_expr(callee) {
      Expr::Member(member) if self.graph.style_api_of(&member.obj) == Some(StyleApi::Styled) => {
        match &member.prop {
          MemberProp::Ident(name) => Some(StyledTag::Intrinsic(name.sym.to_string())),
          _ => None,
        }
      }
      Expr::Call(call) => {
        let Callee::Expr(inner) = &call.callee else {
          return None;
        };
        if self.graph.style_api_of(inner) != Some(StyleApi::Styled) {
          return None;
        }
        match call.args.as_slice() {
          [arg] if arg.spread.is_none() => Some(match unwrap_expr(&arg.expr) {
            Expr::Lit(Lit::Str(tag)) => StyledTag::Intrinsic(tag.value.to_string()),
            component => StyledTag::Component(Box::new(component.clone())),
          }),
          _ => None,
        }
      }
      _ => None,
    }
  }

  /// Rewrites a styled component definition. `None` when `expr` is not one.
  pub(super) fn styled_component(&mut self, expr: &Expr) -> Option<Expr> {
    let (tag, usage) = match expr {
      Expr::Call(call) => {
        let Callee::Expr(callee) = &call.callee else {
          return None;
        };
        let tag = self.styled_tag(callee)?;
        let usage = self.record(|transformer| {
          transformer
            .compiler
            .compile_styled(&mut transformer.evaluator, StyledInput::Args(&call.args))
        });
        (tag, usage)
      }
      Expr::TaggedTpl(tagged) => {
        let tag = self.styled_tag(&tagged.tag)?;
        let usage = self.record(|transformer| {
          transformer
            .compiler
            .compile_styled(&mut transformer.evaluator, StyledInput::Template(&tagged.tpl))
        });
        (tag, usage)
      }
      _ => return None,
    };

    // A failed compile is reported once the traversal unwinds.
    let usage = usage?;
    Some(self.build_styled_component(&tag, &usage))
  }

  fn build_styled_component(&mut self, tag: &StyledTag, usage: &CompiledUsage) -> Expr {
    self.runtime.ax = true;
    self.runtime.forward_ref = true;
    if !usage.variables.is_empty() {
      self.runtime.ix = true;
    }

    let mut stmts = vec![inner_ref_guard()];
    let omits_props = matches!(tag, StyledTag::Intrinsic(_)) && !usage.excluded_props.is_empty();
    let forwarded = if omits_props {
      stmts.push(omit_props(&usage.excluded_props));
      DOM_PROPS_IDENTIFIER
    } else {
      PROPS_IDENTIFIER
    };

    let style = usage
      .style_expr(Some(ident_expr(STYLE_IDENTIFIER)))
      .unwrap_or_else(|| ident_expr(STYLE_IDENTIFIER));
    let class_name = usage.class_name_expr(Some(member_expr(
      ident_expr(PROPS_IDENTIFIER),
      "className",
    )));
    let element = jsx_element(
      COMPONENT_IDENTIFIER,
      vec![
        JSXAttrOrSpread::SpreadElement(SpreadElement {
          dot3_token: DUMMY_SP,
          expr: Box::new(ident_expr(forwarded)),
        }),
        jsx_attr("style", style),
        jsx_attr("ref", ident_expr(REF_IDENTIFIER)),
        jsx_attr("className", class_name),
      ],
      Vec::new(),
    );
    let rendered = self.compiled_template(element, &usage.sheets);
    stmts.push(Stmt::Return(ReturnStmt {
      span: DUMMY_SP,
      arg: Some(Box::new(Expr::JSXElement(Box::new(rendered)))),
    }));

    let render = Expr::Arrow(ArrowExpr {
      span: DUMMY_SP,
      ctxt: SyntaxContext::empty(),
      params: component_params(tag),
      body: Box::new(BlockStmtOrExpr::BlockStmt(BlockStmt {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        stmts,
      })),
      is_async: false,
      is_generator: false,
      type_params: None,
      return_type: None,
    });
    tracing::debug!(
      intrinsic = matches!(tag, StyledTag::Intrinsic(_)),
      excluded_props = usage.excluded_props.len(),
      "built styled component"
    );
    call_expr(Expr::Ident(self.forward_ref.clone()), vec![render])
  }
}
