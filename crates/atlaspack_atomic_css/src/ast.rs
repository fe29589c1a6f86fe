//! Small builders and helpers over the swc AST.

use swc_core::common::{sync::Lrc, SourceMap, SyntaxContext, DUMMY_SP};
use swc_core::ecma::ast::{
  ArrayLit, ArrowExpr, BinExpr, BinaryOp, BlockStmtOrExpr, CallExpr, Callee, CondExpr, Expr,
  ExprOrSpread, Ident, IdentName, KeyValueProp, Lit, MemberExpr, MemberProp, Null, Number,
  ParenExpr, Prop, PropName, PropOrSpread, Str, UnaryExpr, UnaryOp,
};
use swc_core::ecma::codegen::text_writer::JsWriter;
use swc_core::ecma::codegen::{Config, Emitter, Node};

pub fn ident(name: &str) -> Ident {
  Ident::new(name.into(), DUMMY_SP, SyntaxContext::empty())
}

pub fn ident_expr(name: &str) -> Expr {
  Expr::Ident(ident(name))
}

pub fn str_expr(value: &str) -> Expr {
  Expr::Lit(Lit::Str(Str {
    span: DUMMY_SP,
    value: value.into(),
    raw: None,
  }))
}

pub fn num_expr(value: f64) -> Expr {
  Expr::Lit(Lit::Num(Number {
    span: DUMMY_SP,
    value,
    raw: None,
  }))
}

pub fn null_expr() -> Expr {
  Expr::Lit(Lit::Null(Null { span: DUMMY_SP }))
}

pub fn call_expr(callee: Expr, args: Vec<Expr>) -> Expr {
  Expr::Call(CallExpr {
    span: DUMMY_SP,
    ctxt: SyntaxContext::empty(),
    callee: Callee::Expr(Box::new(callee)),
    args: args.into_iter().map(expr_or_spread).collect(),
    type_args: None,
  })
}

pub fn expr_or_spread(expr: Expr) -> ExprOrSpread {
  ExprOrSpread {
    spread: None,
    expr: Box::new(expr),
  }
}

pub fn member_expr(obj: Expr, prop: &str) -> Expr {
  Expr::Member(MemberExpr {
    span: DUMMY_SP,
    obj: Box::new(obj),
    prop: MemberProp::Ident(IdentName::new(prop.into(), DUMMY_SP)),
  })
}

pub fn array_expr(items: Vec<Expr>) -> Expr {
  Expr::Array(ArrayLit {
    span: DUMMY_SP,
    elems: items.into_iter().map(|item| Some(expr_or_spread(item))).collect(),
  })
}

pub fn and_expr(left: Expr, right: Expr) -> Expr {
  Expr::Bin(BinExpr {
    span: DUMMY_SP,
    op: BinaryOp::LogicalAnd,
    left: Box::new(parenthesize(left)),
    right: Box::new(parenthesize(right)),
  })
}

pub fn not_expr(expr: Expr) -> Expr {
  Expr::Unary(UnaryExpr {
    span: DUMMY_SP,
    op: UnaryOp::Bang,
    arg: Box::new(parenthesize(expr)),
  })
}

/// `expr == null`, true for both `null` and `undefined`.
pub fn is_nullish_expr(expr: Expr) -> Expr {
  Expr::Bin(BinExpr {
    span: DUMMY_SP,
    op: BinaryOp::EqEq,
    left: Box::new(parenthesize(expr)),
    right: Box::new(null_expr()),
  })
}

pub fn cond_expr(test: Expr, cons: Expr, alt: Expr) -> Expr {
  Expr::Cond(CondExpr {
    span: DUMMY_SP,
    test: Box::new(parenthesize(test)),
    cons: Box::new(parenthesize(cons)),
    alt: Box::new(parenthesize(alt)),
  })
}

/// Wraps compound expressions in parentheses so they can be nested as operands.
pub fn parenthesize(expr: Expr) -> Expr {
  match expr {
    Expr::Bin(_) | Expr::Cond(_) | Expr::Assign(_) | Expr::Seq(_) | Expr::Arrow(_) => {
      Expr::Paren(ParenExpr {
        span: DUMMY_SP,
        expr: Box::new(expr),
      })
    }
    other => other,
  }
}

pub fn key_value_prop(key: &str, value: Expr) -> PropOrSpread {
  PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
    key: PropName::Str(Str {
      span: DUMMY_SP,
      value: key.into(),
      raw: None,
    }),
    value: Box::new(value),
  })))
}

/// `(() => { ... })()`.
pub fn wrap_in_iife(body: BlockStmtOrExpr) -> Expr {
  call_expr(
    Expr::Paren(ParenExpr {
      span: DUMMY_SP,
      expr: Box::new(Expr::Arrow(ArrowExpr {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        params: Vec::new(),
        body: Box::new(body),
        is_async: false,
        is_generator: false,
        type_params: None,
        return_type: None,
      })),
    }),
    Vec::new(),
  )
}

/// The value an arrow evaluates to: its expression body, or its block body run as an IIFE.
pub fn arrow_body_expr(arrow: &ArrowExpr) -> Expr {
  match &*arrow.body {
    BlockStmtOrExpr::Expr(expr) => (**expr).clone(),
    BlockStmtOrExpr::BlockStmt(block) => wrap_in_iife(BlockStmtOrExpr::BlockStmt(block.clone())),
  }
}

/// Looks through parentheses and TypeScript-only wrappers.
pub fn unwrap_expr(expr: &Expr) -> &Expr {
  match expr {
    Expr::Paren(paren) => unwrap_expr(&paren.expr),
    Expr::TsAs(ts) => unwrap_expr(&ts.expr),
    Expr::TsSatisfies(ts) => unwrap_expr(&ts.expr),
    Expr::TsNonNull(ts) => unwrap_expr(&ts.expr),
    Expr::TsTypeAssertion(ts) => unwrap_expr(&ts.expr),
    Expr::TsConstAssertion(ts) => unwrap_expr(&ts.expr),
    _ => expr,
  }
}

/// Static text of a non-computed property key.
pub fn static_prop_name(key: &PropName) -> Option<String> {
  match key {
    PropName::Ident(ident) => Some(ident.sym.to_string()),
    PropName::Str(str) => Some(str.value.to_string()),
    PropName::Num(num) => Some(crate::evaluate::js_number(num.value)),
    PropName::BigInt(big) => Some(big.value.to_string()),
    PropName::Computed(_) => None,
  }
}

/// Prints an expression the way it would appear in emitted code.
pub fn print_expr(expr: &Expr) -> String {
  let source_map: Lrc<SourceMap> = Default::default();
  let mut buffer = Vec::new();
  {
    let mut writer = JsWriter::new(source_map.clone(), "\n", &mut buffer, None);
    writer.set_indent_str("  ");
    let mut emitter = Emitter {
      cfg: Config::default(),
      comments: None,
      cm: source_map,
      wr: writer,
    };
    // Writing into a Vec cannot fail.
    let _ = expr.emit_with(&mut emitter);
  }
  String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn prints_composed_expressions() {
    let expr = cond_expr(
      and_expr(ident_expr("a"), ident_expr("b")),
      str_expr("x"),
      str_expr(""),
    );

    assert_eq!(print_expr(&expr), r#"(a && b) ? "x" : """#);
  }

  #[test]
  fn reads_numeric_keys_like_javascript() {
    let key = |value: f64| {
      static_prop_name(&PropName::Num(Number {
        span: DUMMY_SP,
        value,
        raw: None,
      }))
    };

    assert_eq!(key(0.5).as_deref(), Some("0.5"));
    assert_eq!(key(10.0).as_deref(), Some("10"));
  }

  #[test]
  fn wraps_block_bodies_in_iife() {
    let expr = wrap_in_iife(BlockStmtOrExpr::Expr(Box::new(num_expr(1.0))));

    let printed = print_expr(&expr);
    assert!(printed.starts_with("(()"), "{printed}");
    assert!(printed.ends_with(")()"), "{printed}");
  }
}
