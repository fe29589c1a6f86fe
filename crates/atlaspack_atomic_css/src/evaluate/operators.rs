use swc_core::ecma::ast::{BinaryOp, UnaryOp};

use super::value::StaticValue;

/// Folds a non-logical binary operator over two resolved operands.
pub fn fold_binary(op: BinaryOp, left: &StaticValue, right: &StaticValue) -> StaticValue {
  let value = match op {
    BinaryOp::Add => add(left, right),
    BinaryOp::Sub => numeric(left, right, |a, b| a - b),
    BinaryOp::Mul => numeric(left, right, |a, b| a * b),
    BinaryOp::Div => numeric(left, right, |a, b| a / b),
    BinaryOp::Mod => numeric(left, right, |a, b| a % b),
    BinaryOp::Exp => numeric(left, right, f64::powf),
    BinaryOp::EqEqEq => strict_equals(left, right).map(StaticValue::Boolean),
    BinaryOp::NotEqEq => strict_equals(left, right).map(|eq| StaticValue::Boolean(!eq)),
    BinaryOp::Lt => compare(left, right, |a, b| a < b),
    BinaryOp::LtEq => compare(left, right, |a, b| a <= b),
    BinaryOp::Gt => compare(left, right, |a, b| a > b),
    BinaryOp::GtEq => compare(left, right, |a, b| a >= b),
    _ => None,
  };
  value.unwrap_or(StaticValue::Unresolvable)
}

pub fn fold_unary(op: UnaryOp, arg: &StaticValue) -> StaticValue {
  let value = match op {
    UnaryOp::Minus => arg.to_number().map(|n| StaticValue::Number(-n)),
    UnaryOp::Plus => arg.to_number().map(StaticValue::Number),
    UnaryOp::Bang => arg.truthiness().map(|truthy| StaticValue::Boolean(!truthy)),
    UnaryOp::Void => Some(StaticValue::Nullish),
    UnaryOp::TypeOf => type_of(arg).map(|name| StaticValue::String(name.into())),
    _ => None,
  };
  value.unwrap_or(StaticValue::Unresolvable)
}

fn add(left: &StaticValue, right: &StaticValue) -> Option<StaticValue> {
  match (left, right) {
    (StaticValue::String(_), _) | (_, StaticValue::String(_)) => Some(StaticValue::String(
      format!("{}{}", left.to_js_string()?, right.to_js_string()?),
    )),
    _ => numeric(left, right, |a, b| a + b),
  }
}

fn numeric(left: &StaticValue, right: &StaticValue, op: impl Fn(f64, f64) -> f64) -> Option<StaticValue> {
  let result = op(left.to_number()?, right.to_number()?);
  result.is_finite().then_some(StaticValue::Number(result))
}

fn compare(left: &StaticValue, right: &StaticValue, op: impl Fn(f64, f64) -> bool) -> Option<StaticValue> {
  Some(StaticValue::Boolean(op(left.to_number()?, right.to_number()?)))
}

fn strict_equals(left: &StaticValue, right: &StaticValue) -> Option<bool> {
  match (left, right) {
    (StaticValue::String(a), StaticValue::String(b)) => Some(a == b),
    (StaticValue::Number(a), StaticValue::Number(b)) => Some(a == b),
    (StaticValue::Boolean(a), StaticValue::Boolean(b)) => Some(a == b),
    (StaticValue::Nullish, StaticValue::Nullish) => None,
    (
      StaticValue::String(_) | StaticValue::Number(_) | StaticValue::Boolean(_),
      StaticValue::String(_) | StaticValue::Number(_) | StaticValue::Boolean(_),
    ) => Some(false),
    _ => None,
  }
}

fn type_of(value: &StaticValue) -> Option<&'static str> {
  match value {
    StaticValue::String(_) => Some("string"),
    StaticValue::Number(_) => Some("number"),
    StaticValue::Boolean(_) => Some("boolean"),
    StaticValue::Function(_) => Some("function"),
    StaticValue::Object(_) | StaticValue::Array(_) => Some("object"),
    StaticValue::Nullish | StaticValue::Unresolvable => None,
  }
}
