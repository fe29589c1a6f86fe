use indexmap::IndexMap;
use swc_core::ecma::ast::{ArrowExpr, BlockStmt, BlockStmtOrExpr, Expr, Function, Pat};


/// The outcome of evaluating an expression at compile time.
#[derive(Clone, Debug)]
pub enum StaticValue {
  /// Not provably constant. The expression stays a runtime value.
  Unresolvable,
  /// `undefined` or `null`.
  Nullish,
  String(String),
  Number(f64),
  Boolean(bool),
  Object(IndexMap<String, Slot>),
  Array(Vec<Slot>),
  Function(FunctionValue),
}

/// A member of an object or array value: either folded, or left as a runtime expression.
#[derive(Clone, Debug)]
pub enum Slot {
  Static(StaticValue),
  Dynamic(Box<Expr>),
}

impl Slot {
  pub fn value(&self) -> StaticValue {
    match self {
      Slot::Static(value) => value.clone(),
      Slot::Dynamic(_) => StaticValue::Unresolvable,
    }
  }
}

#[derive(Clone, Debug)]
pub struct FunctionValue {
  pub params: Vec<Pat>,
  pub body: FunctionBody,
}

#[derive(Clone, Debug)]
pub enum FunctionBody {
  Expr(Box<Expr>),
  Block(BlockStmt),
}

impl FunctionValue {
  pub fn from_arrow(arrow: &ArrowExpr) -> Self {
    FunctionValue {
      params: arrow.params.clone(),
      body: match &*arrow.body {
        BlockStmtOrExpr::Expr(expr) => FunctionBody::Expr(expr.clone()),
        BlockStmtOrExpr::BlockStmt(block) => FunctionBody::Block(block.clone()),
      },
    }
  }

  pub fn from_function(function: &Function) -> Option<Self> {
    if function.is_async || function.is_generator {
      return None;
    }
    Some(FunctionValue {
      params: function.params.iter().map(|param| param.pat.clone()).collect(),
      body: FunctionBody::Block(function.body.clone()?),
    })
  }
}

impl StaticValue {
  pub fn is_resolved(&self) -> bool {
    !matches!(self, StaticValue::Unresolvable)
  }

  /// True when no part of the value is left to runtime.
  pub fn is_fully_static(&self) -> bool {
    match self {
      StaticValue::Unresolvable => false,
      StaticValue::Object(map) => map.values().all(Slot::is_fully_static),
      StaticValue::Array(items) => items.iter().all(Slot::is_fully_static),
      _ => true,
    }
  }

  /// JavaScript truthiness, when known.
  pub fn truthiness(&self) -> Option<bool> {
    match self {
      StaticValue::Unresolvable => None,
      StaticValue::Nullish => Some(false),
      StaticValue::String(value) => Some(!value.is_empty()),
      StaticValue::Number(value) => Some(*value != 0.0 && !value.is_nan()),
      StaticValue::Boolean(value) => Some(*value),
      StaticValue::Object(_) | StaticValue::Array(_) | StaticValue::Function(_) => Some(true),
    }
  }

  /// The value as JavaScript would print it in string concatenation.
  pub fn to_js_string(&self) -> Option<String> {
    match self {
      StaticValue::String(value) => Some(value.clone()),
      StaticValue::Number(value) => Some(js_number(*value)),
      StaticValue::Boolean(value) => Some(value.to_string()),
      _ => None,
    }
  }

  /// Numeric coercion, including numeric strings such as `'8'`.
  pub fn to_number(&self) -> Option<f64> {
    match self {
      StaticValue::Number(value) => Some(*value),
      StaticValue::Boolean(value) => Some(if *value { 1.0 } else { 0.0 }),
      StaticValue::String(value) => string_to_number(value),
      _ => None,
    }
  }
}

/// `Number(text)` for the spellings JavaScript accepts. `None` where it would be `NaN`.
fn string_to_number(text: &str) -> Option<f64> {
  let text = text.trim();
  if text.is_empty() {
    return Some(0.0);
  }

  let radix = match text.get(..2) {
    Some("0x" | "0X") => Some(16),
    Some("0o" | "0O") => Some(8),
    Some("0b" | "0B") => Some(2),
    _ => None,
  };
  if let Some(radix) = radix {
    let digits = &text[2..];
    if digits.is_empty() {
      return None;
    }
    return digits.chars().try_fold(0.0, |value: f64, ch| {
      ch.to_digit(radix)
        .map(|digit| value * f64::from(radix) + f64::from(digit))
    });
  }

  let unsigned = text.strip_prefix(&['+', '-'][..]).unwrap_or(text);
  if unsigned == "Infinity" {
    return Some(if text.starts_with('-') {
      f64::NEG_INFINITY
    } else {
      f64::INFINITY
    });
  }
  // Rust also accepts `inf` and `NaN`; JavaScript only takes decimal literals here.
  if !unsigned
    .chars()
    .all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '+' | '-'))
  {
    return None;
  }
  text.parse::<f64>().ok()
}

impl Slot {
  pub fn is_fully_static(&self) -> bool {
    match self {
      Slot::Static(value) => value.is_fully_static(),
      Slot::Dynamic(_) => false,
    }
  }
}

/// Formats a number the way JavaScript's `String(n)` does.
pub fn js_number(value: f64) -> String {
  if value.is_nan() {
    return "NaN".into();
  }
  if value == 0.0 {
    return "0".into();
  }
  if value.is_infinite() {
    return if value > 0.0 { "Infinity" } else { "-Infinity" }.into();
  }

  let sign = if value < 0.0 { "-" } else { "" };
  // Shortest round-trip digits and exponent, such as `1.5e21`.
  let scientific = format!("{:e}", value.abs());
  let (mantissa, exponent) = scientific.as_str().split_once('e').unwrap_or((scientific.as_str(), "0"));
  let digits: String = mantissa.chars().filter(|ch| *ch != '.').collect();
  let exponent: i32 = exponent.parse().unwrap_or(0);
  let length = digits.len() as i32;
  let point = exponent + 1;

  let body = if length <= point && point <= 21 {
    format!("{digits}{}", "0".repeat((point - length) as usize))
  } else if 0 < point && point <= 21 {
    let (whole, fraction) = digits.split_at(point as usize);
    format!("{whole}.{fraction}")
  } else if -6 < point && point <= 0 {
    format!("0.{}{digits}", "0".repeat(-point as usize))
  } else {
    let (first, rest) = digits.split_at(1);
    let fraction = if rest.is_empty() {
      String::new()
    } else {
      format!(".{rest}")
    };
    let exponent_sign = if point - 1 < 0 { "-" } else { "+" };
    format!("{first}{fraction}e{exponent_sign}{}", (point - 1).abs())
  };
  format!("{sign}{body}")
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn coerces_like_javascript() {
    assert_eq!(StaticValue::String("8".into()).to_number(), Some(8.0));
    assert_eq!(StaticValue::String(" ".into()).to_number(), Some(0.0));
    assert_eq!(StaticValue::String("8px".into()).to_number(), None);
    assert_eq!(StaticValue::Boolean(true).to_number(), Some(1.0));
    assert_eq!(StaticValue::Nullish.to_number(), None);

    assert_eq!(js_number(12.0), "12");
    assert_eq!(js_number(0.5), "0.5");
    assert_eq!(js_number(-1.25), "-1.25");
  }

  #[test]
  fn parses_numeric_strings_like_number() {
    let number = |text: &str| StaticValue::String(text.into()).to_number();

    assert_eq!(number("0x10"), Some(16.0));
    assert_eq!(number("0b101"), Some(5.0));
    assert_eq!(number("0o17"), Some(15.0));
    assert_eq!(number(" -2.5e1 "), Some(-25.0));
    assert_eq!(number("Infinity"), Some(f64::INFINITY));
    assert_eq!(number("inf"), None);
    assert_eq!(number("NaN"), None);
    assert_eq!(number("infinity"), None);
    assert_eq!(number("1_0"), None);
    assert_eq!(number("0x"), None);
    assert_eq!(number("-0x10"), None);
  }

  #[test]
  fn prints_numbers_like_string() {
    assert_eq!(js_number(1e-7), "1e-7");
    assert_eq!(js_number(0.000001), "0.000001");
    assert_eq!(js_number(1.5e21), "1.5e+21");
    assert_eq!(js_number(1e21), "1e+21");
    assert_eq!(js_number(123456789012345680000.0), "123456789012345680000");
    assert_eq!(js_number(-0.25), "-0.25");
    assert_eq!(js_number(100.0), "100");
  }

  #[test]
  fn reports_truthiness() {
    assert_eq!(StaticValue::String(String::new()).truthiness(), Some(false));
    assert_eq!(StaticValue::Number(0.0).truthiness(), Some(false));
    assert_eq!(StaticValue::Nullish.truthiness(), Some(false));
    assert_eq!(StaticValue::Object(IndexMap::new()).truthiness(), Some(true));
    assert_eq!(StaticValue::Unresolvable.truthiness(), None);
  }

  #[test]
  fn detects_dynamic_leaves() {
    let mut map = IndexMap::new();
    map.insert("color".to_string(), Slot::Static(StaticValue::String("red".into())));
    assert!(StaticValue::Object(map.clone()).is_fully_static());

    map.insert(
      "size".to_string(),
      Slot::Dynamic(Box::new(crate::ast::ident_expr("size"))),
    );
    assert!(!StaticValue::Object(map).is_fully_static());
  }
}
