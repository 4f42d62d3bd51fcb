//! Operator engine
//!
//! Operators never fail: a data error becomes a [`Value::Error`] result.
//! Error operands propagate, left operand first.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::ops::{Add, BitAnd, BitOr, Div, Mul, Neg, Sub};

use super::{Number, Value};
use crate::error::{XlError, XlResult};

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl ArithOp {
    pub fn apply(&self, lhs: Number, rhs: Number) -> XlResult<Number> {
        match self {
            ArithOp::Add => lhs.checked_add(rhs),
            ArithOp::Sub => lhs.checked_sub(rhs),
            ArithOp::Mul => lhs.checked_mul(rhs),
            ArithOp::Div => lhs.checked_div(rhs),
            ArithOp::Pow => lhs.checked_pow(rhs),
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Ne,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Le),
            "=" => Some(CompareOp::Eq),
            "<>" => Some(CompareOp::Ne),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Ge),
            _ => None,
        }
    }

    /// Does `lhs <op> rhs` hold, given `lhs.cmp(rhs)`?
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// Sort rank across kinds: numbers < text < booleans
fn kind_rank(value: &Value) -> Option<u8> {
    match value {
        Value::Number(_) | Value::DateTime(_) => Some(0),
        Value::Text(_) => Some(1),
        Value::Boolean(_) => Some(2),
        _ => None,
    }
}

/// What a blank operand compares as, given the other operand
fn blank_stand_in<'a>(value: &'a Value, other: &Value) -> Cow<'a, Value> {
    if !value.is_blank() {
        return Cow::Borrowed(value);
    }
    match other {
        Value::Text(_) | Value::Boolean(_) => {
            Cow::Owned(other.as_blank_default().unwrap_or_default())
        }
        _ => Cow::Owned(Value::Number(Number::Int(0))),
    }
}

fn into_value(result: XlResult<Number>) -> Value {
    result.map_or_else(Value::Error, Value::Number)
}

impl Value {
    /// Apply an arithmetic operator to the numeric views of both operands
    pub fn arithmetic(&self, op: ArithOp, rhs: &Value) -> Value {
        into_value(self.try_arithmetic(op, rhs))
    }

    pub fn try_arithmetic(&self, op: ArithOp, rhs: &Value) -> XlResult<Number> {
        let lhs = self.as_number()?;
        let rhs = rhs.as_number()?;
        op.apply(lhs, rhs)
    }

    pub fn pow(&self, rhs: &Value) -> Value {
        self.arithmetic(ArithOp::Pow, rhs)
    }

    /// Unary minus
    pub fn negate(&self) -> Value {
        into_value(self.as_number().map(Neg::neg))
    }

    /// Postfix `%`
    pub fn percent(&self) -> Value {
        into_value(
            self.as_number()
                .and_then(|n| n.checked_mul(Number::Float(0.01))),
        )
    }

    /// Text concatenation (`&` in formulas)
    pub fn concat(&self, rhs: &Value) -> Value {
        let joined = self
            .as_text()
            .and_then(|lhs| rhs.as_text().map(|rhs| format!("{lhs}{rhs}")));
        joined.map_or_else(Value::Error, Value::text)
    }

    /// Order two values
    ///
    /// A blank compares as the neutral value of the other operand's kind.
    /// Across kinds, numbers and date/times sort below text, which sorts below
    /// booleans. Text compares case-insensitively. `Ok(None)` means the pair
    /// has no ordering (arrays).
    pub fn compare(&self, rhs: &Value) -> XlResult<Option<Ordering>> {
        if let Value::Error(e) = self {
            return Err(e.clone());
        }
        if let Value::Error(e) = rhs {
            return Err(e.clone());
        }

        let lhs = blank_stand_in(self, rhs);
        let rhs = blank_stand_in(rhs, self);

        let (lhs_rank, rhs_rank) = match (kind_rank(&lhs), kind_rank(&rhs)) {
            (Some(l), Some(r)) => (l, r),
            _ => return Ok(None),
        };
        if lhs_rank != rhs_rank {
            return Ok(Some(lhs_rank.cmp(&rhs_rank)));
        }

        let ordering = match (lhs.as_ref(), rhs.as_ref()) {
            (Value::Text(a), Value::Text(b)) => {
                Some(a.as_str().to_lowercase().cmp(&b.as_str().to_lowercase()))
            }
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (a, b) => a.as_number()?.partial_cmp(&b.as_number()?),
        };
        Ok(ordering)
    }

    /// Apply a comparison operator
    ///
    /// `=` and `<>` answer `FALSE`/`TRUE` for unordered pairs; the ordering
    /// operators give `#VALUE!`.
    pub fn compare_with(&self, op: CompareOp, rhs: &Value) -> Value {
        match self.compare(rhs) {
            Ok(Some(ordering)) => Value::Boolean(op.holds(ordering)),
            Ok(None) => match op {
                CompareOp::Eq => Value::Boolean(false),
                CompareOp::Ne => Value::Boolean(true),
                _ => Value::Error(XlError::value(format!(
                    "Cannot compare {} {} {}",
                    self.type_name(),
                    op.symbol(),
                    rhs.type_name()
                ))),
            },
            Err(e) => Value::Error(e),
        }
    }

    fn logical(&self, rhs: &Value, op: fn(bool, bool) -> bool) -> Value {
        let result = match (self, rhs) {
            (Value::Blank, Value::Blank) => Err(XlError::value(
                "Logical operators need at least one non-blank operand",
            )),
            (Value::Blank, other) | (other, Value::Blank) => other.as_boolean(),
            _ => self
                .as_boolean()
                .and_then(|lhs| rhs.as_boolean().map(|rhs| op(lhs, rhs))),
        };
        result.map_or_else(Value::Error, Value::Boolean)
    }

    /// Logical AND; a blank operand is ignored
    pub fn and(&self, rhs: &Value) -> Value {
        self.logical(rhs, |a, b| a && b)
    }

    /// Logical OR; a blank operand is ignored
    pub fn or(&self, rhs: &Value) -> Value {
        self.logical(rhs, |a, b| a || b)
    }
}

macro_rules! binary_operator {
    ($trait:ident, $method:ident, |$lhs:ident, $rhs:ident| $body:expr) => {
        impl $trait<&Value> for &Value {
            type Output = Value;

            fn $method(self, rhs: &Value) -> Value {
                let ($lhs, $rhs) = (self, rhs);
                $body
            }
        }

        impl $trait for Value {
            type Output = Value;

            fn $method(self, rhs: Value) -> Value {
                let ($lhs, $rhs) = (&self, &rhs);
                $body
            }
        }
    };
}

binary_operator!(Add, add, |a, b| a.arithmetic(ArithOp::Add, b));
binary_operator!(Sub, sub, |a, b| a.arithmetic(ArithOp::Sub, b));
binary_operator!(Mul, mul, |a, b| a.arithmetic(ArithOp::Mul, b));
binary_operator!(Div, div, |a, b| a.arithmetic(ArithOp::Div, b));
binary_operator!(BitAnd, bitand, |a, b| a.and(b));
binary_operator!(BitOr, bitor, |a, b| a.or(b));

impl Neg for &Value {
    type Output = Value;

    fn neg(self) -> Value {
        self.negate()
    }
}

impl Neg for Value {
    type Output = Value;

    fn neg(self) -> Value {
        self.negate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::value::{Array, DateTime};

    fn v<T: Into<Value>>(value: T) -> Value {
        value.into()
    }

    fn dt(serial: f64) -> Value {
        Value::DateTime(DateTime::from_serial(serial).unwrap())
    }

    fn kind_of(value: &Value) -> Option<ErrorKind> {
        value.as_error().map(XlError::kind)
    }

    fn cmp(lhs: &Value, op: &str, rhs: &Value) -> Value {
        lhs.compare_with(CompareOp::from_symbol(op).unwrap(), rhs)
    }

    #[test]
    fn test_whole_arithmetic() {
        let sum = v(1) + v(2);
        assert!(matches!(sum, Value::Number(Number::Int(3))));
        let text_sum = v("1") + v("2");
        assert!(matches!(text_sum, Value::Number(Number::Int(3))));
        let with_bool = v(1) + v(true);
        assert!(matches!(with_bool, Value::Number(Number::Int(2))));
        assert!(matches!(v(2).pow(&v(3)), Value::Number(Number::Int(8))));
    }

    #[test]
    fn test_decimal_arithmetic() {
        assert!(matches!(v(1) + v(2.0), Value::Number(Number::Float(n)) if n == 3.0));
        assert!(matches!(v(1) / v(2), Value::Number(Number::Float(n)) if n == 0.5));
        assert!(matches!(v(1) + dt(31.0), Value::Number(Number::Float(n)) if n == 32.0));
        assert!(matches!(dt(1.0) - dt(32.0), Value::Number(Number::Float(n)) if n == -31.0));
    }

    #[test]
    fn test_blank_arithmetic() {
        assert_eq!(Value::Blank + v(1), v(1));
        assert_eq!(Value::Blank - v(1), v(-1));
        assert_eq!(Value::Blank * v(1), v(0));
        assert_eq!(Value::Blank / v(1), v(0));
        assert_eq!(kind_of(&(v(1) / Value::Blank)), Some(ErrorKind::DivZero));
    }

    #[test]
    fn test_arithmetic_errors() {
        assert_eq!(kind_of(&(v(1) / v(0))), Some(ErrorKind::DivZero));
        assert_eq!(kind_of(&(v(1) + v("data"))), Some(ErrorKind::Value));
        let array = v(Array::row([1, 2]).unwrap());
        assert_eq!(kind_of(&(v(1) + array)), Some(ErrorKind::Value));
    }

    #[test]
    fn test_left_error_wins() {
        let result = v(ErrorKind::Na) + v(ErrorKind::Ref);
        assert_eq!(kind_of(&result), Some(ErrorKind::Na));
        let result = v(1) * v(ErrorKind::Ref);
        assert_eq!(kind_of(&result), Some(ErrorKind::Ref));
        assert_eq!(kind_of(&cmp(&v(1), "=", &v(ErrorKind::Num))), Some(ErrorKind::Num));
    }

    #[test]
    fn test_unary() {
        assert_eq!(-v(2), v(-2));
        assert!(matches!(v(50).percent(), Value::Number(Number::Float(n)) if n == 0.5));
        assert_eq!(kind_of(&v("data").negate()), Some(ErrorKind::Value));
    }

    #[test]
    fn test_concat() {
        assert_eq!(v("a").concat(&v(1)), v("a1"));
        assert_eq!(v(true).concat(&Value::Blank), v("True"));
        assert_eq!(kind_of(&v("a").concat(&v(ErrorKind::Na))), Some(ErrorKind::Na));
    }

    #[test]
    fn test_number_comparisons() {
        assert_eq!(cmp(&v(1), "<", &v(2)), v(true));
        assert_eq!(cmp(&v(1), "<=", &v(1)), v(true));
        assert_eq!(cmp(&v(2), "<=", &v(1)), v(false));
        assert_eq!(cmp(&v(1), "=", &v(1.0)), v(true));
        assert_eq!(cmp(&v(1), "<>", &v(2)), v(true));
        assert_eq!(cmp(&v(2), ">", &v(1)), v(true));
        assert_eq!(cmp(&v(1), ">=", &v(2)), v(false));
        assert_eq!(cmp(&v(1), "<", &dt(2.0)), v(true));
    }

    #[test]
    fn test_cross_kind_ordering() {
        // Text sorts above numbers and dates, booleans above everything
        assert_eq!(cmp(&v(1), "<", &v("data")), v(true));
        assert_eq!(cmp(&v("1"), "<", &v(true)), v(true));
        assert_eq!(cmp(&v("1"), "<", &dt(2.0)), v(false));
        assert_eq!(cmp(&v(2), "<", &v(true)), v(true));
        assert_eq!(cmp(&v(0), "<", &v(true)), v(true));
        assert_eq!(cmp(&v(true), "<", &v("data")), v(false));
        assert_eq!(cmp(&v(true), "<", &dt(2.0)), v(false));
        assert_eq!(cmp(&v(false), "<", &v(true)), v(true));
        assert_eq!(cmp(&v(1), "=", &v("1")), v(false));
    }

    #[test]
    fn test_text_comparison_ignores_case() {
        assert_eq!(cmp(&v("abc"), "=", &v("ABC")), v(true));
        assert_eq!(cmp(&v("a"), "<", &v("B")), v(true));
    }

    #[test]
    fn test_blank_comparisons() {
        let blank = Value::Blank;
        assert_eq!(cmp(&blank, "<", &v(1)), v(true));
        assert_eq!(cmp(&blank, "<=", &v(0)), v(true));
        assert_eq!(cmp(&blank, "=", &v(0)), v(true));
        assert_eq!(cmp(&blank, "=", &v(1)), v(false));
        assert_eq!(cmp(&blank, "=", &v("")), v(true));
        assert_eq!(cmp(&blank, "=", &v("data")), v(false));
        assert_eq!(cmp(&blank, "=", &v(true)), v(false));
        assert_eq!(cmp(&blank, "=", &v(false)), v(true));
        assert_eq!(cmp(&blank, "<>", &v(false)), v(false));
        assert_eq!(cmp(&blank, ">=", &v(1)), v(false));
        assert_eq!(cmp(&v(-1), "<", &blank), v(true));
        assert_eq!(cmp(&v(1), "<", &blank), v(false));
        assert_eq!(cmp(&blank, "=", &blank), v(true));
        assert_eq!(cmp(&blank, "<", &dt(1.0)), v(true));
    }

    #[test]
    fn test_unordered_pairs() {
        let array = v(Array::row([1]).unwrap());
        assert_eq!(cmp(&array, "=", &v(1)), v(false));
        assert_eq!(cmp(&array, "<>", &v(1)), v(true));
        assert_eq!(kind_of(&cmp(&array, "<", &v(1))), Some(ErrorKind::Value));
    }

    #[test]
    fn test_logical() {
        assert_eq!(v(1) & v(2), v(true));
        assert_eq!(v(1) & v(0), v(false));
        assert_eq!(v(0) | v(1), v(true));
        assert_eq!(v(0) | v(0), v(false));
        assert_eq!(dt(0.0) & dt(1.0), v(true));
        assert_eq!(dt(0.0) | dt(0.0), v(true));
        assert_eq!(Value::Blank & v(1), v(true));
        assert_eq!(v(1) | Value::Blank, v(true));
        assert_eq!(Value::Blank & v(0), v(false));
        assert_eq!(kind_of(&(Value::Blank & Value::Blank)), Some(ErrorKind::Value));
        assert_eq!(kind_of(&(Value::Blank | Value::Blank)), Some(ErrorKind::Value));
        assert_eq!(kind_of(&(v("data") & v(true))), Some(ErrorKind::Value));
    }
}
