//! Numeric values

use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;

use crate::error::{XlError, XlResult};

/// Largest magnitude at which a float still prints without a fractional part
const WHOLE_DISPLAY_LIMIT: f64 = 1e15;

/// A number that remembers whether it is whole (integer) or decimal
///
/// Integer arithmetic stays integral until it overflows, at which point it
/// falls back to floating point. Division always produces a decimal.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn is_whole(&self) -> bool {
        matches!(self, Number::Int(_))
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(n) => n as f64,
            Number::Float(n) => n,
        }
    }

    /// Truncate toward zero, failing for values outside the `i64` range
    pub fn trunc(&self) -> Option<i64> {
        match *self {
            Number::Int(n) => Some(n),
            Number::Float(n) => {
                let t = n.trunc();
                if t.is_finite() && t >= i64::MIN as f64 && t <= i64::MAX as f64 {
                    Some(t as i64)
                } else {
                    None
                }
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_f64() == 0.0
    }

    /// Wrap a float result, rejecting NaN and infinities with `#NUM!`
    pub fn finite(value: f64) -> XlResult<Number> {
        if value.is_finite() {
            Ok(Number::Float(value))
        } else {
            Err(XlError::num(format!("{value} is not a finite number")))
        }
    }

    fn binary(
        self,
        rhs: Number,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> XlResult<Number> {
        if let (Number::Int(a), Number::Int(b)) = (self, rhs) {
            if let Some(n) = int_op(a, b) {
                return Ok(Number::Int(n));
            }
        }
        Number::finite(float_op(self.as_f64(), rhs.as_f64()))
    }

    pub fn checked_add(self, rhs: Number) -> XlResult<Number> {
        self.binary(rhs, i64::checked_add, |a, b| a + b)
    }

    pub fn checked_sub(self, rhs: Number) -> XlResult<Number> {
        self.binary(rhs, i64::checked_sub, |a, b| a - b)
    }

    pub fn checked_mul(self, rhs: Number) -> XlResult<Number> {
        self.binary(rhs, i64::checked_mul, |a, b| a * b)
    }

    pub fn checked_div(self, rhs: Number) -> XlResult<Number> {
        if rhs.is_zero() {
            return Err(XlError::div_zero(format!("{self} / 0")));
        }
        Number::finite(self.as_f64() / rhs.as_f64())
    }

    pub fn checked_pow(self, rhs: Number) -> XlResult<Number> {
        if let (Number::Int(base), Number::Int(exp)) = (self, rhs) {
            if let Some(n) = u32::try_from(exp).ok().and_then(|e| base.checked_pow(e)) {
                return Ok(Number::Int(n));
            }
        }
        let (base, exp) = (self.as_f64(), rhs.as_f64());
        if base == 0.0 && exp < 0.0 {
            return Err(XlError::div_zero(format!("0 ^ {rhs}")));
        }
        Number::finite(base.powf(exp))
    }

    /// Python-style modulo: the result takes the sign of the divisor
    pub fn checked_rem(self, rhs: Number) -> XlResult<Number> {
        if rhs.is_zero() {
            return Err(XlError::div_zero(format!("{self} mod 0")));
        }
        if let (Number::Int(a), Number::Int(b)) = (self, rhs) {
            if let Some(r) = a.checked_rem_euclid(b) {
                // rem_euclid is always non-negative; shift into the divisor's sign
                let r = if b < 0 && r != 0 { r + b } else { r };
                return Ok(Number::Int(r));
            }
        }
        let (a, b) = (self.as_f64(), rhs.as_f64());
        Number::finite(a - b * (a / b).floor())
    }
}

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Number {
        match self {
            Number::Int(n) => n
                .checked_neg()
                .map_or(Number::Float(-(n as f64)), Number::Int),
            Number::Float(n) => Number::Float(-n),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Number) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(n) => write!(f, "{n}"),
            Number::Float(n) if n == 0.0 => f.write_str("0"),
            Number::Float(n) if n.fract() == 0.0 && n.abs() < WHOLE_DISPLAY_LIMIT => {
                write!(f, "{n:.0}")
            }
            Number::Float(n) => write!(f, "{n}"),
        }
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::Int(0)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Int(n)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::Int(n as i64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::Float(n)
    }
}
