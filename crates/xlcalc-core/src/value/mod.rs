//! Value kinds and their coercion rules
//!
//! [`Value`] is the closed set of kinds a formula computes with. Every kind
//! converts to every other through the `as_*` contracts below; the operator
//! engine in [`ops`] is built entirely on top of them.

mod array;
mod datetime;
mod number;
pub mod ops;
mod text;

pub use array::Array;
pub use datetime::DateTime;
pub use number::Number;
pub use ops::{ArithOp, CompareOp};
pub use text::SharedString;

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use lazy_regex::regex_is_match;

use crate::error::{ErrorKind, ExpectedKind, TypeMismatch, XlError, XlResult};

/// A formula value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Number(Number),
    Text(SharedString),
    Boolean(bool),
    DateTime(DateTime),
    /// An absent cell
    #[default]
    Blank,
    Array(Array),
    /// An error produced in place of a value
    Error(XlError),
}

/// Parse a numeric literal, keeping integers whole
fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if !regex_is_match!(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$", text) {
        return None;
    }
    if regex_is_match!(r"^[+-]?\d+$", text) {
        if let Ok(n) = text.parse::<i64>() {
            return Some(Number::Int(n));
        }
    }
    text.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(Number::Float)
}

fn parse_boolean(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl Value {
    pub fn text(s: impl Into<SharedString>) -> Self {
        Value::Text(s.into())
    }

    pub fn error(kind: ErrorKind) -> Self {
        Value::Error(XlError::from(kind))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    pub fn is_datetime(&self) -> bool {
        matches!(self, Value::DateTime(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Value::Blank)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn as_error(&self) -> Option<&XlError> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Kind name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::DateTime(_) => "datetime",
            Value::Blank => "blank",
            Value::Array(_) => "array",
            Value::Error(_) => "error",
        }
    }

    /// Build the compound error for a failed coercion of this value
    pub fn mismatch(&self, field: &str, expected: ExpectedKind) -> XlError {
        XlError::mismatch(TypeMismatch::new(
            field,
            self.to_string(),
            expected,
            self.type_name(),
        ))
    }

    fn not_convertible(&self, target: &str) -> XlError {
        XlError::value(format!(
            "Cannot convert {} \"{self}\" to {target}",
            self.type_name()
        ))
    }

    /// Numeric view
    ///
    /// Text is tried as a number literal, then as `true`/`false`, then as a
    /// date string.
    pub fn as_number(&self) -> XlResult<Number> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Boolean(b) => Ok(Number::Int(*b as i64)),
            Value::DateTime(dt) => Ok(Number::Float(dt.serial())),
            Value::Blank => Ok(Number::Int(0)),
            Value::Text(s) => parse_number(s.as_str())
                .or_else(|| parse_boolean(s.as_str()).map(|b| Number::Int(b as i64)))
                .or_else(|| DateTime::parse(s.as_str()).map(|dt| Number::Float(dt.serial())))
                .ok_or_else(|| self.not_convertible("a number")),
            Value::Array(_) => Err(self.not_convertible("a number")),
            Value::Error(e) => Err(e.clone()),
        }
    }

    pub fn as_f64(&self) -> XlResult<f64> {
        self.as_number().map(|n| n.as_f64())
    }

    /// Canonical text rendering
    pub fn as_text(&self) -> XlResult<SharedString> {
        match self {
            Value::Text(s) => Ok(s.clone()),
            Value::Array(_) => Err(self.not_convertible("text")),
            Value::Error(e) => Err(e.clone()),
            other => Ok(other.to_string().into()),
        }
    }

    /// Truth value
    ///
    /// Text must literally be `true` or `false` (any case). A date/time is
    /// always true, even at the epoch.
    pub fn as_boolean(&self) -> XlResult<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            Value::Number(n) => Ok(!n.is_zero()),
            Value::DateTime(_) => Ok(true),
            Value::Blank => Ok(false),
            Value::Text(s) => {
                parse_boolean(s.as_str()).ok_or_else(|| self.not_convertible("a boolean"))
            }
            Value::Array(_) => Err(self.not_convertible("a boolean")),
            Value::Error(e) => Err(e.clone()),
        }
    }

    /// Date/time view; text is tried as a date string before a number
    pub fn as_datetime(&self) -> XlResult<DateTime> {
        match self {
            Value::DateTime(dt) => Ok(*dt),
            Value::Blank => Ok(DateTime::EPOCH),
            Value::Text(s) => match DateTime::parse(s.as_str()) {
                Some(dt) => Ok(dt),
                None => DateTime::from_serial(self.as_f64()?),
            },
            Value::Number(_) | Value::Boolean(_) => DateTime::from_serial(self.as_f64()?),
            Value::Array(_) => Err(self.not_convertible("a date")),
            Value::Error(e) => Err(e.clone()),
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// The neutral value of this kind, which a blank stands in for
    ///
    /// Date/times, arrays and errors have none.
    pub fn as_blank_default(&self) -> Option<Value> {
        match self {
            Value::Number(_) => Some(Value::Number(Number::Int(0))),
            Value::Text(_) => Some(Value::text("")),
            Value::Boolean(_) => Some(Value::Boolean(false)),
            Value::Blank => Some(Value::Blank),
            Value::DateTime(_) | Value::Array(_) | Value::Error(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
            Value::DateTime(dt) => write!(f, "{dt}"),
            Value::Blank => Ok(()),
            Value::Array(a) => write!(f, "{a}"),
            Value::Error(e) => write!(f, "{e}"),
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::Int(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::Int(n as i64))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        match Number::finite(n) {
            Ok(n) => Value::Number(n),
            Err(e) => Value::Error(e),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::text(s)
    }
}

impl From<SharedString> for Value {
    fn from(s: SharedString) -> Self {
        Value::Text(s)
    }
}

impl From<DateTime> for Value {
    fn from(dt: DateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        DateTime::from_naive_date(date).map_or_else(Value::Error, Value::DateTime)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(moment: NaiveDateTime) -> Self {
        DateTime::from_naive_datetime(moment).map_or_else(Value::Error, Value::DateTime)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<XlError> for Value {
    fn from(e: XlError) -> Self {
        Value::Error(e)
    }
}

impl From<ErrorKind> for Value {
    fn from(kind: ErrorKind) -> Self {
        Value::error(kind)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Blank, Into::into)
    }
}

impl<T: Into<Value>> From<XlResult<T>> for Value {
    fn from(result: XlResult<T>) -> Self {
        result.map_or_else(Value::Error, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_text_as_number() {
        assert_eq!(Value::from("1").as_number().unwrap(), Number::Int(1));
        assert!(Value::from("1").as_number().unwrap().is_whole());
        assert!(Value::from("1.0").as_number().unwrap().is_decimal());
        assert_eq!(Value::from(" 1.1 ").as_number().unwrap(), Number::Float(1.1));
        assert_eq!(Value::from("-1e3").as_number().unwrap(), Number::Float(-1000.0));
        assert_eq!(Value::from("true").as_number().unwrap(), Number::Int(1));
        assert_eq!(Value::from("FALSE").as_number().unwrap(), Number::Int(0));
        assert_eq!(Value::from("1900-01-01").as_number().unwrap(), Number::Int(1));
        assert_eq!(
            Value::from("data").as_number().unwrap_err().kind(),
            ErrorKind::Value
        );
        assert_eq!(Value::from("inf").as_number().unwrap_err().kind(), ErrorKind::Value);
        assert_eq!(Value::from("").as_number().unwrap_err().kind(), ErrorKind::Value);
    }

    #[test]
    fn test_other_kinds_as_number() {
        assert_eq!(Value::Blank.as_number().unwrap(), Number::Int(0));
        assert_eq!(Value::from(true).as_number().unwrap(), Number::Int(1));
        assert_eq!(
            Value::from(DateTime::from_serial(32.0).unwrap()).as_number().unwrap(),
            Number::Float(32.0)
        );
        let err = Value::from(ErrorKind::Na).as_number().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Na);
        let array = Value::from(Array::row([1]).unwrap());
        assert_eq!(array.as_number().unwrap_err().kind(), ErrorKind::Value);
    }

    #[test]
    fn test_as_text() {
        assert_eq!(Value::from(1).as_text().unwrap().as_str(), "1");
        assert_eq!(Value::from(1.5).as_text().unwrap().as_str(), "1.5");
        assert_eq!(Value::from(true).as_text().unwrap().as_str(), "True");
        assert_eq!(Value::from(false).as_text().unwrap().as_str(), "False");
        assert_eq!(Value::Blank.as_text().unwrap().as_str(), "");
        assert_eq!(
            Value::from(DateTime::from_serial(1.0).unwrap()).as_text().unwrap().as_str(),
            "1900-01-01 00:00:00"
        );
    }

    #[test]
    fn test_as_boolean() {
        assert!(Value::from(2).as_boolean().unwrap());
        assert!(!Value::from(0).as_boolean().unwrap());
        assert!(!Value::Blank.as_boolean().unwrap());
        assert!(Value::from("TRUE").as_boolean().unwrap());
        assert!(Value::from("True").as_boolean().unwrap());
        assert!(!Value::from("False").as_boolean().unwrap());
        assert!(Value::from(DateTime::EPOCH).as_boolean().unwrap());
        for text in ["1", "", "data"] {
            assert_eq!(
                Value::from(text).as_boolean().unwrap_err().kind(),
                ErrorKind::Value
            );
        }
    }

    #[test]
    fn test_as_datetime() {
        assert_eq!(Value::from("1").as_datetime().unwrap().ymd().unwrap(), (1900, 1, 1));
        assert_eq!(
            Value::from("1900-01-01").as_datetime().unwrap().ymd().unwrap(),
            (1900, 1, 1)
        );
        assert_eq!(Value::from(-1).as_datetime().unwrap_err().kind(), ErrorKind::Num);
        assert_eq!(Value::Blank.as_datetime().unwrap(), DateTime::EPOCH);
    }

    #[test]
    fn test_blank_defaults() {
        assert_eq!(Value::from(1).as_blank_default(), Some(Value::from(0)));
        assert_eq!(Value::from("1").as_blank_default(), Some(Value::from("")));
        assert_eq!(Value::from(true).as_blank_default(), Some(Value::from(false)));
        assert_eq!(Value::from(DateTime::EPOCH).as_blank_default(), None);
    }

    #[test]
    fn test_native_adapter() {
        assert_eq!(Value::from(None::<i64>), Value::Blank);
        assert_eq!(Value::from(Some("a")), Value::from("a"));
        assert_eq!(Value::from(f64::NAN).as_error().map(XlError::kind), Some(ErrorKind::Num));
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert_eq!(Value::from(date).as_number().unwrap(), Number::Int(36526));
        let ancient = NaiveDate::from_ymd_opt(1800, 1, 1).unwrap();
        assert!(Value::from(ancient).is_error());
    }

    #[test]
    fn test_mismatch_message() {
        let err = Value::from("bad").mismatch("number", ExpectedKind::Number);
        assert!(matches!(err, XlError::Number(_)));
        assert_eq!(
            err.info().as_deref(),
            Some("`number` \"bad\" must be a number. Got: text")
        );
    }

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i64>().prop_map(Value::from),
            (-1e12f64..1e12).prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            "[a-z0-9 ]{0,8}".prop_map(Value::from),
            (0.0f64..2_958_465.0).prop_map(|s| Value::from(DateTime::from_serial(s).unwrap())),
            Just(Value::Blank),
        ]
    }

    proptest! {
        #[test]
        fn prop_casts_are_idempotent(value in scalar()) {
            match &value {
                Value::Number(n) => prop_assert_eq!(value.as_number().unwrap(), *n),
                Value::Text(s) => prop_assert_eq!(value.as_text().unwrap(), s.clone()),
                Value::Boolean(b) => prop_assert_eq!(value.as_boolean().unwrap(), *b),
                Value::DateTime(dt) => prop_assert_eq!(value.as_datetime().unwrap(), *dt),
                _ => {}
            }
        }

        #[test]
        fn prop_number_text_round_trip(n in any::<i64>()) {
            let text = Value::from(n).as_text().unwrap();
            prop_assert_eq!(Value::Text(text).as_number().unwrap(), Number::Int(n));
        }
    }
}
