//! Spreadsheet error values
//!
//! Errors here are *data*: they are produced in place of a result, stored in
//! arrays, and propagated through operators like any other value. Every error
//! displays as one of the seven canonical codes regardless of which variant
//! produced it.

use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Result type for coercions and computations that fail with a spreadsheet error
pub type XlResult<T> = std::result::Result<T, XlError>;

/// The canonical spreadsheet error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// #NULL! - Incorrect range operator
    Null,
    /// #DIV/0! - Division by zero
    DivZero,
    /// #VALUE! - Wrong type of argument or operand
    Value,
    /// #REF! - Invalid cell reference
    Ref,
    /// #NAME? - Unrecognized formula name
    Name,
    /// #NUM! - Invalid numeric value
    Num,
    /// #N/A - Value not available
    Na,
}

impl ErrorKind {
    /// All kinds, in canonical order
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Null,
        ErrorKind::DivZero,
        ErrorKind::Value,
        ErrorKind::Ref,
        ErrorKind::Name,
        ErrorKind::Num,
        ErrorKind::Na,
    ];

    /// Get the display code for this error
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Null => "#NULL!",
            ErrorKind::DivZero => "#DIV/0!",
            ErrorKind::Value => "#VALUE!",
            ErrorKind::Ref => "#REF!",
            ErrorKind::Name => "#NAME?",
            ErrorKind::Num => "#NUM!",
            ErrorKind::Na => "#N/A",
        }
    }

    /// Parse an error code (case-insensitive)
    pub fn from_code(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        Self::ALL.into_iter().find(|kind| kind.code() == upper)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// What an argument was expected to be, for the compound `#VALUE!` errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpectedKind {
    Number,
    Integer,
    Text,
    Range,
    Blank,
}

impl ExpectedKind {
    fn describe(&self) -> &'static str {
        match self {
            ExpectedKind::Number => "a number",
            ExpectedKind::Integer => "an integer",
            ExpectedKind::Text => "text",
            ExpectedKind::Range => "a range",
            ExpectedKind::Blank => "blank",
        }
    }
}

/// An argument that could not be coerced to the kind a parameter declares
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMismatch {
    field: String,
    value: String,
    expected: ExpectedKind,
    actual: &'static str,
}

impl TypeMismatch {
    pub fn new(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: ExpectedKind,
        actual: &'static str,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            expected,
            actual,
        }
    }

    /// Name of the offending parameter
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Text rendering of the offending value
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expected(&self) -> ExpectedKind {
        self.expected
    }

    /// Kind name of the offending value (`"text"`, `"array"`, ...)
    pub fn actual(&self) -> &'static str {
        self.actual
    }
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` \"{}\" must be {}. Got: {}",
            self.field,
            self.value,
            self.expected.describe(),
            self.actual
        )
    }
}

/// A spreadsheet error value
///
/// The seven plain variants carry optional diagnostic text. The compound
/// variants are all `#VALUE!` errors that record which coercion failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum XlError {
    #[error("#NULL!")]
    Null(Option<String>),
    #[error("#DIV/0!")]
    DivZero(Option<String>),
    #[error("#VALUE!")]
    Value(Option<String>),
    #[error("#REF!")]
    Ref(Option<String>),
    #[error("#NAME?")]
    Name(Option<String>),
    #[error("#NUM!")]
    Num(Option<String>),
    #[error("#N/A")]
    Na(Option<String>),

    /// Expected a number
    #[error("#VALUE!")]
    Number(TypeMismatch),
    /// Expected a whole number
    #[error("#VALUE!")]
    Integer(TypeMismatch),
    /// Expected text
    #[error("#VALUE!")]
    Text(TypeMismatch),
    /// Expected an array or range
    #[error("#VALUE!")]
    Range(TypeMismatch),
    /// Expected an empty value
    #[error("#VALUE!")]
    Blank(TypeMismatch),
}

impl XlError {
    /// Create an error of the given kind with diagnostic text
    pub fn new(kind: ErrorKind, info: impl Into<String>) -> Self {
        Self::with_info(kind, Some(info.into()))
    }

    fn with_info(kind: ErrorKind, info: Option<String>) -> Self {
        match kind {
            ErrorKind::Null => XlError::Null(info),
            ErrorKind::DivZero => XlError::DivZero(info),
            ErrorKind::Value => XlError::Value(info),
            ErrorKind::Ref => XlError::Ref(info),
            ErrorKind::Name => XlError::Name(info),
            ErrorKind::Num => XlError::Num(info),
            ErrorKind::Na => XlError::Na(info),
        }
    }

    pub fn null(info: impl Into<String>) -> Self {
        Self::new(ErrorKind::Null, info)
    }

    pub fn div_zero(info: impl Into<String>) -> Self {
        Self::new(ErrorKind::DivZero, info)
    }

    pub fn value(info: impl Into<String>) -> Self {
        Self::new(ErrorKind::Value, info)
    }

    pub fn num(info: impl Into<String>) -> Self {
        Self::new(ErrorKind::Num, info)
    }

    pub fn na(info: impl Into<String>) -> Self {
        Self::new(ErrorKind::Na, info)
    }

    /// Build the compound error matching `expected`
    pub fn mismatch(mismatch: TypeMismatch) -> Self {
        match mismatch.expected {
            ExpectedKind::Number => XlError::Number(mismatch),
            ExpectedKind::Integer => XlError::Integer(mismatch),
            ExpectedKind::Text => XlError::Text(mismatch),
            ExpectedKind::Range => XlError::Range(mismatch),
            ExpectedKind::Blank => XlError::Blank(mismatch),
        }
    }

    /// The canonical kind; every compound variant is a `Value` error
    pub fn kind(&self) -> ErrorKind {
        match self {
            XlError::Null(_) => ErrorKind::Null,
            XlError::DivZero(_) => ErrorKind::DivZero,
            XlError::Value(_)
            | XlError::Number(_)
            | XlError::Integer(_)
            | XlError::Text(_)
            | XlError::Range(_)
            | XlError::Blank(_) => ErrorKind::Value,
            XlError::Ref(_) => ErrorKind::Ref,
            XlError::Name(_) => ErrorKind::Name,
            XlError::Num(_) => ErrorKind::Num,
            XlError::Na(_) => ErrorKind::Na,
        }
    }

    /// The display code, e.g. `#VALUE!`
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// Diagnostic text, if any
    pub fn info(&self) -> Option<Cow<'_, str>> {
        match self {
            XlError::Null(info)
            | XlError::DivZero(info)
            | XlError::Value(info)
            | XlError::Ref(info)
            | XlError::Name(info)
            | XlError::Num(info)
            | XlError::Na(info) => info.as_deref().map(Cow::Borrowed),
            XlError::Number(m)
            | XlError::Integer(m)
            | XlError::Text(m)
            | XlError::Range(m)
            | XlError::Blank(m) => Some(Cow::Owned(m.to_string())),
        }
    }

    /// The failed coercion behind a compound error
    pub fn mismatch_details(&self) -> Option<&TypeMismatch> {
        match self {
            XlError::Number(m)
            | XlError::Integer(m)
            | XlError::Text(m)
            | XlError::Range(m)
            | XlError::Blank(m) => Some(m),
            _ => None,
        }
    }
}

impl From<ErrorKind> for XlError {
    fn from(kind: ErrorKind) -> Self {
        Self::with_info(kind, None)
    }
}

// Legacy evaluators test errors by comparing against the code string.
impl PartialEq<str> for XlError {
    fn eq(&self, other: &str) -> bool {
        self.code() == other
    }
}

impl PartialEq<&str> for XlError {
    fn eq(&self, other: &&str) -> bool {
        self.code() == *other
    }
}

impl PartialEq<XlError> for &str {
    fn eq(&self, other: &XlError) -> bool {
        *self == other.code()
    }
}
