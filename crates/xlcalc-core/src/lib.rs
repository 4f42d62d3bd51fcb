//! # xlcalc-core
//!
//! The value model of the xlcalc spreadsheet formula library.
//!
//! This crate provides the types every formula function computes with:
//! - [`Value`] - The closed set of value kinds and their coercions
//! - [`XlError`] and [`ErrorKind`] - Spreadsheet error values (`#VALUE!`, `#DIV/0!`, ...)
//! - [`date`] - Date serial encoding, decoding and year fractions
//! - [`flatten`](flatten::flatten) - Depth-first argument flattening
//!
//! ## Example
//!
//! ```rust
//! use xlcalc_core::{CompareOp, Value};
//!
//! let sum = Value::from("1") + Value::from(2);
//! assert_eq!(sum, Value::from(3));
//!
//! // A blank stands in for the neutral value of the other operand
//! let blank_is_zero = Value::Blank.compare_with(CompareOp::Eq, &Value::from(0));
//! assert_eq!(blank_is_zero, Value::from(true));
//!
//! // Errors are values; they display as their code
//! let quotient = Value::from(1) / Value::from(0);
//! assert_eq!(quotient.to_string(), "#DIV/0!");
//! ```

pub mod date;
pub mod error;
pub mod flatten;
pub mod value;

pub use date::Basis;
pub use error::{ErrorKind, ExpectedKind, TypeMismatch, XlError, XlResult};
pub use flatten::{flatten, flatten_nested, Nested, MAX_FLATTEN_DEPTH};
pub use value::{ArithOp, Array, CompareOp, DateTime, Number, SharedString, Value};

/// Maximum number of characters a cell can hold (Excel limit)
pub const CELL_CHARACTER_LIMIT: usize = 32_767;
