//! # xlcalc
//!
//! The value model of a spreadsheet formula language.
//!
//! xlcalc provides the runtime semantics a formula evaluator computes with,
//! independent of any parser or workbook format.
//!
//! ## Features
//!
//! - Seven value kinds with spreadsheet coercion and comparison rules
//! - Error values (`#VALUE!`, `#DIV/0!`, `#N/A`, ...) that flow through calculations
//! - 1900-system date serials and year fractions for all five day-count bases
//! - Declared parameter schemas that bind and coerce function arguments
//! - A registry of built-in functions, extensible at start-up
//! - Excel and Python (numpy-financial) compatibility modes
//!
//! ## Example
//!
//! ```rust
//! use xlcalc::prelude::*;
//!
//! // Values coerce the way a spreadsheet does
//! let total = Value::from("40") + Value::from(2);
//! assert_eq!(total, Value::from(42));
//!
//! // Functions are looked up by name, case-insensitively
//! let rounded = call_function("round", Call::new().arg(2.675).arg(2)).unwrap();
//! assert_eq!(rounded, Value::from(2.68));
//!
//! // Bad arguments produce error values, not failures
//! let bad = call_function("SQRT", [Value::from(-1)]).unwrap();
//! assert_eq!(bad.as_error().map(XlError::kind), Some(ErrorKind::Num));
//! ```

pub mod prelude;

use log::debug;

// Re-export the value model
pub use xlcalc_core::{
    date,
    flatten,
    flatten_nested,
    ArithOp,
    Array,
    Basis,
    CompareOp,
    DateTime,
    ErrorKind,
    ExpectedKind,
    Nested,
    Number,
    SharedString,
    TypeMismatch,
    Value,
    XlError,
    XlResult,
    CELL_CHARACTER_LIMIT,
    MAX_FLATTEN_DEPTH,
};

// Re-export the function layer
pub use xlcalc_formula::{
    compatibility,
    functions,
    init,
    init_with,
    parse_criteria,
    registry,
    set_compatibility,
    Args,
    Call,
    Compatibility,
    Criteria,
    EvaluationContext,
    FormulaError,
    FormulaResult,
    FunctionDef,
    FunctionImpl,
    FunctionRegistry,
    Kind,
    Param,
    ParamDefault,
    ParamType,
    Signature,
};

/// Call a built-in function through the process-wide registry
///
/// The registry is initialised with the built-ins on first use, and the call
/// runs in a fresh [`EvaluationContext`].
pub fn call_function(name: &str, call: impl Into<Call>) -> FormulaResult<Value> {
    debug!("calling {name}");
    init().call(name, call, &EvaluationContext::new())
}
