//! Prelude module - common imports for xlcalc users
//!
//! ```rust
//! use xlcalc::prelude::*;
//! ```

pub use crate::{
    // Function calls
    call_function,
    Args,
    Array,
    Call,
    // Compatibility mode
    Compatibility,
    DateTime,
    // Error types
    ErrorKind,
    EvaluationContext,
    FormulaError,
    FormulaResult,
    FunctionRegistry,
    Number,
    // Value types
    Value,
    XlError,
    XlResult,
};
