//! Formula faults
//!
//! These are contract violations by the caller, not spreadsheet errors.
//! Spreadsheet errors travel as [`Value::Error`](xlcalc_core::Value::Error)
//! inside an `Ok` result.

use thiserror::Error;

/// Result type for function lookup and invocation
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Faults raised while calling a formula function
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// A feature the function declares but does not support
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// A named argument that matches no parameter
    #[error("{function} has no parameter named `{name}`")]
    UnknownArgument { function: String, name: String },

    /// A parameter supplied both positionally and by name, or twice by name
    #[error("{function} got multiple values for `{name}`")]
    DuplicateArgument { function: String, name: String },

    /// A required parameter with no argument
    #[error("{function} is missing required argument `{name}`")]
    MissingArgument { function: String, name: String },
}
