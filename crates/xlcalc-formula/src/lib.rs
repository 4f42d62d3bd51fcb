//! # xlcalc-formula
//!
//! The function-facing half of xlcalc.
//!
//! This crate provides:
//! - Argument validation: declared parameter schemas that bind and coerce call-site arguments
//! - Criteria parsing for conditional aggregation (`">=1"`, `"a*"`, ...)
//! - The function registry and its process-wide instance
//! - Built-in functions (date, math, statistics, logic, lookup, text, financial, operators)
//! - The evaluation context and the Excel/Python compatibility mode
//!
//! ## Example
//!
//! ```rust
//! use xlcalc_core::{Array, Value};
//! use xlcalc_formula::{init, Call, EvaluationContext};
//!
//! let registry = init();
//! let call = Call::new()
//!     .arg(Array::row([0, 1, 2]).unwrap())
//!     .arg(">=1")
//!     .arg(Array::row([10, 20, 30]).unwrap());
//! let total = registry.call("SUMIF", call, &EvaluationContext::new()).unwrap();
//! assert_eq!(total, Value::from(50));
//! ```

pub mod context;
pub mod error;
pub mod functions;
pub mod signature;

pub use context::{compatibility, set_compatibility, Compatibility, EvaluationContext};
pub use error::{FormulaError, FormulaResult};
pub use functions::criteria::{parse_criteria, Criteria};
pub use functions::{init, init_with, registry, FunctionDef, FunctionImpl, FunctionRegistry};
pub use signature::{Args, Call, Kind, Param, ParamDefault, ParamType, Signature};
