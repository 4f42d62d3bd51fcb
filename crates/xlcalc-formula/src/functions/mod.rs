//! Built-in functions and the function registry

pub mod criteria;
pub mod date;
pub mod financial;
pub mod logical;
pub mod lookup;
pub mod math;
pub mod operator;
pub mod statistical;
pub mod text;

use std::ops::Index;
use std::sync::OnceLock;

use ahash::AHashMap;
use log::debug;

use xlcalc_core::Value;

use crate::context::EvaluationContext;
use crate::error::{FormulaError, FormulaResult};
use crate::signature::{Args, Call, Kind, ParamType, Signature};

/// Function implementation signature
///
/// Bodies receive arguments already bound and coerced to the function's
/// [`Signature`]. Data errors are returned as `Ok(Value::Error(..))`.
pub type FunctionImpl = fn(&Args, &EvaluationContext) -> FormulaResult<Value>;

/// Function definition
#[derive(Clone)]
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Declared parameters
    pub signature: Signature,
    /// Implementation
    pub implementation: FunctionImpl,
    /// Is volatile (result depends on more than the arguments)
    pub volatile: bool,
}

impl FunctionDef {
    /// Validate `call` against the signature and run the body
    ///
    /// Binding faults are returned as `Err`; a failed coercion becomes the
    /// result value without running the body.
    pub fn call(&self, call: Call, ctx: &EvaluationContext) -> FormulaResult<Value> {
        let args = self.signature.bind(self.name, call)?;
        match self.signature.coerce(self.name, args) {
            Ok(args) => (self.implementation)(&args, ctx),
            Err(e) => Ok(Value::Error(e)),
        }
    }
}

/// Function registry
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register_date_functions();
        registry.register_math_functions();
        registry.register_statistical_functions();
        registry.register_logical_functions();
        registry.register_lookup_functions();
        registry.register_text_functions();
        registry.register_financial_functions();
        registry.register_operator_functions();

        registry
    }

    /// Create a registry with no functions
    pub fn empty() -> Self {
        Self {
            functions: AHashMap::new(),
        }
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Look up a function by name, failing for unknown names
    pub fn lookup(&self, name: &str) -> FormulaResult<&FunctionDef> {
        self.get(name)
            .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Register a function under its own name
    ///
    /// Re-registering a name replaces the previous entry.
    pub fn register(&mut self, def: FunctionDef) {
        let name = def.name;
        self.register_as(name, def);
    }

    /// Register a function under an alternative name
    pub fn register_as(&mut self, name: &str, def: FunctionDef) {
        let key = name.to_uppercase();
        if self.functions.insert(key.clone(), def).is_some() {
            debug!("function {key} re-registered, previous entry replaced");
        } else {
            debug!("function {key} registered");
        }
    }

    /// Call a function by name
    pub fn call(
        &self,
        name: &str,
        call: impl Into<Call>,
        ctx: &EvaluationContext,
    ) -> FormulaResult<Value> {
        self.lookup(name)?.call(call.into(), ctx)
    }

    fn register_date_functions(&mut self) {
        // DATE
        self.register(FunctionDef {
            name: "DATE",
            signature: Signature::new()
                .required("year", Kind::Integer)
                .required("month", Kind::Integer)
                .required("day", Kind::Integer),
            implementation: date::fn_date,
            volatile: false,
        });

        // YEAR
        self.register(FunctionDef {
            name: "YEAR",
            signature: Signature::new().required("serial_number", Kind::DateTime),
            implementation: date::fn_year,
            volatile: false,
        });

        // MONTH
        self.register(FunctionDef {
            name: "MONTH",
            signature: Signature::new().required("serial_number", Kind::DateTime),
            implementation: date::fn_month,
            volatile: false,
        });

        // DAY
        self.register(FunctionDef {
            name: "DAY",
            signature: Signature::new().required("serial_number", Kind::DateTime),
            implementation: date::fn_day,
            volatile: false,
        });

        // TODAY (volatile)
        self.register(FunctionDef {
            name: "TODAY",
            signature: Signature::new(),
            implementation: date::fn_today,
            volatile: true,
        });

        // YEARFRAC
        self.register(FunctionDef {
            name: "YEARFRAC",
            signature: Signature::new()
                .required("start_date", Kind::Number)
                .required("end_date", Kind::Number)
                .optional("basis", Kind::Integer, 0),
            implementation: date::fn_yearfrac,
            volatile: false,
        });
    }

    fn register_math_functions(&mut self) {
        // ABS
        self.register(FunctionDef {
            name: "ABS",
            signature: Signature::new().required("number", Kind::Number),
            implementation: math::fn_abs,
            volatile: false,
        });

        // LN
        self.register(FunctionDef {
            name: "LN",
            signature: Signature::new().required("number", Kind::Number),
            implementation: math::fn_ln,
            volatile: false,
        });

        // MOD
        self.register(FunctionDef {
            name: "MOD",
            signature: Signature::new()
                .required("number", Kind::Integer)
                .required("divisor", Kind::Integer),
            implementation: math::fn_mod,
            volatile: false,
        });

        // PI
        self.register(FunctionDef {
            name: "PI",
            signature: Signature::new(),
            implementation: math::fn_pi,
            volatile: false,
        });

        // POWER
        self.register(FunctionDef {
            name: "POWER",
            signature: Signature::new()
                .required("number", Kind::Number)
                .required("power", Kind::Number),
            implementation: math::fn_power,
            volatile: false,
        });

        // ROUND
        self.register(FunctionDef {
            name: "ROUND",
            signature: rounding_signature(),
            implementation: math::fn_round,
            volatile: false,
        });

        // ROUNDUP
        self.register(FunctionDef {
            name: "ROUNDUP",
            signature: rounding_signature(),
            implementation: math::fn_roundup,
            volatile: false,
        });

        // ROUNDDOWN
        self.register(FunctionDef {
            name: "ROUNDDOWN",
            signature: rounding_signature(),
            implementation: math::fn_rounddown,
            volatile: false,
        });

        // SQRT
        self.register(FunctionDef {
            name: "SQRT",
            signature: Signature::new().required("number", Kind::Number),
            implementation: math::fn_sqrt,
            volatile: false,
        });

        // SUM
        self.register(FunctionDef {
            name: "SUM",
            signature: Signature::new().variadic("numbers", ParamType::Any),
            implementation: math::fn_sum,
            volatile: false,
        });

        // SUMIF
        self.register(FunctionDef {
            name: "SUMIF",
            signature: Signature::new()
                .required("range", Kind::Range)
                .required("criteria", ParamType::Any)
                .omittable("sum_range", Kind::Range),
            implementation: math::fn_sumif,
            volatile: false,
        });

        // SUMPRODUCT
        self.register(FunctionDef {
            name: "SUMPRODUCT",
            signature: Signature::new()
                .variadic("arrays", ParamType::Union(vec![Kind::Range, Kind::Number])),
            implementation: math::fn_sumproduct,
            volatile: false,
        });

        // TRUNC
        self.register(FunctionDef {
            name: "TRUNC",
            signature: rounding_signature(),
            implementation: math::fn_trunc,
            volatile: false,
        });
    }

    fn register_statistical_functions(&mut self) {
        // AVERAGE
        self.register(FunctionDef {
            name: "AVERAGE",
            signature: Signature::new().variadic("numbers", ParamType::Any),
            implementation: statistical::fn_average,
            volatile: false,
        });

        // COUNT
        self.register(FunctionDef {
            name: "COUNT",
            signature: Signature::new().variadic("values", ParamType::Any),
            implementation: statistical::fn_count,
            volatile: false,
        });

        // COUNTA
        self.register(FunctionDef {
            name: "COUNTA",
            signature: Signature::new().variadic("values", ParamType::Any),
            implementation: statistical::fn_counta,
            volatile: false,
        });

        // MAX
        self.register(FunctionDef {
            name: "MAX",
            signature: Signature::new().variadic("numbers", ParamType::Any),
            implementation: statistical::fn_max,
            volatile: false,
        });

        // MIN
        self.register(FunctionDef {
            name: "MIN",
            signature: Signature::new().variadic("numbers", ParamType::Any),
            implementation: statistical::fn_min,
            volatile: false,
        });
    }

    fn register_logical_functions(&mut self) {
        // AND
        self.register(FunctionDef {
            name: "AND",
            signature: Signature::new().variadic("logicals", ParamType::Any),
            implementation: logical::fn_and,
            volatile: false,
        });

        // OR
        self.register(FunctionDef {
            name: "OR",
            signature: Signature::new().variadic("logicals", ParamType::Any),
            implementation: logical::fn_or,
            volatile: false,
        });

        // IF
        self.register(FunctionDef {
            name: "IF",
            signature: Signature::new()
                .required("logical_test", Kind::Boolean)
                .required("value_if_true", ParamType::Any)
                .optional("value_if_false", ParamType::Any, false),
            implementation: logical::fn_if,
            volatile: false,
        });
    }

    fn register_lookup_functions(&mut self) {
        // CHOOSE
        self.register(FunctionDef {
            name: "CHOOSE",
            signature: Signature::new()
                .required("index_num", Kind::Integer)
                .variadic("values", ParamType::Any),
            implementation: lookup::fn_choose,
            volatile: false,
        });

        // VLOOKUP
        self.register(FunctionDef {
            name: "VLOOKUP",
            signature: Signature::new()
                .required("lookup_value", ParamType::Any)
                .required("table_array", Kind::Range)
                .required("col_index_num", Kind::Integer)
                .optional("range_lookup", Kind::Boolean, false),
            implementation: lookup::fn_vlookup,
            volatile: false,
        });
    }

    fn register_text_functions(&mut self) {
        // CONCAT
        self.register(FunctionDef {
            name: "CONCAT",
            signature: Signature::new().variadic("texts", ParamType::Any),
            implementation: text::fn_concat,
            volatile: false,
        });

        // MID
        self.register(FunctionDef {
            name: "MID",
            signature: Signature::new()
                .required("text", Kind::Text)
                .required("start_num", Kind::Integer)
                .required("num_chars", Kind::Integer),
            implementation: text::fn_mid,
            volatile: false,
        });

        // RIGHT
        self.register(FunctionDef {
            name: "RIGHT",
            signature: Signature::new()
                .required("text", Kind::Text)
                .optional("num_chars", Kind::Integer, 1),
            implementation: text::fn_right,
            volatile: false,
        });
    }

    fn register_financial_functions(&mut self) {
        // IRR
        self.register(FunctionDef {
            name: "IRR",
            signature: Signature::new()
                .required("values", Kind::Range)
                .omittable("guess", Kind::Number),
            implementation: financial::fn_irr,
            volatile: false,
        });

        // NPV
        self.register(FunctionDef {
            name: "NPV",
            signature: Signature::new()
                .required("rate", Kind::Number)
                .variadic("values", ParamType::Any),
            implementation: financial::fn_npv,
            volatile: false,
        });

        // PMT
        self.register(FunctionDef {
            name: "PMT",
            signature: Signature::new()
                .required("rate", Kind::Number)
                .required("nper", Kind::Number)
                .required("pv", Kind::Number)
                .optional("fv", Kind::Number, 0)
                .optional("type", Kind::Integer, 0),
            implementation: financial::fn_pmt,
            volatile: false,
        });

        // SLN
        self.register(FunctionDef {
            name: "SLN",
            signature: Signature::new()
                .required("cost", Kind::Number)
                .required("salvage", Kind::Number)
                .required("life", Kind::Number),
            implementation: financial::fn_sln,
            volatile: false,
        });

        // XNPV
        self.register(FunctionDef {
            name: "XNPV",
            signature: Signature::new()
                .required("rate", Kind::Number)
                .required("values", Kind::Range)
                .required("dates", Kind::Range),
            implementation: financial::fn_xnpv,
            volatile: false,
        });
    }

    fn register_operator_functions(&mut self) {
        for (name, implementation) in operator::BINARY_OPERATORS {
            self.register(FunctionDef {
                name,
                signature: Signature::new()
                    .required("left", ParamType::Any)
                    .required("right", ParamType::Any),
                implementation,
                volatile: false,
            });
        }

        for (name, implementation) in operator::UNARY_OPERATORS {
            self.register(FunctionDef {
                name,
                signature: Signature::new().required("operand", ParamType::Any),
                implementation,
                volatile: false,
            });
        }
    }
}

/// `(number, num_digits = 0)`, shared by the rounding functions
fn rounding_signature() -> Signature {
    Signature::new()
        .required("number", Kind::Number)
        .optional("num_digits", Kind::Integer, 0)
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<&str> for FunctionRegistry {
    type Output = FunctionDef;

    /// Panics for unknown names; use [`FunctionRegistry::lookup`] to handle them
    fn index(&self, name: &str) -> &FunctionDef {
        match self.get(name) {
            Some(def) => def,
            None => panic!("unknown function: {name}"),
        }
    }
}

static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// Initialize the process-wide registry with the built-in functions
///
/// Idempotent; later calls return the registry built by the first.
pub fn init() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Install a custom registry as the process-wide one
///
/// Fails, handing the registry back, when one is already installed.
pub fn init_with(registry: FunctionRegistry) -> Result<(), FunctionRegistry> {
    FUNCTION_REGISTRY.set(registry)
}

/// The process-wide registry, initializing it on first use
pub fn registry() -> &'static FunctionRegistry {
    init()
}
