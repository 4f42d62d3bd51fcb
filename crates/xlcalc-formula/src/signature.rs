//! Argument validation
//!
//! Every function declares a [`Signature`]: an ordered list of parameters,
//! each with a name, a declared type, and whether it is required, defaulted,
//! or variadic. Calling a function first binds the call-site arguments to the
//! parameters (a mismatch here is a [`FormulaError`] fault), then coerces each
//! bound argument to its declared type (a failure here is a spreadsheet error
//! returned in place of the result).

use log::trace;

use xlcalc_core::{
    Array, DateTime, ExpectedKind, Number, SharedString, Value, XlError, XlResult,
};

use crate::error::{FormulaError, FormulaResult};

/// A value kind a parameter can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Number,
    /// A number truncated toward zero
    Integer,
    Text,
    Boolean,
    DateTime,
    /// An array (range) argument
    Range,
    /// A blank or empty text
    Blank,
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Number => "number",
            Kind::Integer => "integer",
            Kind::Text => "text",
            Kind::Boolean => "boolean",
            Kind::DateTime => "datetime",
            Kind::Range => "range",
            Kind::Blank => "blank",
        }
    }

    /// Coerce `value` to this kind
    ///
    /// Error values pass through unchanged. Failed coercions to number,
    /// integer, text, range and blank produce the matching compound
    /// `#VALUE!` error.
    pub fn coerce(&self, value: &Value, field: &str) -> XlResult<Value> {
        if let Value::Error(e) = value {
            return Err(e.clone());
        }
        match self {
            Kind::Number => value
                .as_number()
                .map(Value::Number)
                .map_err(|_| value.mismatch(field, ExpectedKind::Number)),
            Kind::Integer => value
                .as_number()
                .ok()
                .and_then(|n| n.trunc())
                .map(|n| Value::Number(Number::Int(n)))
                .ok_or_else(|| value.mismatch(field, ExpectedKind::Integer)),
            Kind::Text => value
                .as_text()
                .map(Value::Text)
                .map_err(|_| value.mismatch(field, ExpectedKind::Text)),
            Kind::Boolean => value.as_boolean().map(Value::Boolean),
            Kind::DateTime => value.as_datetime().map(Value::DateTime),
            Kind::Range => match value {
                Value::Array(_) => Ok(value.clone()),
                _ => Err(value.mismatch(field, ExpectedKind::Range)),
            },
            Kind::Blank => match value {
                Value::Blank => Ok(Value::Blank),
                Value::Text(s) if s.is_empty() => Ok(Value::Blank),
                _ => Err(value.mismatch(field, ExpectedKind::Blank)),
            },
        }
    }
}

/// The declared type of a parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// No coercion
    Any,
    Kind(Kind),
    /// Coerce every cell of an array (or a lone scalar) to the kind
    ListOf(Kind),
    /// Try each kind in order, keeping the first that succeeds
    Union(Vec<Kind>),
}

impl ParamType {
    pub fn coerce(&self, value: &Value, field: &str) -> XlResult<Value> {
        match self {
            ParamType::Any => Ok(value.clone()),
            ParamType::Kind(kind) => kind.coerce(value, field),
            ParamType::ListOf(kind) => match value {
                Value::Array(array) => {
                    let rows = array
                        .iter_rows()
                        .map(|row| {
                            row.iter()
                                .map(|cell| kind.coerce(cell, field))
                                .collect::<XlResult<Vec<_>>>()
                        })
                        .collect::<XlResult<Vec<_>>>()?;
                    Array::from_rows(rows).map(Value::Array)
                }
                scalar => kind.coerce(scalar, field),
            },
            ParamType::Union(kinds) => {
                if let Value::Error(e) = value {
                    return Err(e.clone());
                }
                if let Some(coerced) = kinds.iter().find_map(|k| k.coerce(value, field).ok()) {
                    return Ok(coerced);
                }
                let first = kinds.first().map_or("a value", Kind::name);
                Err(XlError::value(format!(
                    "`{field}` \"{value}\" must be {first}. Got: {}",
                    value.type_name()
                )))
            }
        }
    }
}

impl From<Kind> for ParamType {
    fn from(kind: Kind) -> Self {
        ParamType::Kind(kind)
    }
}

/// How an omitted argument is filled in
#[derive(Debug, Clone, PartialEq)]
pub enum ParamDefault {
    Required,
    /// Optional; the argument reads as this value when omitted
    Value(Value),
    /// Optional; the argument reads as absent when omitted
    Omitted,
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: &'static str,
    pub ty: ParamType,
    pub variadic: bool,
    pub default: ParamDefault,
}

/// An ordered parameter list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, param: Param) -> Self {
        debug_assert!(
            !self.params.iter().any(|p| p.variadic),
            "the variadic parameter must come last"
        );
        self.params.push(param);
        self
    }

    pub fn required(self, name: &'static str, ty: impl Into<ParamType>) -> Self {
        self.push(Param {
            name,
            ty: ty.into(),
            variadic: false,
            default: ParamDefault::Required,
        })
    }

    pub fn optional(
        self,
        name: &'static str,
        ty: impl Into<ParamType>,
        default: impl Into<Value>,
    ) -> Self {
        self.push(Param {
            name,
            ty: ty.into(),
            variadic: false,
            default: ParamDefault::Value(default.into()),
        })
    }

    /// An optional parameter with no default value
    pub fn omittable(self, name: &'static str, ty: impl Into<ParamType>) -> Self {
        self.push(Param {
            name,
            ty: ty.into(),
            variadic: false,
            default: ParamDefault::Omitted,
        })
    }

    /// Collect all remaining positional arguments
    pub fn variadic(self, name: &'static str, ty: impl Into<ParamType>) -> Self {
        self.push(Param {
            name,
            ty: ty.into(),
            variadic: true,
            default: ParamDefault::Omitted,
        })
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    fn arity(&self) -> String {
        let required = self
            .params
            .iter()
            .filter(|p| !p.variadic && p.default == ParamDefault::Required)
            .count();
        let fixed = self.params.iter().filter(|p| !p.variadic).count();
        if self.params.iter().any(|p| p.variadic) {
            format!("at least {required}")
        } else if required == fixed {
            format!("{fixed}")
        } else {
            format!("{required} to {fixed}")
        }
    }

    /// Bind call-site arguments to parameters
    ///
    /// Defaults are filled in for omitted optional parameters; they are not
    /// coerced.
    pub fn bind(&self, function: &str, call: Call) -> FormulaResult<Args> {
        let mut slots: Vec<Slot> = self
            .params
            .iter()
            .map(|p| if p.variadic { Slot::Many(Vec::new()) } else { Slot::Unset })
            .collect();

        let supplied = call.positional.len();
        for (index, value) in call.positional.into_iter().enumerate() {
            let slot = match self.params.get(index) {
                Some(p) if !p.variadic => &mut slots[index],
                _ => match self.params.iter().position(|p| p.variadic) {
                    Some(variadic) => &mut slots[variadic],
                    None => {
                        return Err(FormulaError::ArgumentCount {
                            function: function.to_string(),
                            expected: self.arity(),
                            actual: supplied,
                        })
                    }
                },
            };
            match slot {
                Slot::Many(values) => values.push(value),
                other => *other = Slot::One(value),
            }
        }

        for (name, value) in call.named {
            let index = self
                .params
                .iter()
                .position(|p| !p.variadic && p.name.eq_ignore_ascii_case(&name))
                .ok_or_else(|| FormulaError::UnknownArgument {
                    function: function.to_string(),
                    name: name.clone(),
                })?;
            if !matches!(slots[index], Slot::Unset) {
                return Err(FormulaError::DuplicateArgument {
                    function: function.to_string(),
                    name,
                });
            }
            slots[index] = Slot::One(value);
        }

        for (param, slot) in self.params.iter().zip(slots.iter_mut()) {
            if !matches!(slot, Slot::Unset) {
                continue;
            }
            *slot = match &param.default {
                ParamDefault::Required => {
                    return Err(FormulaError::MissingArgument {
                        function: function.to_string(),
                        name: param.name.to_string(),
                    })
                }
                ParamDefault::Value(default) => Slot::Default(default.clone()),
                ParamDefault::Omitted => Slot::Unset,
            };
        }

        Ok(Args {
            names: self.params.iter().map(|p| p.name).collect(),
            slots,
        })
    }

    /// Coerce every supplied argument to its declared type
    ///
    /// The first failure is returned as the call's result value.
    pub fn coerce(&self, function: &str, args: Args) -> XlResult<Args> {
        let Args { names, slots } = args;
        let slots = self
            .params
            .iter()
            .zip(slots)
            .map(|(param, slot)| {
                let coerce = |value: &Value| {
                    param.ty.coerce(value, param.name).map_err(|e| {
                        trace!("{function}: `{}` rejected with {e}", param.name);
                        e
                    })
                };
                Ok(match slot {
                    Slot::One(value) => Slot::One(coerce(&value)?),
                    Slot::Many(values) => Slot::Many(
                        values.iter().map(coerce).collect::<XlResult<Vec<_>>>()?,
                    ),
                    defaulted => defaulted,
                })
            })
            .collect::<XlResult<Vec<_>>>()?;
        Ok(Args { names, slots })
    }
}

/// Call-site arguments, as handed over by an evaluator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Call {
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
}

impl Call {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append a named argument
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }
}

impl From<Vec<Value>> for Call {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            named: Vec::new(),
        }
    }
}

impl<const N: usize> From<[Value; N]> for Call {
    fn from(positional: [Value; N]) -> Self {
        Self::from(Vec::from(positional))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Unset,
    One(Value),
    Default(Value),
    Many(Vec<Value>),
}

static BLANK: Value = Value::Blank;

/// Arguments bound to a signature
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    names: Vec<&'static str>,
    slots: Vec<Slot>,
}

impl Args {
    fn slot(&self, name: &str) -> Option<&Slot> {
        self.names
            .iter()
            .position(|n| *n == name)
            .and_then(|i| self.slots.get(i))
    }

    /// The argument for `name`, or its default; `None` when omitted
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.slot(name)? {
            Slot::One(value) | Slot::Default(value) => Some(value),
            Slot::Unset | Slot::Many(_) => None,
        }
    }

    /// Was an argument actually supplied for `name`?
    pub fn is_supplied(&self, name: &str) -> bool {
        match self.slot(name) {
            Some(Slot::One(_)) => true,
            Some(Slot::Many(values)) => !values.is_empty(),
            _ => false,
        }
    }

    /// The argument for `name`; omitted arguments read as blank
    pub fn value(&self, name: &str) -> &Value {
        self.get(name).unwrap_or(&BLANK)
    }

    /// The arguments collected by a variadic parameter
    pub fn rest(&self, name: &str) -> &[Value] {
        match self.slot(name) {
            Some(Slot::Many(values)) => values,
            _ => &[],
        }
    }

    pub fn number(&self, name: &str) -> XlResult<Number> {
        self.value(name).as_number()
    }

    pub fn f64(&self, name: &str) -> XlResult<f64> {
        self.value(name).as_f64()
    }

    pub fn integer(&self, name: &str) -> XlResult<i64> {
        let value = self.value(name);
        value
            .as_number()?
            .trunc()
            .ok_or_else(|| value.mismatch(name, ExpectedKind::Integer))
    }

    pub fn text(&self, name: &str) -> XlResult<SharedString> {
        self.value(name).as_text()
    }

    pub fn boolean(&self, name: &str) -> XlResult<bool> {
        self.value(name).as_boolean()
    }

    pub fn datetime(&self, name: &str) -> XlResult<DateTime> {
        self.value(name).as_datetime()
    }

    pub fn array(&self, name: &str) -> XlResult<&Array> {
        let value = self.value(name);
        value
            .as_array()
            .ok_or_else(|| value.mismatch(name, ExpectedKind::Range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xlcalc_core::ErrorKind;

    fn validate(signature: &Signature, call: Call) -> FormulaResult<XlResult<Args>> {
        let args = signature.bind("TEST", call)?;
        Ok(signature.coerce("TEST", args))
    }

    #[test]
    fn test_number_param_coerces_text() {
        let sig = Signature::new().required("number", Kind::Number);
        let args = validate(&sig, Call::new().arg("1.1")).unwrap().unwrap();
        assert_eq!(args.value("number"), &Value::from(1.1));
    }

    #[test]
    fn test_number_param_rejects_bad_text() {
        let sig = Signature::new().required("number", Kind::Number);
        let err = validate(&sig, Call::new().arg("bad")).unwrap().unwrap_err();
        assert!(matches!(err, XlError::Number(_)));
        assert_eq!(err.to_string(), "#VALUE!");
    }

    #[test]
    fn test_integer_param_truncates() {
        let sig = Signature::new().required("n", Kind::Integer);
        let args = validate(&sig, Call::new().arg("2.9")).unwrap().unwrap();
        assert_eq!(args.integer("n").unwrap(), 2);
        assert!(matches!(args.value("n"), Value::Number(Number::Int(2))));

        let err = validate(&sig, Call::new().arg("bad")).unwrap().unwrap_err();
        assert!(matches!(err, XlError::Integer(_)));
    }

    #[test]
    fn test_range_and_blank_params() {
        let sig = Signature::new()
            .required("values", Kind::Range)
            .required("empty", Kind::Blank);
        let array = Array::row([1, 2]).unwrap();
        let args = validate(&sig, Call::new().arg(array.clone()).arg(""))
            .unwrap()
            .unwrap();
        assert_eq!(args.array("values").unwrap(), &array);
        assert_eq!(args.value("empty"), &Value::Blank);

        let err = validate(&sig, Call::new().arg(1).arg(Value::Blank))
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, XlError::Range(_)));
        let err = validate(&sig, Call::new().arg(array).arg("x"))
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, XlError::Blank(_)));
    }

    #[test]
    fn test_error_arguments_propagate() {
        let sig = Signature::new().required("number", Kind::Number);
        let err = validate(&sig, Call::new().arg(ErrorKind::Na)).unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Na);
    }

    #[test]
    fn test_untyped_param_passes_through() {
        let sig = Signature::new().required("anything", ParamType::Any);
        let args = validate(&sig, Call::new().arg("bad")).unwrap().unwrap();
        assert_eq!(args.value("anything"), &Value::from("bad"));
    }

    #[test]
    fn test_union_first_success_wins() {
        let sig = Signature::new().required(
            "x",
            ParamType::Union(vec![Kind::Range, Kind::Number, Kind::Text]),
        );
        let args = validate(&sig, Call::new().arg("2")).unwrap().unwrap();
        assert_eq!(args.value("x"), &Value::from(2));
        let args = validate(&sig, Call::new().arg("data")).unwrap().unwrap();
        assert_eq!(args.value("x"), &Value::from("data"));
    }

    #[test]
    fn test_union_failure_names_first_alternative() {
        let sig = Signature::new().required(
            "x",
            ParamType::Union(vec![Kind::Number, Kind::Boolean]),
        );
        let err = validate(&sig, Call::new().arg("data")).unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(
            err.info().as_deref(),
            Some("`x` \"data\" must be number. Got: text")
        );
    }

    #[test]
    fn test_variadic_list_coerces_each_element() {
        let sig = Signature::new()
            .required("rate", Kind::Number)
            .variadic("values", ParamType::ListOf(Kind::Number));
        let call = Call::new()
            .arg(0.1)
            .arg("1")
            .arg(Array::row(["2", "3"]).unwrap());
        let args = validate(&sig, call).unwrap().unwrap();
        assert_eq!(args.rest("values").len(), 2);
        assert_eq!(args.rest("values")[0], Value::from(1));
        assert_eq!(
            args.rest("values")[1],
            Value::from(Array::row([2, 3]).unwrap())
        );

        let call = Call::new().arg(0.1).arg(Array::row(["2", "x"]).unwrap());
        let err = validate(&sig, call).unwrap().unwrap_err();
        assert!(matches!(err, XlError::Number(_)));
    }

    #[test]
    fn test_defaults() {
        let sig = Signature::new()
            .required("text", Kind::Text)
            .optional("num_chars", Kind::Integer, 1)
            .omittable("extra", Kind::Number);
        let args = validate(&sig, Call::new().arg("abc")).unwrap().unwrap();
        assert_eq!(args.integer("num_chars").unwrap(), 1);
        assert!(!args.is_supplied("num_chars"));
        assert_eq!(args.get("extra"), None);
        assert_eq!(args.value("extra"), &Value::Blank);
    }

    #[test]
    fn test_named_arguments() {
        let sig = Signature::new()
            .required("pv", Kind::Number)
            .optional("type", Kind::Integer, 0);
        let args = validate(&sig, Call::new().arg(1).named("type", "1"))
            .unwrap()
            .unwrap();
        assert_eq!(args.integer("type").unwrap(), 1);
        assert!(args.is_supplied("type"));
    }

    #[test]
    fn test_binding_faults() {
        let sig = Signature::new()
            .required("a", Kind::Number)
            .optional("b", Kind::Number, 0);

        let err = sig.bind("F", Call::new()).unwrap_err();
        assert!(matches!(err, FormulaError::MissingArgument { .. }));

        let err = sig.bind("F", Call::new().arg(1).arg(2).arg(3)).unwrap_err();
        assert_eq!(
            err,
            FormulaError::ArgumentCount {
                function: "F".into(),
                expected: "1 to 2".into(),
                actual: 3
            }
        );

        let err = sig.bind("F", Call::new().arg(1).named("c", 2)).unwrap_err();
        assert!(matches!(err, FormulaError::UnknownArgument { .. }));

        let err = sig.bind("F", Call::new().arg(1).named("a", 2)).unwrap_err();
        assert!(matches!(err, FormulaError::DuplicateArgument { .. }));
    }
}
