//! Statistical functions

use xlcalc_core::{flatten, Number, Value, XlError, XlResult};

use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::signature::Args;

/// Most values the counting functions accept
const MAX_COUNT_ARGS: usize = 255;

/// The numbers among `values`, stopping at the first error
fn numbers(values: &[Value]) -> XlResult<Vec<Number>> {
    let mut numbers = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Value::Number(n) => numbers.push(*n),
            Value::DateTime(dt) => numbers.push(Number::Float(dt.serial())),
            Value::Error(e) => return Err(e.clone()),
            _ => {}
        }
    }
    Ok(numbers)
}

fn check_count_limit(values: &[Value]) -> XlResult<()> {
    if values.len() > MAX_COUNT_ARGS {
        return Err(XlError::value(format!(
            "Can only have up to {MAX_COUNT_ARGS} arguments. Provided: {}",
            values.len()
        )));
    }
    Ok(())
}

/// AVERAGE(number1, [number2], ...)
///
/// No arguments at all averages to 0; arguments without a single number are
/// `#DIV/0!`.
pub fn fn_average(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(average(&flatten(args.rest("numbers"))).into())
}

fn average(values: &[Value]) -> XlResult<Number> {
    if values.is_empty() {
        return Ok(Number::Int(0));
    }
    let numbers = numbers(values)?;
    if numbers.is_empty() {
        return Err(XlError::div_zero("AVERAGE has no numbers to average"));
    }
    let total = numbers
        .iter()
        .try_fold(Number::Int(0), |total, n| total.checked_add(*n))?;
    total.checked_div(Number::Int(numbers.len() as i64))
}

/// COUNT(value1, [value2], ...) - Counts cells holding numbers
pub fn fn_count(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(count(&flatten(args.rest("values"))).into())
}

fn count(values: &[Value]) -> XlResult<i64> {
    if values.first().map_or(true, Value::is_blank) {
        return Err(XlError::value("value1 is required"));
    }
    check_count_limit(values)?;
    Ok(values
        .iter()
        .filter(|v| v.is_number() || v.is_datetime())
        .count() as i64)
}

/// COUNTA(value1, [value2], ...) - Counts the number of non-empty cells
///
/// Errors count as non-empty.
pub fn fn_counta(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(counta(&flatten(args.rest("values"))).into())
}

fn counta(values: &[Value]) -> XlResult<i64> {
    if values.first().map_or(true, Value::is_blank) {
        return Err(XlError::null("value1 is required"));
    }
    check_count_limit(values)?;
    Ok(values
        .iter()
        .filter(|v| match v {
            Value::Blank => false,
            Value::Text(s) => !s.is_empty(),
            _ => true,
        })
        .count() as i64)
}

fn extreme(values: &[Value], keep: fn(Number, Number) -> bool) -> XlResult<Number> {
    let numbers = numbers(values)?;
    Ok(numbers
        .into_iter()
        .reduce(|best, n| if keep(n, best) { n } else { best })
        .unwrap_or_default())
}

/// MAX(number1, [number2], ...)
///
/// Returns 0 when there are no numbers.
pub fn fn_max(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(extreme(&flatten(args.rest("numbers")), |n, best| n > best).into())
}

/// MIN(number1, [number2], ...)
///
/// Returns 0 when there are no numbers.
pub fn fn_min(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(extreme(&flatten(args.rest("numbers")), |n, best| n < best).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::FunctionRegistry;
    use crate::signature::Call;
    use pretty_assertions::assert_eq;
    use xlcalc_core::{Array, ErrorKind};

    fn eval(name: &str, call: Call) -> Value {
        FunctionRegistry::new()
            .call(name, call, &EvaluationContext::new())
            .unwrap()
    }

    fn kind(value: &Value) -> Option<ErrorKind> {
        value.as_error().map(XlError::kind)
    }

    fn range() -> Array {
        Array::from_rows([
            [Value::from(1), Value::from("text")],
            [Value::from(3), Value::Blank],
            [Value::from(true), Value::from(6)],
        ])
        .unwrap()
    }

    #[test]
    fn test_average() {
        let avg = eval("AVERAGE", Call::new().arg(range()).arg(2));
        assert_eq!(avg, Value::from(3.0));
        assert_eq!(eval("AVERAGE", Call::new()), Value::from(0));
        assert_eq!(
            kind(&eval("AVERAGE", Call::new().arg("a").arg(true))),
            Some(ErrorKind::DivZero)
        );
    }

    #[test]
    fn test_count() {
        assert_eq!(eval("COUNT", Call::new().arg(range())), Value::from(3));
        assert_eq!(eval("COUNT", Call::new().arg(1).arg("2").arg(3)), Value::from(2));
        assert_eq!(kind(&eval("COUNT", Call::new())), Some(ErrorKind::Value));
        assert_eq!(
            kind(&eval("COUNT", Call::new().arg(Value::Blank).arg(1))),
            Some(ErrorKind::Value)
        );
    }

    #[test]
    fn test_count_limit() {
        let many = Array::row(0..256).unwrap();
        assert_eq!(kind(&eval("COUNT", Call::new().arg(many.clone()))), Some(ErrorKind::Value));
        assert_eq!(kind(&eval("COUNTA", Call::new().arg(many))), Some(ErrorKind::Value));
        let enough = Array::row(0..255).unwrap();
        assert_eq!(eval("COUNT", Call::new().arg(enough)), Value::from(255));
    }

    #[test]
    fn test_counta() {
        assert_eq!(eval("COUNTA", Call::new().arg(range())), Value::from(5));
        let with_error = Array::row([
            Value::from(1),
            Value::from(""),
            Value::error(ErrorKind::Na),
        ])
        .unwrap();
        assert_eq!(eval("COUNTA", Call::new().arg(with_error)), Value::from(2));
        assert_eq!(kind(&eval("COUNTA", Call::new())), Some(ErrorKind::Null));
    }

    #[test]
    fn test_max_min() {
        assert_eq!(eval("MAX", Call::new().arg(range()).arg(-1)), Value::from(6));
        assert_eq!(eval("MIN", Call::new().arg(range()).arg(-1)), Value::from(-1));
        assert_eq!(eval("MAX", Call::new()), Value::from(0));
        assert_eq!(eval("MIN", Call::new().arg("x")), Value::from(0));
        let broken = Array::row([Value::from(1), Value::error(ErrorKind::Num)]).unwrap();
        assert_eq!(kind(&eval("MAX", Call::new().arg(broken))), Some(ErrorKind::Num));
    }
}
