//! Math functions

use std::borrow::Cow;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use xlcalc_core::{flatten, Array, Number, Value, XlError, XlResult};

use super::criteria::parse_criteria;
use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::signature::Args;

/// ABS(number)
pub fn fn_abs(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    let result = args.number("number").map(|n| if n < Number::Int(0) { -n } else { n });
    Ok(result.into())
}

/// LN(number)
pub fn fn_ln(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(ln(args).into())
}

fn ln(args: &Args) -> XlResult<Number> {
    let number = args.f64("number")?;
    if number <= 0.0 {
        return Err(XlError::num(format!("LN of non-positive number {number}")));
    }
    Number::finite(number.ln())
}

/// MOD(number, divisor)
///
/// The result takes the sign of the divisor.
pub fn fn_mod(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    let result = args
        .number("number")
        .and_then(|n| n.checked_rem(args.number("divisor")?));
    Ok(result.into())
}

/// PI()
pub fn fn_pi(_args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(Value::from(std::f64::consts::PI))
}

/// POWER(number, power)
pub fn fn_power(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    let result = args
        .number("number")
        .and_then(|n| n.checked_pow(args.number("power")?));
    Ok(result.into())
}

/// SQRT(number)
pub fn fn_sqrt(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(sqrt(args).into())
}

fn sqrt(args: &Args) -> XlResult<Number> {
    let number = args.f64("number")?;
    if number < 0.0 {
        return Err(XlError::num(format!("SQRT of negative number {number}")));
    }
    Number::finite(number.sqrt())
}

/// Round `number` to `digits` decimal places (negative digits round left of
/// the decimal point)
///
/// Rounding happens in decimal, so `2.675` rounds to `2.68`. Non-positive
/// digit counts produce whole numbers when they fit an `i64`.
pub fn round_number(number: Number, digits: i64, strategy: RoundingStrategy) -> XlResult<Number> {
    let overflow = || XlError::num(format!("Cannot round {number} to {digits} digits"));

    let decimal = match number {
        Number::Int(n) if digits >= 0 => return Ok(Number::Int(n)),
        Number::Int(n) => Decimal::from(n),
        Number::Float(f) => match Decimal::from_f64(f) {
            Some(d) => d,
            // Beyond decimal range every digit is left of the point already
            None if digits >= 0 => return Ok(number),
            None => return round_float(f, digits, strategy),
        },
    };

    let rounded = if digits >= 0 {
        let scale = u32::try_from(digits).unwrap_or(u32::MAX);
        if scale > decimal.scale() {
            decimal
        } else {
            decimal.round_dp_with_strategy(scale, strategy)
        }
    } else {
        let factor = u32::try_from(digits.unsigned_abs())
            .ok()
            .and_then(|exp| 10_i128.checked_pow(exp))
            .and_then(Decimal::from_i128);
        match factor {
            Some(factor) => (decimal / factor)
                .round_dp_with_strategy(0, strategy)
                .checked_mul(factor)
                .ok_or_else(overflow)?,
            // Rounding to more places than the decimal holds
            None => match strategy {
                RoundingStrategy::AwayFromZero if !decimal.is_zero() => return Err(overflow()),
                _ => Decimal::ZERO,
            },
        }
    };

    match rounded.to_i64() {
        Some(whole) if digits <= 0 => Ok(Number::Int(whole)),
        // Whole results past the i64 range stay decimal
        _ => rounded.to_f64().ok_or_else(overflow).and_then(Number::finite),
    }
}

/// Round a float too large for `Decimal` to the left of the decimal point
fn round_float(number: f64, digits: i64, strategy: RoundingStrategy) -> XlResult<Number> {
    let exp = i32::try_from(digits.unsigned_abs()).unwrap_or(i32::MAX);
    let factor = 10f64.powi(exp);
    if factor.is_infinite() {
        return Err(XlError::num(format!("Cannot round {number} to {digits} digits")));
    }
    let scaled = number / factor;
    let rounded = match strategy {
        RoundingStrategy::MidpointAwayFromZero => scaled.round(),
        RoundingStrategy::AwayFromZero if scaled.fract() != 0.0 => {
            scaled.trunc() + scaled.signum()
        }
        _ => scaled.trunc(),
    };
    Number::finite(rounded * factor)
}

fn round_with(args: &Args, strategy: RoundingStrategy) -> Value {
    let result = args
        .number("number")
        .and_then(|n| round_number(n, args.integer("num_digits")?, strategy));
    result.into()
}

/// ROUND(number, [num_digits])
///
/// Halves round away from zero.
pub fn fn_round(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(round_with(args, RoundingStrategy::MidpointAwayFromZero))
}

/// ROUNDUP(number, [num_digits])
pub fn fn_roundup(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(round_with(args, RoundingStrategy::AwayFromZero))
}

/// ROUNDDOWN(number, [num_digits])
pub fn fn_rounddown(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(round_with(args, RoundingStrategy::ToZero))
}

/// TRUNC(number, [num_digits])
pub fn fn_trunc(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(round_with(args, RoundingStrategy::ToZero))
}

/// Add up the numbers among `values`; other kinds are skipped and the first
/// error wins
fn sum_numbers<'a>(values: impl IntoIterator<Item = &'a Value>) -> XlResult<Number> {
    values
        .into_iter()
        .try_fold(Number::Int(0), |total, value| match value {
            Value::Number(_) | Value::DateTime(_) => total.checked_add(value.as_number()?),
            Value::Error(e) => Err(e.clone()),
            _ => Ok(total),
        })
}

/// SUM(number1, [number2], ...)
///
/// Only numbers count; text and booleans are ignored.
pub fn fn_sum(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(sum_numbers(&flatten(args.rest("numbers"))).into())
}

/// SUMIF(range, criteria, [sum_range])
///
/// Array criteria are not supported and sum to 0. Matches past the end of
/// `sum_range` contribute nothing.
pub fn fn_sumif(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    if args.value("criteria").is_array() {
        return Ok(Value::from(0));
    }
    Ok(sumif(args).into())
}

fn sumif(args: &Args) -> XlResult<Number> {
    let range = args.array("range")?;
    let criteria = parse_criteria(args.value("criteria"))?;
    let sum_range = match args.get("sum_range") {
        Some(_) => args.array("sum_range")?,
        None => range,
    };

    let matched = range
        .flat()
        .iter()
        .enumerate()
        .filter(|(_, probe)| criteria.matches(probe))
        .filter_map(|(index, _)| sum_range.flat().get(index));
    sum_numbers(matched)
}

/// SUMPRODUCT(array1, [array2], ...)
///
/// Arrays must share one shape. Cells that are not numbers count as 0; any
/// error cell makes the result `#N/A`.
pub fn fn_sumproduct(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(sumproduct(args.rest("arrays")).into())
}

/// A scalar argument takes part as a 1x1 array
fn sumproduct(values: &[Value]) -> XlResult<Number> {
    let arrays = values
        .iter()
        .filter_map(|value| match value {
            Value::Array(array) => Some(Cow::Borrowed(array)),
            Value::Number(_) => Array::row([value.clone()]).ok().map(Cow::Owned),
            _ => None,
        })
        .collect::<Vec<Cow<'_, Array>>>();
    let Some(first) = arrays.first() else {
        return Err(XlError::null("SUMPRODUCT requires at least one array"));
    };
    if first.is_empty() {
        return Ok(Number::Int(0));
    }
    if let Some(other) = arrays
        .iter()
        .find(|a| (a.rows(), a.cols()) != (first.rows(), first.cols()))
    {
        return Err(XlError::value(format!(
            "Array sizes differ: {}x{} and {}x{}",
            first.rows(),
            first.cols(),
            other.rows(),
            other.cols()
        )));
    }
    if arrays.iter().any(|a| a.flat().iter().any(Value::is_error)) {
        return Err(XlError::na("Errors are present in the SUMPRODUCT arrays"));
    }

    (0..first.len()).try_fold(Number::Int(0), |total, index| {
        let product = arrays.iter().try_fold(Number::Int(1), |product, array| {
            let cell = match &array.flat()[index] {
                value @ (Value::Number(_) | Value::DateTime(_)) => value.as_number()?,
                _ => Number::Int(0),
            };
            product.checked_mul(cell)
        })?;
        total.checked_add(product)
    })
}
