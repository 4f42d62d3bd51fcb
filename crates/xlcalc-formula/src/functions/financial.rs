//! Financial functions
//!
//! NPV and PMT follow the [`Compatibility`] mode of the evaluation context.

use log::trace;

use xlcalc_core::{flatten, Number, Value, XlError, XlResult};

use crate::context::{Compatibility, EvaluationContext};
use crate::error::{FormulaError, FormulaResult};
use crate::signature::Args;

const IRR_MAX_ITERATIONS: usize = 100;
const IRR_TOLERANCE: f64 = 1e-10;

/// Net present value of `cashflows` at `rate`, the first flow at period `first`
fn present_value(rate: f64, cashflows: &[f64], first: i32) -> f64 {
    cashflows
        .iter()
        .zip(first..)
        .map(|(value, period)| value / (1.0 + rate).powi(period))
        .sum()
}

/// Derivative of [`present_value`] with respect to the rate
fn present_value_slope(rate: f64, cashflows: &[f64], first: i32) -> f64 {
    cashflows
        .iter()
        .zip(first..)
        .map(|(value, period)| -f64::from(period) * value / (1.0 + rate).powi(period + 1))
        .sum()
}

/// Solve for the rate at which the cash flows are worth nothing
///
/// Newton's method from 10%, falling back to bisection when it strays.
fn internal_rate(cashflows: &[f64]) -> XlResult<f64> {
    let has_inflow = cashflows.iter().any(|v| *v > 0.0);
    let has_outflow = cashflows.iter().any(|v| *v < 0.0);
    if !(has_inflow && has_outflow) {
        return Err(XlError::num(
            "IRR needs at least one positive and one negative cash flow",
        ));
    }

    let mut rate = 0.1;
    for _ in 0..IRR_MAX_ITERATIONS {
        let value = present_value(rate, cashflows, 0);
        let slope = present_value_slope(rate, cashflows, 0);
        if slope == 0.0 || !slope.is_finite() {
            break;
        }
        let next = rate - value / slope;
        if !next.is_finite() || next <= -1.0 {
            break;
        }
        if (next - rate).abs() < IRR_TOLERANCE {
            return Ok(next);
        }
        rate = next;
    }

    trace!("IRR: Newton's method did not converge, bisecting");
    let (mut low, mut high) = (-0.999_999, 100.0);
    let mut low_value = present_value(low, cashflows, 0);
    if low_value.signum() == present_value(high, cashflows, 0).signum() {
        return Err(XlError::num("IRR did not converge"));
    }
    for _ in 0..1000 {
        let mid = (low + high) / 2.0;
        let mid_value = present_value(mid, cashflows, 0);
        if mid_value.abs() < IRR_TOLERANCE || (high - low) / 2.0 < IRR_TOLERANCE {
            return Ok(mid);
        }
        if mid_value.signum() == low_value.signum() {
            low = mid;
            low_value = mid_value;
        } else {
            high = mid;
        }
    }
    Err(XlError::num("IRR did not converge"))
}

/// IRR(values, [guess])
///
/// Only the default guess is supported; any other guess is a fault.
pub fn fn_irr(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    if let Some(guess) = args.get("guess") {
        if !guess.as_number().map_or(false, |g| g.is_zero()) {
            return Err(FormulaError::NotImplemented(format!(
                "IRR with a guess of {guess}"
            )));
        }
    }
    Ok(irr(args).and_then(Number::finite).into())
}

fn irr(args: &Args) -> XlResult<f64> {
    let values = args.array("values")?;
    let cashflows = numbers(values.flat())?;
    internal_rate(&cashflows)
}

/// The numbers among `values` as floats, stopping at the first error
fn numbers(values: &[Value]) -> XlResult<Vec<f64>> {
    let mut numbers = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Value::Number(_) | Value::DateTime(_) => numbers.push(value.as_f64()?),
            Value::Error(e) => return Err(e.clone()),
            _ => {}
        }
    }
    Ok(numbers)
}

/// NPV(rate, value1, [value2], ...)
///
/// In Excel mode the first value is discounted by one period; in Python mode
/// it is not discounted.
pub fn fn_npv(args: &Args, ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(npv(args, ctx.compatibility()).and_then(Number::finite).into())
}

fn npv(args: &Args, mode: Compatibility) -> XlResult<f64> {
    let rate = args.f64("rate")?;
    let values = args.rest("values");
    if values.is_empty() {
        return Err(XlError::value("value1 is required"));
    }
    let cashflows = numbers(&flatten(values))?;
    let first = match mode {
        Compatibility::Excel => 1,
        Compatibility::Python => 0,
    };
    Ok(present_value(rate, &cashflows, first))
}

/// Periodic payment for an annuity
///
/// `at_start` moves payments to the beginning of each period.
fn payment(rate: f64, nper: f64, pv: f64, fv: f64, at_start: bool) -> XlResult<f64> {
    if nper == 0.0 {
        return Err(XlError::num("PMT needs a non-zero number of periods"));
    }
    if rate == 0.0 {
        return Ok(-(fv + pv) / nper);
    }
    let when = if at_start { 1.0 } else { 0.0 };
    let growth = (1.0 + rate).powf(nper);
    let factor = (1.0 + rate * when) * (growth - 1.0) / rate;
    if factor == 0.0 {
        return Err(XlError::div_zero("PMT annuity factor is zero"));
    }
    Ok(-(fv + pv * growth) / factor)
}

/// PMT(rate, nper, pv, [fv], [type])
///
/// Python mode ignores `fv`.
pub fn fn_pmt(args: &Args, ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(pmt(args, ctx.compatibility()).and_then(Number::finite).into())
}

fn pmt(args: &Args, mode: Compatibility) -> XlResult<f64> {
    let fv = match mode {
        Compatibility::Excel => args.f64("fv")?,
        Compatibility::Python => 0.0,
    };
    payment(
        args.f64("rate")?,
        args.f64("nper")?,
        args.f64("pv")?,
        fv,
        args.integer("type")? != 0,
    )
}

/// SLN(cost, salvage, life)
pub fn fn_sln(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(sln(args).into())
}

fn sln(args: &Args) -> XlResult<Number> {
    args.number("cost")?
        .checked_sub(args.number("salvage")?)?
        .checked_div(args.number("life")?)
}

/// XNPV(rate, values, dates)
///
/// Each value is discounted by the actual days since the first date.
pub fn fn_xnpv(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(xnpv(args).and_then(Number::finite).into())
}

fn xnpv(args: &Args) -> XlResult<f64> {
    let rate = args.f64("rate")?;
    let values = args.array("values")?.flat();
    let dates = args.array("dates")?.flat();
    if values.len() != dates.len() {
        return Err(XlError::num(format!(
            "`values` range must be the same length as `dates` range in XNPV, {} != {}",
            values.len(),
            dates.len()
        )));
    }
    let Some(start) = dates.first() else {
        return Ok(0.0);
    };
    let start = start.as_f64()?;
    values.iter().zip(dates).try_fold(0.0, |total, (value, date)| {
        let years = (date.as_f64()? - start) / 365.0;
        Ok(total + value.as_f64()? / (1.0 + rate).powf(years))
    })
}
