//! Date functions

use xlcalc_core::date::{self, Basis};
use xlcalc_core::{DateTime, Number, Value, XlResult};

use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::signature::Args;

/// DATE(year, month, day)
///
/// Returns the serial number; out-of-range months and days roll over.
pub fn fn_date(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(date_serial(args).map(Number::Int).into())
}

fn date_serial(args: &Args) -> XlResult<i64> {
    date::encode(
        args.integer("year")?,
        args.integer("month")?,
        args.integer("day")?,
    )
}

fn date_part(args: &Args, part: fn((i64, u32, u32)) -> i64) -> Value {
    let result: XlResult<i64> = args
        .datetime("serial_number")
        .and_then(|dt| dt.ymd())
        .map(part);
    result.into()
}

/// YEAR(serial_number)
pub fn fn_year(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(date_part(args, |(year, _, _)| year))
}

/// MONTH(serial_number)
pub fn fn_month(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(date_part(args, |(_, month, _)| i64::from(month)))
}

/// DAY(serial_number)
pub fn fn_day(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(date_part(args, |(_, _, day)| i64::from(day)))
}

/// TODAY()
pub fn fn_today(_args: &Args, ctx: &EvaluationContext) -> FormulaResult<Value> {
    let today = DateTime::from_naive_date(ctx.today()).map(|dt| Number::Int(dt.day_serial()));
    Ok(today.into())
}

/// YEARFRAC(start_date, end_date, [basis])
pub fn fn_yearfrac(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(year_fraction(args).into())
}

fn year_fraction(args: &Args) -> XlResult<f64> {
    let basis = Basis::try_from(args.integer("basis")?)?;
    date::year_fraction(args.f64("start_date")?, args.f64("end_date")?, basis)
}
