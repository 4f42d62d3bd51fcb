//! Logical functions

use xlcalc_core::{flatten, Value, XlError, XlResult};

use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::signature::Args;

/// Fold the truth values of `logicals`, skipping blanks and empty text
fn fold_logicals(logicals: &[Value], all: bool) -> XlResult<bool> {
    if logicals.is_empty() {
        return Err(XlError::null("logical1 is required"));
    }
    let mut seen = false;
    let mut result = all;
    for value in flatten(logicals) {
        let skip = match &value {
            Value::Blank => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        };
        if skip {
            continue;
        }
        seen = true;
        let truth = value.as_boolean()?;
        result = if all { result && truth } else { result || truth };
    }
    if !seen {
        return Err(XlError::value("No logical values to evaluate"));
    }
    Ok(result)
}

/// AND(logical1, [logical2], ...)
pub fn fn_and(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(fold_logicals(args.rest("logicals"), true).into())
}

/// OR(logical1, [logical2], ...)
pub fn fn_or(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(fold_logicals(args.rest("logicals"), false).into())
}

/// IF(logical_test, value_if_true, [value_if_false])
pub fn fn_if(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    let branch = match args.boolean("logical_test") {
        Ok(true) => args.value("value_if_true"),
        Ok(false) => args.value("value_if_false"),
        Err(e) => return Ok(Value::Error(e)),
    };
    Ok(branch.clone())
}
