//! Text functions

use xlcalc_core::{flatten, SharedString, Value, XlError, XlResult, CELL_CHARACTER_LIMIT};

use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::signature::Args;

/// Most arguments CONCAT accepts
const MAX_CONCAT_ARGS: usize = 254;

fn check_length(text: &SharedString) -> XlResult<()> {
    let len = text.char_len();
    if len > CELL_CHARACTER_LIMIT {
        return Err(XlError::value(format!(
            "Text is too long. Is {len} but needs to be {CELL_CHARACTER_LIMIT} or less."
        )));
    }
    Ok(())
}

/// CONCAT(text1, [text2], ...)
///
/// Joins the text and number cells of every argument; other kinds are
/// skipped and the first error wins.
pub fn fn_concat(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(concat(args.rest("texts")).into())
}

fn concat(texts: &[Value]) -> XlResult<SharedString> {
    if texts.len() > MAX_CONCAT_ARGS {
        return Err(XlError::value(format!(
            "Can't concat more than {MAX_CONCAT_ARGS} arguments. Provided: {}",
            texts.len()
        )));
    }
    let mut joined = String::new();
    for value in flatten(texts) {
        match value {
            Value::Text(s) => joined.push_str(s.as_str()),
            Value::Number(n) => joined.push_str(&n.to_string()),
            Value::Error(e) => return Err(e),
            _ => {}
        }
    }
    let joined = SharedString::from(joined);
    check_length(&joined)?;
    Ok(joined)
}

/// MID(text, start_num, num_chars)
pub fn fn_mid(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(mid(args).into())
}

fn mid(args: &Args) -> XlResult<String> {
    let text = args.text("text")?;
    check_length(&text)?;
    let start = args.integer("start_num")?;
    let count = args.integer("num_chars")?;
    if start < 1 {
        return Err(XlError::num(format!("{start} is < 1")));
    }
    if count < 0 {
        return Err(XlError::num(format!("{count} is < 0")));
    }
    let skip = usize::try_from(start - 1).unwrap_or(usize::MAX);
    let take = usize::try_from(count).unwrap_or(usize::MAX);
    Ok(text.as_str().chars().skip(skip).take(take).collect())
}

/// RIGHT(text, [num_chars])
pub fn fn_right(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(right(args).into())
}

fn right(args: &Args) -> XlResult<String> {
    let text = args.text("text")?;
    check_length(&text)?;
    let count = args.integer("num_chars")?;
    let count = usize::try_from(count)
        .map_err(|_| XlError::value(format!("num_chars {count} must not be negative")))?;
    let len = text.char_len();
    Ok(text.as_str().chars().skip(len.saturating_sub(count)).collect())
}
