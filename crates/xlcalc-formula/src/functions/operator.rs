//! Operators as named functions, for evaluators that dispatch by name

use xlcalc_core::{ArithOp, CompareOp, Value};

use super::FunctionImpl;
use crate::context::EvaluationContext;
use crate::error::FormulaResult;
use crate::signature::Args;

/// `(name, implementation)` of each `left <op> right` function
pub const BINARY_OPERATORS: [(&str, FunctionImpl); 14] = [
    ("OP_ADD", fn_op_add),
    ("OP_SUB", fn_op_sub),
    ("OP_MUL", fn_op_mul),
    ("OP_DIV", fn_op_div),
    ("OP_POW", fn_op_pow),
    ("OP_CONCAT", fn_op_concat),
    ("OP_EQ", fn_op_eq),
    ("OP_NE", fn_op_ne),
    ("OP_LT", fn_op_lt),
    ("OP_LE", fn_op_le),
    ("OP_GT", fn_op_gt),
    ("OP_GE", fn_op_ge),
    ("OP_AND", fn_op_and),
    ("OP_OR", fn_op_or),
];

/// `(name, implementation)` of each single-operand function
pub const UNARY_OPERATORS: [(&str, FunctionImpl); 2] =
    [("OP_NEG", fn_op_neg), ("OP_PERCENT", fn_op_percent)];

fn operands(args: &Args) -> (&Value, &Value) {
    (args.value("left"), args.value("right"))
}

fn arithmetic(args: &Args, op: ArithOp) -> FormulaResult<Value> {
    let (left, right) = operands(args);
    Ok(left.arithmetic(op, right))
}

fn comparison(args: &Args, op: CompareOp) -> FormulaResult<Value> {
    let (left, right) = operands(args);
    Ok(left.compare_with(op, right))
}

pub fn fn_op_add(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    arithmetic(args, ArithOp::Add)
}

pub fn fn_op_sub(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    arithmetic(args, ArithOp::Sub)
}

pub fn fn_op_mul(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    arithmetic(args, ArithOp::Mul)
}

/// Division by zero is `#DIV/0!`
pub fn fn_op_div(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    arithmetic(args, ArithOp::Div)
}

pub fn fn_op_pow(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    arithmetic(args, ArithOp::Pow)
}

pub fn fn_op_concat(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    let (left, right) = operands(args);
    Ok(left.concat(right))
}

pub fn fn_op_eq(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    comparison(args, CompareOp::Eq)
}

pub fn fn_op_ne(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    comparison(args, CompareOp::Ne)
}

pub fn fn_op_lt(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    comparison(args, CompareOp::Lt)
}

pub fn fn_op_le(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    comparison(args, CompareOp::Le)
}

pub fn fn_op_gt(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    comparison(args, CompareOp::Gt)
}

pub fn fn_op_ge(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    comparison(args, CompareOp::Ge)
}

pub fn fn_op_and(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    let (left, right) = operands(args);
    Ok(left.and(right))
}

pub fn fn_op_or(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    let (left, right) = operands(args);
    Ok(left.or(right))
}

pub fn fn_op_neg(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(args.value("operand").negate())
}

/// `operand / 100`
pub fn fn_op_percent(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(args.value("operand").percent())
}
