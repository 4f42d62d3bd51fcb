//! Lookup functions

use xlcalc_core::{CompareOp, Value, XlError, XlResult};

use crate::context::EvaluationContext;
use crate::error::{FormulaError, FormulaResult};
use crate::signature::Args;

/// Largest index CHOOSE accepts
const MAX_CHOOSE_INDEX: i64 = 254;

/// CHOOSE(index_num, value1, [value2], ...)
pub fn fn_choose(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    Ok(choose(args).map_or_else(Value::Error, Value::clone))
}

fn choose(args: &Args) -> XlResult<&Value> {
    let index = args.integer("index_num")?;
    let values = args.rest("values");
    if !(1..=MAX_CHOOSE_INDEX).contains(&index) {
        return Err(XlError::value(format!(
            "`index_num` {index} must be between 1 and {MAX_CHOOSE_INDEX}"
        )));
    }
    usize::try_from(index - 1)
        .ok()
        .and_then(|i| values.get(i))
        .ok_or_else(|| {
            XlError::value(format!(
                "`index_num` {index} must not be larger than the number of values: {}",
                values.len()
            ))
        })
}

/// VLOOKUP(lookup_value, table_array, col_index_num, [range_lookup])
///
/// Only exact matching is supported; asking for an approximate match is a
/// fault. Text matches case-insensitively.
pub fn fn_vlookup(args: &Args, _ctx: &EvaluationContext) -> FormulaResult<Value> {
    if args.boolean("range_lookup").unwrap_or(false) {
        return Err(FormulaError::NotImplemented(
            "VLOOKUP approximate match (range_lookup = TRUE)".to_string(),
        ));
    }
    Ok(vlookup(args).map_or_else(Value::Error, Value::clone))
}

fn vlookup(args: &Args) -> XlResult<&Value> {
    let lookup_value = args.value("lookup_value");
    let table = args.array("table_array")?;
    let col = args.integer("col_index_num")?;

    let col = match usize::try_from(col) {
        Ok(c) if (1..=table.cols()).contains(&c) => c - 1,
        _ => {
            return Err(XlError::value(format!(
                "col_index_num {col} is outside the {} columns of table_array",
                table.cols()
            )))
        }
    };

    table
        .iter_rows()
        .find(|row| {
            row.first().is_some_and(|key| {
                matches!(
                    key.compare_with(CompareOp::Eq, lookup_value),
                    Value::Boolean(true)
                )
            })
        })
        .and_then(|row| row.get(col))
        .ok_or_else(|| XlError::na("`lookup_value` not in first column of `table_array`."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::FunctionRegistry;
    use crate::signature::Call;
    use pretty_assertions::assert_eq;
    use xlcalc_core::{Array, ErrorKind};

    fn eval(name: &str, call: Call) -> FormulaResult<Value> {
        FunctionRegistry::new().call(name, call, &EvaluationContext::new())
    }

    fn kind(value: &Value) -> Option<ErrorKind> {
        value.as_error().map(XlError::kind)
    }

    #[test]
    fn test_choose() {
        let ranges = [
            Array::from_rows([[1, 2], [3, 4]]).unwrap(),
            Array::from_rows([[2, 1], [3, 4]]).unwrap(),
            Array::from_rows([[1, 2], [4, 3]]).unwrap(),
        ];
        let call = Call::new()
            .arg("2")
            .arg(ranges[0].clone())
            .arg(ranges[1].clone())
            .arg(ranges[2].clone());
        assert_eq!(eval("CHOOSE", call).unwrap(), Value::from(ranges[1].clone()));
    }

    #[test]
    fn test_choose_out_of_range() {
        let call = |index: i64| Call::new().arg(index).arg("a").arg("b");
        assert_eq!(kind(&eval("CHOOSE", call(0)).unwrap()), Some(ErrorKind::Value));
        assert_eq!(kind(&eval("CHOOSE", call(3)).unwrap()), Some(ErrorKind::Value));
        assert_eq!(kind(&eval("CHOOSE", call(255)).unwrap()), Some(ErrorKind::Value));
        assert_eq!(eval("CHOOSE", call(1)).unwrap(), Value::from("a"));
    }

    fn table() -> Array {
        Array::from_rows([
            [Value::from(101), Value::from("Davis"), Value::from("Sara")],
            [Value::from(102), Value::from("Fortana"), Value::from("Olivier")],
            [Value::from(103), Value::from("Leal"), Value::from("Karina")],
            [Value::from(104), Value::from("Patten"), Value::from("Michael")],
            [Value::from(105), Value::from("Burke"), Value::from("Brian")],
            [Value::from(106), Value::from("Sousa"), Value::from("Luis")],
        ])
        .unwrap()
    }

    #[test]
    fn test_vlookup() {
        let call = Call::new().arg(102).arg(table()).arg(2).arg(false);
        assert_eq!(eval("VLOOKUP", call).unwrap(), Value::from("Fortana"));

        let call = Call::new().arg(105).arg(table()).arg(3);
        assert_eq!(eval("VLOOKUP", call).unwrap(), Value::from("Brian"));

        let names = Array::from_rows([
            [Value::from("Davis"), Value::from(1)],
            [Value::from("Leal"), Value::from(2)],
        ])
        .unwrap();
        let call = Call::new().arg("LEAL").arg(names).arg(2);
        assert_eq!(eval("VLOOKUP", call).unwrap(), Value::from(2));
    }

    #[test]
    fn test_vlookup_errors() {
        let call = Call::new().arg(102).arg(table()).arg(4);
        assert_eq!(kind(&eval("VLOOKUP", call).unwrap()), Some(ErrorKind::Value));

        let call = Call::new().arg(102).arg(table()).arg(0);
        assert_eq!(kind(&eval("VLOOKUP", call).unwrap()), Some(ErrorKind::Value));

        let call = Call::new().arg(999).arg(table()).arg(2);
        assert_eq!(kind(&eval("VLOOKUP", call).unwrap()), Some(ErrorKind::Na));

        let call = Call::new().arg(102).arg(table()).arg(2).arg(true);
        assert!(matches!(
            eval("VLOOKUP", call),
            Err(FormulaError::NotImplemented(_))
        ));
    }
}
