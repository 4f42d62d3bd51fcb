//! Depth-first flattening of arguments
//!
//! Aggregating functions see their arguments as one ordered run of scalars.
//! Arrays expand in row-major order; [`Nested`] trees supplied by foreign
//! callers expand the same way, guarded by [`MAX_FLATTEN_DEPTH`].

use log::warn;

use crate::error::{XlError, XlResult};
use crate::value::{Array, Value};

/// Deepest list nesting accepted from foreign input
pub const MAX_FLATTEN_DEPTH: usize = 64;

/// Arbitrarily nested input from a host caller
#[derive(Debug, Clone, PartialEq)]
pub enum Nested {
    Value(Value),
    List(Vec<Nested>),
}

impl Nested {
    pub fn list<T: Into<Nested>>(items: impl IntoIterator<Item = T>) -> Self {
        Nested::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for Nested {
    fn from(value: Value) -> Self {
        Nested::Value(value)
    }
}

impl From<Vec<Nested>> for Nested {
    fn from(items: Vec<Nested>) -> Self {
        Nested::List(items)
    }
}

/// Expand arrays into their cells, keeping argument order
pub fn flatten(values: &[Value]) -> Vec<Value> {
    let mut flat = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Value::Array(array) => flat.extend(array.flat().iter().cloned()),
            other => flat.push(other.clone()),
        }
    }
    flat
}

/// Flatten a nested tree depth-first into its leaf values
///
/// Trees deeper than [`MAX_FLATTEN_DEPTH`] are rejected with `#VALUE!`.
pub fn flatten_nested(root: &Nested) -> XlResult<Vec<Value>> {
    let mut flat = Vec::new();
    // Each frame is a list and the index of its next child
    let mut stack: Vec<(&[Nested], usize)> = Vec::new();

    match root {
        Nested::Value(value) => return Ok(flatten(std::slice::from_ref(value))),
        Nested::List(items) => stack.push((items.as_slice(), 0)),
    }

    while let Some((items, index)) = stack.pop() {
        let Some(item) = items.get(index) else {
            continue;
        };
        stack.push((items, index + 1));
        match item {
            Nested::Value(Value::Array(array)) => flat.extend(array.flat().iter().cloned()),
            Nested::Value(value) => flat.push(value.clone()),
            Nested::List(children) => {
                if stack.len() >= MAX_FLATTEN_DEPTH {
                    warn!("flatten: input nested deeper than {MAX_FLATTEN_DEPTH} levels");
                    return Err(XlError::value(format!(
                        "Input is nested deeper than {MAX_FLATTEN_DEPTH} levels"
                    )));
                }
                stack.push((children.as_slice(), 0));
            }
        }
    }

    Ok(flat)
}

impl TryFrom<&Nested> for Array {
    type Error = XlError;

    /// A list of lists becomes rows; a flat list becomes a single row
    fn try_from(nested: &Nested) -> XlResult<Self> {
        match nested {
            Nested::Value(Value::Array(array)) => Ok(array.clone()),
            Nested::Value(value) => Array::row([value.clone()]),
            Nested::List(items) if items.iter().all(|i| matches!(i, Nested::List(_))) => {
                let rows = items
                    .iter()
                    .map(flatten_nested)
                    .collect::<XlResult<Vec<_>>>()?;
                Array::from_rows(rows)
            }
            Nested::List(_) => Array::row(flatten_nested(nested)?),
        }
    }
}
