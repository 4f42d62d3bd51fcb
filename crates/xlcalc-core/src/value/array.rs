//! Rectangular arrays of values

use std::fmt;
use std::sync::Arc;

use super::{Number, Value};
use crate::error::{XlError, XlResult};

/// A row-major 2-D grid of scalar values
///
/// The shape is fixed at construction and cells are shared, so cloning an
/// array never copies its contents. An empty grid represents an empty range.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    rows: usize,
    cols: usize,
    cells: Arc<[Value]>,
}

impl Array {
    pub fn empty() -> Self {
        Array {
            rows: 0,
            cols: 0,
            cells: Arc::from(Vec::new()),
        }
    }

    /// Build from rows of native or [`Value`] cells
    ///
    /// Ragged rows, and cells that are themselves arrays, are rejected with a
    /// `#VALUE!` error for the whole array.
    pub fn from_rows<R, T>(rows: impl IntoIterator<Item = R>) -> XlResult<Self>
    where
        R: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let mut cells: Vec<Value> = Vec::new();
        let mut width = None;
        let mut height = 0;

        for row in rows {
            let start = cells.len();
            cells.extend(row.into_iter().map(Into::into));
            let row_width = cells.len() - start;
            match width {
                None => width = Some(row_width),
                Some(expected) if expected != row_width => {
                    return Err(XlError::value(format!(
                        "Array row {height} has {row_width} cells, expected {expected}"
                    )));
                }
                Some(_) => {}
            }
            height += 1;
        }

        if cells.iter().any(Value::is_array) {
            return Err(XlError::value("Arrays cannot be nested"));
        }

        match width {
            Some(cols) if cols > 0 => Ok(Array {
                rows: height,
                cols,
                cells: cells.into(),
            }),
            _ => Ok(Array::empty()),
        }
    }

    /// A single row
    pub fn row<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> XlResult<Self> {
        Array::from_rows([values])
    }

    /// A single column
    pub fn column<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> XlResult<Self> {
        Array::from_rows(values.into_iter().map(|v| [v]))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// All cells in row-major order
    pub fn flat(&self) -> &[Value] {
        &self.cells
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[Value]> {
        self.cells.chunks(self.cols.max(1))
    }

    fn map(&self, f: impl Fn(&Value) -> Value) -> Array {
        Array {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(f).collect(),
        }
    }

    /// Coerce every cell to a number; unconvertible cells become 0
    pub fn cast_to_numbers(&self) -> Array {
        self.map(|cell| Value::Number(cell.as_number().unwrap_or_default()))
    }

    /// Coerce every cell to a boolean
    ///
    /// Cells that are not boolean-like are tested as numbers; anything else is
    /// false.
    pub fn cast_to_booleans(&self) -> Array {
        self.map(|cell| {
            let truth = cell
                .as_boolean()
                .or_else(|_| cell.as_number().map(|n| !n.is_zero()))
                .unwrap_or(false);
            Value::Boolean(truth)
        })
    }

    /// Render every cell as text; errors render as their code
    pub fn cast_to_texts(&self) -> Array {
        self.map(|cell| Value::Text(cell.to_string().into()))
    }

    /// The cells that hold numbers, skipping every other kind
    pub fn numeric_cells(&self) -> impl Iterator<Item = Number> + '_ {
        self.cells.iter().filter_map(|cell| match cell {
            Value::Number(n) => Some(*n),
            _ => None,
        })
    }
}

impl Default for Array {
    fn default() -> Self {
        Array::empty()
    }
}

/// Array literal notation: `{1,2;3,4}`
impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (r, row) in self.iter_rows().enumerate() {
            if r > 0 {
                f.write_str(";")?;
            }
            for (c, cell) in row.iter().enumerate() {
                if c > 0 {
                    f.write_str(",")?;
                }
                match cell {
                    Value::Text(s) => write!(f, "\"{s}\"")?,
                    other => write!(f, "{other}")?,
                }
            }
        }
        f.write_str("}")
    }
}
