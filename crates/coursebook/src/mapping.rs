//! Conversion between spreadsheet rows and keyed records.

use serde_json::{Map, Value};

/// One row keyed by header name, in header order.
pub type Record = Map<String, Value>;

/// Value written for a column the record does not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellDefault {
    Empty,
    Zero,
    One,
}

impl CellDefault {
    fn to_value(self) -> Value {
        match self {
            CellDefault::Empty => Value::String(String::new()),
            CellDefault::Zero => Value::from(0),
            CellDefault::One => Value::from(1),
        }
    }
}

/// A named column in a fixed row layout.
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    pub name: &'a str,
    pub default: CellDefault,
}

impl<'a> Column<'a> {
    pub const fn text(name: &'a str) -> Self {
        Self {
            name,
            default: CellDefault::Empty,
        }
    }

    pub const fn with_default(name: &'a str, default: CellDefault) -> Self {
        Self { name, default }
    }
}

/// Reads `matrix[header_row]` as field names and every row from
/// `first_data_row` on as a record.
///
/// Missing cells become `""`; cells past the end of the header are dropped.
/// Rows between the header and `first_data_row` are ignored.
pub fn rows_to_records(
    matrix: &[Vec<String>],
    header_row: usize,
    first_data_row: usize,
) -> Vec<Record> {
    let Some(header) = matrix.get(header_row) else {
        return Vec::new();
    };

    matrix
        .iter()
        .skip(first_data_row)
        .map(|row| {
            header
                .iter()
                .enumerate()
                .map(|(i, key)| {
                    let cell = row.get(i).cloned().unwrap_or_default();
                    (key.clone(), Value::String(cell))
                })
                .collect()
        })
        .collect()
}

/// Lays `record` out in `columns` order. Absent or null fields take the column default.
pub fn record_to_row(record: &Record, columns: &[Column<'_>]) -> Vec<Value> {
    columns
        .iter()
        .map(|column| match record.get(column.name) {
            Some(value) if !value.is_null() => value.clone(),
            _ => column.default.to_value(),
        })
        .collect()
}
