//! In-memory [`SheetStore`] used by the tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use super::client::cell_text;
use super::{Cells, SheetRange, SheetStore, SheetsError};

/// Zero-based bounds of an A1 range. Open ends (`A:A`) run to `usize::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellBounds {
    first_row: usize,
    last_row: usize,
    first_col: usize,
    last_col: usize,
}

impl CellBounds {
    /// Parses `A1:E1`, `A:A`, `A1:ZZ999` or a single cell such as `B2`.
    fn parse(cells: &str) -> Option<Self> {
        let (start, end) = match cells.split_once(':') {
            Some((start, end)) => (start, end),
            None => (cells, cells),
        };
        let (first_col, first_row) = parse_cell(start)?;
        let (last_col, last_row) = parse_cell(end)?;

        Some(Self {
            first_row: first_row.unwrap_or(0),
            last_row: last_row.unwrap_or(usize::MAX),
            first_col,
            last_col,
        })
    }
}

/// Splits `AB12` into column index 27 and row index 11.
fn parse_cell(cell: &str) -> Option<(usize, Option<usize>)> {
    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(cell.len());
    let (letters, digits) = cell.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let col = letters
        .chars()
        .fold(0usize, |acc, c| acc * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1))
        - 1;

    let row = if digits.is_empty() {
        None
    } else {
        let n: usize = digits.parse().ok()?;
        Some(n.checked_sub(1)?)
    };

    Some((col, row))
}

pub struct MemorySheetStore {
    spreadsheet_id: Option<String>,
    tabs: Mutex<HashMap<String, Cells>>,
    fail_reads: bool,
    fail_writes: bool,
    updates: AtomicUsize,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self {
            spreadsheet_id: Some("memory".to_string()),
            tabs: Mutex::new(HashMap::new()),
            fail_reads: false,
            fail_writes: false,
            updates: AtomicUsize::new(0),
        }
    }

    /// A store that behaves as if `SHEET_ID` were unset.
    pub fn unconfigured() -> Self {
        Self {
            spreadsheet_id: None,
            ..Self::new()
        }
    }

    pub fn with_tab(self, name: &str, rows: &[&[&str]]) -> Self {
        let grid = rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
        self.tabs.lock().unwrap().insert(name.to_string(), grid);
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Full contents of a tab, or `None` if it does not exist.
    pub fn tab(&self, name: &str) -> Option<Cells> {
        self.tabs.lock().unwrap().get(name).cloned()
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    fn check(&self, range: &SheetRange) -> Result<CellBounds, SheetsError> {
        if self.spreadsheet_id.is_none() {
            return Err(SheetsError::NotConfigured);
        }
        if !self.tabs.lock().unwrap().contains_key(&range.tab) {
            return Err(unable_to_parse(range));
        }
        CellBounds::parse(&range.cells).ok_or_else(|| unable_to_parse(range))
    }
}

fn unable_to_parse(range: &SheetRange) -> SheetsError {
    SheetsError::Api {
        status: StatusCode::BAD_REQUEST,
        message: format!("Unable to parse range: {range}"),
    }
}

fn write_cell(grid: &mut Cells, row: usize, col: usize, value: String) {
    if grid.len() <= row {
        grid.resize_with(row + 1, Vec::new);
    }
    let cells = &mut grid[row];
    if cells.len() <= col {
        cells.resize(col + 1, String::new());
    }
    cells[col] = value;
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    fn spreadsheet_id(&self) -> Option<&str> {
        self.spreadsheet_id.as_deref()
    }

    async fn read_range(&self, range: &SheetRange) -> Result<Cells, SheetsError> {
        if self.fail_reads {
            return Err(SheetsError::Network {
                message: "connection reset".to_string(),
            });
        }
        let bounds = self.check(range)?;
        let tabs = self.tabs.lock().unwrap();
        let grid = &tabs[&range.tab];

        let mut rows: Cells = grid
            .iter()
            .enumerate()
            .filter(|(i, _)| *i >= bounds.first_row && *i <= bounds.last_row)
            .map(|(_, row)| {
                let mut cells: Vec<String> = row
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j >= bounds.first_col && *j <= bounds.last_col)
                    .map(|(_, c)| c.clone())
                    .collect();
                while cells.last().is_some_and(|c| c.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .collect();
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }

        Ok(rows)
    }

    async fn append_row(&self, range: &SheetRange, row: Vec<Value>) -> Result<(), SheetsError> {
        if self.fail_writes {
            return Err(SheetsError::Api {
                status: StatusCode::FORBIDDEN,
                message: "The caller does not have permission".to_string(),
            });
        }
        let bounds = self.check(range)?;
        let mut tabs = self.tabs.lock().unwrap();
        let grid = tabs.entry(range.tab.clone()).or_default();

        let next_row = grid
            .iter()
            .rposition(|r| r.iter().any(|c| !c.is_empty()))
            .map_or(0, |i| i + 1)
            .max(bounds.first_row);
        for (offset, value) in row.iter().enumerate() {
            write_cell(grid, next_row, bounds.first_col + offset, cell_text(value.clone()));
        }

        Ok(())
    }

    async fn update_range(
        &self,
        range: &SheetRange,
        rows: Vec<Vec<Value>>,
    ) -> Result<(), SheetsError> {
        if self.fail_writes {
            return Err(SheetsError::Api {
                status: StatusCode::FORBIDDEN,
                message: "The caller does not have permission".to_string(),
            });
        }
        let bounds = self.check(range)?;
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut tabs = self.tabs.lock().unwrap();
        let grid = tabs.entry(range.tab.clone()).or_default();

        for (i, row) in rows.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                write_cell(grid, bounds.first_row + i, bounds.first_col + j, cell_text(value.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_closed_range() {
        let bounds = CellBounds::parse("A1:E1").unwrap();
        assert_eq!(
            bounds,
            CellBounds {
                first_row: 0,
                last_row: 0,
                first_col: 0,
                last_col: 4
            }
        );

        let wide = CellBounds::parse("A1:ZZ999").unwrap();
        assert_eq!(wide.last_col, 701);
        assert_eq!(wide.last_row, 998);
    }

    #[test]
    fn test_parse_open_column_range() {
        let bounds = CellBounds::parse("A:I").unwrap();
        assert_eq!(bounds.first_row, 0);
        assert_eq!(bounds.last_row, usize::MAX);
        assert_eq!(bounds.last_col, 8);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(CellBounds::parse("1A").is_none());
        assert!(CellBounds::parse("A0").is_none());
        assert!(CellBounds::parse("").is_none());
    }
}
