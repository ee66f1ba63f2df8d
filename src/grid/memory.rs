use crate::error::Result;
use crate::grid::{csv_file, Cell, Grid, UsedRange};
use std::path::Path;

/// A grid held entirely in memory.
///
/// Used directly in tests and as the working copy behind [`super::CsvGrid`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryGrid {
    rows: Vec<Vec<Cell>>,
}

impl MemoryGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid from rows of cells; trailing null cells are dropped.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut row| {
                while matches!(row.last(), Some(None)) {
                    row.pop();
                }
                row
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }
}

impl Grid for MemoryGrid {
    fn used_range(&self) -> UsedRange {
        UsedRange {
            rows: self.rows.len(),
            columns: self.rows.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    fn cell(&self, row: usize, column: usize) -> Option<&str> {
        if row == 0 || column == 0 {
            return None;
        }
        self.rows
            .get(row - 1)
            .and_then(|cells| cells.get(column - 1))
            .and_then(|cell| cell.as_deref())
    }

    fn insert_row_at(&mut self, row: usize) {
        let index = row.saturating_sub(1);
        if index >= self.rows.len() {
            self.rows.resize_with(index + 1, Vec::new);
        } else {
            self.rows.insert(index, Vec::new());
        }
    }

    fn write_cell(&mut self, row: usize, column: usize, value: &str) {
        if row == 0 || column == 0 {
            return;
        }
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < column {
            cells.resize(column, None);
        }
        cells[column - 1] = Some(value.to_string());
    }

    fn save(&mut self) -> Result<()> {
        Ok(())
    }

    fn save_as(&mut self, path: &Path) -> Result<()> {
        csv_file::write_rows(path, &self.rows)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
