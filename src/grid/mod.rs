//! The tabular grid collaborator.
//!
//! The store only needs a spreadsheet-shaped surface: read cells, find text in
//! the used range, insert rows, write cells, append columns and save. Anything
//! that can offer that (a spreadsheet engine, a CSV file, a database table) can
//! back a store.
//!
//! All coordinates are 1-indexed. Row 1 holds the headers.

mod csv_file;
mod memory;

pub use csv_file::{CsvGrid, CsvSource};
pub use memory::MemoryGrid;

use crate::error::Result;
use std::fmt::Debug;
use std::path::Path;

/// A cell value. `None` is a null (never written or blank) cell.
pub type Cell = Option<String>;

/// Address of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: usize,
    pub column: usize,
}

impl CellRef {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Extent of the used range, counted from `[1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UsedRange {
    pub rows: usize,
    pub columns: usize,
}

impl UsedRange {
    pub fn cell_count(&self) -> usize {
        self.rows * self.columns
    }
}

/// A snapshot of the used range, read in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellBlock {
    rows: Vec<Vec<Cell>>,
    columns: usize,
}

impl CellBlock {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, columns }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    /// Cell text at a 1-indexed position; out-of-range cells are null.
    pub fn get(&self, row: usize, column: usize) -> Option<&str> {
        if row == 0 || column == 0 {
            return None;
        }
        self.rows
            .get(row - 1)
            .and_then(|cells| cells.get(column - 1))
            .and_then(|cell| cell.as_deref())
    }

    /// Header row cells, padded to the block width.
    pub fn header(&self) -> Vec<Cell> {
        (1..=self.columns)
            .map(|column| self.get(1, column).map(str::to_string))
            .collect()
    }
}

/// Spreadsheet-like grid operations required by the reader and merge engine.
pub trait Grid: Send + Debug {
    fn used_range(&self) -> UsedRange;

    fn cell(&self, row: usize, column: usize) -> Option<&str>;

    fn read_used_range(&self) -> CellBlock {
        let range = self.used_range();
        let rows = (1..=range.rows)
            .map(|row| {
                (1..=range.columns)
                    .map(|column| self.cell(row, column).map(str::to_string))
                    .collect()
            })
            .collect();
        CellBlock::new(rows)
    }

    /// First cell in row-major order whose text contains `what`.
    fn find_first(&self, what: &str) -> Option<CellRef> {
        let range = self.used_range();
        if what.is_empty() || range.cell_count() == 0 {
            return None;
        }
        (0..range.cell_count())
            .map(|index| position(index, range.columns))
            .find(|at| self.cell_matches(*at, what))
    }

    /// Next matching cell after `after`, wrapping from the end of the used range
    /// back to `[1, 1]`. When `after` is the only match it is returned again.
    fn find_next(&self, what: &str, after: CellRef) -> Option<CellRef> {
        let range = self.used_range();
        let total = range.cell_count();
        if what.is_empty() || total == 0 {
            return None;
        }
        let start = (after.row.saturating_sub(1) * range.columns
            + after.column.saturating_sub(1))
            % total;
        (1..=total)
            .map(|step| position((start + step) % total, range.columns))
            .find(|at| self.cell_matches(*at, what))
    }

    fn cell_matches(&self, at: CellRef, what: &str) -> bool {
        self.cell(at.row, at.column)
            .is_some_and(|text| text.contains(what))
    }

    /// Insert an empty row so that it becomes row `row`; rows below shift down.
    fn insert_row_at(&mut self, row: usize);

    fn write_cell(&mut self, row: usize, column: usize, value: &str);

    /// Write `value` into the header cell of a new column after the used range.
    fn append_column_header(&mut self, value: &str) -> usize {
        let column = self.used_range().columns + 1;
        self.write_cell(1, column, value);
        column
    }

    fn save(&mut self) -> Result<()>;

    /// Save to `path` and make it the grid's location from now on.
    fn save_as(&mut self, path: &Path) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

fn position(index: usize, columns: usize) -> CellRef {
    CellRef::new(index / columns + 1, index % columns + 1)
}

/// Opens or creates the grid a store persists to.
pub trait GridSource: Send + Sync + Debug {
    /// Human-readable location, used in logs and errors.
    fn location(&self) -> &Path;

    fn exists(&self) -> bool;

    /// # Errors
    /// `StoreError::GridFormat` when the target exists but is not a grid.
    fn open(&self) -> Result<Box<dyn Grid>>;

    /// A new, empty grid at this location. Nothing is persisted until saved.
    fn create(&self) -> Result<Box<dyn Grid>>;

    fn copy_to(&self, destination: &Path) -> Result<()>;
}
