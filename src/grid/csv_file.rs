//! CSV-file grid.
//!
//! The whole file is read into a [`MemoryGrid`] on open and rewritten on save.
//! Empty fields read back as null cells, so an empty-string translation does not
//! survive a save/open cycle.

use crate::error::{Result, StoreError};
use crate::grid::{Cell, CellRef, Grid, GridSource, MemoryGrid, UsedRange};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug)]
pub struct CsvGrid {
    path: PathBuf,
    sheet: MemoryGrid,
}

impl CsvGrid {
    /// Read an existing CSV file.
    ///
    /// # Errors
    /// `StoreError::GridFormat` when the file is not valid UTF-8 CSV,
    /// `StoreError::Csv` for I/O failures while reading.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| classify(&path, e))?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| classify(&path, e))?;
            let row: Vec<Cell> = record
                .iter()
                .map(|field| (!field.is_empty()).then(|| field.to_string()))
                .collect();
            rows.push(row);
        }

        debug!("Read {} rows from {}", rows.len(), path.display());
        Ok(Self {
            path,
            sheet: MemoryGrid::from_rows(rows),
        })
    }

    /// A new grid that will be written to `path` on the first save.
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet: MemoryGrid::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// I/O failures stay I/O failures; anything else means the file is not a grid.
fn classify(path: &Path, error: csv::Error) -> StoreError {
    if matches!(error.kind(), csv::ErrorKind::Io(_)) {
        StoreError::Csv(error)
    } else {
        StoreError::GridFormat {
            path: path.to_path_buf(),
            reason: error.to_string(),
        }
    }
}

/// Write rows as CSV, padding every record to the widest row.
pub(crate) fn write_rows(path: &Path, rows: &[Vec<Cell>]) -> Result<()> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut writer = WriterBuilder::new().flexible(true).from_path(path)?;
    for row in rows {
        let record: Vec<&str> = (0..width)
            .map(|i| row.get(i).and_then(|c| c.as_deref()).unwrap_or(""))
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

impl Grid for CsvGrid {
    fn used_range(&self) -> UsedRange {
        self.sheet.used_range()
    }

    fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.sheet.cell(row, column)
    }

    fn find_first(&self, what: &str) -> Option<CellRef> {
        self.sheet.find_first(what)
    }

    fn find_next(&self, what: &str, after: CellRef) -> Option<CellRef> {
        self.sheet.find_next(what, after)
    }

    fn insert_row_at(&mut self, row: usize) {
        self.sheet.insert_row_at(row);
    }

    fn write_cell(&mut self, row: usize, column: usize, value: &str) {
        self.sheet.write_cell(row, column, value);
    }

    fn save(&mut self) -> Result<()> {
        write_rows(&self.path, self.sheet.rows())?;
        info!("Saved grid to {}", self.path.display());
        Ok(())
    }

    fn save_as(&mut self, path: &Path) -> Result<()> {
        self.path = path.to_path_buf();
        self.save()
    }

    fn close(&mut self) -> Result<()> {
        debug!("Closed grid {}", self.path.display());
        Ok(())
    }
}

/// A grid persisted as a CSV file at a fixed path.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GridSource for CsvSource {
    fn location(&self) -> &Path {
        &self.path
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn open(&self) -> Result<Box<dyn Grid>> {
        Ok(Box::new(CsvGrid::open(&self.path)?))
    }

    fn create(&self) -> Result<Box<dyn Grid>> {
        Ok(Box::new(CsvGrid::create(&self.path)))
    }

    fn copy_to(&self, destination: &Path) -> Result<()> {
        std::fs::copy(&self.path, destination)?;
        Ok(())
    }
}
