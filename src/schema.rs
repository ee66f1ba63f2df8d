//! Schema discovery from a raw header row.
//!
//! A grid never declares its layout. The leading header cells that do not name a
//! culture are key-part columns; every later column whose header resolves to a
//! culture is a language column.

use crate::grid::Cell;
use crate::i18n::Culture;
use std::collections::HashMap;
use tracing::warn;

/// Layout of a grid, derived from its header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub num_key_columns: usize,
    pub language_columns: HashMap<Culture, usize>,
}

impl Schema {
    /// Derive the layout from `header`.
    ///
    /// A header whose first cell already names a culture leaves no room for
    /// keys. Column 1 is then taken as the key column and that culture is left
    /// unmapped, so a merge gives it a new column instead of mixing keys and
    /// text in one column.
    pub fn discover(header: &[Cell]) -> Self {
        let mut num_key_columns = discover_key_column_count(header);
        let mut language_columns = build_language_column_index(header, num_key_columns);

        if num_key_columns == 0 && !language_columns.is_empty() {
            language_columns.retain(|culture, column| {
                if *column == 1 {
                    warn!(
                        "Header names culture {} in column 1; using column 1 for keys",
                        culture
                    );
                }
                *column != 1
            });
            num_key_columns = 1;
        }

        Self {
            num_key_columns,
            language_columns,
        }
    }

    pub fn column_of(&self, culture: &Culture) -> Option<usize> {
        self.language_columns.get(culture).copied()
    }

    /// Language columns in column order.
    pub fn languages(&self) -> Vec<(&Culture, usize)> {
        let mut columns: Vec<_> = self
            .language_columns
            .iter()
            .map(|(culture, column)| (culture, *column))
            .collect();
        columns.sort_by_key(|(_, column)| *column);
        columns
    }
}

/// Number of leading key-part columns (1-indexed header).
///
/// The first header cell that resolves to a culture at column `c` means `c - 1`
/// key columns. With no culture in the row, every column is a key column.
pub fn discover_key_column_count(header: &[Cell]) -> usize {
    header
        .iter()
        .position(|cell| {
            cell.as_deref()
                .and_then(|text| Culture::resolve_or_default(text, false))
                .is_some()
        })
        .unwrap_or(header.len())
}

/// Map each culture named after the key columns to its 1-indexed column.
///
/// Headers that do not resolve are skipped. If a culture is named twice, the
/// leftmost column wins.
pub fn build_language_column_index(
    header: &[Cell],
    num_key_columns: usize,
) -> HashMap<Culture, usize> {
    let mut columns = HashMap::new();
    for (index, cell) in header.iter().enumerate().skip(num_key_columns) {
        let column = index + 1;
        let Some(text) = cell.as_deref() else {
            continue;
        };
        match Culture::resolve_or_default(text, false) {
            Some(culture) => {
                if let Some(existing) = columns.get(&culture) {
                    warn!(
                        "Culture {} appears in columns {} and {}; using column {}",
                        culture, existing, column, existing
                    );
                } else {
                    columns.insert(culture, column);
                }
            }
            None => warn!("Skipping non-culture header '{}' in column {}", text, column),
        }
    }
    columns
}
