//! Merge engine: reconciles the in-memory dictionary against a grid.
//!
//! Each key is matched to an existing row or given a new one; language columns
//! are appended on demand. Rows and columns that no key touches are left as they
//! are, and nothing is ever deleted. The engine keeps its own view of the grid's
//! shape (key column count, language columns, widest column, end of the data
//! block) and updates it after every structural edit it makes.
//!
//! The grid must not be modified by anyone else while a merge runs.

use crate::dictionary::Translations;
use crate::grid::{Cell, CellRef, Grid};
use crate::i18n::Culture;
use crate::key::KeyCodec;
use crate::reader::key_parts;
use crate::schema::Schema;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// What a merge changed in the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Existing rows whose translations were written
    pub rows_updated: usize,

    /// New rows inserted for keys not yet in the grid
    pub rows_inserted: usize,

    /// Language columns appended for cultures not yet in the grid
    pub columns_added: usize,

    /// Glossary keys left untouched
    pub glossary_skipped: usize,
}

/// Result of scanning the grid for a key's row.
#[derive(Debug, Default, PartialEq, Eq)]
struct RowSearch {
    /// Row whose key cells equal the key exactly
    target: Option<usize>,

    /// Last row whose first key cell equals the key's first part
    last_sibling: Option<usize>,
}

pub struct MergeEngine<'a, G: Grid + ?Sized> {
    grid: &'a mut G,
    codec: &'a KeyCodec,
    decorate_headers: bool,
    schema: Schema,
    max_column: usize,
    data_end: usize,
    report: MergeReport,
}

impl<'a, G: Grid + ?Sized> MergeEngine<'a, G> {
    pub fn new(grid: &'a mut G, codec: &'a KeyCodec) -> Self {
        let range = grid.used_range();
        let header: Vec<Cell> = (1..=range.columns)
            .map(|column| grid.cell(1, column).map(str::to_string))
            .collect();
        let schema = Schema::discover(&header);

        let mut data_end = 1;
        while grid.cell(data_end + 1, 1).is_some() {
            data_end += 1;
        }

        Self {
            grid,
            codec,
            decorate_headers: false,
            schema,
            max_column: range.columns,
            data_end,
            report: MergeReport::default(),
        }
    }

    /// Write new language headers as "Native name (tag)".
    pub fn with_decorated_headers(mut self, decorate: bool) -> Self {
        self.decorate_headers = decorate;
        self
    }

    /// Merge every (culture, key, text) of `translations` into the grid.
    pub fn merge(mut self, translations: &Translations) -> MergeReport {
        let by_key = translations.by_key();

        if self.schema.num_key_columns == 0 && self.schema.language_columns.is_empty() {
            let widest = by_key
                .keys()
                .filter(|key| !self.codec.is_glossary_key(key))
                .map(|key| self.codec.decompose(key).len())
                .max()
                .unwrap_or(1);
            debug!("Empty grid: laying out {} key columns", widest);
            self.schema.num_key_columns = widest;
            self.max_column = self.max_column.max(widest);
        }

        for (key, entries) in &by_key {
            self.merge_key(key, entries);
        }

        info!(
            "Merged {} keys: {} rows updated, {} inserted, {} columns added, {} glossary skipped",
            by_key.len(),
            self.report.rows_updated,
            self.report.rows_inserted,
            self.report.columns_added,
            self.report.glossary_skipped
        );
        self.report
    }

    fn merge_key(&mut self, key: &str, entries: &[(&Culture, &str)]) {
        if self.codec.is_glossary_key(key) {
            debug!("Skipping glossary key {}", key);
            self.report.glossary_skipped += 1;
            return;
        }

        let parts = self
            .codec
            .squeeze(&self.codec.decompose(key), self.schema.num_key_columns);
        let search = self.find_row(&parts);

        let row = match search.target {
            Some(row) => {
                self.report.rows_updated += 1;
                row
            }
            None => {
                let row = search.last_sibling.unwrap_or(self.data_end) + 1;
                self.insert_key_row(row, &parts);
                row
            }
        };

        for (culture, text) in entries {
            let column = self.column_for(culture);
            self.grid.write_cell(row, column, text);
        }
    }

    /// Circular find over the used range for the key's first part.
    ///
    /// Every hit is only a candidate: the search is by substring, so each
    /// candidate row's key cells are compared with the full key. The scan ends
    /// when find-next comes back to the first hit (which, with a single hit, is
    /// immediately) or after as many hits as the range has cells.
    fn find_row(&self, parts: &[String]) -> RowSearch {
        let mut search = RowSearch::default();
        let Some(first_part) = parts.first() else {
            return search;
        };
        let Some(start) = self.grid.find_first(first_part) else {
            return search;
        };

        let max_hits = self.grid.used_range().cell_count();
        let mut visited = HashSet::new();
        let mut hit = start;

        for _ in 0..max_hits {
            if self.is_data_row(hit.row) && visited.insert(hit.row) {
                if self.grid.cell(hit.row, 1) == Some(first_part.as_str()) {
                    search.last_sibling = search.last_sibling.max(Some(hit.row));
                }
                if self.row_key(hit.row) == parts {
                    search.target = Some(hit.row);
                    return search;
                }
            }

            match self.next_hit(first_part, hit, start) {
                Some(next) => hit = next,
                None => return search,
            }
        }

        warn!(
            "Find for '{}' did not wrap after {} hits; treating remaining rows as unmatched",
            first_part, max_hits
        );
        search
    }

    fn next_hit(&self, what: &str, after: CellRef, start: CellRef) -> Option<CellRef> {
        self.grid
            .find_next(what, after)
            .filter(|next| *next != start && *next != after)
    }

    fn is_data_row(&self, row: usize) -> bool {
        row > 1
            && row <= self.data_end
            && !self
                .grid
                .cell(row, 1)
                .is_some_and(|first| self.codec.is_glossary_cell(first))
    }

    fn row_key(&self, row: usize) -> Vec<String> {
        key_parts(
            (1..=self.schema.num_key_columns.max(1))
                .map(|column| self.grid.cell(row, column))
                .collect(),
        )
    }

    fn insert_key_row(&mut self, row: usize, parts: &[String]) {
        self.grid.insert_row_at(row);
        self.data_end += 1;
        for (index, part) in parts.iter().enumerate() {
            self.grid.write_cell(row, index + 1, part);
        }
        self.report.rows_inserted += 1;
        debug!("Inserted row {} for key parts {:?}", row, parts);
    }

    /// Column for a culture, appending a new language column if needed.
    fn column_for(&mut self, culture: &Culture) -> usize {
        if let Some(column) = self.schema.column_of(culture) {
            return column;
        }

        let label = culture.header_label(self.decorate_headers);
        let column = if self.grid.used_range().columns >= self.max_column {
            self.grid.append_column_header(&label)
        } else {
            // Fresh grid: the key columns have no cells yet.
            let column = self.max_column + 1;
            self.grid.write_cell(1, column, &label);
            column
        };

        self.schema.language_columns.insert(culture.clone(), column);
        self.max_column = self.grid.used_range().columns.max(column);
        self.report.columns_added += 1;
        info!("Added column {} for culture {}", column, culture);
        column
    }
}

/// Merge `translations` into `grid` with default settings.
pub fn merge_translations<G: Grid + ?Sized>(
    grid: &mut G,
    translations: &Translations,
    codec: &KeyCodec,
    decorate_headers: bool,
) -> MergeReport {
    MergeEngine::new(grid, codec)
        .with_decorated_headers(decorate_headers)
        .merge(translations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{MemoryGrid, UsedRange};
    use crate::reader::read_translations;
    use proptest::prelude::*;

    fn grid(rows: &[&[Option<&str>]]) -> MemoryGrid {
        MemoryGrid::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|c| c.map(str::to_string)).collect())
                .collect(),
        )
    }

    fn codec() -> KeyCodec {
        KeyCodec::new(':', "GLOSSARY")
    }

    fn culture(tag: &str) -> Culture {
        Culture::resolve(tag, false).expect("Should resolve")
    }

    fn translations(entries: &[(&str, &str, &str)]) -> Translations {
        let mut translations = Translations::new();
        for (tag, key, text) in entries {
            translations.insert(culture(tag), *key, *text);
        }
        translations
    }

    fn merge(g: &mut MemoryGrid, t: &Translations) -> MergeReport {
        merge_translations(g, t, &codec(), false)
    }

    // ==================== Empty Grid Tests ====================

    #[test]
    fn test_empty_grid_round_trip() {
        let mut g = MemoryGrid::new();
        let t = translations(&[
            ("en", "greeting", "Hello"),
            ("sv", "greeting", "Hej"),
            ("en", "approve", "I accept"),
        ]);
        let report = merge(&mut g, &t);

        assert_eq!(report.rows_inserted, 2);
        assert_eq!(report.columns_added, 2);
        assert_eq!(read_translations(&g, &codec()), t);
    }

    #[test]
    fn test_empty_grid_uses_widest_key_for_key_columns() {
        let mut g = MemoryGrid::new();
        let t = translations(&[
            ("en", "Window:Title", "Main"),
            ("en", "Window:Buttons:Ok", "OK"),
            ("en", "status", "Ready"),
        ]);
        merge(&mut g, &t);

        assert_eq!(g.cell(1, 4), Some("en"));
        assert_eq!(g.cell(1, 1), None);
        assert_eq!(read_translations(&g, &codec()), t);
    }

    // ==================== Idempotence Tests ====================

    #[test]
    fn test_merging_twice_adds_nothing() {
        let mut g = MemoryGrid::new();
        let t = translations(&[
            ("en", "a:x", "A"),
            ("de", "a:y", "B"),
            ("fr", "b", "C"),
        ]);
        merge(&mut g, &t);
        let after_first = g.clone();

        let report = merge(&mut g, &t);
        assert_eq!(report.rows_inserted, 0);
        assert_eq!(report.columns_added, 0);
        assert_eq!(report.rows_updated, 3);
        assert_eq!(g, after_first);
    }

    // ==================== Existing Grid Tests ====================

    #[test]
    fn test_updates_matching_row_in_place() {
        let mut g = grid(&[
            &[None, None, Some("en")],
            &[Some("Window"), Some("Title"), Some("Old")],
            &[Some("Window"), Some("Close"), Some("Close")],
        ]);
        let report = merge(&mut g, &translations(&[("en", "Window:Title", "New")]));

        assert_eq!(report.rows_updated, 1);
        assert_eq!(report.rows_inserted, 0);
        assert_eq!(g.cell(2, 3), Some("New"));
        assert_eq!(g.cell(3, 3), Some("Close"));
    }

    #[test]
    fn test_prefix_false_positive_is_rejected() {
        let mut g = grid(&[
            &[None, None, Some("en")],
            &[Some("WindowExtra"), Some("Title"), Some("Other")],
            &[Some("Tool"), Some("Title"), Some("mentions Window here")],
        ]);
        let report = merge(&mut g, &translations(&[("en", "Window:Title", "Mine")]));

        assert_eq!(report.rows_inserted, 1);
        assert_eq!(g.cell(2, 3), Some("Other"));
        assert_eq!(g.cell(3, 3), Some("mentions Window here"));
        assert_eq!(g.cell(4, 1), Some("Window"));
        assert_eq!(g.cell(4, 3), Some("Mine"));
    }

    #[test]
    fn test_new_row_goes_after_last_sibling() {
        let mut g = grid(&[
            &[None, None, Some("en")],
            &[Some("Menu"), Some("File"), Some("File")],
            &[Some("Menu"), Some("Edit"), Some("Edit")],
            &[Some("Status"), Some("Ready"), Some("Ready")],
        ]);
        merge(&mut g, &translations(&[("en", "Menu:View", "View")]));

        assert_eq!(g.cell(4, 2), Some("View"));
        assert_eq!(g.cell(4, 3), Some("View"));
        assert_eq!(g.cell(5, 1), Some("Status"));
    }

    #[test]
    fn test_new_row_without_sibling_appends_to_data_block() {
        let mut g = grid(&[
            &[None, Some("en")],
            &[Some("a"), Some("A")],
            &[None],
            &[None, Some("notes below the data")],
        ]);
        merge(&mut g, &translations(&[("en", "b", "B")]));

        assert_eq!(g.cell(3, 1), Some("b"));
        assert_eq!(g.cell(5, 2), Some("notes below the data"));
        assert_eq!(read_translations(&g, &codec()).get(&culture("en"), "b"), Some("B"));
    }

    #[test]
    fn test_single_candidate_terminates() {
        let mut g = grid(&[
            &[None, None, Some("en")],
            &[Some("only"), Some("x"), Some("Only")],
        ]);
        let report = merge(&mut g, &translations(&[("en", "only:child", "Child")]));
        assert_eq!(report.rows_inserted, 1);
        assert_eq!(g.cell(3, 2), Some("child"));
    }

    #[test]
    fn test_squeezes_long_keys_into_existing_columns() {
        let mut g = grid(&[
            &[None, None, Some("en")],
            &[Some("a"), Some("b"), Some("AB")],
        ]);
        merge(&mut g, &translations(&[("en", "a:b:c:d", "ABCD")]));

        assert_eq!(g.cell(3, 1), Some("a"));
        assert_eq!(g.cell(3, 2), Some("b:c:d"));
        let read = read_translations(&g, &codec());
        assert_eq!(read.get(&culture("en"), "a:b:c:d"), Some("ABCD"));
    }

    #[test]
    fn test_squeezed_key_matches_on_second_merge() {
        let mut g = grid(&[&[None, None, Some("en")]]);
        let t = translations(&[("en", "a:b:c", "1")]);
        merge(&mut g, &t);
        let report = merge(&mut g, &t);
        assert_eq!(report.rows_updated, 1);
        assert_eq!(report.rows_inserted, 0);
    }

    // ==================== Column Tests ====================

    #[test]
    fn test_new_culture_appends_one_column() {
        let mut g = grid(&[
            &[None, Some("en"), Some("de")],
            &[Some("k1"), Some("one"), Some("eins")],
        ]);
        let report = merge(
            &mut g,
            &translations(&[("sv", "k1", "ett"), ("sv", "k2", "två"), ("en", "k2", "two")]),
        );

        assert_eq!(report.columns_added, 1);
        assert_eq!(g.cell(1, 2), Some("en"));
        assert_eq!(g.cell(1, 3), Some("de"));
        assert_eq!(g.cell(1, 4), Some("sv"));
        assert_eq!(g.cell(1, 5), None);
        assert_eq!(g.cell(2, 4), Some("ett"));
        assert_eq!(g.cell(3, 4), Some("två"));
    }

    #[test]
    fn test_new_column_skips_stray_cells() {
        let mut g = grid(&[
            &[None, Some("en")],
            &[Some("k"), Some("v"), Some("stray")],
        ]);
        merge(&mut g, &translations(&[("sv", "k", "w")]));

        assert_eq!(g.cell(1, 4), Some("sv"));
        assert_eq!(g.cell(2, 3), Some("stray"));
        assert_eq!(g.cell(2, 4), Some("w"));
    }

    #[test]
    fn test_decorated_header() {
        let mut g = MemoryGrid::new();
        merge_translations(&mut g, &translations(&[("sv", "k", "v")]), &codec(), true);
        assert_eq!(g.cell(1, 2), Some("Svenska (sv)"));
        assert_eq!(
            read_translations(&g, &codec()).get(&culture("sv"), "k"),
            Some("v")
        );
    }

    // ==================== Glossary Tests ====================

    #[test]
    fn test_glossary_keys_are_never_written() {
        let mut g = grid(&[
            &[None, Some("en")],
            &[Some("GLOSSARY"), Some("file")],
        ]);
        let mut t = read_translations(&g, &codec());
        t.insert(culture("en"), "GLOSSARY0", "changed");
        t.insert(culture("en"), "GLOSSARY7", "new");

        let report = merge(&mut g, &t);
        assert_eq!(report.glossary_skipped, 2);
        assert_eq!(report.rows_inserted, 0);
        assert_eq!(g.cell(2, 2), Some("file"));
    }

    #[test]
    fn test_glossary_row_is_not_a_match_candidate() {
        let mut g = grid(&[
            &[None, Some("en")],
            &[Some("GLOSSARY"), Some("file")],
        ]);
        let report = merge(&mut g, &translations(&[("en", "GLOSSARY", "plain key")]));
        assert_eq!(report.rows_inserted, 1);
        assert_eq!(g.cell(2, 2), Some("file"));
    }

    #[test]
    fn test_culture_header_in_first_column_keeps_keys_apart() {
        let mut g = grid(&[
            &[Some("en"), Some("sv")],
            &[Some("greeting"), Some("Hej")],
        ]);
        let before = read_translations(&g, &codec());
        assert_eq!(before.get(&culture("sv"), "greeting"), Some("Hej"));

        let report = merge(
            &mut g,
            &translations(&[("en", "greeting", "Hello"), ("sv", "greeting", "Hej")]),
        );
        assert_eq!(report.rows_updated, 1);
        assert_eq!(report.columns_added, 1);
        assert_eq!(g.cell(2, 1), Some("greeting"));
        assert_eq!(g.cell(2, 2), Some("Hej"));
        assert_eq!(g.cell(1, 3), Some("en"));
        assert_eq!(g.cell(2, 3), Some("Hello"));
    }

    // ==================== Find Bound Tests ====================

    /// Grid whose find-next cycles between two later hits and never comes back
    /// to the first one.
    #[derive(Debug)]
    struct NeverWraps {
        sheet: MemoryGrid,
        finds: std::cell::Cell<usize>,
    }

    impl Grid for NeverWraps {
        fn used_range(&self) -> UsedRange {
            self.sheet.used_range()
        }

        fn cell(&self, row: usize, column: usize) -> Option<&str> {
            self.sheet.cell(row, column)
        }

        fn find_next(&self, _what: &str, after: CellRef) -> Option<CellRef> {
            self.finds.set(self.finds.get() + 1);
            if after == CellRef::new(3, 1) {
                Some(CellRef::new(4, 1))
            } else {
                Some(CellRef::new(3, 1))
            }
        }

        fn insert_row_at(&mut self, row: usize) {
            self.sheet.insert_row_at(row);
        }

        fn write_cell(&mut self, row: usize, column: usize, value: &str) {
            self.sheet.write_cell(row, column, value);
        }

        fn save(&mut self) -> crate::error::Result<()> {
            Ok(())
        }

        fn save_as(&mut self, _path: &std::path::Path) -> crate::error::Result<()> {
            Ok(())
        }

        fn close(&mut self) -> crate::error::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_find_stops_at_hit_limit() {
        let mut g = NeverWraps {
            sheet: grid(&[
                &[None, None, Some("en")],
                &[Some("Menu"), Some("File"), Some("File")],
                &[Some("Menu"), Some("Edit"), Some("Edit")],
                &[Some("Menu"), Some("View"), Some("View")],
            ]),
            finds: std::cell::Cell::new(0),
        };
        let cells = g.used_range().cell_count();

        let report = merge_translations(
            &mut g,
            &translations(&[("en", "Menu:Help", "Help")]),
            &codec(),
            false,
        );

        assert_eq!(g.finds.get(), cells);
        assert_eq!(report.rows_inserted, 1);
        assert_eq!(g.cell(5, 1), Some("Menu"));
        assert_eq!(g.cell(5, 2), Some("Help"));
        assert_eq!(g.cell(5, 3), Some("Help"));
    }

    // ==================== Property Tests ====================

    fn key_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec("[A-Za-z][A-Za-z0-9]{0,5}", 1..4).prop_map(|parts| parts.join(":"))
    }

    fn dictionary_strategy() -> impl Strategy<Value = Translations> {
        let tags = prop::sample::select(vec!["en", "en-US", "sv", "de", "fr-CA"]);
        prop::collection::vec((tags, key_strategy(), "[a-z ]{1,12}"), 0..20).prop_map(|entries| {
            let mut translations = Translations::new();
            for (tag, key, text) in entries {
                translations.insert(culture(tag), key, text);
            }
            translations
        })
    }

    proptest! {
        #[test]
        fn prop_round_trip_through_empty_grid(t in dictionary_strategy()) {
            let mut g = MemoryGrid::new();
            merge(&mut g, &t);
            prop_assert_eq!(read_translations(&g, &codec()), t);
        }

        #[test]
        fn prop_second_merge_changes_nothing(t in dictionary_strategy()) {
            let mut g = MemoryGrid::new();
            merge(&mut g, &t);
            let snapshot = g.clone();
            let report = merge(&mut g, &t);
            prop_assert_eq!(report.rows_inserted, 0);
            prop_assert_eq!(report.columns_added, 0);
            prop_assert_eq!(g, snapshot);
        }
    }
}
