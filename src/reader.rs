//! Grid reader: materializes the dictionary from a grid's used range.

use crate::dictionary::Translations;
use crate::grid::{CellBlock, Grid};
use crate::key::KeyCodec;
use crate::schema::Schema;
use tracing::debug;

/// Column checked to tell comment rows from data rows.
const MARKER_COLUMN: usize = 2;

/// Read every translation row of `grid`.
///
/// Data starts at row 2 and ends at the first row whose first cell is null.
/// Glossary rows get sequential keys (`<tag>0`, `<tag>1`, ...) in read order. A
/// row whose marker cell is null and that carries no language text is a comment
/// row and is skipped. Null language cells produce no entry.
pub fn read_translations<G: Grid + ?Sized>(grid: &G, codec: &KeyCodec) -> Translations {
    let block = grid.read_used_range();
    let schema = Schema::discover(&block.header());
    read_block(&block, &schema, codec)
}

fn read_block(block: &CellBlock, schema: &Schema, codec: &KeyCodec) -> Translations {
    let mut translations = Translations::new();
    let mut glossary_count = 0;
    let mut skipped = 0;
    let mut row = 2;

    while let Some(first) = block.get(row, 1) {
        let key = if codec.is_glossary_cell(first) {
            let key = codec.glossary_key(glossary_count);
            glossary_count += 1;
            key
        } else if is_comment_row(block, schema, row) {
            debug!("Skipping comment row {}", row);
            skipped += 1;
            row += 1;
            continue;
        } else {
            codec.compose(&row_key_parts(block, row, schema.num_key_columns))
        };

        for (culture, column) in &schema.language_columns {
            if let Some(text) = block.get(row, *column) {
                translations.insert(culture.clone(), key.clone(), text);
            }
        }
        row += 1;
    }

    debug!(
        "Read {} entries over {} cultures ({} glossary rows, {} comment rows)",
        translations.len(),
        translations.culture_count(),
        glossary_count,
        skipped
    );
    translations
}

fn is_comment_row(block: &CellBlock, schema: &Schema, row: usize) -> bool {
    block.get(row, MARKER_COLUMN).is_none()
        && schema
            .language_columns
            .values()
            .all(|column| block.get(row, *column).is_none())
}

/// Key cells of a row: trailing nulls dropped, interior nulls read as "".
pub(crate) fn key_parts(mut cells: Vec<Option<&str>>) -> Vec<String> {
    while cells.len() > 1 && matches!(cells.last(), Some(None)) {
        cells.pop();
    }
    cells
        .into_iter()
        .map(|part| part.unwrap_or_default().to_string())
        .collect()
}

fn row_key_parts(block: &CellBlock, row: usize, num_key_columns: usize) -> Vec<String> {
    key_parts(
        (1..=num_key_columns.max(1))
            .map(|column| block.get(row, column))
            .collect(),
    )
}
