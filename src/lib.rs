//! Localization dictionary persisted in a spreadsheet-shaped grid.
//!
//! Translations are read from a grid whose header row names the cultures, kept
//! in memory as `culture -> key -> text`, and merged back into the grid in place
//! so that unrelated rows, comments and glossary entries are left alone.

pub mod config;
pub mod dictionary;
pub mod display;
pub mod error;
pub mod grid;
pub mod i18n;
pub mod key;
pub mod reader;
pub mod schema;
pub mod store;
pub mod writer;

pub use config::StoreConfig;
pub use dictionary::Translations;
pub use error::{Result, StoreError};
pub use i18n::Culture;
pub use store::{LocalizationStore, StoreStatus};
pub use writer::MergeReport;
