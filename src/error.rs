//! Error taxonomy for the localization store.
//!
//! Column-level anomalies (unrecognised headers, comment rows) never reach this
//! type: they are skipped where they are found. Everything here is surfaced to
//! the caller, who decides whether to recreate the grid or abort.

use crate::store::StoreStatus;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the localization store and its collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A culture tag that does not name any known culture.
    #[error("Invalid culture tag: '{0}'")]
    InvalidCultureTag(String),

    /// `update` was called with a blank key, or one whose first or last part
    /// is empty.
    #[error("A key with non-empty first and last parts is required")]
    KeyRequired,

    /// `update` was given empty text, which a grid cannot tell apart from a
    /// missing translation.
    #[error("Empty text for key '{key}' in culture {culture}")]
    EmptyText { key: String, culture: String },

    /// The grid file exists but cannot be read as a grid.
    #[error("Grid at {path} is not readable: {reason}")]
    GridFormat { path: PathBuf, reason: String },

    /// The dictionary was accessed while the store was not ready.
    #[error("Localization store is not initialized (status: {0:?})")]
    NotInitialized(StoreStatus),

    /// `initialize` was called outside a Tokio runtime.
    #[error("Background load requires a Tokio runtime")]
    NoRuntime,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience alias used across the crate.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;
