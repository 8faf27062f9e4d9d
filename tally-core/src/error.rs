use std::path::PathBuf;
use thiserror::Error;

use crate::finance::Field;
use crate::month::YearMonth;

/// All errors produced by the tally pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// A required field has no matching column in a source.
    #[error("{source_tag}: no column for {field} (columns: {})", columns.join(", "))]
    Schema {
        source_tag: String,
        field: Field,
        columns: Vec<String>,
    },

    /// A located field holds a value that cannot be converted.
    #[error("{source_tag} line {line}: cannot parse {field} from {value:?}: {reason}")]
    Parse {
        source_tag: String,
        line: usize,
        field: Field,
        value: String,
        reason: String,
    },

    /// The rule set or another configuration value is structurally invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The pipeline was started without any source input.
    #[error("No source inputs given")]
    EmptyInput,

    /// The month filter kept nothing.
    #[error("No transactions dated in {0}")]
    NoDataForMonth(YearMonth),

    /// A file could not be opened, read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV layer rejected a file.
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Row-level errors are the only kind a best-effort run may skip past.
    pub fn is_row_level(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}

/// Convenience alias used throughout the tally crates.
pub type Result<T> = std::result::Result<T, Error>;
