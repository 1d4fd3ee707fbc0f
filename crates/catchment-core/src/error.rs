use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the catchment crates.
#[derive(Error, Debug)]
pub enum CatchmentError {
    /// A required field is absent from the raw input.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A record could not be turned into a timestamp or a number.
    ///
    /// `position` is the 1-based line number for file input, or the 0-based
    /// record index for in-memory input.
    #[error("Malformed input at {position}: {detail}")]
    MalformedInput { position: usize, detail: String },

    /// Normalisation hit a column whose maximum is zero or which holds no values.
    #[error("Cannot normalise column \"{column}\": maximum is zero or column has no values")]
    DegenerateColumn { column: String },

    /// A mean/max/min bucket had no values and the caller asked to fail on that.
    #[error("No data for column \"{column}\" on {date}")]
    EmptyReduction { column: String, date: NaiveDate },

    /// A daily reduction produced a value outside the `f64` range.
    #[error("Daily {reduction} of column \"{column}\" on {date} is out of range")]
    Overflow {
        column: String,
        date: NaiveDate,
        reduction: String,
    },

    /// A table was assembled with duplicate keys, duplicate labels, ragged rows
    /// or a non-finite cell.
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A delimited-text input could not be decoded.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A table could not be encoded as JSON.
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CatchmentError {
    pub fn malformed(position: usize, detail: impl Into<String>) -> Self {
        Self::MalformedInput {
            position,
            detail: detail.into(),
        }
    }
}

/// Convenience alias used throughout the catchment crates.
pub type Result<T> = std::result::Result<T, CatchmentError>;
