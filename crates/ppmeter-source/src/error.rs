//! Error types for sample sources

use thiserror::Error;

/// Sample source errors
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: expected at least 2 columns, found {found}")]
    MissingColumns { line: u64, found: usize },

    #[error("Line {line}, column {column}: not a number: {value:?}")]
    InvalidNumber {
        line: u64,
        column: usize,
        value: String,
    },

    #[error("Invalid timestamp {line:?}: {source}")]
    Timestamp {
        line: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Result type for sample sources
pub type SourceResult<T> = Result<T, SourceError>;
