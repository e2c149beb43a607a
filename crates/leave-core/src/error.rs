use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// All errors produced by the leave dashboard.
#[derive(Error, Debug)]
pub enum LeaveError {
    /// The leave data file does not exist.
    #[error("The file '{}' was not found.", .0.display())]
    MissingSource(PathBuf),

    /// One or more required columns are absent from the header row.
    #[error("Missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A single record could not be turned into a leave row.
    #[error("Invalid record on line {line}: {message}")]
    Data { line: usize, message: String },

    /// A leave range ends before it starts.
    #[error("End date {end} is before start date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A spreadsheet workbook could not be opened or has no worksheet.
    #[error("Failed to read workbook {}: {message}", .path.display())]
    Workbook { path: PathBuf, message: String },

    /// The CSV reader rejected the input.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience alias used throughout the leave crates.
pub type Result<T> = std::result::Result<T, LeaveError>;
