//! Error types for bizdash imports.

use thiserror::Error;

use crate::entity::VALID_UNITS;

/// Errors that abort an import before any row is processed.
#[derive(Error, Debug)]
pub enum BizdashError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Please select a CSV file (got '{0}')")]
    InvalidFileType(String),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whole-file structural problems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("CSV file must have a header row and at least one data row")]
    TooFewLines,

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Per-row field problems. The row is recorded as failed and the import goes on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid unit \"{0}\". Must be one of: {units}", units = VALID_UNITS.join(", "))]
    InvalidUnit(String),
}

/// Result type alias for bizdash operations.
pub type BizdashResult<T> = Result<T, BizdashError>;
