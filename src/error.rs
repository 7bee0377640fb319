//! Error taxonomy for sensitizing-rule analysis.
//!
//! Every failure is a validation failure: it is terminal for the current
//! analysis and surfaces as a typed value, never as a panic.

use thiserror::Error;

/// Errors raised while ingesting, selecting, or normalizing a measurement column.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpcError {
    /// The requested column is absent from the source data.
    #[error("Column '{column}' not found. Available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// Fewer than two non-missing values; sample std dev is undefined.
    #[error("Need at least 2 non-missing values to compute std dev (found {found}).")]
    InsufficientData { found: usize },

    /// Sample standard deviation is zero or not finite.
    #[error("Standard deviation is 0/NaN; z-scores are undefined (std = {std}).")]
    DegenerateVariance { std: f64 },

    /// Source data has no header row.
    #[error("Input contains no header row")]
    EmptyInput,

    /// A data row has more fields than the header.
    #[error("Malformed row at line {line}: expected at most {expected} fields, found {found}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A non-missing field in the selected column is not a finite number.
    #[error("Invalid value '{value}' in column '{column}' at line {line}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpcError>;
