//! Error types for the phcurate library.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which table an edit addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// A single measurement row.
    Measurement,
    /// Every measurement of one sample group.
    Sample,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Measurement => write!(f, "per-measurement"),
            Granularity::Sample => write!(f, "per-sample"),
        }
    }
}

/// An edit or configuration rejected before any state was touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The field is not editable at this granularity.
    #[error("`{field}` cannot be set on a {granularity} basis")]
    UnknownField {
        granularity: Granularity,
        field: String,
    },

    /// The value does not have the type the field needs.
    #[error("Invalid value '{value}' for `{field}`: expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// No measurement carries this order key.
    #[error("Measurement {0} not found")]
    UnknownMeasurement(u32),

    /// No sample group carries this id.
    #[error("Sample group {0} not found")]
    UnknownSample(u32),

    /// Engine configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Main error type for phcurate operations.
#[derive(Debug, Error)]
pub enum PhcurateError {
    /// An edit or configuration failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The tables violate an invariant. Indicates a logic defect.
    #[error("Consistency fault: {0}")]
    Consistency(String),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing raw measurement records.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Empty file or no records to ingest.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Saving or loading a snapshot failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl PhcurateError {
    /// True when the caller can fix the request and retry.
    pub fn is_validation(&self) -> bool {
        matches!(self, PhcurateError::Validation(_))
    }

    /// True when an external collaborator (parser, filesystem, serializer) failed.
    pub fn is_collaborator(&self) -> bool {
        matches!(
            self,
            PhcurateError::Io { .. }
                | PhcurateError::Parse { .. }
                | PhcurateError::Csv(_)
                | PhcurateError::Json(_)
                | PhcurateError::EmptyData(_)
                | PhcurateError::Persistence(_)
                | PhcurateError::Regex(_)
        )
    }
}

/// Result type alias for phcurate operations.
pub type Result<T> = std::result::Result<T, PhcurateError>;
