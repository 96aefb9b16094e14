//! Raw measurement records and source metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Absorbances read by the instrument at the three indicator wavelengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Absorbance {
    /// Absorbance at 578 nm (base form peak).
    pub a578: f64,
    /// Absorbance at 434 nm (acid form peak).
    pub a434: f64,
    /// Absorbance at 730 nm (baseline).
    pub a730: f64,
}

impl Absorbance {
    pub fn new(a578: f64, a434: f64, a730: f64) -> Self {
        Self { a578, a434, a730 }
    }
}

/// One instrument reading, in instrument order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Sample label typed at the instrument.
    pub label: String,
    /// Practical salinity entered for the reading.
    pub salinity: f64,
    /// Analysis temperature in °C.
    pub temperature: f64,
    /// Measured absorbances.
    pub absorbance: Absorbance,
    /// pH reported by the instrument itself, if present in the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument_ph: Option<f64>,
}

impl RawRecord {
    /// Create a record without an instrument pH.
    pub fn new(
        label: impl Into<String>,
        salinity: f64,
        temperature: f64,
        absorbance: Absorbance,
    ) -> Self {
        Self {
            label: label.into(),
            salinity,
            temperature,
            absorbance,
            instrument_ph: None,
        }
    }

    /// Attach the instrument-reported pH.
    pub fn with_instrument_ph(mut self, ph: f64) -> Self {
        self.instrument_ph = Some(ph);
        self
    }
}

/// Metadata about the ingested data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of records read.
    pub row_count: usize,
    /// When the file was ingested.
    pub ingested_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has just been read.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            ingested_at: Utc::now(),
        }
    }
}
