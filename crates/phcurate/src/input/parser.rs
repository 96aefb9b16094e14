//! Delimited-text reader for raw measurement records.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::source::{Absorbance, RawRecord, SourceMetadata};
use crate::error::{PhcurateError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

const LABEL_COLUMNS: &[&str] = &["label", "sample_name", "name", "sample"];
const SALINITY_COLUMNS: &[&str] = &["salinity", "volume(35)"];
const TEMPERATURE_COLUMNS: &[&str] = &["temperature", "weight(25)"];
const ABS578_COLUMNS: &[&str] = &["abs578", "absorbance_578", "abs<578nm>"];
const ABS434_COLUMNS: &[&str] = &["abs434", "absorbance_434", "abs<434nm>"];
const ABS730_COLUMNS: &[&str] = &["abs730", "absorbance_730", "abs<730nm>"];
const INSTRUMENT_PH_COLUMNS: &[&str] = &["instrument_ph", "ph_instrument", "ph"];

/// Parser configuration.
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
}

impl ParserConfig {
    /// Force a delimiter instead of detecting one.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

/// Positions of the recognised columns in the header row.
#[derive(Debug)]
struct ColumnMap {
    label: usize,
    salinity: usize,
    temperature: usize,
    abs578: usize,
    abs434: usize,
    abs730: usize,
    instrument_ph: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |aliases: &[&str]| normalized.iter().position(|h| aliases.contains(&h.as_str()));
        let require = |aliases: &[&str]| {
            find(aliases).ok_or_else(|| PhcurateError::Parse {
                row: 0,
                column: 0,
                message: format!("Missing required column (one of: {})", aliases.join(", ")),
            })
        };

        Ok(Self {
            label: require(LABEL_COLUMNS)?,
            salinity: require(SALINITY_COLUMNS)?,
            temperature: require(TEMPERATURE_COLUMNS)?,
            abs578: require(ABS578_COLUMNS)?,
            abs434: require(ABS434_COLUMNS)?,
            abs730: require(ABS730_COLUMNS)?,
            instrument_ph: find(INSTRUMENT_PH_COLUMNS),
        })
    }
}

/// Reads raw measurement records from CSV/TSV files.
pub struct RecordParser {
    config: ParserConfig,
}

impl RecordParser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return its records in file order, with metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Vec<RawRecord>, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| PhcurateError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| PhcurateError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let records = self.parse_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        info!(
            path = %path.display(),
            records = records.len(),
            format = %format,
            "read raw measurement records"
        );

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            contents.len() as u64,
            format,
            records.len(),
        );

        Ok((records, metadata))
    }

    /// Parse bytes directly with a known delimiter.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Vec<RawRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(PhcurateError::EmptyData("No columns found".to_string()));
        }
        let columns = ColumnMap::from_headers(&headers)?;
        debug!(?columns, "resolved record columns");

        let mut records = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let row = row_idx + 1;
            let cell = |col: usize| record.get(col).unwrap_or("").trim();
            let number = |col: usize| parse_number(cell(col), row, col);

            let instrument_ph = match columns.instrument_ph {
                Some(col) if !cell(col).is_empty() => Some(number(col)?),
                _ => None,
            };

            records.push(RawRecord {
                label: cell(columns.label).to_string(),
                salinity: number(columns.salinity)?,
                temperature: number(columns.temperature)?,
                absorbance: Absorbance::new(
                    number(columns.abs578)?,
                    number(columns.abs434)?,
                    number(columns.abs730)?,
                ),
                instrument_ph,
            });
        }

        if records.is_empty() {
            return Err(PhcurateError::EmptyData("No data rows found".to_string()));
        }

        Ok(records)
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number(value: &str, row: usize, col: usize) -> Result<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PhcurateError::Parse {
            row,
            column: col + 1,
            message: format!("'{}' is not a finite number", value),
        })
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(PhcurateError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        // Consistent counts across lines beat raw frequency; tab breaks ties
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
