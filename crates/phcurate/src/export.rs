//! Table export to delimited text or JSON.

use std::fmt;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::dataset::{Classification, Measurement, SampleGroup};
use crate::error::{PhcurateError, Result};
use crate::reconcile::EditReconciler;

/// Output format for exported tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            ExportFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" | "tab" => Ok(ExportFormat::Tsv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("Unknown export format: {} (expected csv, tsv or json)", s)),
        }
    }
}

/// Flat measurement row; undefined values become empty cells.
#[derive(Serialize)]
struct MeasurementRow<'a> {
    order: u32,
    group_id: u32,
    label: &'a str,
    salinity: f64,
    temperature: f64,
    a578: f64,
    a434: f64,
    a730: f64,
    ph: Option<f64>,
    instrument_ph: Option<f64>,
    good: bool,
    classification: Classification,
    extra_indicator: bool,
}

impl<'a> From<&'a Measurement> for MeasurementRow<'a> {
    fn from(m: &'a Measurement) -> Self {
        Self {
            order: m.order,
            group_id: m.group_id,
            label: &m.label,
            salinity: m.salinity,
            temperature: m.temperature,
            a578: m.absorbance.a578,
            a434: m.absorbance.a434,
            a730: m.absorbance.a730,
            ph: m.ph,
            instrument_ph: m.instrument_ph,
            good: m.good,
            classification: m.classification,
            extra_indicator: m.extra_indicator,
        }
    }
}

#[derive(Serialize)]
struct SampleRow<'a> {
    group_id: u32,
    label: &'a str,
    salinity: f64,
    temperature: f64,
    ph: Option<f64>,
    ph_std: Option<f64>,
    count: usize,
    good_count: usize,
    classification: Classification,
    extra_indicator: bool,
    expected_reference_ph: Option<f64>,
    reference_offset: Option<f64>,
}

impl<'a> From<&'a SampleGroup> for SampleRow<'a> {
    fn from(s: &'a SampleGroup) -> Self {
        Self {
            group_id: s.group_id,
            label: &s.label,
            salinity: s.salinity,
            temperature: s.temperature,
            ph: s.ph,
            ph_std: s.ph_std,
            count: s.count,
            good_count: s.good_count,
            classification: s.classification,
            extra_indicator: s.extra_indicator,
            expected_reference_ph: s.expected_reference_ph,
            reference_offset: s.reference_offset(),
        }
    }
}

/// Write the measurement table as delimited text with a header row.
pub fn write_measurements<W: Write>(
    writer: W,
    measurements: &[Measurement],
    delimiter: u8,
) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    for m in measurements {
        wtr.serialize(MeasurementRow::from(m))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write the sample table as delimited text with a header row.
pub fn write_samples<W: Write>(writer: W, samples: &[SampleGroup], delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    for s in samples {
        wtr.serialize(SampleRow::from(s))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[derive(Serialize)]
struct JsonTables<'a> {
    measurements: Vec<MeasurementRow<'a>>,
    samples: Vec<SampleRow<'a>>,
}

/// Write both tables of an engine into `dir`.
///
/// Delimited formats produce `<stem>_measurements.<ext>` and
/// `<stem>_samples.<ext>`; JSON produces a single `<stem>_tables.json`.
/// Returns the written paths.
pub fn export_tables(
    engine: &EditReconciler,
    dir: impl AsRef<Path>,
    stem: &str,
    format: ExportFormat,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| PhcurateError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let written = match format {
        ExportFormat::Json => {
            let path = dir.join(format!("{}_tables.json", stem));
            let tables = JsonTables {
                measurements: engine.measurements().iter().map(MeasurementRow::from).collect(),
                samples: engine.samples().iter().map(SampleRow::from).collect(),
            };
            write_atomic(&path, |w| {
                serde_json::to_writer_pretty(w, &tables)?;
                Ok(())
            })?;
            vec![path]
        }
        ExportFormat::Csv | ExportFormat::Tsv => {
            let delimiter = format.delimiter();
            let ext = format.extension();
            let measurements = dir.join(format!("{}_measurements.{}", stem, ext));
            let samples = dir.join(format!("{}_samples.{}", stem, ext));
            write_atomic(&measurements, |w| {
                write_measurements(w, engine.measurements(), delimiter)
            })?;
            write_atomic(&samples, |w| write_samples(w, engine.samples(), delimiter))?;
            vec![measurements, samples]
        }
    };

    info!(files = written.len(), %format, "exported tables");
    Ok(written)
}

fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<()>,
{
    let parent = path.parent().unwrap_or(Path::new("."));
    let io_err = |source| PhcurateError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut temp = NamedTempFile::new_in(parent).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(&mut temp);
        write(&mut writer)?;
        writer.flush().map_err(io_err)?;
    }
    temp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
