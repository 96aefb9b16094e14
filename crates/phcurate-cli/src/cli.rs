//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use phcurate::ExportFormat;
use std::path::PathBuf;

/// phcurate: replicate curation for spectrophotometric pH measurements
#[derive(Parser)]
#[command(name = "phcurate")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read an instrument export and create a snapshot
    Ingest {
        /// Path to the instrument export (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path for the snapshot (default: <file>.phcurate.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Intercept of the dye impurity correction
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        dye_intercept: f64,

        /// Slope of the dye impurity correction
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        dye_slope: f64,

        /// Seed good flags with the rangefinder using this window width
        #[arg(long)]
        cutoff: Option<f64>,

        /// Smallest window the rangefinder may accept
        #[arg(long, default_value_t = 3)]
        min_values: usize,

        /// Keep per-reading salinity and temperature instead of group medians
        #[arg(long)]
        no_uniform_covariates: bool,

        /// Field delimiter (default: auto-detect)
        #[arg(long)]
        delimiter: Option<char>,
    },

    /// Show the sample table of a snapshot
    Status {
        /// Path to snapshot or data file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit one measurement (fields: label, good)
    EditMeasurement {
        /// Path to snapshot or data file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Order key of the measurement
        #[arg(long)]
        order: u32,

        /// Field to set
        #[arg(long)]
        field: String,

        /// New value
        #[arg(long, allow_hyphen_values = true)]
        value: String,
    },

    /// Edit every measurement of a sample
    /// (fields: salinity, temperature, classification, extra_indicator, label)
    EditSample {
        /// Path to snapshot or data file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Sample group id
        #[arg(long)]
        group: u32,

        /// Field to set
        #[arg(long)]
        field: String,

        /// New value
        #[arg(long, allow_hyphen_values = true)]
        value: String,
    },

    /// Reseed good flags with the rangefinder
    Autoflag {
        /// Path to snapshot or data file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Only this sample group (default: every group)
        #[arg(long)]
        group: Option<u32>,

        /// Window width in pH units
        #[arg(long, default_value_t = 0.001)]
        cutoff: f64,

        /// Smallest window that may be accepted
        #[arg(long, default_value_t = 3)]
        min_values: usize,
    },

    /// Export the measurement and sample tables
    Export {
        /// Path to snapshot or data file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output directory (default: next to the snapshot)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,
    },
}
