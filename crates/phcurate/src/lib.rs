//! phcurate: replicate reconciliation for spectrophotometric pH measurements.
//!
//! An instrument run is a sequence of readings. Consecutive readings with the
//! same label are replicates of one sample. phcurate keeps two tables in step:
//! the measurement table, which the analyst edits, and the sample table,
//! which is always derived from it.
//!
//! # Core Principles
//!
//! - **Derived, never stored by hand**: every sample row is recomputed from its members
//! - **Atomic edits**: a rejected edit leaves both tables untouched
//! - **Full provenance**: every applied edit is recorded in the history
//!
//! # Example
//!
//! ```no_run
//! use phcurate::{EditReconciler, EngineConfig, RangefinderConfig};
//!
//! let config = EngineConfig::default().with_autoflag(RangefinderConfig::default());
//! let mut engine = EditReconciler::from_file("run_042.csv", config).unwrap();
//!
//! engine.edit_measurement_field(4, "good", "false").unwrap();
//! for sample in engine.samples() {
//!     println!("{} {:?}", sample.label, sample.ph);
//! }
//! ```

pub mod chemistry;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod input;
pub mod persistence;
pub mod rangefinder;
pub mod reconcile;
pub mod stats;

pub use chemistry::{Chemistry, DyeCorrection, MCresolPurple};
pub use config::{ClassifierConfig, EngineConfig, LabelClassifier};
pub use dataset::{Classification, Measurement, SampleGroup};
pub use error::{Granularity, PhcurateError, Result, ValidationError};
pub use export::{export_tables, ExportFormat};
pub use input::{Absorbance, ParserConfig, RawRecord, RecordParser, SourceMetadata};
pub use persistence::{snapshot_path, Snapshot};
pub use rangefinder::{find_window, RangefinderConfig};
pub use reconcile::{
    ChangeNotice, ChangeScope, EditReconciler, EditRecord, EditTarget, MeasurementEdit, SampleEdit,
};
