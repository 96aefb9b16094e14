//! Edit reconciliation.
//!
//! [`EditReconciler`] owns the measurement and sample tables of one dataset.
//! Edits come in at two granularities: [`MeasurementEdit`] for a single
//! reading and [`SampleEdit`] for every reading of a sample group. After each
//! successful edit every sample row is again a pure function of its members.
//!
//! # Usage
//!
//! ```no_run
//! use phcurate::{EditReconciler, EngineConfig};
//!
//! let mut engine = EditReconciler::from_file("run_042.csv", EngineConfig::default()).unwrap();
//!
//! // Exclude one reading, then fix a mistyped label
//! engine.edit_measurement_field(7, "good", "false").unwrap();
//! engine.edit_sample_field(3, "label", "CTD2-05").unwrap();
//!
//! engine.snapshot().save("run_042.phcurate.json").unwrap();
//! ```

mod edit;
mod engine;
mod history;

pub use edit::{MeasurementEdit, SampleEdit};
pub use engine::EditReconciler;
pub use history::{ChangeNotice, ChangeScope, EditRecord, EditTarget};
