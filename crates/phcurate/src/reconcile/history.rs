//! Edit history and change notices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::edit::{MeasurementEdit, SampleEdit};
use crate::chemistry::DyeCorrection;
use crate::rangefinder::RangefinderConfig;

/// What an applied edit addressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditTarget {
    /// A single measurement, by order key.
    Measurement { order: u32, edit: MeasurementEdit },
    /// A whole sample group, by the id it had when edited.
    Sample { group_id: u32, edit: SampleEdit },
    /// Good flags rewritten by the rangefinder.
    Autoflag {
        #[serde(skip_serializing_if = "Option::is_none")]
        group_id: Option<u32>,
        config: RangefinderConfig,
        excluded: usize,
    },
    /// New dye correction applied to every measurement.
    DyeCorrection { dye: DyeCorrection },
}

/// A successfully applied edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRecord {
    /// Identifier derived from the revision.
    pub id: String,
    /// Engine revision this edit produced.
    pub revision: u64,
    /// When the edit was applied.
    pub at: DateTime<Utc>,
    /// What was edited.
    pub target: EditTarget,
}

impl EditRecord {
    pub fn new(revision: u64, target: EditTarget) -> Self {
        Self {
            id: format!("edit_{:03}", revision),
            revision,
            at: Utc::now(),
            target,
        }
    }
}

/// Which part of the sample table a change touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ChangeScope {
    /// One group was recomputed in place; ids are unchanged.
    Group { group_id: u32 },
    /// Group ids were reassigned and every sample row rebuilt.
    Regrouped { groups: usize },
    /// Every sample row was rebuilt with ids unchanged.
    All,
}

/// Sent to subscribers after every successful edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotice {
    /// Revision after the edit.
    pub revision: u64,
    /// Extent of the change.
    pub scope: ChangeScope,
}
