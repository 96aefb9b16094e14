//! Sample group rows.

use serde::{Deserialize, Serialize};

use super::measurement::Classification;

/// Summary of one contiguous run of equally labelled measurements.
///
/// Every field is a pure function of the member measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleGroup {
    /// Run index, starting at 1.
    pub group_id: u32,
    /// Label of the first member.
    pub label: String,
    /// Mean salinity of all members.
    pub salinity: f64,
    /// Mean temperature of all members.
    pub temperature: f64,
    /// Mean pH of good members; `None` when no good member has a pH.
    pub ph: Option<f64>,
    /// Sample standard deviation of the same values; needs two of them.
    pub ph_std: Option<f64>,
    /// Number of members.
    pub count: usize,
    /// Number of members flagged good.
    pub good_count: usize,
    /// Classification of the first member.
    pub classification: Classification,
    /// True when every member carries the extra-indicator flag.
    pub extra_indicator: bool,
    /// Expected pH of a reference group; `None` for ordinary groups or when not finite.
    pub expected_reference_ph: Option<f64>,
}

impl SampleGroup {
    /// Measured minus expected pH for reference groups.
    pub fn reference_offset(&self) -> Option<f64> {
        Some(self.ph? - self.expected_reference_ph?)
    }

    /// Number of members excluded from the statistics.
    pub fn bad_count(&self) -> usize {
        self.count - self.good_count
    }
}
