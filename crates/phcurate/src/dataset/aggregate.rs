//! Derivation of sample rows from measurement rows.

use tracing::warn;

use super::grouping::{group_ranges, member_range};
use super::measurement::Measurement;
use super::sample::SampleGroup;
use crate::chemistry::Chemistry;
use crate::error::{PhcurateError, Result};
use crate::stats;

/// pH statistics over the good members of a group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityStats {
    pub good_count: usize,
    pub ph: Option<f64>,
    pub ph_std: Option<f64>,
}

/// Good-member count and pH mean/dispersion for one group's members.
pub fn quality_stats(members: &[Measurement]) -> QualityStats {
    let good: Vec<f64> = members.iter().filter_map(Measurement::good_ph).collect();
    QualityStats {
        good_count: members.iter().filter(|m| m.good).count(),
        ph: stats::mean(&good),
        ph_std: stats::sample_std(&good),
    }
}

/// Build the sample row of `group_id`.
///
/// Fails with a consistency fault when the group has no members.
pub fn aggregate(
    measurements: &[Measurement],
    group_id: u32,
    chemistry: &dyn Chemistry,
) -> Result<SampleGroup> {
    let range = member_range(measurements, group_id).ok_or_else(|| {
        PhcurateError::Consistency(format!("Sample group {} has no members", group_id))
    })?;
    aggregate_members(group_id, &measurements[range], chemistry)
}

/// Build every sample row, in group order.
pub fn aggregate_all(
    measurements: &[Measurement],
    chemistry: &dyn Chemistry,
) -> Result<Vec<SampleGroup>> {
    group_ranges(measurements)
        .into_iter()
        .map(|(group_id, range)| aggregate_members(group_id, &measurements[range], chemistry))
        .collect()
}

fn aggregate_members(
    group_id: u32,
    members: &[Measurement],
    chemistry: &dyn Chemistry,
) -> Result<SampleGroup> {
    let first = members.first().ok_or_else(|| {
        PhcurateError::Consistency(format!("Sample group {} has no members", group_id))
    })?;

    if members
        .iter()
        .any(|m| m.classification != first.classification)
    {
        warn!(
            group_id,
            label = %first.label,
            "members disagree on classification, using the first member's"
        );
    }

    let salinities: Vec<f64> = members.iter().map(|m| m.salinity).collect();
    let temperatures: Vec<f64> = members.iter().map(|m| m.temperature).collect();
    let salinity = stats::mean(&salinities).unwrap_or(first.salinity);
    let temperature = stats::mean(&temperatures).unwrap_or(first.temperature);
    let quality = quality_stats(members);

    let expected_reference_ph = first
        .classification
        .is_reference()
        .then(|| chemistry.expected_reference_ph(temperature, salinity))
        .filter(|v| v.is_finite());

    Ok(SampleGroup {
        group_id,
        label: first.label.clone(),
        salinity,
        temperature,
        ph: quality.ph,
        ph_std: quality.ph_std,
        count: members.len(),
        good_count: quality.good_count,
        classification: first.classification,
        extra_indicator: members.iter().all(|m| m.extra_indicator),
        expected_reference_ph,
    })
}
