//! Run-length grouping of measurements by label.

use std::ops::Range;

use indexmap::IndexMap;

use super::measurement::Measurement;

/// Assign group ids in place and return the number of groups.
///
/// Ids start at 1 and increase exactly where a label differs from the
/// previous row's label. Rows are never reordered, so two separated runs of
/// the same label stay distinct groups.
pub fn regroup(measurements: &mut [Measurement]) -> u32 {
    let mut group_id = 0;
    for i in 0..measurements.len() {
        if i == 0 || measurements[i].label != measurements[i - 1].label {
            group_id += 1;
        }
        measurements[i].group_id = group_id;
    }
    group_id
}

/// Row ranges of every group, in group order.
pub fn group_ranges(measurements: &[Measurement]) -> IndexMap<u32, Range<usize>> {
    let mut ranges: IndexMap<u32, Range<usize>> = IndexMap::new();
    for (i, m) in measurements.iter().enumerate() {
        ranges
            .entry(m.group_id)
            .and_modify(|r| r.end = i + 1)
            .or_insert(i..i + 1);
    }
    ranges
}

/// Row range of one group. Relies on group ids being non-decreasing.
pub fn member_range(measurements: &[Measurement], group_id: u32) -> Option<Range<usize>> {
    let start = measurements.partition_point(|m| m.group_id < group_id);
    let end = measurements.partition_point(|m| m.group_id <= group_id);
    if start < end { Some(start..end) } else { None }
}
