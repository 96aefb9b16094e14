//! The two tables: measurements and the sample groups derived from them.

mod aggregate;
mod grouping;
mod measurement;
mod sample;

pub use aggregate::{aggregate, aggregate_all, quality_stats, QualityStats};
pub use grouping::{group_ranges, member_range, regroup};
pub use measurement::{Classification, Measurement};
pub use sample::SampleGroup;
