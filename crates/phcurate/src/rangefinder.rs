//! Replicate-consistency window detection.
//!
//! Given the replicate pH values of one sample, find the window of width
//! `cutoff` holding the most values and mark which inputs fall inside it.
//! The mask seeds the `good` flags at ingestion.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::stats;

/// Tuning for the window search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangefinderConfig {
    /// Width of the accepted window, in pH units.
    pub cutoff: f64,
    /// Smallest window (in values) that may be accepted.
    pub minimum_values: usize,
}

impl Default for RangefinderConfig {
    fn default() -> Self {
        Self {
            cutoff: 0.001,
            minimum_values: 3,
        }
    }
}

impl RangefinderConfig {
    pub fn new(cutoff: f64, minimum_values: usize) -> Self {
        Self {
            cutoff,
            minimum_values,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.cutoff.is_finite() || self.cutoff < 0.0 {
            return Err(ValidationError::InvalidConfig(format!(
                "rangefinder cutoff must be a non-negative number, got {}",
                self.cutoff
            ))
            .into());
        }
        Ok(())
    }

    /// Run the window search with this configuration.
    pub fn find(&self, values: &[f64]) -> Vec<bool> {
        find_window(values, self.cutoff, self.minimum_values)
    }
}

/// Select the most mutually consistent subset of `values`.
///
/// Returns a mask aligned with the input order. When no window reaches
/// `minimum_values`, or the best windows cannot be told apart, every value is
/// accepted.
pub fn find_window(values: &[f64], cutoff: f64, minimum_values: usize) -> Vec<bool> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut matches = Vec::with_capacity(sorted.len());
    let mut means = Vec::with_capacity(sorted.len());
    for (i, &v) in sorted.iter().enumerate() {
        matches.push(sorted[i + 1..].iter().filter(|&&x| x - v <= cutoff).count());
        let in_window: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|&x| x >= v && x <= v + cutoff)
            .collect();
        means.push(stats::mean(&in_window).unwrap_or(v));
    }

    let best = matches.iter().copied().max().unwrap_or(0);
    let required = minimum_values.saturating_sub(1);
    let candidates: Vec<usize> = (0..sorted.len())
        .filter(|&i| matches[i] == best && matches[i] >= required)
        .collect();

    let lower = match candidates.as_slice() {
        [] => return vec![true; values.len()],
        [only] => sorted[*only],
        _ => {
            let Some(median) = stats::median(values) else {
                return vec![true; values.len()];
            };
            let distance = |i: usize| (means[i] - median).abs();
            let closest = candidates
                .iter()
                .map(|&i| distance(i))
                .fold(f64::INFINITY, f64::min);
            let winners: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&i| distance(i) == closest)
                .collect();
            match winners.as_slice() {
                [only] => sorted[*only],
                _ => return vec![true; values.len()],
            }
        }
    };

    values
        .iter()
        .map(|&x| x >= lower && x <= lower + cutoff)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_outlier_excluded() {
        let mask = find_window(&[7.000, 7.001, 7.002, 7.050], 0.01, 2);
        assert_eq!(mask, vec![true, true, true, false]);
    }

    #[test]
    fn test_no_pair_within_cutoff_accepts_all() {
        let mask = find_window(&[1.0, 2.0, 3.0], 0.01, 2);
        assert_eq!(mask, vec![true, true, true]);
    }

    #[test]
    fn test_window_below_minimum_accepts_all() {
        // Best window holds two values but three are required
        let mask = find_window(&[7.0, 7.0005, 7.2, 7.4], 0.001, 3);
        assert_eq!(mask, vec![true; 4]);
    }

    #[test]
    fn test_tie_broken_by_distance_to_median() {
        // Candidates start at 1.0, 2.0 and 2.25; the 2.0 window mean is nearest the median
        let mask = find_window(&[2.25, 1.0, 2.75, 2.0, 1.25], 0.5, 2);
        assert_eq!(mask, vec![true, false, false, true, false]);
    }

    #[test]
    fn test_equidistant_tie_accepts_all() {
        // Known degenerate behavior: two equally good windows whose means sit
        // equally far from the median fall back to accepting everything.
        let mask = find_window(&[1.0, 1.25, 3.0, 3.25], 0.5, 2);
        assert_eq!(mask, vec![true; 4]);
    }

    #[test]
    fn test_mask_follows_input_order() {
        let mask = find_window(&[7.050, 7.002, 7.000, 7.001], 0.01, 2);
        assert_eq!(mask, vec![false, true, true, true]);
    }

    #[test]
    fn test_duplicates_share_window() {
        let mask = find_window(&[8.0, 8.0, 8.0, 9.0], 0.0, 2);
        assert_eq!(mask, vec![true, true, true, false]);
    }

    #[test]
    fn test_empty_and_single() {
        assert!(find_window(&[], 0.01, 2).is_empty());
        assert_eq!(find_window(&[7.9], 0.01, 2), vec![true]);
    }

    #[test]
    fn test_config_validation() {
        assert!(RangefinderConfig::default().validate().is_ok());
        assert!(RangefinderConfig::new(-0.1, 2).validate().is_err());
        assert!(RangefinderConfig::new(f64::NAN, 2).validate().is_err());
    }
}
