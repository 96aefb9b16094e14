//! Property-based tests for grouping, the rangefinder and the reconciler.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p phcurate --test property_tests
//!
//! # With more cases
//! PROPTEST_CASES=10000 cargo test -p phcurate --test property_tests
//! ```

use proptest::prelude::*;

use phcurate::dataset::{group_ranges, regroup};
use phcurate::{
    find_window, Absorbance, EditReconciler, EngineConfig, MeasurementEdit, RangefinderConfig,
    RawRecord, SampleEdit,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Labels from a small alphabet so that runs and merges are common.
fn label() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("TRIS".to_string()),
        Just("A".to_string()),
        Just("B".to_string()),
        Just("C".to_string()),
    ]
}

fn record() -> impl Strategy<Value = RawRecord> {
    (label(), 30.0..37.0f64, 15.0..30.0f64, 0.3..1.0f64, 0.3..0.7f64, 0.0..0.02f64).prop_map(
        |(label, salinity, temperature, a578, a434, a730)| {
            RawRecord::new(label, salinity, temperature, Absorbance::new(a578, a434, a730))
        },
    )
}

fn records() -> impl Strategy<Value = Vec<RawRecord>> {
    prop::collection::vec(record(), 1..40)
}

#[derive(Debug, Clone)]
enum Edit {
    Good(u32, bool),
    Relabel(u32, String),
    SampleTemperature(u32, f64),
    SampleLabel(u32, String),
    Autoflag(u32),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (1..40u32, any::<bool>()).prop_map(|(o, g)| Edit::Good(o, g)),
        (1..40u32, label()).prop_map(|(o, l)| Edit::Relabel(o, l)),
        (1..20u32, 10.0..30.0f64).prop_map(|(g, t)| Edit::SampleTemperature(g, t)),
        (1..20u32, label()).prop_map(|(g, l)| Edit::SampleLabel(g, l)),
        (1..20u32).prop_map(Edit::Autoflag),
    ]
}

fn apply(engine: &mut EditReconciler, edit: Edit) -> bool {
    let result = match edit {
        Edit::Good(order, good) => engine.edit_measurement(order, MeasurementEdit::Good(good)),
        Edit::Relabel(order, label) => engine.edit_measurement(order, MeasurementEdit::Label(label)),
        Edit::SampleTemperature(group, t) => engine.edit_sample(group, SampleEdit::Temperature(t)),
        Edit::SampleLabel(group, label) => engine.edit_sample(group, SampleEdit::Label(label)),
        Edit::Autoflag(group) => engine.autoflag_sample(group, RangefinderConfig::new(0.01, 2)),
    };
    result.is_ok()
}

// =============================================================================
// Grouping Properties
// =============================================================================

proptest! {
    /// Regrouping twice yields identical ids.
    #[test]
    fn regroup_is_idempotent(records in records()) {
        let engine = EditReconciler::ingest(records, EngineConfig::default()).unwrap();
        let mut table = engine.measurements().to_vec();
        let first = regroup(&mut table);
        let ids: Vec<u32> = table.iter().map(|m| m.group_id).collect();
        let second = regroup(&mut table);
        prop_assert_eq!(first, second);
        prop_assert_eq!(ids, table.iter().map(|m| m.group_id).collect::<Vec<_>>());
    }

    /// Group sizes partition the measurement table.
    #[test]
    fn groups_partition_measurements(records in records()) {
        let n = records.len();
        let engine = EditReconciler::ingest(records, EngineConfig::default()).unwrap();
        let total: usize = engine.samples().iter().map(|s| s.count).sum();
        prop_assert_eq!(total, n);
        prop_assert_eq!(group_ranges(engine.measurements()).len(), engine.samples().len());
        for (i, sample) in engine.samples().iter().enumerate() {
            prop_assert_eq!(sample.group_id as usize, i + 1);
        }
    }
}

// =============================================================================
// Rangefinder Properties
// =============================================================================

proptest! {
    /// The mask is aligned with the input and never empty for non-empty input.
    #[test]
    fn rangefinder_mask_shape(
        values in prop::collection::vec(7.0..8.5f64, 0..30),
        cutoff in 0.0..0.2f64,
        minimum in 0usize..6,
    ) {
        let mask = find_window(&values, cutoff, minimum);
        prop_assert_eq!(mask.len(), values.len());
        if !values.is_empty() {
            prop_assert!(mask.iter().any(|&keep| keep));
        }
    }

    /// Accepted values span at most the cutoff unless the fallback accepted everything.
    #[test]
    fn rangefinder_window_width(
        values in prop::collection::vec(7.0..8.5f64, 1..30),
        cutoff in 0.0..0.2f64,
    ) {
        let mask = find_window(&values, cutoff, 2);
        let kept: Vec<f64> = values.iter().zip(&mask).filter(|(_, k)| **k).map(|(&v, _)| v).collect();
        if kept.len() < values.len() {
            let lo = kept.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = kept.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(hi - lo <= cutoff + 1e-12);
        }
    }

    /// Shuffling the input permutes the mask the same way.
    #[test]
    fn rangefinder_is_order_independent(
        values in prop::collection::vec(7.0..8.5f64, 1..20),
        cutoff in 0.001..0.2f64,
    ) {
        let mask = find_window(&values, cutoff, 2);
        let reversed: Vec<f64> = values.iter().rev().cloned().collect();
        let mut reversed_mask = find_window(&reversed, cutoff, 2);
        reversed_mask.reverse();
        prop_assert_eq!(mask, reversed_mask);
    }
}

// =============================================================================
// Reconciler Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any sequence of edits keeps every table invariant.
    #[test]
    fn edits_preserve_invariants(
        records in records(),
        edits in prop::collection::vec(edit(), 0..15),
    ) {
        let mut engine = EditReconciler::ingest(records, EngineConfig::default()).unwrap();
        let mut applied = 0;
        for e in edits {
            if apply(&mut engine, e) {
                applied += 1;
            }
            prop_assert!(engine.verify().is_ok());
        }
        prop_assert_eq!(engine.revision(), applied);
        prop_assert_eq!(engine.history().len() as u64, applied);
    }

    /// A rejected edit leaves the engine exactly as it was.
    #[test]
    fn rejected_edits_change_nothing(records in records(), order in 100..200u32) {
        let mut engine = EditReconciler::ingest(records, EngineConfig::default()).unwrap();
        let before = engine.snapshot();
        prop_assert!(engine.edit_measurement(order, MeasurementEdit::Good(false)).is_err());
        prop_assert!(engine.edit_sample(order, SampleEdit::Salinity(35.0)).is_err());
        prop_assert_eq!(engine.snapshot(), before);
    }
}
