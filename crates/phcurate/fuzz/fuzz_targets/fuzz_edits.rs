//! Fuzz target for edit sequences.
//!
//! Arbitrary labels and edits must leave the tables consistent after every
//! accepted or rejected edit.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use phcurate::{Absorbance, EditReconciler, EngineConfig, RangefinderConfig, RawRecord};

#[derive(Debug, Arbitrary)]
struct Reading {
    label: u8,
    a578: u16,
    a434: u16,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Measurement { order: u8, field: String, value: String },
    Sample { group_id: u8, field: String, value: String },
    Autoflag { group_id: u8, cutoff: u16, minimum: u8 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    readings: Vec<Reading>,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    if input.readings.is_empty() || input.readings.len() > 200 || input.ops.len() > 50 {
        return;
    }

    let records = input
        .readings
        .iter()
        .map(|r| {
            RawRecord::new(
                format!("S{}", r.label % 8),
                35.0,
                25.0,
                Absorbance::new(f64::from(r.a578) / 1000.0, f64::from(r.a434) / 1000.0, 0.0),
            )
        })
        .collect();

    let Ok(mut engine) = EditReconciler::ingest(records, EngineConfig::default()) else {
        return;
    };

    for op in input.ops {
        let _ = match op {
            Op::Measurement { order, field, value } => {
                engine.edit_measurement_field(u32::from(order), &field, &value)
            }
            Op::Sample { group_id, field, value } => {
                engine.edit_sample_field(u32::from(group_id), &field, &value)
            }
            Op::Autoflag { group_id, cutoff, minimum } => engine.autoflag_sample(
                u32::from(group_id),
                RangefinderConfig::new(f64::from(cutoff) / 10_000.0, usize::from(minimum)),
            ),
        };
        assert!(engine.verify().is_ok());
    }
});
