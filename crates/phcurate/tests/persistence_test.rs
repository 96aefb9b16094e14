//! Snapshot persistence tests.

use tempfile::TempDir;

use phcurate::{
    Absorbance, DyeCorrection, EditReconciler, EngineConfig, PhcurateError, RawRecord,
    SampleEdit, Snapshot,
};

fn records() -> Vec<RawRecord> {
    vec![
        RawRecord::new("TRIS", 35.0, 25.0, Absorbance::new(0.8400, 0.5200, 0.0100)),
        RawRecord::new("TRIS", 35.0, 25.0, Absorbance::new(0.8413, 0.5200, 0.0100))
            .with_instrument_ph(8.091),
        RawRecord::new("S-1", 33.7, 21.3, Absorbance::new(0.6137, 0.4981, 0.0073)),
        RawRecord::new("S-1", 33.7, 21.3, Absorbance::new(0.6141, 0.4979, 0.0071)),
        // ratio below the indicator limit, so no pH
        RawRecord::new("S-2", 34.0, 22.0, Absorbance::new(0.0010, 0.5000, 0.0000)),
    ]
}

fn engine() -> EditReconciler {
    let config = EngineConfig::default().with_dye(0.0034, -0.0121);
    EditReconciler::ingest(records(), config).unwrap()
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_round_trip_reproduces_tables_exactly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.phcurate.json");

    let mut original = engine();
    original.edit_measurement_field(4, "good", "false").unwrap();
    original.edit_sample(2, SampleEdit::Temperature(21.7)).unwrap();
    original.snapshot().save(&path).unwrap();

    let restored = EditReconciler::restore(Snapshot::load(&path).unwrap()).unwrap();

    assert_eq!(restored.measurements(), original.measurements());
    assert_eq!(restored.samples(), original.samples());
    for (a, b) in restored.measurements().iter().zip(original.measurements()) {
        assert_eq!(a.ph.map(f64::to_bits), b.ph.map(f64::to_bits));
    }
    assert_eq!(restored.config().dye, DyeCorrection::new(0.0034, -0.0121));
    assert_eq!(restored.revision(), 2);
    assert_eq!(restored.history(), original.history());
}

#[test]
fn test_undefined_values_survive_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.phcurate.json");

    let original = engine();
    assert_eq!(original.sample(3).unwrap().ph, None);
    original.snapshot().save(&path).unwrap();

    let restored = EditReconciler::restore(Snapshot::load(&path).unwrap()).unwrap();
    assert_eq!(restored.sample(3).unwrap().ph, None);
    assert_eq!(restored.measurements()[1].instrument_ph, Some(8.091));
}

#[test]
fn test_restored_engine_accepts_edits() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.phcurate.json");
    engine().snapshot().save(&path).unwrap();

    let mut restored = EditReconciler::restore(Snapshot::load(&path).unwrap()).unwrap();
    restored.edit_sample_field(2, "label", "TRIS").unwrap();

    assert_eq!(restored.samples().len(), 2);
    assert_eq!(restored.sample(1).unwrap().count, 4);
    assert_eq!(restored.revision(), 1);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = Snapshot::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, PhcurateError::Persistence(_)));
}

#[test]
fn test_restore_rejects_unknown_version() {
    let mut snapshot = engine().snapshot();
    snapshot.format_version = "0.1".to_string();
    let err = EditReconciler::restore(snapshot).unwrap_err();
    assert!(matches!(err, PhcurateError::Persistence(_)));
}

#[test]
fn test_restore_rejects_tampered_tables() {
    let mut snapshot = engine().snapshot();
    snapshot.measurements[0].group_id = 2;
    let err = EditReconciler::restore(snapshot).unwrap_err();
    assert!(matches!(err, PhcurateError::Consistency(_)));
}

// =============================================================================
// History Tests
// =============================================================================

#[test]
fn test_save_with_history() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.phcurate.json");

    let mut engine = engine();
    engine.snapshot().save_with_history(&path).unwrap();
    assert!(Snapshot::list_history(&path).unwrap().is_empty());

    engine.edit_sample_field(1, "extra_indicator", "true").unwrap();
    engine.snapshot().save_with_history(&path).unwrap();
    engine.edit_sample_field(1, "extra_indicator", "false").unwrap();
    engine.snapshot().save_with_history(&path).unwrap();

    let history = Snapshot::list_history(&path).unwrap();
    assert_eq!(history.len(), 2);

    let newest = Snapshot::load_history(&path, 0).unwrap();
    assert_eq!(newest.revision, 1);
    let oldest = Snapshot::load_history(&path, 1).unwrap();
    assert_eq!(oldest.revision, 0);

    assert_eq!(Snapshot::load(&path).unwrap().revision, 2);
    assert!(Snapshot::load_history(&path, 5).is_err());
}

#[test]
fn test_failed_save_leaves_previous_snapshot_intact() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.phcurate.json");
    let blocked = dir.path().join("blocked.phcurate.json");
    std::fs::create_dir(&blocked).unwrap();
    std::fs::write(blocked.join("keep"), b"x").unwrap();

    let mut engine = engine();
    engine.snapshot().save(&path).unwrap();
    let saved = std::fs::read(&path).unwrap();

    engine.edit_sample(2, SampleEdit::Salinity(30.0)).unwrap();
    let err = engine.snapshot().save(&blocked).unwrap_err();
    assert!(matches!(err, PhcurateError::Persistence(_)));

    assert_eq!(std::fs::read(&path).unwrap(), saved);
    let mut entries: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["blocked.phcurate.json", "run.phcurate.json"]);
    assert_eq!(Snapshot::load(&path).unwrap().revision, 0);
}
