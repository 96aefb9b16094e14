//! Fuzz target for the record parser.
//!
//! Malformed instrument exports must produce an error, never a panic, and
//! anything that parses must ingest into consistent tables.

#![no_main]

use libfuzzer_sys::fuzz_target;
use phcurate::{EditReconciler, EngineConfig, RecordParser};
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok(mut temp_file) = tempfile::NamedTempFile::new() {
        if temp_file.write_all(data).is_ok() {
            let parser = RecordParser::new();
            if let Ok((records, _)) = parser.parse_file(temp_file.path()) {
                if let Ok(engine) = EditReconciler::ingest(records, EngineConfig::default()) {
                    assert!(engine.verify().is_ok());
                }
            }
        }
    }
});
