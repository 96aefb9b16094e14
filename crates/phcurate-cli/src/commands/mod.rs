//! CLI command implementations.

pub mod autoflag;
pub mod edit;
pub mod export;
pub mod ingest;
pub mod status;

use std::path::{Path, PathBuf};

use phcurate::{snapshot_path, EditReconciler, Snapshot};

/// Accept either a snapshot or the data file it was created from.
pub fn resolve_snapshot(file: &Path) -> PathBuf {
    if file.extension().is_some_and(|e| e == "json") {
        file.to_path_buf()
    } else {
        snapshot_path(file)
    }
}

/// Load and verify the engine stored at `file`.
pub fn load_engine(file: &Path) -> Result<(PathBuf, EditReconciler), Box<dyn std::error::Error>> {
    let path = resolve_snapshot(file);
    if !path.exists() {
        return Err(format!(
            "Snapshot not found: {}\nRun 'phcurate ingest {}' first.",
            path.display(),
            file.display()
        )
        .into());
    }
    let engine = EditReconciler::restore(Snapshot::load(&path)?)?;
    Ok((path, engine))
}

/// Format an optional value, or a dash when undefined.
pub fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", precision, v))
}
