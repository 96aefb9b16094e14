//! Snapshot persistence - save/load the complete engine state as JSON.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::config::EngineConfig;
use crate::dataset::{Measurement, SampleGroup};
use crate::error::{PhcurateError, Result};
use crate::input::SourceMetadata;
use crate::reconcile::EditRecord;

/// Version written into every snapshot.
pub const FORMAT_VERSION: &str = "1.0";

/// Complete engine state: both tables, the configuration including the dye
/// correction, and the edit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub format_version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    pub config: EngineConfig,
    pub revision: u64,
    pub measurements: Vec<Measurement>,
    pub samples: Vec<SampleGroup>,
    #[serde(default)]
    pub history: Vec<EditRecord>,
}

impl Snapshot {
    /// Save the snapshot to a JSON file.
    ///
    /// The file is written next to its destination and renamed into place, so
    /// a failed save never leaves a truncated snapshot behind.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use phcurate::{EditReconciler, EngineConfig};
    /// # fn example(engine: &EditReconciler) -> phcurate::Result<()> {
    /// engine.snapshot().save("run_042.phcurate.json")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                PhcurateError::Persistence(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp = NamedTempFile::new_in(parent).map_err(|e| {
            PhcurateError::Persistence(format!(
                "Failed to create temporary file in '{}': {}",
                parent.display(),
                e
            ))
        })?;

        let mut writer = BufWriter::new(temp);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| {
            PhcurateError::Persistence(format!("Failed to serialize snapshot: {}", e))
        })?;
        writer.flush().map_err(|e| {
            PhcurateError::Persistence(format!("Failed to write snapshot: {}", e))
        })?;

        let temp = writer.into_inner().map_err(|e| {
            PhcurateError::Persistence(format!("Failed to write snapshot: {}", e.error()))
        })?;
        temp.persist(path).map_err(|e| {
            PhcurateError::Persistence(format!(
                "Failed to move snapshot into '{}': {}",
                path.display(),
                e.error
            ))
        })?;

        info!(path = %path.display(), revision = self.revision, "saved snapshot");
        Ok(())
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            PhcurateError::Persistence(format!(
                "Failed to open file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let reader = BufReader::new(file);
        let snapshot: Snapshot = serde_json::from_reader(reader).map_err(|e| {
            PhcurateError::Persistence(format!(
                "Failed to parse snapshot '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(snapshot)
    }

    /// Save with version history.
    ///
    /// Copies the snapshot currently at `path` into a `.history` subdirectory
    /// before replacing it.
    ///
    /// ```text
    /// data/
    /// ├── run_042.phcurate.json                      # Current version
    /// └── run_042.phcurate.history/
    ///     └── 2026-03-02T10-00-00_r0003.json         # Previous version
    /// ```
    pub fn save_with_history(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if path.exists() {
            Self::save_to_history(path)?;
        }

        self.save(path)
    }

    fn save_to_history(path: &Path) -> Result<()> {
        let existing = Self::load(path)?;

        let timestamp = existing.updated_at.format("%Y-%m-%dT%H-%M-%S");
        let history_file = history_directory(path)
            .join(format!("{}_r{:04}.json", timestamp, existing.revision));

        existing.save(&history_file)
    }

    /// List all historical versions of a snapshot, newest first.
    pub fn list_history(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let history_dir = history_directory(path.as_ref());

        if !history_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&history_dir)
            .map_err(|e| {
                PhcurateError::Persistence(format!(
                    "Failed to read history directory '{}': {}",
                    history_dir.display(),
                    e
                ))
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();

        entries.sort_by(|a, b| b.cmp(a));

        Ok(entries)
    }

    /// Load a historical version; index 0 is the newest.
    pub fn load_history(path: impl AsRef<Path>, index: usize) -> Result<Self> {
        let history = Self::list_history(&path)?;

        let history_path = history.get(index).ok_or_else(|| {
            PhcurateError::Persistence(format!(
                "History version {} not found (only {} versions available)",
                index,
                history.len()
            ))
        })?;

        Self::load(history_path)
    }
}

fn history_directory(path: &Path) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let parent = path.parent().unwrap_or(Path::new("."));

    parent.join(format!("{}.history", stem))
}

/// Snapshot path for a data file.
///
/// ```
/// use phcurate::persistence::snapshot_path;
///
/// let path = snapshot_path("data/run_042.csv");
/// assert_eq!(path.to_string_lossy(), "data/run_042.phcurate.json");
/// ```
pub fn snapshot_path(data_path: impl AsRef<Path>) -> PathBuf {
    let data_path = data_path.as_ref();
    let stem = data_path.file_stem().unwrap_or_default().to_string_lossy();
    let parent = data_path.parent().unwrap_or(Path::new("."));

    parent.join(format!("{}.phcurate.json", stem))
}
