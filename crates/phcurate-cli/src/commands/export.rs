//! Export command - write the measurement and sample tables.

use std::path::{Path, PathBuf};

use colored::Colorize;
use phcurate::{export_tables, ExportFormat};

use super::load_engine;

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    format: ExportFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (path, engine) = load_engine(&file)?;

    let dir = output.unwrap_or_else(|| match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    });
    let stem = stem_of(&path);

    let written = export_tables(&engine, &dir, &stem, format)?;

    println!(
        "{} {} samples, {} measurements",
        "Exported".green().bold(),
        engine.samples().len(),
        engine.measurements().len()
    );
    for p in written {
        println!("  {}", p.display().to_string().white());
    }
    Ok(())
}

/// `run.phcurate.json` -> `run`
fn stem_of(path: &Path) -> String {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    name.strip_suffix(".phcurate.json")
        .or_else(|| name.strip_suffix(".json"))
        .unwrap_or(&name)
        .to_string()
}
