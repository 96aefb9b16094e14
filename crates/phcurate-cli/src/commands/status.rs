//! Status command - show the sample table of a snapshot.

use std::path::PathBuf;

use colored::Colorize;

use super::{fmt_opt, load_engine};

pub fn run(file: PathBuf, json_output: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (path, engine) = load_engine(&file)?;

    if json_output {
        let status = serde_json::json!({
            "snapshot": path,
            "source": engine.source().map(|s| s.file.clone()),
            "revision": engine.revision(),
            "measurements": engine.measurements().len(),
            "excluded": engine.measurements().iter().filter(|m| !m.good).count(),
            "dye": engine.config().dye,
            "samples": engine.samples(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let title = engine
        .source()
        .map(|s| s.file.clone())
        .unwrap_or_else(|| path.display().to_string());
    println!("{} {}", "Samples in".cyan().bold(), title.white());
    println!(
        "Revision {}, {} measurements, dye correction {} + {}·R",
        engine.revision(),
        engine.measurements().len(),
        engine.config().dye.intercept,
        engine.config().dye.slope
    );
    println!();

    println!(
        "{:>5}  {:<20} {:>7} {:>6} {:>8} {:>8} {:>6}  {}",
        "group", "label", "S", "T", "pH", "sd", "good", "note"
    );
    for sample in engine.samples() {
        let good = format!("{}/{}", sample.good_count, sample.count);
        let good = if sample.good_count == sample.count {
            good.green()
        } else if sample.good_count == 0 {
            good.red()
        } else {
            good.yellow()
        };

        let note = match sample.reference_offset() {
            Some(offset) => format!("reference, offset {:+.4}", offset),
            None if sample.classification.is_reference() => "reference".to_string(),
            None => String::new(),
        };

        println!(
            "{:>5}  {:<20} {:>7.3} {:>6.2} {:>8} {:>8} {:>6}  {}",
            sample.group_id,
            sample.label,
            sample.salinity,
            sample.temperature,
            fmt_opt(sample.ph, 4),
            fmt_opt(sample.ph_std, 4),
            good,
            note.blue()
        );

        if verbose {
            if let Some(members) = engine.members(sample.group_id) {
                for m in members {
                    let mark = if m.good { " ".normal() } else { "x".red() };
                    println!(
                        "       {} #{:<5} {:>8}",
                        mark,
                        m.order,
                        fmt_opt(m.ph, 4)
                    );
                }
            }
        }
    }

    if let Some(last) = engine.history().last() {
        println!();
        println!("Last edit: {} at {}", last.id, last.at.format("%Y-%m-%d %H:%M:%S"));
    }

    Ok(())
}
