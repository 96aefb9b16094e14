//! Autoflag command - reseed good flags with the rangefinder.

use std::path::PathBuf;

use colored::Colorize;
use phcurate::{EditReconciler, EditTarget, RangefinderConfig};

use super::edit::{report, save};
use super::load_engine;

pub fn run(
    file: PathBuf,
    group: Option<u32>,
    cutoff: f64,
    min_values: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let (path, mut engine) = load_engine(&file)?;
    let config = RangefinderConfig::new(cutoff, min_values);

    let notice = match group {
        Some(group_id) => engine.autoflag_sample(group_id, config)?,
        None => engine.autoflag_all(config)?,
    };
    save(&path, &engine)?;

    let excluded = last_excluded(&engine);
    println!(
        "{} cutoff {} / minimum {}: {} measurements excluded",
        "Autoflagged".green().bold(),
        cutoff,
        min_values,
        excluded.to_string().yellow()
    );
    report(&engine, notice);
    Ok(())
}

/// Measurements excluded by the most recent autoflag edit.
fn last_excluded(engine: &EditReconciler) -> usize {
    match engine.history().last().map(|r| &r.target) {
        Some(EditTarget::Autoflag { excluded, .. }) => *excluded,
        _ => 0,
    }
}
