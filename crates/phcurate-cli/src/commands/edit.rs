//! Edit commands - change one measurement or one whole sample.

use std::path::PathBuf;

use colored::Colorize;
use phcurate::{ChangeNotice, ChangeScope, EditReconciler};

use super::{fmt_opt, load_engine};

pub fn run_measurement(
    file: PathBuf,
    order: u32,
    field: String,
    value: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let (path, mut engine) = load_engine(&file)?;
    let notice = engine.edit_measurement_field(order, &field, &value)?;
    save(&path, &engine)?;

    println!(
        "{} measurement {}: {} = {}",
        "Edited".green().bold(),
        order,
        field,
        value
    );
    report(&engine, notice);
    Ok(())
}

pub fn run_sample(
    file: PathBuf,
    group: u32,
    field: String,
    value: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let (path, mut engine) = load_engine(&file)?;
    let notice = engine.edit_sample_field(group, &field, &value)?;
    save(&path, &engine)?;

    println!(
        "{} sample {}: {} = {}",
        "Edited".green().bold(),
        group,
        field,
        value
    );
    report(&engine, notice);
    Ok(())
}

pub(crate) fn save(path: &std::path::Path, engine: &EditReconciler) -> phcurate::Result<()> {
    engine.snapshot().save_with_history(path)
}

pub(crate) fn report(engine: &EditReconciler, notice: ChangeNotice) {
    match notice.scope {
        ChangeScope::Group { group_id } => {
            if let Some(sample) = engine.sample(group_id) {
                println!(
                    "  Sample {} ({}): pH {} ± {}, {}/{} good",
                    group_id,
                    sample.label,
                    fmt_opt(sample.ph, 4),
                    fmt_opt(sample.ph_std, 4),
                    sample.good_count,
                    sample.count
                );
            }
        }
        ChangeScope::Regrouped { groups } => {
            println!("  Regrouped into {} samples", groups.to_string().yellow());
        }
        ChangeScope::All => {
            println!("  Recomputed all {} samples", engine.samples().len());
        }
    }
    println!("  Revision {}", notice.revision);
}
