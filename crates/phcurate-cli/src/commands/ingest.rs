//! Ingest command - read an instrument export and create a snapshot.

use std::path::PathBuf;

use colored::Colorize;
use phcurate::{
    snapshot_path, EditReconciler, EngineConfig, ParserConfig, RangefinderConfig, RecordParser,
};

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    dye: (f64, f64),
    autoflag: Option<(f64, usize)>,
    uniform_covariates: bool,
    delimiter: Option<char>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let mut config = EngineConfig::default()
        .with_dye(dye.0, dye.1)
        .with_uniform_covariates(uniform_covariates);
    if let Some((cutoff, minimum_values)) = autoflag {
        config = config.with_autoflag(RangefinderConfig::new(cutoff, minimum_values));
    }

    let mut parser_config = ParserConfig::default();
    if let Some(d) = delimiter {
        let byte = u8::try_from(d)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| format!("Delimiter must be a single ASCII character, got '{}'", d))?;
        parser_config = parser_config.with_delimiter(byte);
    }
    let parser = RecordParser::with_config(parser_config);

    println!("{} {}", "Ingesting".cyan().bold(), file.display());
    let engine = EditReconciler::from_file_with_parser(&file, config, &parser)?;

    let output_path = output.unwrap_or_else(|| snapshot_path(&file));
    engine.snapshot().save_with_history(&output_path)?;

    let references = engine
        .samples()
        .iter()
        .filter(|s| s.classification.is_reference())
        .count();
    let excluded = engine.measurements().iter().filter(|m| !m.good).count();
    let undefined = engine.measurements().iter().filter(|m| m.ph.is_none()).count();

    println!();
    println!(
        "  Measurements: {}",
        engine.measurements().len().to_string().white().bold()
    );
    println!(
        "  Samples:      {} ({} reference)",
        engine.samples().len().to_string().white().bold(),
        references
    );
    if excluded > 0 {
        println!("  Excluded:     {}", excluded.to_string().yellow());
    }
    if undefined > 0 {
        println!("  Undefined pH: {}", undefined.to_string().red());
    }
    println!();
    println!(
        "{} {}",
        "Snapshot saved to".green(),
        output_path.display().to_string().white()
    );
    println!(
        "Run {} to review the samples.",
        format!("phcurate status {}", output_path.display())
            .cyan()
            .bold()
    );

    Ok(())
}
