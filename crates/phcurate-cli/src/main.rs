//! phcurate CLI - replicate curation for spectrophotometric pH runs.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Ingest {
            file,
            output,
            dye_intercept,
            dye_slope,
            cutoff,
            min_values,
            no_uniform_covariates,
            delimiter,
        } => commands::ingest::run(
            file,
            output,
            (dye_intercept, dye_slope),
            cutoff.map(|c| (c, min_values)),
            !no_uniform_covariates,
            delimiter,
        ),

        Commands::Status { file, json } => commands::status::run(file, json, cli.verbose),

        Commands::EditMeasurement {
            file,
            order,
            field,
            value,
        } => commands::edit::run_measurement(file, order, field, value),

        Commands::EditSample {
            file,
            group,
            field,
            value,
        } => commands::edit::run_sample(file, group, field, value),

        Commands::Autoflag {
            file,
            group,
            cutoff,
            min_values,
        } => commands::autoflag::run(file, group, cutoff, min_values),

        Commands::Export {
            file,
            output,
            format,
        } => commands::export::run(file, output, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `--verbose` selects debug output.
fn init_logging(verbose: bool) {
    let default = if verbose { "phcurate=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
