mod cli;

use std::process;

use clap::Parser;
use tracing::info;

use geoindicator::config::{RawRunConfig, RunConfig, Target};
use geoindicator::logging;
use geoindicator::pipeline::Pipeline;
use geoindicator::registry::Registry;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let registry = Registry::with_builtin_plugins();

    if cli.list {
        list(&registry);
        return Ok(());
    }

    let file_settings = match &cli.config {
        Some(path) => RawRunConfig::from_file(path)?,
        None => RawRunConfig::default(),
    };
    let config = RunConfig::try_from(file_settings.merge(cli.overrides()))?;
    let options = config.run_options();
    let pipeline = Pipeline::with_naming_convention(&registry);

    let written = match config.target() {
        Target::Processor { name, indicators } => {
            pipeline.run_processor(name, indicators, &options)?
        }
        Target::Indicators(indicators) => pipeline.run_indicators(indicators, &options)?,
    };

    info!("Wrote {} indicator rasters", written.len());
    for path in &written {
        println!("{}", path.display());
    }

    Ok(())
}

fn list(registry: &Registry) {
    println!("Post processors:");
    for name in registry.names() {
        let description = registry.describe(name).unwrap_or_default();
        println!("  {name}: {description}");
    }

    println!("Indicators:");
    for indicator in registry.available_indicators() {
        println!("  {indicator}");
    }
}
