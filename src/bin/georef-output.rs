//! georef-output CLI Binary
//!
//! Generates output products for frames whose registration is complete.

use clap::Parser;
use georef_output::cli::{Cli, RunContext};
use georef_output::config::ConfigLoader;
use georef_output::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Option combinations are checked before anything is opened or logged
    if let Err(e) = cli.frame_override() {
        eprintln!("{}", georef_output::cli::map_error(&e));
        process::exit(1);
    }

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Output generator has started");

    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error initializing run: {}", e);
            eprintln!("{}", georef_output::cli::map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli) {
        Ok(output) => {
            info!("Output generator has stopped");
            println!("{}", output);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("{}", georef_output::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = match cli.config {
        Some(ref config_path) => ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default(),
        None => ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default(),
    };

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    } else if config.file.is_relative() {
        config.file = cli.workspace.join(&config.file);
    }

    config
}
