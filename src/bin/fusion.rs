//! `fusion` executable: parses arguments, installs logging, runs one pipeline command and prints
//! its output.

use clap::Parser;
use fusion::cli::{map_error, Cli, RunContext};
use fusion::config::ConfigLoader;
use fusion::error::FusionError;
use fusion::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let logging = logging_for(&cli);
    if let Err(e) = init_logging(Some(&logging)) {
        eprintln!("fusion: {}", e);
        process::exit(1);
    }

    let command = cli.command.name();
    info!(command, project = %cli.project.display(), "Starting");
    match run(&cli) {
        Ok(output) => {
            info!(command, "Finished");
            println!("{}", output);
        }
        Err(e) => {
            error!(command, "Aborted: {:#}", e);
            eprintln!("{}", describe(&e));
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let context = RunContext::new(&cli.project, cli.config.as_deref())?;
    Ok(context.execute(&cli.command)?)
}

fn describe(e: &anyhow::Error) -> String {
    match e.downcast_ref::<FusionError>() {
        Some(fusion_error) => map_error(fusion_error),
        None => format!("{:#}", e),
    }
}

// `[logging]` from the same files the command will read, then the command-line flags on top.
// A config that fails to load falls back to defaults here; the command reports the failure.
fn logging_for(cli: &Cli) -> LoggingConfig {
    let loaded = match cli.config {
        Some(ref config_path) => ConfigLoader::load_from_file(config_path),
        None => ConfigLoader::load(&cli.project),
    };
    let mut config = loaded.map(|c| c.logging).unwrap_or_default();

    if cli.quiet {
        config.enabled = false;
    }
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
    }
    config
}
