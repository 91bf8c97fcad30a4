//! CLI parse: clap types for Fusion. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Fusion CLI - Multi-source data fusion
#[derive(Parser)]
#[command(name = "fusion")]
#[command(about = "Fuse overlapping datasets and score the result against a gold standard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project directory holding fusion.toml; relative paths resolve against it
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cluster duplicates, merge the datasets, write the merged document and report part one
    Union,
    /// Resolve the merged document, score it against the gold standard, append report part two
    Fuse {
        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Union then fuse in one process
    Run {
        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show duplicate clusters
    Clusters {
        /// List the members of every cluster
        #[arg(long)]
        members: bool,
    },
    /// Configuration commands (show, validate)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

impl Commands {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Union => "union",
            Commands::Fuse { .. } => "fuse",
            Commands::Run { .. } => "run",
            Commands::Clusters { .. } => "clusters",
            Commands::Config { .. } => "config",
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Validate the effective configuration
    Validate,
}
