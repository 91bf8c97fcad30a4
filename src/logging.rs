//! `tracing` subscriber setup for the CLI.
//!
//! The `[logging]` table picks level, format and destination. Reports may be printed on stdout,
//! so logs go to stderr unless told otherwise.

use crate::error::FusionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directives, e.g. `fusion=debug`.
pub const ENV_LOG: &str = "FUSION_LOG";
/// `text` or `json`.
pub const ENV_LOG_FORMAT: &str = "FUSION_LOG_FORMAT";
/// `stdout`, `stderr` or `file`.
pub const ENV_LOG_OUTPUT: &str = "FUSION_LOG_OUTPUT";

/// The `[logging]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Disable to install no subscriber at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base `EnvFilter` level, or `off`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `text` or `json`.
    #[serde(default = "default_format")]
    pub format: String,

    /// `stdout`, `stderr` or `file`.
    #[serde(default = "default_output")]
    pub output: String,

    /// Appended to when `output = "file"`.
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// ANSI colors for text logs on a terminal stream.
    #[serde(default = "default_true")]
    pub color: bool,

    /// Per-target levels, e.g. `fusion::resolution = "debug"`.
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("fusion.log")
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: default_log_file(),
            color: default_true(),
            modules: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogOutput {
    Stdout,
    Stderr,
    File,
}

/// Format and destination after the `FUSION_LOG_*` variables are applied over `[logging]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Sink {
    format: LogFormat,
    output: LogOutput,
    ansi: bool,
}

impl Sink {
    fn resolve(config: Option<&LoggingConfig>) -> Result<Self, FusionError> {
        let format = std::env::var(ENV_LOG_FORMAT)
            .ok()
            .unwrap_or_else(|| config.map_or_else(default_format, |c| c.format.clone()));
        let output = std::env::var(ENV_LOG_OUTPUT)
            .ok()
            .unwrap_or_else(|| config.map_or_else(default_output, |c| c.output.clone()));
        let output = parse_output(&output)?;
        Ok(Self {
            format: parse_format(&format)?,
            output,
            ansi: config.map_or(true, |c| c.color) && output != LogOutput::File,
        })
    }

    fn writer(&self, config: Option<&LoggingConfig>) -> Result<BoxMakeWriter, FusionError> {
        Ok(match self.output {
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogOutput::File => {
                let path = config.map_or_else(default_log_file, |c| c.file.clone());
                BoxMakeWriter::new(std::sync::Mutex::new(open_log_file(&path)?))
            }
        })
    }
}

fn open_log_file(path: &std::path::Path) -> Result<std::fs::File, FusionError> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| FusionError::Write(dir.to_path_buf(), e))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| FusionError::Write(path.to_path_buf(), e))
}

/// Install the global subscriber for a run.
///
/// `FUSION_LOG`, `FUSION_LOG_FORMAT` and `FUSION_LOG_OUTPUT` win over `config`; without a config
/// the crate logs `info` and above as text to stderr. A disabled config installs nothing.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), FusionError> {
    if config.is_some_and(|c| !c.enabled) {
        return Ok(());
    }

    let filter = filter(config)?;
    let sink = Sink::resolve(config)?;
    let writer = sink.writer(config)?;

    let registry = Registry::default().with(filter);
    let installed = match sink.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(sink.ansi)
                    .with_writer(writer),
            )
            .try_init(),
    };
    installed.map_err(|e| FusionError::Config(format!("log subscriber already set: {}", e)))
}

// `FUSION_LOG` replaces the configured level and per-module directives wholesale.
fn filter(config: Option<&LoggingConfig>) -> Result<EnvFilter, FusionError> {
    if let Ok(filter) = EnvFilter::try_from_env(ENV_LOG) {
        return Ok(filter);
    }
    let Some(config) = config else {
        return Ok(EnvFilter::new(default_log_level()));
    };
    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }
    config
        .modules
        .iter()
        .try_fold(EnvFilter::new(&config.level), |filter, (module, level)| {
            let directive = format!("{}={}", module, level)
                .parse()
                .map_err(|e| FusionError::Config(format!("logging.modules.{}: {}", module, e)))?;
            Ok(filter.add_directive(directive))
        })
}

fn parse_format(format: &str) -> Result<LogFormat, FusionError> {
    match format {
        "text" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => Err(FusionError::Config(format!(
            "logging.format `{}` is neither `text` nor `json`",
            other
        ))),
    }
}

fn parse_output(output: &str) -> Result<LogOutput, FusionError> {
    match output {
        "stdout" => Ok(LogOutput::Stdout),
        "stderr" => Ok(LogOutput::Stderr),
        "file" => Ok(LogOutput::File),
        other => Err(FusionError::Config(format!(
            "logging.output `{}` is not one of `stdout`, `stderr`, `file`",
            other
        ))),
    }
}
