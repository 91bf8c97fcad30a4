//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; a single route table dispatches to the pipeline.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, ConfigCommands, OutputFormat};
pub use presentation::{format_clusters_text, format_evaluation_json};
pub use route::RunContext;
