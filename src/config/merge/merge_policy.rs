//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("input.root_element", "data")?
        .set_default("input.provenance_id_path", "/data/provenance/id")?
        .set_default("output.merged", "merged.json")?
        .set_default("output.fused", "fused.json")?
        .set_default("output.pretty", true)
}
