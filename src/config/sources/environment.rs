//! Environment source: FUSION__SECTION__KEY=value, e.g. FUSION__OUTPUT__PRETTY=false

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "FUSION";

/// Separator between prefix and nested keys.
pub const ENV_SEPARATOR: &str = "__";

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    )
}
