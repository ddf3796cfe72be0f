//! Merge rules: defaults first, then user file, explicit file, environment.

use crate::target::DEFAULT_URL_PREFIX;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("url_prefix", DEFAULT_URL_PREFIX)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
