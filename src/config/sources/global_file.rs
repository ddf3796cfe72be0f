//! User-level config file source: $XDG_CONFIG_HOME/usertour/config.toml or ~/.config/usertour/config.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::PathBuf;
use tracing::debug;

/// Path to the user-level config file.
pub fn global_config_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return Some(PathBuf::from(xdg).join("usertour").join("config.toml"));
        }
    }
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("usertour")
            .join("config.toml")
    })
}

/// Add the user-level config file to the builder if it exists.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(path) = global_config_path() {
        if path.exists() {
            builder = builder.add_source(File::from(path.as_path()).required(false));
        } else {
            debug!(config_path = %path.display(), "No user-level configuration file");
        }
    }
    Ok(builder)
}
