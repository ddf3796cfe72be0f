//! Configuration System
//!
//! Layered configuration for the loader: built-in defaults, an optional user-level
//! file, an optional explicit file, and process environment overrides, merged with
//! the `config` crate.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::target::DEFAULT_URL_PREFIX;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod environment;
    pub mod explicit_file;
    pub mod global_file;
}

pub use sources::environment::ENV_OVERRIDES;
pub use sources::global_file::global_config_path;

/// Override variables a host can set to steer which build is fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVars {
    /// Forced build variant. `es2020` selects the modern build, anything else the
    /// compatibility build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_target: Option<String>,

    /// Explicit URL for the modern build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub es2020_url: Option<String>,

    /// Explicit URL for the compatibility build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_url: Option<String>,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnippetConfig {
    /// Base URL both builds are published under. Must end with `/`.
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,

    /// User agent fed to the capability probe when no target is forced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(default)]
    pub env_vars: EnvVars,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_url_prefix() -> String {
    DEFAULT_URL_PREFIX.to_string()
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            url_prefix: default_url_prefix(),
            user_agent: None,
            env_vars: EnvVars::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl SnippetConfig {
    /// Validate the configuration, collecting every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.url_prefix.is_empty() {
            errors.push("url_prefix cannot be empty".to_string());
        } else {
            if !is_http_url(&self.url_prefix) {
                errors.push(format!("url_prefix must be an http(s) URL: {}", self.url_prefix));
            }
            if !self.url_prefix.ends_with('/') {
                errors.push(format!("url_prefix must end with '/': {}", self.url_prefix));
            }
        }

        for (name, url) in [
            ("es2020_url", &self.env_vars.es2020_url),
            ("legacy_url", &self.env_vars.legacy_url),
        ] {
            if let Some(url) = url {
                if !is_http_url(url) {
                    errors.push(format!("{} must be an http(s) URL: {}", name, url));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads [`SnippetConfig`] from its layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load using the process environment.
    pub fn load(explicit: Option<&Path>) -> Result<SnippetConfig, ApiError> {
        Self::load_with_env(explicit, |var| std::env::var(var).ok())
    }

    /// Load with a custom environment lookup.
    ///
    /// Precedence (highest last): defaults, user-level file, explicit file, environment.
    pub fn load_with_env<F>(explicit: Option<&Path>, lookup: F) -> Result<SnippetConfig, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = merge::merge_policy::builder_with_defaults()?;
        builder = sources::global_file::add_to_builder(builder)?;
        if let Some(path) = explicit {
            builder = sources::explicit_file::add_to_builder(builder, path)?;
        }
        builder = sources::environment::add_to_builder(builder, lookup)?;

        let config: SnippetConfig = builder.build()?.try_deserialize()?;
        config
            .validate()
            .map_err(|errors| ApiError::ConfigError(errors.join("; ")))?;
        Ok(config)
    }

    /// Load a single file on top of defaults, ignoring other sources.
    pub fn load_from_file(path: &Path) -> Result<SnippetConfig, ApiError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::explicit_file::add_to_builder(builder, path)?;
        let config: SnippetConfig = builder.build()?.try_deserialize()?;
        config
            .validate()
            .map_err(|errors| ApiError::ConfigError(errors.join("; ")))?;
        Ok(config)
    }

    /// Render a configuration as TOML.
    pub fn to_toml(config: &SnippetConfig) -> Result<String, ApiError> {
        toml::to_string_pretty(config).map_err(|e| ApiError::ConfigError(e.to_string()))
    }
}
