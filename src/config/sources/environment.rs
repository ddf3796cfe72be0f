//! Environment source: the override variables a host page would set before loading.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;

/// Process variable name -> config key.
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("USERTOURJS_BROWSER_TARGET", "env_vars.browser_target"),
    ("USERTOURJS_ES2020_URL", "env_vars.es2020_url"),
    ("USERTOURJS_LEGACY_URL", "env_vars.legacy_url"),
    ("USERTOUR_URL_PREFIX", "url_prefix"),
    ("USERTOUR_USER_AGENT", "user_agent"),
];

/// Apply overrides found through `lookup`. Empty values are ignored.
pub fn add_to_builder<F>(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: F,
) -> Result<ConfigBuilder<DefaultState>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    for (var, key) in ENV_OVERRIDES {
        if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
            builder = builder.set_override(*key, value)?;
        }
    }
    Ok(builder)
}
