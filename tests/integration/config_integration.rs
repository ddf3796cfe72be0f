//! Integration tests for layered configuration

use std::fs;
use tempfile::TempDir;
use usertour::config::{ConfigLoader, SnippetConfig};
use usertour::target::{resolve_script_source, BrowserTarget};
use usertour::ApiError;

const FIREFOX_115: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0";

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("usertour.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_file_values_are_loaded() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        &format!(
            r#"
url_prefix = "https://cdn.example.com/usertour/"
user_agent = "{}"

[env_vars]
legacy_url = "https://cdn.example.com/compat.js"

[logging]
level = "debug"
"#,
            FIREFOX_115
        ),
    );

    let config = ConfigLoader::load_from_file(&path).unwrap();
    assert_eq!(config.url_prefix, "https://cdn.example.com/usertour/");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.output, "stderr");

    let source = resolve_script_source(
        &config.env_vars,
        &config.url_prefix,
        config.user_agent.as_deref().unwrap_or_default(),
    );
    assert_eq!(source.target, BrowserTarget::Es2020);
    assert_eq!(source.url, "https://cdn.example.com/usertour/es2020/usertour.js");
}

#[test]
fn test_environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[env_vars]
browser_target = "es2020"
"#,
    );

    let config = ConfigLoader::load_with_env(Some(&path), |var| match var {
        "USERTOURJS_BROWSER_TARGET" => Some("legacy".to_string()),
        "USERTOUR_URL_PREFIX" => Some("http://localhost:8080/".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.env_vars.browser_target.as_deref(), Some("legacy"));
    let source = resolve_script_source(&config.env_vars, &config.url_prefix, FIREFOX_115);
    assert_eq!(source.url, "http://localhost:8080/legacy/usertour.iife.js");
}

#[test]
fn test_invalid_prefix_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "url_prefix = \"https://cdn.example.com\"\n");
    let err = ConfigLoader::load_from_file(&path).unwrap_err();
    assert!(matches!(err, ApiError::ConfigError(ref msg) if msg.contains("must end with '/'")));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(ConfigLoader::load_from_file(&missing).is_err());
}

#[test]
fn test_rendered_toml_loads_back() {
    let dir = TempDir::new().unwrap();
    let mut config = SnippetConfig::default();
    config.env_vars.es2020_url = Some("https://mirror.example.com/usertour.js".to_string());
    let path = write_config(&dir, &ConfigLoader::to_toml(&config).unwrap());

    let loaded = ConfigLoader::load_from_file(&path).unwrap();
    assert_eq!(loaded.env_vars, config.env_vars);
    assert_eq!(loaded.url_prefix, config.url_prefix);
}
