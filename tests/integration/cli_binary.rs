//! Integration tests for the usertour-snippet binary.
//!
//! Commands that need no network: `methods`, `target` and `config`.

use std::process::{Command, Output};
use tempfile::TempDir;

const CHROME_120: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

fn run(home: &TempDir, args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_usertour-snippet");
    Command::new(bin)
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("USERTOURJS_BROWSER_TARGET")
        .env_remove("USERTOURJS_ES2020_URL")
        .env_remove("USERTOURJS_LEGACY_URL")
        .env_remove("USERTOUR_URL_PREFIX")
        .env_remove("USERTOUR_USER_AGENT")
        .env("USERTOUR_LOG", "off")
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_methods_lists_conventions() {
    let home = TempDir::new().unwrap();
    let output = run(&home, &["methods"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("identifyAnonymous"));
    assert!(stdout.contains("promise-queued"));
    assert!(stdout.contains("void-queued"));
}

#[test]
fn test_target_json_for_modern_browser() {
    let home = TempDir::new().unwrap();
    let output = run(
        &home,
        &["target", "--user-agent", CHROME_120, "--format", "json"],
    );
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["target"], "es2020");
    assert_eq!(value["url"], "https://js.usertour.io/es2020/usertour.js");
}

#[test]
fn test_env_override_forces_legacy() {
    let home = TempDir::new().unwrap();
    let bin = env!("CARGO_BIN_EXE_usertour-snippet");
    let output = Command::new(bin)
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("USERTOURJS_BROWSER_TARGET", "legacy")
        .env("USERTOUR_LOG", "off")
        .args(["target", "--user-agent", CHROME_120])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("legacy/usertour.iife.js"));
}

#[test]
fn test_invalid_config_fails() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("bad.toml");
    std::fs::write(&path, "url_prefix = \"not-a-url/\"\n").unwrap();
    let output = run(&home, &["--config", path.to_str().unwrap(), "config"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("url_prefix"));
}
