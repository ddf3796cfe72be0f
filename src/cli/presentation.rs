//! CLI presentation: text and JSON rendering of command results.

use crate::method::METHOD_TABLE;
use crate::target::ScriptSource;
use comfy_table::{presets::UTF8_FULL, Table};
use owo_colors::OwoColorize;

/// Render a resolved script source.
pub fn format_script_source(source: &ScriptSource, format: &str) -> String {
    if format == "json" {
        return serde_json::to_string(source).unwrap_or_default();
    }
    format!(
        "target: {}\nurl:    {}\nscript: {}",
        source.target,
        source.url,
        if source.module { "module" } else { "classic" }
    )
}

/// Render the method table.
pub fn format_method_table() -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Method", "Calling convention"]);
    for (method, convention) in METHOD_TABLE {
        table.add_row(vec![method.as_str().to_string(), convention.to_string()]);
    }
    table.to_string()
}

/// Render the outcome of a `load` run.
pub fn format_load_report(
    source: &ScriptSource,
    attempts: u64,
    bytes: Option<usize>,
    queued: usize,
) -> String {
    let status = match bytes {
        Some(bytes) => format!("{} ({} bytes)", "loaded".green(), bytes),
        None => "failed".red().to_string(),
    };
    format!(
        "{}\nstatus:   {}\nattempts: {}\nqueued:   {}",
        format_script_source(source, "text"),
        status,
        attempts,
        queued
    )
}
