//! CLI domain: parse, route, output and presentation only.
//! No loader orchestration beyond wiring a registry; one route table dispatches.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{format_load_report, format_method_table, format_script_source};
pub use route::RunContext;
