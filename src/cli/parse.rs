//! CLI parse: clap types for usertour-snippet. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// usertour-snippet - inspect and exercise the Usertour.js lazy loader
#[derive(Parser)]
#[command(name = "usertour-snippet")]
#[command(about = "Inspect and exercise the Usertour.js lazy loader")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over defaults and user config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show which build variant and URL would be loaded
    Target {
        /// User agent to probe (defaults to the configured one)
        #[arg(long)]
        user_agent: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List the client methods and their calling conventions
    Methods,
    /// Queue an init call and load the real implementation over the network
    Load {
        /// User agent to probe (defaults to the configured one)
        #[arg(long)]
        user_agent: Option<String>,
        /// Environment id passed to the queued init call
        #[arg(long, default_value = "snippet-check")]
        env_id: String,
        /// Maximum number of load attempts
        #[arg(long, default_value = "1")]
        attempts: u32,
    },
    /// Print the resolved configuration as TOML
    Config,
}
