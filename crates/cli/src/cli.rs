//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// perfcast - perfdata spool relay for monitoring check results
#[derive(Parser, Debug)]
#[command(
    name = "perfcast",
    author,
    version,
    about = "Perfdata spool relay",
    long_about = "Reads perfdata spool files written by a host monitoring daemon,\n\
                  normalizes the check results into metric records, and forwards\n\
                  them to the configured telemetry backends."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "PERFCAST_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "PERFCAST_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the spool scan/dispatch loop
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display resolved configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "perfcast.toml", env = "PERFCAST_CONFIG")]
    pub config: PathBuf,

    /// Override the spool directory from configuration
    #[arg(long, env = "PERFCAST_SPOOL_DIR")]
    pub spool: Option<String>,

    /// Override the scan interval (seconds) from configuration
    #[arg(long, env = "PERFCAST_INTERVAL")]
    pub interval: Option<u64>,

    /// Scan the spool directory once and exit
    #[arg(long)]
    pub once: bool,

    /// Process files without deleting them
    #[arg(long)]
    pub test_mode: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "perfcast.toml")]
    pub config: PathBuf,

    /// Emit the validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "perfcast.toml")]
    pub config: PathBuf,

    /// Emit the configuration summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON logs
    Json,
    /// Human-readable multi-line format
    Pretty,
    /// Single-line compact format
    Compact,
}
