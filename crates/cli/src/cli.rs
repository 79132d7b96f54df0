//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Logfan - event fan-out pipeline
#[derive(Parser, Debug)]
#[command(
    name = "logfan",
    author,
    version,
    about = "Event-logging fan-out pipeline",
    long_about = "Reads event messages from stdin, buffers them in an \n\
                  overflow-aware queue, and fans each message out to every \n\
                  configured sink (console, TCP) without letting a slow or \n\
                  failing sink block producers or other sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LOGFAN_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "LOGFAN_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the fan-out pipeline (stdin -> queue -> sinks)
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "config.toml", env = "LOGFAN_CONFIG")]
    pub config: PathBuf,

    /// Maximum number of messages to process (0 = unlimited)
    #[arg(long, default_value = "0", env = "LOGFAN_MAX_MESSAGES")]
    pub max_messages: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LOGFAN_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without running the pipeline
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "config.toml", env = "LOGFAN_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LogFormat {
    /// Structured JSON logs
    Json,
    /// Human-readable multi-line format
    Pretty,
    /// Compact single-line format
    Compact,
}
