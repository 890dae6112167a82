//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Dispatch Pipeline - concurrent request dispatch through a worker pool
#[derive(Parser, Debug)]
#[command(
    name = "dispatch-pipeline",
    author,
    version,
    about = "Concurrent request dispatch pipeline",
    long_about = "Runs a producer/consumer request pipeline.\n\n\
                  Clients submit payloads into a bounded inbound queue, dispatcher tasks \n\
                  hand each one to a worker chosen from a pool, and an output sink \n\
                  commits every result to the configured store."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        global = true,
        env = "DISPATCH_PIPELINE_VERBOSE"
    )]
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
        env = "DISPATCH_PIPELINE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the dispatch pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "pipeline.toml",
        env = "DISPATCH_PIPELINE_CONFIG"
    )]
    pub config: PathBuf,

    /// Number of generated `request #i` payloads (ignored with --input)
    #[arg(long, default_value = "100", env = "DISPATCH_PIPELINE_ITEMS")]
    pub items: u64,

    /// Submit each non-empty line of this file as one payload
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Override the number of dispatcher tasks from configuration
    #[arg(long, env = "DISPATCH_PIPELINE_DISPATCHERS")]
    pub dispatchers: Option<usize>,

    /// Override the random selection seed from configuration
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of concurrent producer tasks
    #[arg(long, default_value = "1")]
    pub producers: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "DISPATCH_PIPELINE_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "pipeline.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "pipeline.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the configuration with all defaults filled in (TOML, or JSON with --json)
    #[arg(long)]
    pub resolved: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
