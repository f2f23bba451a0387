//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use crate::domain::Dimension;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Self-monitoring for a metric alerting pipeline
///
/// Watches ingestion, matching and trigger checks and alerts when the
/// pipeline itself stops working.
#[derive(Parser, Debug)]
#[command(name = "selfwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SELFWATCH_CONFIG")]
    pub config: Option<String>,

    /// Log level (error, warn, info, debug, trace); overrides the config file
    #[arg(long, global = true, env = "SELFWATCH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// State directory; selects the file store backend
    #[arg(long, global = true, env = "SELFWATCH_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the heartbeat probes and the self-state monitor until interrupted
    Run(RunArgs),

    /// Evaluate the pipeline once and print the verdict
    Check(CheckArgs),

    /// Show the stored health flag, activity timestamps and matched counter
    Status,

    /// Clear the health flag back to OK
    Reset,

    /// Record activity for a dimension at the current time
    Touch {
        /// Dimension to record
        #[arg(value_enum)]
        dimension: DimensionArg,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the run command
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Run the probes only, without the self-state monitor
    #[arg(long)]
    pub no_monitor: bool,
}

/// Arguments for the check command
#[derive(Parser, Debug, Default)]
pub struct CheckArgs {
    /// Dispatch an alert to the configured contacts if degraded
    #[arg(long)]
    pub notify: bool,
}

/// Dimension names accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DimensionArg {
    /// Metrics received by the ingestion engine
    Ingestion,
    /// Local trigger checks
    Check,
    /// Remote trigger checks
    RemoteCheck,
}

impl From<DimensionArg> for Dimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::Ingestion => Dimension::Ingestion,
            DimensionArg::Check => Dimension::Check,
            DimensionArg::RemoteCheck => Dimension::RemoteCheck,
        }
    }
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
