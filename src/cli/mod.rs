//! CLI argument parsing and output formatting
//!
//! Uses clap for the argument definitions and serde for JSON output.

pub mod args;
pub mod output;

pub use args::{Cli, Commands};
