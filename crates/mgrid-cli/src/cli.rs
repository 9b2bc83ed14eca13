//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Microgrid dispatch simulation engine", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single scenario and write its results
    Run {
        /// Path to the scenario YAML file
        scenario: PathBuf,

        /// Results directory
        #[arg(long, default_value = "results")]
        out: PathBuf,

        /// Time-series rows to write: negative for all, 0 for summary only
        #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
        max_lines: i64,
    },
    /// Run every scenario in a directory, one model per worker thread
    Batch {
        /// Directory containing scenario YAML files
        dir: PathBuf,

        /// Root results directory; each scenario writes to a subdirectory
        #[arg(long, default_value = "results")]
        out: PathBuf,

        /// Time-series rows to write: negative for all, 0 for summary only
        #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
        max_lines: i64,

        /// Worker thread count, or "auto" for one per core
        #[arg(long, default_value = "auto")]
        threads: String,
    },
}
