//! CLI parse: clap types for modstamp. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Modstamp CLI - content-addressed module manifests and update stamps
#[derive(Parser)]
#[command(name = "modstamp")]
#[command(about = "Maintain module manifests, version stamps, and the consolidated update index")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Root directory containing the module directories
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
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
    /// Fingerprint all modules, stamp changes, and rewrite the index
    Publish {
        /// Rebuild missing manifests without asking
        #[arg(long)]
        yes: bool,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Skip the reserved-name fetch from the online registry
        #[arg(long)]
        offline: bool,
    },
    /// Report per-module state without writing
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Rebuild the consolidated index from existing version records
    Index,
}
