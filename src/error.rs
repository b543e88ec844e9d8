//! Error types for the modstamp publishing pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// File-level errors from reading or writing per-module state files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed row {line} in {path:?}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

/// Run-level errors. Any of these aborts the whole batch; there is no
/// per-module isolation of failures.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Multiple descriptor files in module '{module}': {found:?}. Delete all but one.")]
    AmbiguousDescriptor { module: String, found: Vec<String> },

    #[error("No version record found in module '{module}' while writing the consolidated index")]
    MissingVersionRecord { module: String },

    #[error(
        "Module name '{module}' is identical to a device in the online module registry. \
         Rename the module directory before publishing."
    )]
    ReservedName { module: String },

    #[error(
        "Stamp overflow in module '{module}': the same-day sequence 00..99 is exhausted \
         (current stamp {stamp})"
    )]
    StampOverflow { module: String, stamp: u64 },

    #[error("Module '{module}' has a version record but no manifest; run aborted")]
    RecoveryDeclined { module: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}
