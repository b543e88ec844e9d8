//! Configuration System
//!
//! Layered configuration for the publishing pipeline: built-in defaults,
//! then an optional `modstamp.toml` in the root directory, then `MODSTAMP_*`
//! environment variables. An explicitly passed config file bypasses the
//! layering and is loaded directly.

use crate::error::PublishError;
use crate::logging::LoggingConfig;
use crate::registry::RegistryConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Workspace config file name, looked up in the root directory.
pub const CONFIG_FILE: &str = "modstamp.toml";

/// How to treat a module that has a version record but no manifest.
///
/// This inconsistent state normally means a manifest was deleted by hand.
/// `Prompt` asks for confirmation before regenerating it; `Proceed` and
/// `Abort` decide without a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryPolicy {
    #[default]
    Prompt,
    Proceed,
    Abort,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModstampConfig {
    /// Online registry access (reserved-name list)
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Recovery decision for version-record-without-manifest modules
    #[serde(default)]
    pub recovery: RecoveryPolicy,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a root directory: defaults, then
    /// `<root>/modstamp.toml` when present, then `MODSTAMP_*` environment
    /// variables (e.g. `MODSTAMP_REGISTRY__URL`).
    pub fn load(root: &Path) -> Result<ModstampConfig, PublishError> {
        let mut builder = Config::builder();

        let workspace_file = root.join(CONFIG_FILE);
        if workspace_file.exists() {
            builder = builder.add_source(File::from(workspace_file).required(false));
        }

        builder = builder.add_source(Environment::with_prefix("MODSTAMP").separator("__"));

        builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| PublishError::Config(format!("Failed to load configuration: {}", e)))
    }

    /// Load configuration from an explicit file, no layering.
    pub fn load_from_file(path: &Path) -> Result<ModstampConfig, PublishError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PublishError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        toml::from_str(&content).map_err(|e| {
            PublishError::Config(format!("Invalid config file {:?}: {}", path, e))
        })
    }
}
