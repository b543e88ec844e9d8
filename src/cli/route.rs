//! CLI route: run context and command dispatch. Wires the terminal prompt
//! into the publisher and renders command results.

use crate::cli::parse::Commands;
use crate::config::{ConfigLoader, ModstampConfig, RecoveryPolicy};
use crate::error::PublishError;
use crate::index::write_index;
use crate::publish::{Publisher, RecoveryConfirm};
use crate::status::{format_status_json, format_status_text};
use std::path::PathBuf;

/// Terminal implementation of the recovery confirmation, used under the
/// `prompt` policy.
struct TerminalConfirm;

impl RecoveryConfirm for TerminalConfirm {
    fn confirm(&self, module: &str) -> Result<bool, PublishError> {
        use dialoguer::Confirm;
        Confirm::new()
            .with_prompt(format!(
                "Module '{}' has a version record but no manifest. Create a new manifest?",
                module
            ))
            .default(false)
            .interact()
            .map_err(|e| PublishError::Config(format!("Failed to get user input: {}", e)))
    }
}

/// Execution context for CLI commands: resolved root and configuration.
pub struct RunContext {
    root: PathBuf,
    config: ModstampConfig,
}

impl RunContext {
    /// Create a context for the given root, loading configuration from an
    /// explicit file when passed, layered loading otherwise.
    pub fn new(root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, PublishError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(&path)?,
            None => ConfigLoader::load(&root)?,
        };
        Ok(Self { root, config })
    }

    pub fn config(&self) -> &ModstampConfig {
        &self.config
    }

    /// Execute a command and return its printable output.
    pub fn execute(&self, command: &Commands) -> Result<String, PublishError> {
        match command {
            Commands::Publish {
                yes,
                dry_run,
                offline,
            } => self.handle_publish(*yes, *dry_run, *offline),
            Commands::Status { format } => self.handle_status(format),
            Commands::Index => self.handle_index(),
        }
    }

    fn handle_publish(
        &self,
        yes: bool,
        dry_run: bool,
        offline: bool,
    ) -> Result<String, PublishError> {
        let mut config = self.config.clone();
        if yes {
            config.recovery = RecoveryPolicy::Proceed;
        }

        let publisher = Publisher::new(self.root.clone(), config)
            .with_confirm(Box::new(TerminalConfirm));

        if dry_run {
            let summary = publisher.preview()?;
            return Ok(format!(
                "Dry run, nothing written.\n{}",
                format_status_text(&summary)
            ));
        }

        let summary = publisher.run(offline)?;
        let updated = summary
            .modules
            .iter()
            .filter(|m| {
                !matches!(m.state, crate::publish::ModuleState::Unchanged)
            })
            .count();
        Ok(format!(
            "Published {} module(s), {} updated. Index lists {} module(s).",
            summary.modules.len(),
            updated,
            summary.index.len()
        ))
    }

    fn handle_status(&self, format: &str) -> Result<String, PublishError> {
        let publisher = Publisher::new(self.root.clone(), self.config.clone());
        let summary = publisher.preview()?;
        match format {
            "json" => format_status_json(&summary),
            "text" => Ok(format_status_text(&summary)),
            other => Err(PublishError::Config(format!(
                "Invalid output format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }

    fn handle_index(&self) -> Result<String, PublishError> {
        let index = write_index(&self.root)?;
        Ok(format!("Index written with {} module(s).", index.len()))
    }
}
