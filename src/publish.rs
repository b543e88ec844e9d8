//! Publishing pipeline
//!
//! Drives the whole run: reserved-name guard, then per module fingerprint →
//! reconcile → stamp → persist, and finally the consolidated index. The run
//! is fully sequential; the first fatal error aborts the batch and the
//! recovery strategy is rerunning from scratch.

use crate::config::{ModstampConfig, RecoveryPolicy};
use crate::error::PublishError;
use crate::index::{module_dirs, write_index, IndexEntry};
use crate::manifest::Manifest;
use crate::reconcile::reconcile;
use crate::registry::fetch_reserved_names;
use crate::scan::{scan_module, ScanOptions};
use crate::stamp::{advance_stamp, VersionRecord};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Detected state of one module at reconciliation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleState {
    /// No manifest and no version record: first publication.
    New,
    /// Files added, changed, or deleted since the last manifest, or the
    /// version record is missing.
    Changed,
    /// Manifest and version record both match the current file set.
    Unchanged,
    /// Version record present but manifest absent; needs recovery.
    Inconsistent,
}

/// Per-module result of a run or preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleReport {
    pub module: String,
    pub state: ModuleState,
    /// Stamp after the run, or the currently recorded stamp in a preview.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp: Option<u64>,
}

/// Result of a full run or preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub modules: Vec<ModuleReport>,
    /// Consolidated index as written; empty for previews.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub index: Vec<IndexEntry>,
}

/// Decision hook for the inconsistent-state recovery (version record without
/// manifest) under the `prompt` policy. The CLI provides a terminal
/// implementation; everything else stays prompt-free.
pub trait RecoveryConfirm {
    fn confirm(&self, module: &str) -> Result<bool, PublishError>;
}

/// Non-interactive default: declines recovery, which aborts the run.
pub struct DenyRecovery;

impl RecoveryConfirm for DenyRecovery {
    fn confirm(&self, _module: &str) -> Result<bool, PublishError> {
        Ok(false)
    }
}

/// Publishing driver for one root directory.
pub struct Publisher {
    root: PathBuf,
    config: ModstampConfig,
    confirm: Box<dyn RecoveryConfirm>,
}

impl Publisher {
    pub fn new(root: PathBuf, config: ModstampConfig) -> Self {
        Self {
            root,
            config,
            confirm: Box::new(DenyRecovery),
        }
    }

    /// Install the interactive confirmation used under the `prompt` policy.
    pub fn with_confirm(mut self, confirm: Box<dyn RecoveryConfirm>) -> Self {
        self.confirm = confirm;
        self
    }

    /// Run the full pipeline, mutating manifests, version records, and the
    /// consolidated index. `offline` skips the reserved-name fetch.
    pub fn run(&self, offline: bool) -> Result<RunSummary, PublishError> {
        let reserved: HashSet<String> = if offline {
            HashSet::new()
        } else {
            fetch_reserved_names(&self.config.registry)
        };
        self.process(false, &reserved)
    }

    /// Read-only preview: report per-module states without touching any
    /// file (no descriptor relocation, no writes, no registry fetch).
    pub fn preview(&self) -> Result<RunSummary, PublishError> {
        self.process(true, &HashSet::new())
    }

    fn process(
        &self,
        dry_run: bool,
        reserved: &HashSet<String>,
    ) -> Result<RunSummary, PublishError> {
        let dirs = module_dirs(&self.root)?;

        // All collisions are checked before any module is touched.
        for (module, _) in &dirs {
            if reserved.contains(module) {
                return Err(PublishError::ReservedName {
                    module: module.clone(),
                });
            }
        }

        let today = Local::now().date_naive();
        let scan_options = ScanOptions {
            relocate_descriptor: !dry_run,
        };

        let mut modules = Vec::new();
        for (module, dir) in &dirs {
            debug!(module = %module, "Processing module");

            let current = scan_module(dir, module, &scan_options)?;
            let old = Manifest::load(dir)?;
            let record = VersionRecord::load(dir, module)?;

            let (state, needs_update) = match (&old, &record) {
                (Some(manifest), record) => {
                    let outcome = reconcile(Some(manifest), &current);
                    if outcome.requires_update {
                        info!(module = %module, "Deleted or updated files detected");
                        (ModuleState::Changed, true)
                    } else if record.is_none() {
                        info!(module = %module, "Version record not found; creating a new one");
                        (ModuleState::Changed, true)
                    } else {
                        (ModuleState::Unchanged, false)
                    }
                }
                (None, None) => {
                    info!(module = %module, "New module found");
                    (ModuleState::New, true)
                }
                (None, Some(_)) => {
                    if dry_run {
                        (ModuleState::Inconsistent, false)
                    } else if self.resolve_recovery(module)? {
                        warn!(module = %module, "No manifest found; rebuilding it from the current files");
                        (ModuleState::Inconsistent, true)
                    } else {
                        return Err(PublishError::RecoveryDeclined {
                            module: module.clone(),
                        });
                    }
                }
            };

            let stamp = if needs_update && !dry_run {
                let new_stamp =
                    advance_stamp(record.as_ref().map(|r| r.compiled), today, module)?;
                VersionRecord {
                    device: module.clone(),
                    compiled: new_stamp,
                }
                .save(dir)?;

                // The descriptor just changed, so the fingerprint set did
                // too; persist a fresh scan plus the surviving tombstones.
                let fresh = scan_module(dir, module, &scan_options)?;
                let outcome = reconcile(old.as_ref(), &fresh);
                Manifest::new(outcome.entries).save(dir)?;

                info!(module = %module, stamp = new_stamp, "Module stamped");
                Some(new_stamp)
            } else {
                record.as_ref().map(|r| r.compiled)
            };

            modules.push(ModuleReport {
                module: module.clone(),
                state,
                stamp,
            });
        }

        let index = if dry_run {
            Vec::new()
        } else {
            info!("Writing consolidated index");
            write_index(&self.root)?
        };

        Ok(RunSummary { modules, index })
    }

    fn resolve_recovery(&self, module: &str) -> Result<bool, PublishError> {
        match self.config.recovery {
            RecoveryPolicy::Proceed => Ok(true),
            RecoveryPolicy::Abort => Ok(false),
            RecoveryPolicy::Prompt => self.confirm.confirm(module),
        }
    }
}
