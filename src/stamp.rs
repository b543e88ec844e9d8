//! Per-module version record and stamp derivation
//!
//! Each module carries a plain-text descriptor file `<module>.upd` with
//! `<field>: <value>` lines. Two fields are recognized, always written in the
//! same order: `Device` (module identity) and `Compiled` (the stamp).
//! The stamp is an integer shaped `YYYYMMDDnn`, where `nn` is a two-digit
//! same-day sequence counter (00..99).

use crate::error::{PublishError, StoreError};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Descriptor file extension.
pub const DESCRIPTOR_EXT: &str = "upd";

const FIELD_DEVICE: &str = "Device";
const FIELD_COMPILED: &str = "Compiled";

/// Version record of one module. Built fresh on every load; never shared
/// between modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    /// Module identity. Always equals the owning directory's name; the
    /// directory is authoritative, so this is overwritten on every load.
    pub device: String,
    /// Current stamp (`YYYYMMDDnn`).
    pub compiled: u64,
}

/// Canonical descriptor path for a module: `<dir>/<module>.upd`.
pub fn descriptor_path(module_dir: &Path, module: &str) -> PathBuf {
    module_dir.join(format!("{}.{}", module, DESCRIPTOR_EXT))
}

impl VersionRecord {
    /// Load the version record of a module.
    ///
    /// Returns `Ok(None)` when the descriptor file does not exist. The
    /// `Device` value stored on disk is ignored in favor of the directory
    /// name. Unrecognized lines are skipped.
    pub fn load(module_dir: &Path, module: &str) -> Result<Option<VersionRecord>, StoreError> {
        let path = descriptor_path(module_dir, module);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Read { path, source: e }),
        };

        let mut compiled: u64 = 0;
        for (idx, line) in content.lines().enumerate() {
            if let Some(value) = line.strip_prefix(&format!("{}: ", FIELD_COMPILED)) {
                compiled = value.trim().parse().map_err(|_| StoreError::Malformed {
                    path: path.clone(),
                    line: idx + 1,
                    reason: format!("invalid stamp '{}'", value.trim()),
                })?;
            }
        }

        Ok(Some(VersionRecord {
            device: module.to_string(),
            compiled,
        }))
    }

    /// Overwrite the module's descriptor file with the recognized fields in
    /// fixed order.
    pub fn save(&self, module_dir: &Path) -> Result<(), StoreError> {
        let path = descriptor_path(module_dir, &self.device);
        let content = format!(
            "{}: {}\n{}: {}\n",
            FIELD_DEVICE, self.device, FIELD_COMPILED, self.compiled
        );
        fs::write(&path, content).map_err(|e| StoreError::Write { path, source: e })
    }
}

/// First stamp of a calendar day: `YYYYMMDD00`.
pub fn stamp_base(today: NaiveDate) -> u64 {
    format!("{}00", today.format("%Y%m%d"))
        .parse()
        .unwrap_or(0)
}

/// Derive the next stamp for a module.
///
/// The candidate is today's `YYYYMMDD00`. If the current stamp is already at
/// or past the candidate (multiple updates on one day), the stamp advances by
/// one instead, staying strictly greater than its predecessor. The day's
/// sequence window is 00..99; exhausting it is an error rather than a
/// silently reused stamp.
pub fn advance_stamp(
    current: Option<u64>,
    today: NaiveDate,
    module: &str,
) -> Result<u64, PublishError> {
    let candidate = stamp_base(today);
    let current = match current {
        Some(current) => current,
        None => return Ok(candidate),
    };

    if candidate > current {
        return Ok(candidate);
    }

    let next = current + 1;
    if next > candidate + 99 {
        return Err(PublishError::StampOverflow {
            module: module.to_string(),
            stamp: current,
        });
    }
    Ok(next)
}
