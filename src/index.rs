//! Consolidated update index
//!
//! Aggregates every module's identity and stamp into `Updates.csv` at the
//! root: one `identity;stamp;` line per module, carriage-return terminated,
//! in directory-name sort order. The file is fully rewritten each run, and
//! aggregation refuses to run past a module without a version record.

use crate::error::{PublishError, StoreError};
use crate::stamp::VersionRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Index file name in the root directory.
pub const INDEX_FILE: &str = "Updates.csv";

/// One line of the consolidated index. Derived fresh from the module's
/// version record on every run; never persisted per-module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub identity: String,
    pub stamp: u64,
}

/// List the top-level module directories of a root, case-sensitively sorted
/// by name.
pub fn module_dirs(root: &Path) -> Result<Vec<(String, PathBuf)>, StoreError> {
    let read_dir = fs::read_dir(root).map_err(|e| StoreError::Read {
        path: root.to_path_buf(),
        source: e,
    })?;

    let mut dirs = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| StoreError::Read {
            path: root.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push((entry.file_name().to_string_lossy().to_string(), path));
        }
    }
    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(dirs)
}

/// Collect the index entries for every module under the root.
///
/// Fails with `MissingVersionRecord` if any module lacks a descriptor; every
/// module must have been stamped before aggregation.
pub fn collect_index(root: &Path) -> Result<Vec<IndexEntry>, PublishError> {
    let mut index = Vec::new();
    for (module, dir) in module_dirs(root)? {
        let record = VersionRecord::load(&dir, &module)?
            .ok_or_else(|| PublishError::MissingVersionRecord {
                module: module.clone(),
            })?;
        index.push(IndexEntry {
            identity: record.device,
            stamp: record.compiled,
        });
    }
    Ok(index)
}

/// Rebuild `Updates.csv` from the version records under the root.
///
/// Returns the written entries.
pub fn write_index(root: &Path) -> Result<Vec<IndexEntry>, PublishError> {
    let index = collect_index(root)?;

    let mut out = String::new();
    for entry in &index {
        out.push_str(&format!("{};{};\r", entry.identity, entry.stamp));
    }

    let path = root.join(INDEX_FILE);
    fs::write(&path, out).map_err(|e| StoreError::Write { path, source: e })?;
    Ok(index)
}
