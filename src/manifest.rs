//! Per-module manifest: the persisted list of files and tombstones
//!
//! The manifest lives at `<module>/filelist.csv` as semicolon-delimited rows
//! of `path;status;digest` with no header. An empty status marks an active
//! file; `delete` marks a tombstone (digest empty). The file is fully
//! rewritten on every detected change and read on every run.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name inside each module directory. Never fingerprinted.
pub const MANIFEST_FILE: &str = "filelist.csv";

/// Status column of a manifest row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Active,
    Deleted,
}

impl FileStatus {
    /// On-disk status field: empty string for active rows, `delete` for
    /// tombstones.
    pub fn as_field(&self) -> &'static str {
        match self {
            FileStatus::Active => "",
            FileStatus::Deleted => "delete",
        }
    }

    fn parse(field: &str) -> Option<FileStatus> {
        match field {
            "" => Some(FileStatus::Active),
            "delete" => Some(FileStatus::Deleted),
            _ => None,
        }
    }
}

/// One manifest row: a module-relative path, its status, and its content
/// digest (empty for tombstones).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub status: FileStatus,
    pub digest: String,
}

impl FileEntry {
    pub fn active(path: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Active,
            digest: digest.into(),
        }
    }

    pub fn tombstone(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Deleted,
            digest: String::new(),
        }
    }
}

/// Ordered manifest for one module. Order is insertion order from the
/// directory walk; preserved for diff stability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub entries: Vec<FileEntry>,
}

impl Manifest {
    pub fn new(entries: Vec<FileEntry>) -> Self {
        Self { entries }
    }

    /// Path of the manifest file for a module directory.
    pub fn file_path(module_dir: &Path) -> PathBuf {
        module_dir.join(MANIFEST_FILE)
    }

    /// Whether the manifest contains an entry equal to the given one
    /// (full path + status + digest tuple).
    pub fn contains(&self, entry: &FileEntry) -> bool {
        self.entries.contains(entry)
    }

    /// Whether any entry (active or tombstoned) carries the given path.
    pub fn has_path(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }

    /// Load the manifest for a module.
    ///
    /// Returns `Ok(None)` when no manifest file exists yet. A manifest file
    /// with zero rows is a valid empty manifest. Any other read failure is
    /// fatal for the run.
    pub fn load(module_dir: &Path) -> Result<Option<Manifest>, StoreError> {
        let path = Self::file_path(module_dir);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Read {
                    path,
                    source: e,
                })
            }
        };

        let mut entries = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(';').collect();
            if fields.len() != 3 {
                return Err(StoreError::Malformed {
                    path,
                    line: idx + 1,
                    reason: format!("expected 3 fields, found {}", fields.len()),
                });
            }
            let status = FileStatus::parse(fields[1]).ok_or_else(|| StoreError::Malformed {
                path: path.clone(),
                line: idx + 1,
                reason: format!("unknown status '{}'", fields[1]),
            })?;
            entries.push(FileEntry {
                path: fields[0].to_string(),
                status,
                digest: fields[2].to_string(),
            });
        }

        Ok(Some(Manifest { entries }))
    }

    /// Fully overwrite the module's manifest file with the entries in order.
    pub fn save(&self, module_dir: &Path) -> Result<(), StoreError> {
        let path = Self::file_path(module_dir);
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.path);
            out.push(';');
            out.push_str(entry.status.as_field());
            out.push(';');
            out.push_str(&entry.digest);
            out.push_str("\r\n");
        }
        fs::write(&path, out).map_err(|e| StoreError::Write { path, source: e })
    }
}
