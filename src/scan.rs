//! Module fingerprinting
//!
//! Walks one module directory and produces the current (path, digest) set,
//! excluding the manifest file itself. Also enforces the descriptor
//! invariant: a module carries at most one `.upd` file, and it belongs at
//! `<module>/<module>.upd`. A misplaced descriptor is moved there; more than
//! one anywhere in the module aborts the run.

use crate::digest::digest_file;
use crate::error::{PublishError, StoreError};
use crate::manifest::{FileEntry, MANIFEST_FILE};
use crate::stamp::{descriptor_path, DESCRIPTOR_EXT};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// Scan behavior knobs.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Whether a misplaced descriptor file is moved to its canonical path.
    /// Disabled for read-only previews.
    pub relocate_descriptor: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            relocate_descriptor: true,
        }
    }
}

/// Fingerprint one module directory.
///
/// Entries come back in traversal order (sorted by file name per level, so
/// the order is stable across runs). Any read failure while hashing is fatal
/// for the whole run; partial fingerprint sets are never returned.
pub fn scan_module(
    module_dir: &Path,
    module: &str,
    options: &ScanOptions,
) -> Result<Vec<FileEntry>, PublishError> {
    let mut entries = Vec::new();
    let mut descriptors: Vec<(usize, PathBuf)> = Vec::new();

    let walker = WalkDir::new(module_dir)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| module_dir.to_path_buf());
            StoreError::Read {
                path,
                source: e.into(),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name() == MANIFEST_FILE {
            continue;
        }

        let path = entry.path();
        let relative = path
            .strip_prefix(module_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();
        let digest = digest_file(path)?;

        if path.extension().map(|ext| ext == DESCRIPTOR_EXT) == Some(true) {
            descriptors.push((entries.len(), path.to_path_buf()));
        }
        entries.push(FileEntry::active(relative, digest));
    }

    if descriptors.len() > 1 {
        return Err(PublishError::AmbiguousDescriptor {
            module: module.to_string(),
            found: descriptors
                .iter()
                .map(|(idx, _)| entries[*idx].path.clone())
                .collect(),
        });
    }

    if let Some((idx, found_at)) = descriptors.pop() {
        let canonical = descriptor_path(module_dir, module);
        if found_at != canonical && options.relocate_descriptor {
            info!(
                module,
                from = %found_at.display(),
                to = %canonical.display(),
                "Moving descriptor to its canonical path"
            );
            fs::rename(&found_at, &canonical).map_err(|e| StoreError::Write {
                path: canonical.clone(),
                source: e,
            })?;
            entries[idx].path = canonical
                .strip_prefix(module_dir)
                .unwrap_or(&canonical)
                .to_string_lossy()
                .to_string();
        }
    }

    Ok(entries)
}
