//! Manifest reconciliation
//!
//! Pure diff between a module's previously published manifest and its freshly
//! fingerprinted file set. Decides whether the module needs a version bump
//! and derives the manifest to persist.

use crate::manifest::{FileEntry, FileStatus, Manifest, MANIFEST_FILE};
use std::collections::HashSet;

/// Result of reconciling one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Whether the module's version stamp must advance.
    pub requires_update: bool,
    /// Manifest to persist: fresh fingerprints followed by tombstones.
    pub entries: Vec<FileEntry>,
}

/// Reconcile the old manifest (possibly absent) against the current
/// fingerprint set.
///
/// Matching is exact equality of the full `(path, status, digest)` tuple, so
/// a changed digest for the same path counts as new, and so does a path that
/// reappears after being tombstoned (status differs).
///
/// Tombstones are emitted for every previously known path that no longer
/// exists on disk, the manifest file itself excepted. A tombstone that was
/// already present in the old manifest is carried forward without counting as
/// a change; only a newly deleted path (previously active) flags an update.
/// An absent old manifest yields no tombstones and, for a non-empty module,
/// flags an update on its own; the driver additionally forces an update for
/// brand-new modules via the missing-version-record check.
pub fn reconcile(old: Option<&Manifest>, current: &[FileEntry]) -> ReconcileOutcome {
    let old_entries: &[FileEntry] = old.map(|m| m.entries.as_slice()).unwrap_or(&[]);

    let mut requires_update = match old {
        Some(manifest) => current.iter().any(|entry| !manifest.contains(entry)),
        None => !current.is_empty(),
    };

    let current_paths: HashSet<&str> = current.iter().map(|e| e.path.as_str()).collect();

    let mut tombstones = Vec::new();
    let mut tombstoned: HashSet<&str> = HashSet::new();
    for old_entry in old_entries {
        if current_paths.contains(old_entry.path.as_str()) {
            continue;
        }
        if old_entry.path == MANIFEST_FILE {
            continue;
        }
        if !tombstoned.insert(old_entry.path.as_str()) {
            continue;
        }
        if old_entry.status == FileStatus::Active {
            requires_update = true;
        }
        tombstones.push(FileEntry::tombstone(old_entry.path.clone()));
    }

    let mut entries = current.to_vec();
    entries.extend(tombstones);

    ReconcileOutcome {
        requires_update,
        entries,
    }
}
