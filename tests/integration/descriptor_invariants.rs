//! Integration tests for the per-module descriptor invariant

use modstamp::config::{ModstampConfig, RecoveryPolicy};
use modstamp::error::PublishError;
use modstamp::index::INDEX_FILE;
use modstamp::manifest::Manifest;
use modstamp::publish::Publisher;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn publisher(root: &Path) -> Publisher {
    Publisher::new(root.to_path_buf(), ModstampConfig::default())
}

/// A descriptor parked somewhere else in the module is moved to
/// `<module>/<module>.upd` during publishing, and the manifest records the
/// canonical path.
#[test]
fn test_misplaced_descriptor_is_moved_to_canonical_path() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("Sensor1");
    fs::create_dir_all(dir.join("firmware")).unwrap();
    fs::write(dir.join("firmware").join("legacy.upd"), b"Device: Sensor1\n").unwrap();
    fs::write(dir.join("firmware").join("img.bin"), b"fw").unwrap();

    publisher(temp_dir.path()).run(true).unwrap();

    assert!(dir.join("Sensor1.upd").exists());
    assert!(!dir.join("firmware").join("legacy.upd").exists());
    let manifest = Manifest::load(&dir).unwrap().unwrap();
    assert!(manifest.has_path("Sensor1.upd"));
}

/// Two descriptor files anywhere in one module abort the whole batch.
#[test]
fn test_ambiguous_descriptor_aborts_batch() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("Sensor1");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("Sensor1.upd"), b"Device: Sensor1\n").unwrap();
    fs::write(dir.join("Backup.upd"), b"Device: Sensor1\n").unwrap();

    let err = publisher(temp_dir.path()).run(true).unwrap_err();
    assert!(matches!(
        err,
        PublishError::AmbiguousDescriptor { ref module, .. } if module == "Sensor1"
    ));
    // The run stopped before aggregation.
    assert!(!temp_dir.path().join(INDEX_FILE).exists());
}

/// A fatal error in a later module stops the run: the index is never
/// written, even though earlier modules were already processed. Recovery is
/// rerunning after the fix.
#[test]
fn test_later_failure_leaves_no_index() {
    let temp_dir = TempDir::new().unwrap();
    let good = temp_dir.path().join("Aaa");
    fs::create_dir(&good).unwrap();
    fs::write(good.join("ok.bin"), b"ok").unwrap();

    let bad = temp_dir.path().join("Bbb");
    fs::create_dir(&bad).unwrap();
    fs::write(bad.join("one.upd"), b"Device: Bbb\n").unwrap();
    fs::write(bad.join("two.upd"), b"Device: Bbb\n").unwrap();

    let err = publisher(temp_dir.path()).run(true).unwrap_err();
    assert!(matches!(err, PublishError::AmbiguousDescriptor { .. }));

    // The earlier module was stamped (crash-and-rerun model), but the
    // consolidated index must not exist yet.
    assert!(Manifest::load(&good).unwrap().is_some());
    assert!(!temp_dir.path().join(INDEX_FILE).exists());

    // After the fix, a rerun completes and aggregates everything. Deleting
    // the stray descriptor leaves Bbb with a record but no manifest, so the
    // rerun resolves that recovery with the proceed policy.
    fs::remove_file(bad.join("two.upd")).unwrap();
    let config = ModstampConfig {
        recovery: RecoveryPolicy::Proceed,
        ..Default::default()
    };
    let summary = Publisher::new(temp_dir.path().to_path_buf(), config)
        .run(true)
        .unwrap();
    assert_eq!(summary.index.len(), 2);
}
