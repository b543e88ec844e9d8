//! End-to-end tests for the publish pipeline: fingerprint, reconcile, stamp,
//! and index across whole runs.

use chrono::Local;
use modstamp::config::ModstampConfig;
use modstamp::index::INDEX_FILE;
use modstamp::manifest::{FileStatus, Manifest};
use modstamp::publish::{ModuleState, Publisher};
use modstamp::stamp::{descriptor_path, stamp_base};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn publisher(root: &Path) -> Publisher {
    Publisher::new(root.to_path_buf(), ModstampConfig::default())
}

fn make_module(root: &Path, name: &str, files: &[(&str, &[u8])]) {
    let dir = root.join(name);
    fs::create_dir(&dir).unwrap();
    for (file, content) in files {
        fs::write(dir.join(file), content).unwrap();
    }
}

/// First publication of a fresh module: two active rows plus the descriptor,
/// stamp `<today>00`, and an index line.
#[test]
fn test_fresh_module_first_publication() {
    let temp_dir = TempDir::new().unwrap();
    make_module(
        temp_dir.path(),
        "Sensor1",
        &[("a.bin", b"payload-a".as_slice()), ("b.bin", b"payload-b".as_slice())],
    );

    let summary = publisher(temp_dir.path()).run(true).unwrap();

    let today = Local::now().date_naive();
    assert_eq!(summary.modules[0].state, ModuleState::New);
    assert_eq!(summary.modules[0].stamp, Some(stamp_base(today)));

    let module_dir = temp_dir.path().join("Sensor1");
    let manifest = Manifest::load(&module_dir).unwrap().unwrap();
    assert!(manifest.has_path("a.bin"));
    assert!(manifest.has_path("b.bin"));
    assert!(manifest.has_path("Sensor1.upd"));
    assert!(manifest
        .entries
        .iter()
        .all(|e| e.status == FileStatus::Active && !e.digest.is_empty()));

    let index = fs::read_to_string(temp_dir.path().join(INDEX_FILE)).unwrap();
    assert_eq!(index, format!("Sensor1;{};\r", stamp_base(today)));
}

/// A deleted file shows up exactly once as a tombstone, and the stamp moves
/// to the next same-day sequence value.
#[test]
fn test_deletion_produces_tombstone_and_next_sequence() {
    let temp_dir = TempDir::new().unwrap();
    make_module(
        temp_dir.path(),
        "Sensor1",
        &[("a.bin", b"aaa".as_slice()), ("b.bin", b"bbb".as_slice())],
    );

    let first = publisher(temp_dir.path()).run(true).unwrap();
    fs::remove_file(temp_dir.path().join("Sensor1").join("b.bin")).unwrap();
    let second = publisher(temp_dir.path()).run(true).unwrap();

    assert_eq!(
        second.modules[0].stamp.unwrap(),
        first.modules[0].stamp.unwrap() + 1
    );

    let manifest = Manifest::load(&temp_dir.path().join("Sensor1"))
        .unwrap()
        .unwrap();
    let b_rows: Vec<_> = manifest
        .entries
        .iter()
        .filter(|e| e.path == "b.bin")
        .collect();
    assert_eq!(b_rows.len(), 1);
    assert_eq!(b_rows[0].status, FileStatus::Deleted);
    assert!(b_rows[0].digest.is_empty());
}

/// Identical file sets across runs leave the manifest and descriptor
/// byte-identical.
#[test]
fn test_stable_module_is_left_untouched() {
    let temp_dir = TempDir::new().unwrap();
    make_module(temp_dir.path(), "Sensor1", &[("a.bin", b"aaa".as_slice())]);

    publisher(temp_dir.path()).run(true).unwrap();
    let module_dir = temp_dir.path().join("Sensor1");
    let manifest_before = fs::read(Manifest::file_path(&module_dir)).unwrap();
    let descriptor_before = fs::read(descriptor_path(&module_dir, "Sensor1")).unwrap();

    let rerun = publisher(temp_dir.path()).run(true).unwrap();

    assert_eq!(rerun.modules[0].state, ModuleState::Unchanged);
    assert_eq!(
        fs::read(Manifest::file_path(&module_dir)).unwrap(),
        manifest_before
    );
    assert_eq!(
        fs::read(descriptor_path(&module_dir, "Sensor1")).unwrap(),
        descriptor_before
    );
}

/// Content changes under the same path are picked up through the digest.
#[test]
fn test_content_change_is_detected() {
    let temp_dir = TempDir::new().unwrap();
    make_module(temp_dir.path(), "Sensor1", &[("a.bin", b"v1".as_slice())]);

    publisher(temp_dir.path()).run(true).unwrap();
    let manifest_v1 = Manifest::load(&temp_dir.path().join("Sensor1"))
        .unwrap()
        .unwrap();
    let digest_v1 = manifest_v1
        .entries
        .iter()
        .find(|e| e.path == "a.bin")
        .unwrap()
        .digest
        .clone();

    fs::write(temp_dir.path().join("Sensor1").join("a.bin"), b"v2").unwrap();
    let summary = publisher(temp_dir.path()).run(true).unwrap();

    assert_eq!(summary.modules[0].state, ModuleState::Changed);
    let manifest_v2 = Manifest::load(&temp_dir.path().join("Sensor1"))
        .unwrap()
        .unwrap();
    let digest_v2 = &manifest_v2
        .entries
        .iter()
        .find(|e| e.path == "a.bin")
        .unwrap()
        .digest;
    assert_ne!(digest_v1, *digest_v2);
}

/// A tombstoned path that reappears on disk counts as a change and loses
/// its tombstone.
#[test]
fn test_reappearing_file_resurrects() {
    let temp_dir = TempDir::new().unwrap();
    make_module(
        temp_dir.path(),
        "Sensor1",
        &[("a.bin", b"aaa".as_slice()), ("b.bin", b"bbb".as_slice())],
    );

    publisher(temp_dir.path()).run(true).unwrap();
    fs::remove_file(temp_dir.path().join("Sensor1").join("b.bin")).unwrap();
    publisher(temp_dir.path()).run(true).unwrap();
    fs::write(temp_dir.path().join("Sensor1").join("b.bin"), b"bbb").unwrap();
    let summary = publisher(temp_dir.path()).run(true).unwrap();

    assert_eq!(summary.modules[0].state, ModuleState::Changed);
    let manifest = Manifest::load(&temp_dir.path().join("Sensor1"))
        .unwrap()
        .unwrap();
    let b_rows: Vec<_> = manifest
        .entries
        .iter()
        .filter(|e| e.path == "b.bin")
        .collect();
    assert_eq!(b_rows.len(), 1);
    assert_eq!(b_rows[0].status, FileStatus::Active);
}

/// Multiple modules are processed in one run, each with its own manifest and
/// record; a change in one leaves the others untouched.
#[test]
fn test_modules_are_independent() {
    let temp_dir = TempDir::new().unwrap();
    make_module(temp_dir.path(), "Sensor1", &[("a.bin", b"aaa".as_slice())]);
    make_module(temp_dir.path(), "Sensor2", &[("b.bin", b"bbb".as_slice())]);

    let first = publisher(temp_dir.path()).run(true).unwrap();
    fs::write(temp_dir.path().join("Sensor2").join("b.bin"), b"changed").unwrap();
    let second = publisher(temp_dir.path()).run(true).unwrap();

    assert_eq!(second.modules[0].module, "Sensor1");
    assert_eq!(second.modules[0].state, ModuleState::Unchanged);
    assert_eq!(second.modules[0].stamp, first.modules[0].stamp);
    assert_eq!(second.modules[1].module, "Sensor2");
    assert_eq!(second.modules[1].state, ModuleState::Changed);
}
