//! Integration tests for the record-without-manifest recovery path

use modstamp::cli::{Commands, RunContext};
use modstamp::config::{ConfigLoader, ModstampConfig, RecoveryPolicy, CONFIG_FILE};
use modstamp::error::PublishError;
use modstamp::manifest::Manifest;
use modstamp::publish::Publisher;
use modstamp::stamp::VersionRecord;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn inconsistent_module(root: &Path, name: &str) {
    let dir = root.join(name);
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("payload.bin"), b"data").unwrap();
    VersionRecord {
        device: name.to_string(),
        compiled: 2025110300,
    }
    .save(&dir)
    .unwrap();
}

/// The abort policy turns the inconsistent state into a fatal error.
#[test]
fn test_abort_policy_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    inconsistent_module(temp_dir.path(), "Sensor1");

    let config = ModstampConfig {
        recovery: RecoveryPolicy::Abort,
        ..Default::default()
    };
    let err = Publisher::new(temp_dir.path().to_path_buf(), config)
        .run(true)
        .unwrap_err();
    assert!(matches!(err, PublishError::RecoveryDeclined { ref module } if module == "Sensor1"));
    assert!(Manifest::load(&temp_dir.path().join("Sensor1"))
        .unwrap()
        .is_none());
}

/// The proceed policy rebuilds the manifest and advances the stamp.
#[test]
fn test_proceed_policy_rebuilds_manifest() {
    let temp_dir = TempDir::new().unwrap();
    inconsistent_module(temp_dir.path(), "Sensor1");

    let config = ModstampConfig {
        recovery: RecoveryPolicy::Proceed,
        ..Default::default()
    };
    let summary = Publisher::new(temp_dir.path().to_path_buf(), config)
        .run(true)
        .unwrap();

    let manifest = Manifest::load(&temp_dir.path().join("Sensor1"))
        .unwrap()
        .unwrap();
    assert!(manifest.has_path("payload.bin"));
    assert!(summary.modules[0].stamp.unwrap() > 2025110300);
}

/// `publish --yes` is the CLI spelling of the proceed policy.
#[test]
fn test_publish_yes_flag_proceeds() {
    let temp_dir = TempDir::new().unwrap();
    inconsistent_module(temp_dir.path(), "Sensor1");

    let context = RunContext::new(temp_dir.path().to_path_buf(), None).unwrap();
    context
        .execute(&Commands::Publish {
            yes: true,
            dry_run: false,
            offline: true,
        })
        .unwrap();

    assert!(Manifest::load(&temp_dir.path().join("Sensor1"))
        .unwrap()
        .is_some());
}

/// The policy can come from the workspace config file.
#[test]
fn test_policy_from_workspace_config() {
    let temp_dir = TempDir::new().unwrap();
    inconsistent_module(temp_dir.path(), "Sensor1");
    fs::write(
        temp_dir.path().join(CONFIG_FILE),
        "recovery = \"abort\"\n",
    )
    .unwrap();

    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    let err = Publisher::new(temp_dir.path().to_path_buf(), config)
        .run(true)
        .unwrap_err();
    assert!(matches!(err, PublishError::RecoveryDeclined { .. }));
}

/// A dry run only reports the inconsistency; it neither prompts nor writes.
#[test]
fn test_preview_reports_inconsistency() {
    let temp_dir = TempDir::new().unwrap();
    inconsistent_module(temp_dir.path(), "Sensor1");

    let config = ModstampConfig {
        recovery: RecoveryPolicy::Abort,
        ..Default::default()
    };
    let summary = Publisher::new(temp_dir.path().to_path_buf(), config)
        .preview()
        .unwrap();

    assert_eq!(
        summary.modules[0].state,
        modstamp::publish::ModuleState::Inconsistent
    );
    assert!(Manifest::load(&temp_dir.path().join("Sensor1"))
        .unwrap()
        .is_none());
}
