//! Config file loading and the runtime-check switch.

use std::fs;

use handoff_config::{ConfigError, HandoffConfig};
use handoff_core::Auditor;
use handoff_types::RuntimeChecks;
use tempfile::tempdir;

#[test]
fn missing_file_loads_as_none() {
    let dir = tempdir().unwrap();
    let loaded = HandoffConfig::load_from(&dir.path().join("config.toml")).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn file_can_disable_runtime_checks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[audit]\nruntime_checks = false\n\n[logging]\nfilter = \"handoff_core=debug\"\n",
    )
    .unwrap();

    let config = HandoffConfig::load_from(&path).unwrap().unwrap();
    assert_eq!(
        config.runtime_checks_with_override(None),
        RuntimeChecks::Disabled
    );
    assert_eq!(config.log_filter(), Some("handoff_core=debug"));
}

#[test]
fn override_wins_over_file() {
    let config = HandoffConfig::parse("[audit]\nruntime_checks = false\n").unwrap();
    assert_eq!(
        config.runtime_checks_with_override(Some("on")),
        RuntimeChecks::Enabled
    );
    // Unrecognized values fall back to the file.
    assert_eq!(
        config.runtime_checks_with_override(Some("maybe")),
        RuntimeChecks::Disabled
    );
}

#[test]
fn malformed_file_reports_its_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[audit\nruntime_checks = ").unwrap();

    let err = HandoffConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), &path);
    assert!(err.to_string().contains("config.toml"));
}

#[test]
fn auditor_follows_config() {
    let config = HandoffConfig::parse("[audit]\nruntime_checks = false\n").unwrap();
    let checks = config.runtime_checks_with_override(None);
    assert_eq!(Auditor::new(checks), Auditor::disabled());
    assert_eq!(
        Auditor::new(HandoffConfig::default().runtime_checks_with_override(None)),
        Auditor::enabled()
    );
}
