//! Integration tests for configuration loading.

use std::fs;

use stagehand::config::{Config, ConfigError};
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

// =============================================================================
// DEFAULTS
// =============================================================================

#[test]
fn missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();

    let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.execution.update_interval, 1000);
    assert!(config.discovery.enforce_uniqueness);
    assert!(config.cache.enabled);
    assert!(!config.cli.partial_names);
}

#[test]
fn empty_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

#[test]
fn config_path_ends_in_app_dir() {
    let path = Config::config_path();

    assert!(path.ends_with("stagehand/config.toml"));
}

// =============================================================================
// PARSING
// =============================================================================

#[test]
fn sections_override_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[discovery]
modules = ["acme.readers", "DEFAULT"]
excluded_modules = ["acme.broken"]
class_listers = ["acme:list_classes"]
enforce_uniqueness = false

[execution]
update_interval = 50
force_batch = true

[cache]
enabled = false

[cli]
partial_names = true
"#,
    );

    let config = Config::load_from(&path).unwrap();

    assert_eq!(config.discovery.modules, vec!["acme.readers", "DEFAULT"]);
    assert_eq!(config.discovery.excluded_modules, vec!["acme.broken"]);
    assert_eq!(config.discovery.class_listers, vec!["acme:list_classes"]);
    assert!(config.discovery.excluded_class_listers.is_empty());
    assert!(!config.discovery.enforce_uniqueness);
    assert_eq!(config.execution.update_interval, 50);
    assert!(config.execution.force_batch);
    assert!(!config.cache.enabled);
    assert!(config.cli.partial_names);
}

#[test]
fn partial_section_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[execution]\nforce_batch = true\n");

    let config = Config::load_from(&path).unwrap();

    assert!(config.execution.force_batch);
    assert_eq!(config.execution.update_interval, 1000);
    assert!(config.discovery.enforce_uniqueness);
}

#[test]
fn broken_toml_is_malformed() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[execution\nupdate_interval = ");

    let err = Config::load_from(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Malformed { .. }));
    assert!(err.to_string().contains("config.toml"));
}

#[test]
fn wrong_type_is_malformed() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[execution]\nupdate_interval = \"often\"\n");

    assert!(matches!(Config::load_from(&path), Err(ConfigError::Malformed { .. })));
}

// =============================================================================
// VALIDATION
// =============================================================================

#[test]
fn zero_update_interval_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[execution]\nupdate_interval = 0\n");

    let err = Config::load_from(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Invalid { .. }));
    assert!(err.to_string().contains("update_interval"));
}

#[test]
fn blank_module_entry_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[discovery]\nexcluded_modules = [\"a\", \" \"]\n");

    let err = Config::load_from(&path).unwrap_err();

    assert!(err.to_string().contains("discovery.excluded_modules"));
}

#[test]
fn malformed_class_lister_is_rejected() {
    let mut config = Config::default();
    config.discovery.excluded_class_listers = vec!["a:b:c".to_string()];

    let err = config.validate().unwrap_err();

    assert!(err.to_string().contains("module[:function]"));
}

#[test]
fn directory_path_is_unreadable() {
    let dir = TempDir::new().unwrap();

    let err = Config::load_from(dir.path()).unwrap_err();

    assert!(matches!(err, ConfigError::Unreadable { .. }));
}
