//! Tests for config loading

use gleaner::config::Config;
use std::path::Path;

#[test]
fn test_config_file_exists() {
    let config_path = Path::new("config.toml");
    assert!(
        config_path.exists(),
        "config.toml should exist in project root"
    );
}

#[test]
fn test_bundled_config_loads_and_validates() {
    let config = Config::from_file(Path::new("config.toml")).unwrap();
    assert!(config.validate().is_ok());

    assert_eq!(config.harvest.stale_cap, 8);
    assert_eq!(config.harvest.max_iterations, 50);
    assert_eq!(config.harvest.checkpoint_interval, 1000);
    assert_eq!(config.harvest.max_pages, 200);
}

#[test]
fn test_missing_config_file_is_an_error() {
    assert!(Config::from_file(Path::new("does-not-exist.toml")).is_err());
}

#[test]
fn test_malformed_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "fetcher = \"not a table\"").unwrap();

    assert!(Config::from_file(&path).is_err());
}
