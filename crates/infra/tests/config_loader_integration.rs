//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use cadence_domain::CadenceError;
use cadence_infra::config;
use tempfile::NamedTempFile;

/// Write `content` to a temp file carrying `extension` and return both; the
/// returned `NamedTempFile` keeps the directory entry alive.
fn config_file(content: &str, extension: &str) -> (NamedTempFile, std::path::PathBuf) {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(content.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    (temp_file, path)
}

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "harness": {
            "trial_count": 4,
            "scales": [100, 1000],
            "extrapolate_to": [100000],
            "seed": 7
        },
        "report": {
            "output_dir": "charts",
            "width": 800,
            "height": 400
        },
        "logging": {
            "level": "debug",
            "json": true
        }
    }"#;

    let (_temp, path) = config_file(json_content, "json");
    let result = config::load_from_file(&path);
    assert!(result.is_ok(), "Failed to load config from JSON file");

    let config = result.unwrap();
    assert_eq!(config.harness.trial_count, 4);
    assert_eq!(config.harness.scales, vec![100, 1000]);
    assert_eq!(config.harness.extrapolate_to, vec![100_000]);
    assert_eq!(config.harness.seed, Some(7));
    assert_eq!(config.report.output_dir, "charts");
    assert_eq!(config.report.width, 800);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
[harness]
trial_count = 3
scales = [250, 500]

[stores]
temp_root = "/tmp/cadence-stores"
postgres_url = "postgres://bench@localhost/cadence"
"#;

    let (_temp, path) = config_file(toml_content, "toml");
    let config = config::load_from_file(&path).expect("Failed to load config from TOML file");

    assert_eq!(config.harness.trial_count, 3);
    assert_eq!(config.harness.scales, vec![250, 500]);
    assert!(config.harness.extrapolate_to.is_empty());
    assert_eq!(config.stores.temp_root.as_deref(), Some("/tmp/cadence-stores"));
    assert_eq!(
        config.stores.postgres_url.as_deref(),
        Some("postgres://bench@localhost/cadence")
    );

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_load_config_with_minimal_fields() {
    let (_temp, path) = config_file("{}", "json");
    let config = config::load_from_file(&path).expect("Failed to load minimal config");

    // Every section falls back to its defaults
    assert_eq!(config, cadence_domain::Config::default());

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let path = std::path::Path::new("/nonexistent/path/cadence.toml");
    let err = config::load_from_file(path).unwrap_err();
    assert!(matches!(err, CadenceError::Config(_)), "unexpected error: {err:?}");
}

#[test]
fn test_load_config_with_invalid_format() {
    let (_temp, path) = config_file("[harness\ntrial_count = ", "toml");
    let err = config::load_from_file(&path).unwrap_err();
    assert!(matches!(err, CadenceError::Config(_)), "unexpected error: {err:?}");

    std::fs::remove_file(&path).ok();
}
