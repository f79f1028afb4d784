//! Configuration loader
//!
//! Loads harness configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Uses built-in defaults when no file exists
//!
//! ## Environment Variables
//! - `CADENCE_TRIAL_COUNT`: Trials per benchmark run (required)
//! - `CADENCE_SCALES`: Comma-separated scale points (required)
//! - `CADENCE_EXTRAPOLATE_TO`: Comma-separated extrapolation targets
//! - `CADENCE_SEED`: Seed for the synthetic data generator
//! - `CADENCE_PLOT_DIR`: Output directory for charts
//! - `CADENCE_POSTGRES_URL`: PostgreSQL connection string
//! - `CADENCE_TEMP_ROOT`: Parent directory for ephemeral stores
//! - `CADENCE_LOG_LEVEL`: Log level or filter directive
//! - `CADENCE_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./cadence.toml` or `./cadence.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names in the parent and grandparent directories

use std::path::{Path, PathBuf};

use cadence_domain::{CadenceError, Config, HarnessConfig, Result};

const CONFIG_FILE_NAMES: [&str; 4] = ["cadence.toml", "cadence.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to a config file, and to
/// [`Config::default`] when no file is found.
///
/// # Errors
/// Returns `CadenceError::Config` if a config file exists but cannot be read
/// or parsed.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            match probe_config_paths() {
                Some(path) => load_from_file(&path),
                None => {
                    tracing::debug!("No config file found, using defaults");
                    Ok(Config::default())
                }
            }
        }
    }
}

/// Load configuration from environment variables
///
/// `CADENCE_TRIAL_COUNT` and `CADENCE_SCALES` are required. Everything else
/// falls back to its default.
///
/// # Errors
/// Returns `CadenceError::Config` if required variables are missing or any
/// variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let trial_count = env_var("CADENCE_TRIAL_COUNT").and_then(|s| {
        s.trim()
            .parse::<u32>()
            .map_err(|e| CadenceError::Config(format!("Invalid trial count: {}", e)))
    })?;
    let scales = env_var("CADENCE_SCALES").and_then(|s| parse_scale_list("CADENCE_SCALES", &s))?;
    let extrapolate_to = match optional_env("CADENCE_EXTRAPOLATE_TO") {
        Some(raw) => parse_scale_list("CADENCE_EXTRAPOLATE_TO", &raw)?,
        None => Vec::new(),
    };
    let seed = optional_env("CADENCE_SEED")
        .map(|s| {
            s.trim()
                .parse::<u64>()
                .map_err(|e| CadenceError::Config(format!("Invalid seed: {}", e)))
        })
        .transpose()?;

    let mut config = Config {
        harness: HarnessConfig { trial_count, scales, extrapolate_to, seed },
        ..Config::default()
    };

    if let Some(dir) = optional_env("CADENCE_PLOT_DIR") {
        config.report.output_dir = dir;
    }
    config.stores.postgres_url = optional_env("CADENCE_POSTGRES_URL");
    config.stores.temp_root = optional_env("CADENCE_TEMP_ROOT");
    if let Some(level) = optional_env("CADENCE_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("CADENCE_LOG_JSON", false);

    Ok(config)
}

/// Load configuration from a file
///
/// Format is detected by file extension (`.json` or `.toml`). Missing
/// sections and fields take their defaults.
///
/// # Errors
/// Returns `CadenceError::Config` if:
/// - File not found
/// - File format is invalid or unsupported
pub fn load_from_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(CadenceError::Config(format!("Config file not found: {}", path.display())));
    }

    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| CadenceError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, path)
}

/// Parse configuration from string content
///
/// # Errors
/// Returns `CadenceError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CadenceError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CadenceError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(CadenceError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    probe_from(&cwd)
}

fn probe_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(3)
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Parse a comma-separated list of scale points
///
/// # Errors
/// Returns `CadenceError::Config` naming `key` when an item is not a
/// non-negative integer.
pub fn parse_scale_list(key: &str, raw: &str) -> Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.replace('_', "").parse::<u64>().map_err(|e| {
                CadenceError::Config(format!("Invalid value '{}' in {}: {}", item, key, e))
            })
        })
        .collect()
}

/// Get required environment variable
///
/// # Errors
/// Returns `CadenceError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        CadenceError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use cadence_domain::constants::{DEFAULT_PLOT_DIR, DEFAULT_SCALES};
    use once_cell::sync::Lazy;
    use tempfile::TempDir;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 9] = [
        "CADENCE_TRIAL_COUNT",
        "CADENCE_SCALES",
        "CADENCE_EXTRAPOLATE_TO",
        "CADENCE_SEED",
        "CADENCE_PLOT_DIR",
        "CADENCE_POSTGRES_URL",
        "CADENCE_TEMP_ROOT",
        "CADENCE_LOG_LEVEL",
        "CADENCE_LOG_JSON",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("CADENCE_TEST_BOOL_ON", "on");
        std::env::set_var("CADENCE_TEST_BOOL_UPPER", "TRUE");
        std::env::set_var("CADENCE_TEST_BOOL_OFF", "no");

        assert!(env_bool("CADENCE_TEST_BOOL_ON", false));
        assert!(env_bool("CADENCE_TEST_BOOL_UPPER", false));
        assert!(!env_bool("CADENCE_TEST_BOOL_OFF", true));

        std::env::remove_var("CADENCE_TEST_BOOL_MISSING");
        assert!(env_bool("CADENCE_TEST_BOOL_MISSING", true));

        std::env::remove_var("CADENCE_TEST_BOOL_ON");
        std::env::remove_var("CADENCE_TEST_BOOL_UPPER");
        std::env::remove_var("CADENCE_TEST_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("CADENCE_TRIAL_COUNT", "5");
        std::env::set_var("CADENCE_SCALES", "100, 1_000,10000");
        std::env::set_var("CADENCE_EXTRAPOLATE_TO", "100000");
        std::env::set_var("CADENCE_SEED", "42");
        std::env::set_var("CADENCE_PLOT_DIR", "/tmp/cadence-plots");
        std::env::set_var("CADENCE_POSTGRES_URL", "postgres://localhost/bench");
        std::env::set_var("CADENCE_LOG_LEVEL", "debug");
        std::env::set_var("CADENCE_LOG_JSON", "true");

        let result = load_from_env();
        assert!(result.is_ok(), "Should load config from env vars, error: {:?}", result.err());

        let config = result.unwrap();
        assert_eq!(config.harness.trial_count, 5);
        assert_eq!(config.harness.scales, vec![100, 1_000, 10_000]);
        assert_eq!(config.harness.extrapolate_to, vec![100_000]);
        assert_eq!(config.harness.seed, Some(42));
        assert_eq!(config.report.output_dir, "/tmp/cadence-plots");
        assert_eq!(config.stores.postgres_url.as_deref(), Some("postgres://localhost/bench"));
        assert_eq!(config.stores.temp_root, None);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);

        clear_env();
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("CADENCE_TRIAL_COUNT", "5");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, CadenceError::Config(ref msg) if msg.contains("CADENCE_SCALES")));

        clear_env();
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("CADENCE_TRIAL_COUNT", "ten");
        std::env::set_var("CADENCE_SCALES", "100");

        assert!(matches!(load_from_env(), Err(CadenceError::Config(_))));

        std::env::set_var("CADENCE_TRIAL_COUNT", "10");
        std::env::set_var("CADENCE_SCALES", "100,lots");
        assert!(matches!(load_from_env(), Err(CadenceError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_load_from_file_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cadence.toml");
        std::fs::write(
            &path,
            r#"
[harness]
trial_count = 3
scales = [10, 20]
extrapolate_to = [2000]

[stores]
temp_root = "/var/tmp"
"#,
        )
        .unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.harness.trial_count, 3);
        assert_eq!(config.harness.scales, vec![10, 20]);
        assert_eq!(config.harness.extrapolate_to, vec![2_000]);
        assert_eq!(config.stores.temp_root.as_deref(), Some("/var/tmp"));
        assert_eq!(config.report.output_dir, DEFAULT_PLOT_DIR);
    }

    #[test]
    fn test_load_from_file_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "report": { "output_dir": "charts", "width": 800 } }"#)
            .unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.report.output_dir, "charts");
        assert_eq!(config.report.width, 800);
        assert_eq!(config.harness.scales, DEFAULT_SCALES.to_vec());
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Path::new("/nonexistent/cadence.toml"));
        assert!(matches!(result, Err(CadenceError::Config(_))));
    }

    #[test]
    fn test_parse_config_invalid_and_unsupported() {
        assert!(parse_config(r#"{ "harness": "#, Path::new("x.json")).is_err());
        assert!(parse_config("trial_count = ", Path::new("x.toml")).is_err());
        assert!(parse_config("harness: {}", Path::new("x.yaml")).is_err());
    }

    #[test]
    fn test_probe_finds_file_in_parent() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(probe_from(&nested), None);

        std::fs::write(root.path().join("a").join("cadence.json"), "{}").unwrap();
        assert_eq!(probe_from(&nested), Some(root.path().join("a").join("cadence.json")));

        std::fs::write(nested.join("config.toml"), "").unwrap();
        assert_eq!(probe_from(&nested), Some(nested.join("config.toml")));
    }

    #[test]
    fn test_parse_scale_list_skips_blanks() {
        assert_eq!(parse_scale_list("K", " 1, ,2,").unwrap(), vec![1, 2]);
        assert!(parse_scale_list("K", "-5").is_err());
    }
}
