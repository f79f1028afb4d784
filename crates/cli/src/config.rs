//! Resolving the effective configuration for one invocation
//!
//! Precedence, lowest first: built-in defaults, config file, environment,
//! command line flags.

use anyhow::{Context, Result};
use cadence_domain::{Config, HarnessConfig, ScalePoint};
use cadence_infra::config::loader;

use crate::cli::GlobalArgs;

/// Environment variable holding the PostgreSQL connection string
pub const POSTGRES_URL_VAR: &str = "CADENCE_POSTGRES_URL";

/// Load the config named by `--config`, or fall back to the loader's probing.
pub fn resolve(global: &GlobalArgs) -> Result<Config> {
    let mut config = match &global.config {
        Some(path) => loader::load_from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => loader::load().context("failed to load configuration")?,
    };

    // File configs never carry the connection string
    if config.stores.postgres_url.is_none() {
        config.stores.postgres_url =
            std::env::var(POSTGRES_URL_VAR).ok().filter(|url| !url.trim().is_empty());
    }

    apply_global_flags(&mut config, global);
    Ok(config)
}

fn apply_global_flags(config: &mut Config, global: &GlobalArgs) {
    if let Some(level) = &global.log_level {
        config.logging.level = level.clone();
    }
    if global.json_logs {
        config.logging.json = true;
    }
}

/// Harness settings after per-command flags have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessOverrides<'a> {
    /// `--scales`
    pub scales: &'a [u64],
    /// `--trials`
    pub trials: Option<u32>,
    /// `--extrapolate-to`
    pub extrapolate_to: &'a [u64],
    /// `--seed`
    pub seed: Option<u64>,
}

impl HarnessOverrides<'_> {
    /// Empty lists and absent values keep what `base` says.
    pub fn apply(&self, base: &HarnessConfig) -> HarnessConfig {
        HarnessConfig {
            trial_count: self.trials.unwrap_or(base.trial_count),
            scales: pick(self.scales, &base.scales),
            extrapolate_to: pick(self.extrapolate_to, &base.extrapolate_to),
            seed: self.seed.or(base.seed),
        }
    }
}

fn pick(flag: &[u64], base: &[u64]) -> Vec<u64> {
    if flag.is_empty() { base.to_vec() } else { flag.to_vec() }
}

/// Scale for single-run commands: explicit or the first configured scale.
pub fn single_scale(explicit: Option<u64>, harness: &HarnessConfig) -> Result<ScalePoint> {
    explicit
        .or_else(|| harness.scales.first().copied())
        .map(ScalePoint::new)
        .context("no scale given and none configured")
}
