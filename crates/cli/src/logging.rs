//! tracing-subscriber setup for the binary

use anyhow::{anyhow, Result};
use cadence_domain::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr so tables on stdout stay
/// clean.
///
/// `RUST_LOG` wins over the configured level unless `level_forced` is set
/// (an explicit `--log-level`).
pub fn init(config: &LoggingConfig, level_forced: bool) -> Result<()> {
    let filter = filter_for(config, level_forced)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    let installed = if config.json { builder.json().try_init() } else { builder.try_init() };
    installed.map_err(|err| anyhow!("failed to install log subscriber: {err}"))
}

fn filter_for(config: &LoggingConfig, level_forced: bool) -> Result<EnvFilter> {
    if !level_forced {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
    }
    EnvFilter::try_new(&config.level)
        .map_err(|err| anyhow!("invalid log level '{}': {err}", config.level))
}
