//! # Cadence CLI
//!
//! Command line front end for the benchmark harness.
//!
//! This crate contains:
//! - Argument parsing (`clap`)
//! - Configuration resolution (`.env`, config file, flags)
//! - Logging setup (`tracing-subscriber`)
//! - Terminal tables (`comfy-table`)

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod output;

use anyhow::Result;
use tracing::{debug, warn};

pub use cli::{Cli, Command, GlobalArgs};

/// Resolve configuration, install logging and run the parsed command.
pub fn run(cli: &Cli) -> Result<()> {
    // Load .env before anything reads the environment
    let dotenv = dotenvy::dotenv();

    let config = config::resolve(&cli.global)?;
    logging::init(&config.logging, cli.global.log_level.is_some())?;

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => debug!("no .env file"),
        Err(err) => warn!(error = %err, "could not load .env file"),
    }

    commands::execute(&cli.command, &config)
}
