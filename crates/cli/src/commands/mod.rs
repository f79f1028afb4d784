//! Subcommand implementations

pub mod compare;
pub mod extrapolate;
pub mod run;
pub mod seed;

use anyhow::Result;
use cadence_domain::Config;

use crate::cli::Command;

/// Dispatch `command` with the resolved configuration.
pub fn execute(command: &Command, config: &Config) -> Result<()> {
    match command {
        Command::Run(args) => run::execute(args, config),
        Command::Compare(args) => compare::execute(args, config).map(|_| ()),
        Command::Seed(args) => seed::execute(args, config),
        Command::Extrapolate(args) => extrapolate::execute(args),
    }
}
