//! Cadence - document vs relational store benchmarks
//!
//! Main entry point for the `cadence` binary.

use std::process::ExitCode;

use cadence_cli::Cli;
use clap::Parser;

#[allow(clippy::print_stderr)]
fn main() -> ExitCode {
    let cli = Cli::parse();

    match cadence_cli::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
