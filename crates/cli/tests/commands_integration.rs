//! Parsed command lines dispatched end to end against embedded stores.

use cadence_cli::{commands, Cli};
use cadence_domain::{Config, StoreConfig};
use clap::Parser;
use tempfile::TempDir;

fn config_with_scratch(root: &TempDir) -> Config {
    Config {
        stores: StoreConfig {
            postgres_url: None,
            temp_root: Some(root.path().display().to_string()),
        },
        ..Config::default()
    }
}

fn parse(line: &str) -> Cli {
    Cli::try_parse_from(std::iter::once("cadence").chain(line.split_whitespace())).unwrap()
}

#[test]
fn compare_from_command_line_renders_chart() {
    let scratch = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let line = format!(
        "compare --workloads insert,update,delete --stores doc,sqlite --scales 3,6 --trials 2 \
         --seed 8 --title Nightly --output-dir {}",
        out.path().display()
    );

    commands::execute(&parse(&line).command, &config_with_scratch(&scratch)).unwrap();

    assert!(out.path().join("nightly.png").is_file());
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn run_and_seed_leave_no_scratch_behind() {
    let scratch = TempDir::new().unwrap();
    let config = config_with_scratch(&scratch);

    for line in [
        "run --workload read --store sqlite --scale 5 --trials 2 --extrapolate-to 50",
        "run --workload delete --store document --scale 4 --trials 3",
        "seed --store sqlite --count 4 --show 2 --seed 1",
    ] {
        commands::execute(&parse(line).command, &config).unwrap();
    }
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn extrapolate_rejects_zero_origin() {
    let cli = parse("extrapolate --mean 1.0 --std 0.1 --from 0 --to 10");
    let err = commands::execute(&cli.command, &Config::default()).unwrap_err();
    assert!(format!("{err:#}").contains("Invalid scale"));
}
