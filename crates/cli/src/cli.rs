//! Command line definition

use std::path::PathBuf;

use cadence_domain::{StoreKind, Workload};
use clap::{Args, Parser, Subcommand};

/// Benchmark document and relational stores on a music catalog workload
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "cadence", version, about)]
pub struct Cli {
    /// Options shared by every subcommand
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct GlobalArgs {
    /// Config file (TOML or JSON); probed from the working directory when absent
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level or filter directive, overrides RUST_LOG and the config file
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Time one workload on one store at one scale
    Run(RunArgs),

    /// Run workloads × stores × scales, print a table and render the chart
    Compare(CompareArgs),

    /// Fill a throwaway store and show what the catalog looks like
    Seed(SeedArgs),

    /// Project a measured mean and standard deviation to other scales
    Extrapolate(ExtrapolateArgs),
}

/// Arguments for `run`
#[derive(Args, Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// insert, insert-many, read, update or delete
    #[arg(long)]
    pub workload: Workload,

    /// document, sqlite or postgres
    #[arg(long)]
    pub store: StoreKind,

    /// Entries per run; first configured scale when absent
    #[arg(long, value_name = "N")]
    pub scale: Option<u64>,

    /// Timed trials; configured trial count when absent
    #[arg(long, value_name = "T")]
    pub trials: Option<u32>,

    /// Comma-separated scales to project the result to
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub extrapolate_to: Vec<u64>,

    /// Seed for the synthetic data generator
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for `compare`
#[derive(Args, Debug, Clone, PartialEq)]
pub struct CompareArgs {
    /// Comma-separated workloads
    #[arg(long, value_name = "LIST", value_delimiter = ',', required = true)]
    pub workloads: Vec<Workload>,

    /// Comma-separated store kinds
    #[arg(long, value_name = "LIST", value_delimiter = ',', required = true)]
    pub stores: Vec<StoreKind>,

    /// Comma-separated scales; configured scales when absent
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub scales: Vec<u64>,

    /// Timed trials per run; configured trial count when absent
    #[arg(long, value_name = "T")]
    pub trials: Option<u32>,

    /// Comma-separated scales the largest measurement is projected to
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub extrapolate_to: Vec<u64>,

    /// Chart title; derived from the stores and workloads when absent
    #[arg(long)]
    pub title: Option<String>,

    /// Chart directory; configured output directory when absent
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also write the outcome as JSON into DIR
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Seed for the synthetic data generator
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for `seed`
#[derive(Args, Debug, Clone, PartialEq)]
pub struct SeedArgs {
    /// Store kind to fill
    #[arg(long)]
    pub store: StoreKind,

    /// Entries to generate
    #[arg(long, value_name = "N", default_value_t = 25)]
    pub count: usize,

    /// Playlist view rows to print
    #[arg(long, value_name = "M", default_value_t = 10)]
    pub show: usize,

    /// Seed for the synthetic data generator
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for `extrapolate`
#[derive(Args, Debug, Clone, PartialEq)]
pub struct ExtrapolateArgs {
    /// Measured mean in seconds
    #[arg(long)]
    pub mean: f64,

    /// Measured standard deviation in seconds
    #[arg(long)]
    pub std: f64,

    /// Scale the measurement was taken at
    #[arg(long, value_name = "N")]
    pub from: u64,

    /// Comma-separated target scales
    #[arg(long, value_name = "LIST", value_delimiter = ',', required = true)]
    pub to: Vec<u64>,
}
