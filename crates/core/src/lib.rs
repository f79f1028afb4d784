//! # Cadence Core
//!
//! Benchmark harness and catalog workloads, free of store drivers.
//!
//! This crate contains:
//! - The performance harness (timed trials, statistics, extrapolation)
//! - Port interfaces for catalog stores, store providers and data sources
//! - CRUD workloads and the experiment runner
//! - The comparison model handed to chart renderers
//!
//! ## Architecture Principles
//! - Only depends on `cadence-domain`
//! - No database, filesystem or image code
//! - All backends plug in through traits

pub mod catalog;
pub mod experiments;
pub mod harness;
pub mod report;
pub mod workloads;

// Re-export specific items to avoid ambiguity
pub use catalog::{
    generate_entries, generate_entry, run_scoped, CatalogSession, CatalogStore, StoreLease,
    StoreProvider, SyntheticData,
};
pub use experiments::{run_experiment, ExperimentOutcome, ExperimentPlan, SeriesOutcome};
pub use harness::{extrapolate, run_benchmark, Benchmark, Extrapolate, Extrapolation};
pub use report::{artifact_file_name, report, Comparison, ComparisonRenderer, Series};
pub use workloads::benchmark_for;
