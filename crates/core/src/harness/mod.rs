//! Performance measurement and extrapolation harness

pub mod extrapolate;
pub mod runner;
pub mod stats;

pub use extrapolate::{extrapolate, Extrapolate, Extrapolation};
pub use runner::{run_benchmark, Benchmark, OperationFn, SetupFn};
pub use stats::summarize;
