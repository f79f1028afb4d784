//! # Cadence Domain
//!
//! Domain types shared by the benchmark harness, its stores and the CLI.
//!
//! This crate contains:
//! - Measurement types (ScalePoint, BenchmarkResult, ExtrapolatedResult)
//! - Music catalog records (CatalogEntry, Song, Playlist, PlaylistTrack)
//! - Store and workload selectors
//! - Error types and Result definitions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other Cadence crates
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
