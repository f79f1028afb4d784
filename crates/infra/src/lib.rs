//! # Cadence Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - Catalog stores (SQLite, PostgreSQL, JSON document collections)
//! - Ephemeral store providers
//! - The seeded fake-data generator
//! - The PNG chart renderer
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `cadence-core`
//! - Depends on `cadence-domain` and `cadence-core`
//! - Contains all "impure" code (files, databases, images)

pub mod config;
pub mod database;
pub mod errors;
pub mod fake;
pub mod report;

// Re-export commonly used items
pub use database::*;
pub use errors::InfraError;
pub use fake::FakeCatalogData;
pub use report::PngChartRenderer;
