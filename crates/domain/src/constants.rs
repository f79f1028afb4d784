//! Harness constants
//!
//! Centralized defaults used by configuration, workloads and reporting.

// Harness defaults
/// Timed trials per run
pub const DEFAULT_TRIAL_COUNT: u32 = 10;
/// Scales measured when none are configured
pub const DEFAULT_SCALES: [u64; 4] = [250, 500, 1_000, 2_000];

// Reporting defaults (12x6 inches at 100 dpi)
/// Chart directory
pub const DEFAULT_PLOT_DIR: &str = "plots";
/// Chart width in pixels
pub const DEFAULT_CHART_WIDTH: u32 = 1_200;
/// Chart height in pixels
pub const DEFAULT_CHART_HEIGHT: u32 = 600;
/// Extension of rendered charts
pub const CHART_EXTENSION: &str = "png";

// Logging defaults
/// Filter used when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Ephemeral stores
/// Prefix of scratch directories for embedded stores
pub const EPHEMERAL_DIR_PREFIX: &str = "cadence-store-";
/// Prefix of per-lease PostgreSQL schemas
pub const POSTGRES_SCHEMA_PREFIX: &str = "cadence_run_";
