//! Shared helpers for cadence-infra integration tests
#![allow(dead_code)]

use std::sync::Once;

use cadence_core::generate_entries;
use cadence_domain::{CatalogEntry, StoreConfig};
use cadence_infra::FakeCatalogData;

pub const POSTGRES_URL_VAR: &str = "CADENCE_POSTGRES_URL";

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness' captured writer.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("cadence_infra=debug,cadence_core=debug")
            .with_test_writer()
            .try_init();
    });
}

/// `count` deterministic entries.
pub fn entries(seed: u64, count: usize) -> Vec<CatalogEntry> {
    let mut data = FakeCatalogData::seeded(seed);
    generate_entries(&mut data, count)
}

/// Store config pointing at the live PostgreSQL server, when one is
/// configured. Tests that need it return early otherwise.
pub fn postgres_config() -> Option<StoreConfig> {
    let url = std::env::var(POSTGRES_URL_VAR).ok().filter(|url| !url.trim().is_empty())?;
    Some(StoreConfig { postgres_url: Some(url), temp_root: None })
}

/// Store config whose scratch directories live under `root`.
pub fn scratch_config(root: &std::path::Path) -> StoreConfig {
    StoreConfig { postgres_url: None, temp_root: Some(root.display().to_string()) }
}

/// Number of entries directly inside `dir`, 0 when it does not exist.
pub fn dir_entries(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}
