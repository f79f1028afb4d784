//! A leased store paired with the generator feeding it

use std::fmt;

use cadence_domain::{BenchmarkResult, Result};
use tracing::error;

use super::lease::StoreLease;
use super::ports::{StoreProvider, SyntheticData};
use crate::harness::Benchmark;

/// State a catalog workload runs against.
///
/// The fields are public so a closure can borrow the store and the generator
/// at the same time.
pub struct CatalogSession {
    /// Store under test
    pub store: StoreLease,
    /// Source of generated catalog fields
    pub data: Box<dyn SyntheticData>,
}

impl CatalogSession {
    /// Pair `store` with `data`.
    pub fn new(store: StoreLease, data: Box<dyn SyntheticData>) -> Self {
        Self { store, data }
    }
}

impl fmt::Debug for CatalogSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogSession").field("store", &self.store).finish_non_exhaustive()
    }
}

/// Run `benchmark` against a fresh store from `provider` and release it.
///
/// The store is released on every exit path. A teardown failure after a
/// successful run is logged and the measured result is still returned; when
/// the run itself failed its error is returned.
pub fn run_scoped(
    provider: &dyn StoreProvider,
    benchmark: Benchmark<'_, CatalogSession>,
    data: Box<dyn SyntheticData>,
) -> Result<BenchmarkResult> {
    let mut session = CatalogSession::new(provider.acquire()?, data);
    let outcome = benchmark.run(&mut session);

    let label = session.store.label().to_string();
    if let Err(err) = session.store.release() {
        error!(store = %label, provider = provider.label(), error = %err, "store release failed");
    }

    outcome
}
