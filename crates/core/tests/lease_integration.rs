//! Store lease lifecycle across benchmark exit paths

mod support;

use std::panic::{self, AssertUnwindSafe};

use cadence_core::{run_scoped, Benchmark, CatalogSession, StoreProvider};
use cadence_domain::{CadenceError, Result, ScalePoint, Workload};
use support::data::CountingData;
use support::stores::{CountingProvider, Failure};

#[test]
fn explicit_release_tears_down_once() {
    let provider = CountingProvider::default();
    let lease = provider.acquire().unwrap();
    assert_eq!(lease.label(), "memory-1");

    lease.release().unwrap();
    assert_eq!(provider.teardowns(), 1);
}

#[test]
fn dropped_lease_tears_down_once() {
    let provider = CountingProvider::default();
    {
        let _lease = provider.acquire().unwrap();
    }
    assert_eq!(provider.teardowns(), 1);
}

#[test]
fn failing_trial_releases_store_once() {
    let provider = CountingProvider::failing(Failure::Reads);
    let benchmark = cadence_core::benchmark_for(Workload::Read, ScalePoint::new(5), 4);

    let err = run_scoped(&provider, benchmark, CountingData::boxed()).unwrap_err();

    assert!(matches!(err, CadenceError::Trial { trial: 1, trial_count: 4, .. }));
    assert_eq!(provider.acquired(), 1);
    assert_eq!(provider.teardowns(), 1);
    // Setup seeded the store before the trial failed
    assert_eq!(provider.last_counts().map(|counts| counts.songs), Some(5));
}

#[test]
fn failing_setup_releases_store_once() {
    let provider = CountingProvider::failing(Failure::BulkInsert);
    let benchmark = cadence_core::benchmark_for(Workload::Update, ScalePoint::new(5), 4);

    let err = run_scoped(&provider, benchmark, CountingData::boxed()).unwrap_err();

    assert!(matches!(err, CadenceError::Setup { .. }));
    assert_eq!(provider.teardowns(), 1);
}

#[test]
fn panicking_trial_still_releases_store() {
    let provider = CountingProvider::default();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let benchmark = Benchmark::new("explodes", |_: &mut CatalogSession| -> Result<()> {
            panic!("operation blew up")
        })
        .trials(2);
        run_scoped(&provider, benchmark, CountingData::boxed())
    }));

    assert!(outcome.is_err());
    assert_eq!(provider.teardowns(), 1);
}

#[test]
fn teardown_failure_keeps_measured_result() {
    let provider = CountingProvider::failing(Failure::Teardown);
    let benchmark = cadence_core::benchmark_for(Workload::InsertMany, ScalePoint::new(3), 2);

    let result = run_scoped(&provider, benchmark, CountingData::boxed()).unwrap();

    assert_eq!(result.trials, 2);
    assert_eq!(provider.teardowns(), 1);
}
