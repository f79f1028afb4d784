//! CRUD workloads over a [`CatalogSession`]
//!
//! Each workload is a [`Benchmark`] whose operation generates its own input
//! from the session's data source, so the timed window covers generation and
//! store round trips alike for every backend.

use cadence_domain::{Result, ScalePoint, SongPatch, Workload};
use tracing::debug;

use crate::catalog::{generate_entries, CatalogSession};
use crate::harness::Benchmark;

/// Build the benchmark for `workload` at `scale` with `trial_count` trials.
pub fn benchmark_for(
    workload: Workload,
    scale: ScalePoint,
    trial_count: u32,
) -> Benchmark<'static, CatalogSession> {
    let n = scale.as_usize();
    let name = workload.to_string();
    let benchmark = match workload {
        Workload::Insert => Benchmark::new(name, move |session: &mut CatalogSession| {
            let entries = generate_entries(session.data.as_mut(), n);
            for entry in &entries {
                session.store.insert_entry(entry)?;
            }
            Ok(())
        }),
        Workload::InsertMany => Benchmark::new(name, move |session: &mut CatalogSession| {
            let entries = generate_entries(session.data.as_mut(), n);
            session.store.insert_entries(&entries)?;
            Ok(())
        }),
        Workload::Read => Benchmark::new(name, |session: &mut CatalogSession| {
            session.store.playlist_tracks(None)?;
            Ok(())
        })
        .with_setup(seed),
        Workload::Update => Benchmark::new(name, move |session: &mut CatalogSession| {
            let patch = SongPatch::rating(session.data.decimal(1, 1));
            session.store.update_songs(&patch, n)?;
            Ok(())
        })
        .with_setup(seed),
        Workload::Delete => {
            let batch = delete_batch(scale, trial_count);
            Benchmark::new(name, move |session: &mut CatalogSession| {
                session.store.delete_songs(batch)?;
                Ok(())
            })
            .with_setup(seed)
        }
    };

    benchmark.trials(trial_count).at_scale(scale)
}

/// Insert `scale` generated entries in bulk before timing starts.
pub fn seed(session: &mut CatalogSession, scale: ScalePoint) -> Result<()> {
    let entries = generate_entries(session.data.as_mut(), scale.as_usize());
    let inserted = session.store.insert_entries(&entries)?;
    debug!(inserted, store = session.store.label(), "seeded store");
    Ok(())
}

/// Songs removed per delete trial so that all trials together cover the
/// seeded data. Never less than one.
pub fn delete_batch(scale: ScalePoint, trial_count: u32) -> usize {
    let trials = u64::from(trial_count.max(1));
    let batch = scale.get().div_ceil(trials).max(1);
    usize::try_from(batch).unwrap_or(usize::MAX)
}
