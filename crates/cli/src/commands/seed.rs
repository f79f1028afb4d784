//! `cadence seed`: fill a throwaway store and walk through a playlist edit

use anyhow::{Context, Result};
use cadence_core::{generate_entries, CatalogStore};
use cadence_domain::{CatalogCounts, Config, Playlist, PlaylistTrack};
use cadence_infra::{acquire_store, FakeCatalogData};
use tracing::info;

use crate::cli::SeedArgs;
use crate::output;

/// Playlist states around the add/remove walk-through.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistDemo {
    /// Playlist as seeded
    pub before: Playlist,
    /// After adding a song
    pub added: Playlist,
    /// After removing it again
    pub removed: Playlist,
}

/// What a seeded store looked like.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedReport {
    /// Counts after the walk-through
    pub counts: CatalogCounts,
    /// First rows of the playlist view
    pub tracks: Vec<PlaylistTrack>,
    /// Playlist walk-through, when one was possible
    pub demo: Option<PlaylistDemo>,
}

/// Seed a leased store, print what it holds and release it.
pub fn execute(args: &SeedArgs, config: &Config) -> Result<()> {
    let mut lease = acquire_store(args.store, &config.stores)?;
    let label = lease.label().to_string();
    let report = seed_and_inspect(&mut *lease, args, args.seed.or(config.harness.seed))?;
    lease.release().with_context(|| format!("failed to release {label}"))?;

    output::print_seeded(args.store.label(), &report.tracks, &report.counts);
    if let Some(demo) = &report.demo {
        output::print_playlist_stage("before", &demo.before);
        output::print_playlist_stage("added", &demo.added);
        output::print_playlist_stage("removed", &demo.removed);
    }
    Ok(())
}

/// Insert `args.count` generated entries into `store` and inspect the result.
pub fn seed_and_inspect(
    store: &mut dyn CatalogStore,
    args: &SeedArgs,
    seed: Option<u64>,
) -> Result<SeedReport> {
    let mut data = FakeCatalogData::new(seed);
    let entries = generate_entries(&mut data, args.count);
    let inserted = store.insert_entries(&entries)?;
    info!(store = %args.store, inserted, "catalog seeded");

    let tracks = store.playlist_tracks(Some(args.show))?;
    let demo = playlist_demo(store)?;
    let counts = store.counts()?;
    Ok(SeedReport { counts, tracks, demo })
}

/// Add the newest song not yet in the oldest playlist, then take it out
/// again. Skipped when every song is already a member.
fn playlist_demo(store: &mut dyn CatalogStore) -> Result<Option<PlaylistDemo>> {
    let Some(before) = store.playlists(Some(1))?.into_iter().next() else {
        return Ok(None);
    };
    let songs = store.songs(None)?;
    let Some(song) = songs.iter().rev().find(|song| !before.song_ids.contains(&song.id)) else {
        return Ok(None);
    };

    store.add_song_to_playlist(before.id, song.id)?;
    let added = reload(store, before.id)?;
    store.remove_song_from_playlist(before.id, song.id)?;
    let removed = reload(store, before.id)?;

    Ok(Some(PlaylistDemo { before, added, removed }))
}

fn reload(store: &dyn CatalogStore, playlist_id: i64) -> Result<Playlist> {
    store.playlist(playlist_id)?.with_context(|| format!("playlist {playlist_id} vanished"))
}
