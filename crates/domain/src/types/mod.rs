//! Domain types and models

pub mod catalog;
pub mod measurement;
pub mod selectors;

pub use catalog::{
    CatalogCounts, CatalogEntry, CatalogIds, NewSong, Playlist, PlaylistTrack, Song, SongPatch,
};
pub use measurement::{BenchmarkResult, ExtrapolatedResult, Measurement, ScalePoint};
pub use selectors::{StoreKind, Workload};
