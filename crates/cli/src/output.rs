//! Terminal tables. The only place that writes to stdout.
#![allow(clippy::print_stdout)]

use std::path::Path;

use cadence_core::ExperimentOutcome;
use cadence_domain::{BenchmarkResult, CatalogCounts, ExtrapolatedResult, Playlist, PlaylistTrack};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

const MEASURED: &str = "measured";
const EXTRAPOLATED: &str = "extrapolated*";

fn table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);
    table
}

fn seconds(value: f64) -> String {
    format!("{value:.4}")
}

fn measured_row(series: &str, result: &BenchmarkResult) -> Vec<Cell> {
    vec![
        Cell::new(series),
        Cell::new(result.scale),
        Cell::new(seconds(result.mean)),
        Cell::new(seconds(result.std_dev)),
        Cell::new(result.trials),
        Cell::new(MEASURED),
    ]
}

fn extrapolated_row(series: &str, result: &ExtrapolatedResult) -> Vec<Cell> {
    vec![
        Cell::new(series).fg(Color::DarkGrey),
        Cell::new(result.target).fg(Color::DarkGrey),
        Cell::new(seconds(result.mean)).fg(Color::DarkGrey),
        Cell::new(seconds(result.std_dev)).fg(Color::DarkGrey),
        Cell::new(format!("from n={}", result.original)).fg(Color::DarkGrey),
        Cell::new(EXTRAPOLATED).fg(Color::DarkGrey),
    ]
}

const RESULT_HEADER: [&str; 6] = ["Series", "Scale", "Mean (s)", "Std (s)", "Trials", "Kind"];

pub fn run_table(
    label: &str,
    result: &BenchmarkResult,
    projections: &[ExtrapolatedResult],
) -> Table {
    let mut table = table();
    table.set_header(RESULT_HEADER);
    table.add_row(measured_row(label, result));
    for projection in projections {
        table.add_row(extrapolated_row(label, projection));
    }
    table
}

/// Measured rows of every series followed by their projections.
pub fn outcome_table(outcome: &ExperimentOutcome) -> Table {
    let mut table = table();
    table.set_header(RESULT_HEADER);
    for series in &outcome.series {
        for result in &series.measured {
            table.add_row(measured_row(&series.label, result));
        }
        for projection in &series.extrapolated {
            table.add_row(extrapolated_row(&series.label, projection));
        }
    }
    table
}

pub fn projection_table(projections: &[ExtrapolatedResult]) -> Table {
    let mut table = table();
    table.set_header(["Target", "Mean (s)", "Std (s)", "Factor"]);
    for projection in projections {
        table.add_row(vec![
            Cell::new(projection.target),
            Cell::new(seconds(projection.mean)),
            Cell::new(seconds(projection.std_dev)),
            Cell::new(format!("x{:.3}", projection.factor())),
        ]);
    }
    table
}

pub fn tracks_table(tracks: &[PlaylistTrack]) -> Table {
    let mut table = table();
    table.set_header(["Playlist", "Song", "Length", "Rating", "Artist", "Album"]);
    for track in tracks {
        table.add_row(vec![
            Cell::new(&track.playlist_name),
            Cell::new(&track.song_title),
            Cell::new(format!("{:.2}", track.song_length)),
            Cell::new(format!("{:.1}", track.song_rating)),
            Cell::new(track.artist_name.as_deref().unwrap_or("-")),
            Cell::new(track.album_name.as_deref().unwrap_or("-")),
        ]);
    }
    table
}

pub fn counts_table(counts: &CatalogCounts) -> Table {
    let mut table = table();
    table.set_header(["Artists", "Albums", "Songs", "Playlists", "Playlist songs"]);
    table.add_row(vec![
        counts.artists,
        counts.albums,
        counts.songs,
        counts.playlists,
        counts.playlist_songs,
    ]);
    table
}

fn playlist_line(stage: &str, playlist: &Playlist) -> String {
    format!("{stage:<8} '{}' (id {}): songs {:?}", playlist.name, playlist.id, playlist.song_ids)
}

pub fn print_run(label: &str, result: &BenchmarkResult, projections: &[ExtrapolatedResult]) {
    println!("{}", run_table(label, result, projections));
    if !projections.is_empty() {
        println!("* linear projection, not measured");
    }
}

pub fn print_outcome(outcome: &ExperimentOutcome) {
    println!("{}", outcome_table(outcome));
}

/// Paths of whatever artifacts were written.
pub fn print_artifacts(chart: Option<&Path>, export: Option<&Path>) {
    if let Some(chart) = chart {
        println!("chart written to {}", chart.display());
    }
    if let Some(export) = export {
        println!("outcome exported to {}", export.display());
    }
}

pub fn print_projections(projections: &[ExtrapolatedResult]) {
    println!("{}", projection_table(projections));
}

pub fn print_seeded(store: &str, tracks: &[PlaylistTrack], counts: &CatalogCounts) {
    println!("seeded {store}");
    println!("{}", counts_table(counts));
    println!("{}", tracks_table(tracks));
}

pub fn print_playlist_stage(stage: &str, playlist: &Playlist) {
    println!("{}", playlist_line(stage, playlist));
}

#[cfg(test)]
mod tests {
    use cadence_domain::ScalePoint;

    use super::*;

    fn measured() -> BenchmarkResult {
        BenchmarkResult { mean: 0.125, std_dev: 0.0031, scale: ScalePoint::new(500), trials: 10 }
    }

    #[test]
    fn run_table_marks_projections() {
        let source = measured();
        let projection = ExtrapolatedResult {
            mean: 0.25,
            std_dev: 0.0062,
            target: ScalePoint::new(1_000),
            original: ScalePoint::new(500),
            source,
        };

        let rendered = run_table("SQLite Read", &source, &[projection]).to_string();
        assert!(rendered.contains("SQLite Read"));
        assert!(rendered.contains("0.1250"));
        assert!(rendered.contains(EXTRAPOLATED));
        assert!(rendered.contains("from n=500"));
    }

    #[test]
    fn factor_column_shows_multiplier() {
        let projection = ExtrapolatedResult {
            mean: 1.25,
            std_dev: 0.031,
            target: ScalePoint::new(5_000),
            original: ScalePoint::new(500),
            source: measured(),
        };
        assert!(projection_table(&[projection]).to_string().contains("x10.000"));
    }

    #[test]
    fn missing_artist_renders_placeholder() {
        let track = PlaylistTrack {
            playlist_id: 1,
            playlist_name: "Morning".to_string(),
            song_id: 2,
            song_title: "Quiet river.".to_string(),
            song_length: 3.5,
            song_rating: 4.2,
            song_yt_link: "https://www.example.com/".to_string(),
            artist_id: None,
            artist_name: None,
            album_id: None,
            album_name: None,
        };
        let rendered = tracks_table(&[track]).to_string();
        assert!(rendered.contains("Quiet river."));
        assert!(rendered.contains("3.50"));
    }

    #[test]
    fn playlist_line_lists_song_ids() {
        let playlist = Playlist { id: 3, name: "Focus".to_string(), song_ids: vec![4, 9] };
        assert_eq!(playlist_line("after", &playlist), "after    'Focus' (id 3): songs [4, 9]");
    }
}
