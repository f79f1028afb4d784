//! Comparison model consumed by chart renderers

pub mod ports;

use std::path::{Path, PathBuf};

use cadence_domain::constants::CHART_EXTENSION;
use cadence_domain::{CadenceError, Measurement, Result, ScalePoint};
use serde::{Deserialize, Serialize};
use tracing::info;

pub use ports::ComparisonRenderer;

/// One labelled bar series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Legend entry
    pub label: String,
    /// Bars, at most one drawn per scale
    pub points: Vec<Measurement>,
}

impl Series {
    /// Series labelled `label`.
    pub fn new(label: impl Into<String>, points: Vec<Measurement>) -> Self {
        Self { label: label.into(), points }
    }

    /// The measurement recorded for `scale`, if any. Measured values win
    /// over extrapolated ones at the same scale.
    pub fn at(&self, scale: ScalePoint) -> Option<&Measurement> {
        let mut candidates = self.points.iter().filter(|point| point.scale() == scale);
        let first = candidates.next()?;
        if !first.is_extrapolated() {
            return Some(first);
        }
        candidates.find(|point| !point.is_extrapolated()).or(Some(first))
    }
}

/// A titled set of series drawn as one grouped bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Chart title, also the source of the file name
    pub title: String,
    /// Series in legend order
    pub series: Vec<Series>,
}

impl Comparison {
    /// Empty comparison titled `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), series: Vec::new() }
    }

    /// Append `series`.
    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    /// Sorted, deduplicated scale points across all series (one chart group
    /// each).
    pub fn scale_points(&self) -> Vec<ScalePoint> {
        let mut scales: Vec<_> = self
            .series
            .iter()
            .flat_map(|series| series.points.iter().map(Measurement::scale))
            .collect();
        scales.sort_unstable();
        scales.dedup();
        scales
    }

    /// Whether any bar is a projection.
    pub fn has_extrapolations(&self) -> bool {
        self.series.iter().flat_map(|series| &series.points).any(Measurement::is_extrapolated)
    }

    /// File name of the rendered artifact, e.g. `x_vs_y.png` for `"X vs Y"`.
    pub fn file_name(&self) -> String {
        artifact_file_name(&self.title)
    }

    /// Reject comparisons that would render an empty chart.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CadenceError::InvalidInput("comparison title is empty".to_string()));
        }
        if self.series.is_empty() {
            return Err(CadenceError::InvalidInput(format!(
                "comparison '{}' has no series",
                self.title
            )));
        }
        if let Some(empty) = self.series.iter().find(|series| series.points.is_empty()) {
            return Err(CadenceError::InvalidInput(format!(
                "series '{}' has no measurements",
                empty.label
            )));
        }
        Ok(())
    }
}

/// Slug used for artifacts: lower-cased, with spaces and path separators
/// replaced by `_`.
pub fn artifact_stem(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}

/// [`artifact_stem`] with the chart extension.
pub fn artifact_file_name(title: &str) -> String {
    format!("{}.{CHART_EXTENSION}", artifact_stem(title))
}

/// Validate `comparison` and render it into `output_dir`.
///
/// Returns the path of the written artifact.
pub fn report(
    renderer: &dyn ComparisonRenderer,
    comparison: &Comparison,
    output_dir: &Path,
) -> Result<PathBuf> {
    comparison.validate()?;
    let path = renderer.render(comparison, output_dir)?;
    info!(
        title = %comparison.title,
        series = comparison.series.len(),
        path = %path.display(),
        "comparison rendered"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use cadence_domain::{BenchmarkResult, ExtrapolatedResult};

    use super::*;

    fn measured(scale: u64, mean: f64) -> Measurement {
        BenchmarkResult { mean, std_dev: 0.0, scale: ScalePoint::new(scale), trials: 3 }.into()
    }

    #[test]
    fn file_name_slugs_title() {
        assert_eq!(artifact_file_name("X vs Y"), "x_vs_y.png");
        assert_eq!(
            artifact_file_name("Document Store vs SQLite - Read Performance Comparison"),
            "document_store_vs_sqlite_-_read_performance_comparison.png"
        );
        assert_eq!(artifact_file_name("in/out\\up"), "in_out_up.png");
    }

    #[test]
    fn scale_points_are_sorted_union() {
        let comparison = Comparison::new("t")
            .with_series(Series::new("a", vec![measured(500, 1.0), measured(100, 0.2)]))
            .with_series(Series::new("b", vec![measured(250, 0.5), measured(100, 0.3)]));

        let scales: Vec<_> = comparison.scale_points().into_iter().map(ScalePoint::get).collect();
        assert_eq!(scales, vec![100, 250, 500]);
        assert!(!comparison.has_extrapolations());
    }

    #[test]
    fn measured_point_preferred_over_extrapolated() {
        let source =
            BenchmarkResult { mean: 1.0, std_dev: 0.1, scale: ScalePoint::new(10), trials: 2 };
        let projected = ExtrapolatedResult {
            mean: 2.0,
            std_dev: 0.2,
            target: ScalePoint::new(20),
            original: source.scale,
            source,
        };
        let series = Series::new("s", vec![projected.into(), measured(20, 1.8)]);

        assert_eq!(series.at(ScalePoint::new(20)).map(Measurement::mean), Some(1.8));
        assert!(series.at(ScalePoint::new(30)).is_none());
    }

    #[test]
    fn empty_comparisons_are_rejected() {
        let filled = || Series::new("a", vec![measured(1, 1.0)]);

        assert!(Comparison::new("t").validate().is_err());
        assert!(Comparison::new("  ").with_series(filled()).validate().is_err());
        assert!(Comparison::new("t").with_series(Series::new("a", vec![])).validate().is_err());
        assert!(Comparison::new("t").with_series(filled()).validate().is_ok());
    }
}
