//! Grouped bar chart renderer writing PNG artifacts.
//!
//! Layout: one group per scale point (ascending), one bar per series inside
//! a group, error bars of one standard deviation and the mean printed above
//! each bar. Extrapolated bars are lighter and hatched, and their scale label
//! carries a `*`.

use std::path::{Path, PathBuf};

use cadence_core::{Comparison, ComparisonRenderer};
use cadence_domain::constants::{DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH};
use cadence_domain::{CadenceError, Measurement, ReportConfig, Result};
use image::{ImageFormat, Rgb, RgbImage};
use tracing::debug;

use super::canvas::{lighten, Align, Canvas, Color, AXIS, BLACK, GRID, WHITE};
use crate::errors::InfraError;

const MARGIN_LEFT: i32 = 80;
const MARGIN_RIGHT: i32 = 220;
const MARGIN_TOP: i32 = 60;
const MARGIN_BOTTOM: i32 = 70;

const Y_TICKS: u32 = 5;
const GROUP_FILL: f64 = 0.8;

/// Matplotlib's `tab10` cycle.
const PALETTE: [Color; 10] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
    Rgb([148, 103, 189]),
    Rgb([140, 86, 75]),
    Rgb([227, 119, 194]),
    Rgb([127, 127, 127]),
    Rgb([188, 189, 34]),
    Rgb([23, 190, 207]),
];

const EXTRAPOLATED_NOTE: &str = "* extrapolated (linear), not measured";

/// Renders comparisons as PNG grouped bar charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngChartRenderer {
    width: u32,
    height: u32,
}

impl Default for PngChartRenderer {
    fn default() -> Self {
        Self { width: DEFAULT_CHART_WIDTH, height: DEFAULT_CHART_HEIGHT }
    }
}

impl PngChartRenderer {
    /// Renderer for a `width` x `height` canvas. Sizes too small to hold the
    /// margins are raised to fit.
    pub fn new(width: u32, height: u32) -> Self {
        let min_width = (MARGIN_LEFT + MARGIN_RIGHT + 100) as u32;
        let min_height = (MARGIN_TOP + MARGIN_BOTTOM + 100) as u32;
        Self { width: width.max(min_width), height: height.max(min_height) }
    }

    /// Renderer sized by `config`.
    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.width, config.height)
    }

    /// Draw `comparison` into an image without touching the filesystem.
    pub fn draw(&self, comparison: &Comparison) -> RgbImage {
        let mut canvas = Canvas::new(self.width, self.height, WHITE);
        let plot = PlotArea::new(self.width as i32, self.height as i32);

        let scales = comparison.scale_points();
        let axis = ValueAxis::fit(max_extent(comparison));

        canvas.text(
            canvas.width() / 2,
            MARGIN_TOP / 2 - Canvas::text_height(2) / 2,
            &comparison.title,
            2,
            Align::Center,
            BLACK,
        );
        draw_value_axis(&mut canvas, &plot, &axis);

        let groups = scales.len().max(1) as f64;
        let group_width = f64::from(plot.width()) / groups;
        let per_group = comparison.series.len().max(1) as f64;
        let bar_width = (group_width * GROUP_FILL / per_group).max(1.0);

        for (group, scale) in scales.iter().enumerate() {
            let group_left = f64::from(plot.left) + group_width * group as f64;
            let bars_left = group_left + group_width * (1.0 - GROUP_FILL) / 2.0;
            let mut any_extrapolated = false;

            for (index, series) in comparison.series.iter().enumerate() {
                let Some(point) = series.at(*scale) else {
                    continue;
                };
                any_extrapolated |= point.is_extrapolated();
                let left = bars_left + bar_width * index as f64;
                draw_bar(&mut canvas, &plot, &axis, point, left, bar_width, PALETTE[index % 10]);
            }

            let label = if any_extrapolated { format!("{scale}*") } else { scale.to_string() };
            canvas.text(
                (group_left + group_width / 2.0) as i32,
                plot.bottom + 8,
                &label,
                1,
                Align::Center,
                BLACK,
            );
        }

        canvas.text(
            plot.left + plot.width() / 2,
            plot.bottom + 28,
            "Scale (n)",
            2,
            Align::Center,
            BLACK,
        );
        draw_legend(&mut canvas, &plot, comparison);

        if comparison.has_extrapolations() {
            canvas.text(
                plot.left,
                self.height as i32 - Canvas::text_height(1) - 8,
                EXTRAPOLATED_NOTE,
                1,
                Align::Left,
                AXIS,
            );
        }

        canvas.into_image()
    }
}

impl ComparisonRenderer for PngChartRenderer {
    fn render(&self, comparison: &Comparison, output_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir).map_err(|err| {
            CadenceError::Reporting(format!(
                "cannot create output directory {}: {err}",
                output_dir.display()
            ))
        })?;

        let path = output_dir.join(comparison.file_name());
        self.draw(comparison)
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|err| CadenceError::from(InfraError::from(err)))?;

        debug!(path = %path.display(), width = self.width, height = self.height, "chart written");
        Ok(path)
    }
}

struct PlotArea {
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
}

impl PlotArea {
    fn new(width: i32, height: i32) -> Self {
        Self {
            left: MARGIN_LEFT,
            right: width - MARGIN_RIGHT,
            top: MARGIN_TOP,
            bottom: height - MARGIN_BOTTOM,
        }
    }

    fn width(&self) -> i32 {
        self.right - self.left
    }

    fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Linear y axis from zero to a rounded maximum.
struct ValueAxis {
    max: f64,
    step: f64,
}

impl ValueAxis {
    fn fit(extent: f64) -> Self {
        let extent = if extent.is_finite() && extent > 0.0 { extent } else { 1.0 };
        let step = nice_step(extent / f64::from(Y_TICKS));
        let max = (extent / step).ceil() * step;
        Self { max, step }
    }

    fn y(&self, plot: &PlotArea, value: f64) -> i32 {
        let ratio = (value / self.max).clamp(0.0, 1.0);
        plot.bottom - (ratio * f64::from(plot.height())).round() as i32
    }
}

/// Smallest 1, 2 or 5 times a power of ten that is at least `raw`.
fn nice_step(raw: f64) -> f64 {
    let magnitude = 10_f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Largest bar top including its error bar.
fn max_extent(comparison: &Comparison) -> f64 {
    comparison
        .series
        .iter()
        .flat_map(|series| &series.points)
        .map(|point| point.mean() + point.std_dev().max(0.0))
        .fold(0.0, f64::max)
}

fn draw_value_axis(canvas: &mut Canvas, plot: &PlotArea, axis: &ValueAxis) {
    let ticks = (axis.max / axis.step).round() as u32;
    for tick in 0..=ticks {
        let value = axis.step * f64::from(tick);
        let y = axis.y(plot, value);
        if tick > 0 {
            canvas.hline(plot.left + 1, plot.right, y, GRID);
        }
        canvas.hline(plot.left - 5, plot.left - 1, y, AXIS);
        canvas.text(
            plot.left - 8,
            y - Canvas::text_height(1) / 2,
            &format!("{value:.2}"),
            1,
            Align::Right,
            BLACK,
        );
    }

    canvas.vline(plot.left, plot.top, plot.bottom, AXIS);
    canvas.hline(plot.left, plot.right, plot.bottom, AXIS);
    let label_y = plot.top - Canvas::text_height(1) - 8;
    canvas.text(plot.left, label_y, "Time (s)", 1, Align::Center, BLACK);
}

fn draw_bar(
    canvas: &mut Canvas,
    plot: &PlotArea,
    axis: &ValueAxis,
    point: &Measurement,
    left: f64,
    width: f64,
    color: Color,
) {
    let x0 = left.round() as i32;
    let x1 = ((left + width).round() as i32 - 1).max(x0);
    let top = axis.y(plot, point.mean());

    let base = plot.bottom - 1;
    if top <= base {
        if point.is_extrapolated() {
            canvas.fill_rect(x0, top, x1, base, lighten(color, 0.55));
            canvas.hatch_rect(x0, top, x1, base, 6, color);
            canvas.outline_rect(x0, top, x1, base, color);
        } else {
            canvas.fill_rect(x0, top, x1, base, color);
        }
    }

    let std_dev = point.std_dev().max(0.0);
    let center = (x0 + x1) / 2;
    let high = axis.y(plot, point.mean() + std_dev);
    let low = axis.y(plot, (point.mean() - std_dev).max(0.0));
    if std_dev > 0.0 {
        let cap = ((x1 - x0) / 4).max(2);
        canvas.vline(center, high, low, BLACK);
        canvas.hline(center - cap, center + cap, high, BLACK);
        canvas.hline(center - cap, center + cap, low, BLACK);
    }

    canvas.text(
        center,
        high - Canvas::text_height(1) - 4,
        &format!("{:.2}", point.mean()),
        1,
        Align::Center,
        BLACK,
    );
}

fn draw_legend(canvas: &mut Canvas, plot: &PlotArea, comparison: &Comparison) {
    let left = plot.right + 20;
    let swatch = 12;
    let line_height = 20;
    let mut y = plot.top;

    for (index, series) in comparison.series.iter().enumerate() {
        canvas.fill_rect(left, y, left + swatch, y + swatch, PALETTE[index % 10]);
        canvas.text(left + swatch + 8, y + 3, &series.label, 1, Align::Left, BLACK);
        y += line_height;
    }

    if comparison.has_extrapolations() {
        canvas.fill_rect(left, y, left + swatch, y + swatch, lighten(AXIS, 0.55));
        canvas.hatch_rect(left, y, left + swatch, y + swatch, 4, AXIS);
        canvas.outline_rect(left, y, left + swatch, y + swatch, AXIS);
        canvas.text(left + swatch + 8, y + 3, "Extrapolated", 1, Align::Left, BLACK);
    }
}

#[cfg(test)]
mod tests {
    use cadence_core::Series;
    use cadence_domain::{BenchmarkResult, ExtrapolatedResult, ScalePoint};

    use super::*;

    fn measured(mean: f64, n: u64) -> Measurement {
        Measurement::from(BenchmarkResult {
            mean,
            std_dev: mean / 10.0,
            scale: ScalePoint::new(n),
            trials: 5,
        })
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn nice_steps_round_up() {
        assert!(close(nice_step(0.13), 0.2));
        assert!(close(nice_step(0.3), 0.5));
        assert!(close(nice_step(1.0), 1.0));
        assert!(close(nice_step(7.0), 10.0));
    }

    #[test]
    fn axis_covers_largest_error_bar() {
        let axis = ValueAxis::fit(0.87);
        assert!(axis.max >= 0.87);
        assert!(close(axis.step, 0.2));

        let empty = ValueAxis::fit(0.0);
        assert!(close(empty.max, 1.0));
    }

    #[test]
    fn draw_uses_configured_size_and_palette() {
        let comparison = Comparison::new("A vs B")
            .with_series(Series::new("A", vec![measured(1.0, 100)]))
            .with_series(Series::new("B", vec![measured(0.5, 100)]));

        let renderer = PngChartRenderer::new(900, 500);
        let image = renderer.draw(&comparison);
        assert_eq!(image.dimensions(), (900, 500));
        assert!(image.pixels().any(|pixel| *pixel == PALETTE[0]));
        assert!(image.pixels().any(|pixel| *pixel == PALETTE[1]));
    }

    #[test]
    fn extrapolated_bars_are_lighter() {
        let source = BenchmarkResult {
            mean: 1.0,
            std_dev: 0.0,
            scale: ScalePoint::new(100),
            trials: 3,
        };
        let projected = ExtrapolatedResult {
            mean: 2.0,
            std_dev: 0.0,
            target: ScalePoint::new(200),
            original: source.scale,
            source,
        };
        let comparison = Comparison::new("Projected").with_series(Series::new(
            "Only",
            vec![Measurement::from(source), Measurement::from(projected)],
        ));

        let image = PngChartRenderer::default().draw(&comparison);
        assert!(image.pixels().any(|pixel| *pixel == lighten(PALETTE[0], 0.55)));
    }

    #[test]
    fn tiny_sizes_are_raised() {
        let renderer = PngChartRenderer::new(10, 10);
        let image = renderer.draw(&Comparison::new("t").with_series(Series::new(
            "s",
            vec![measured(1.0, 1)],
        )));
        assert!(image.width() > 300);
        assert!(image.height() > 200);
    }
}
