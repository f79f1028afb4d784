//! PNG chart rendering for comparisons

mod canvas;
pub mod chart;
mod font;

pub use chart::PngChartRenderer;
