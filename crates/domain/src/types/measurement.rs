//! Measurement types produced by the performance harness
//!
//! A [`BenchmarkResult`] is always measured. An [`ExtrapolatedResult`] is
//! derived from one and keeps the measured source alongside, so reports can
//! tell the two apart.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Data volume ("n") a run was performed at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ScalePoint(u64);

impl ScalePoint {
    /// Wrap a raw volume.
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    /// Raw volume.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Zero is never a valid extrapolation origin.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Volume as `usize`, saturating on narrow targets.
    pub fn as_usize(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

impl From<u64> for ScalePoint {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

impl fmt::Display for ScalePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aggregate statistics of one benchmark run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Mean trial duration in seconds
    pub mean: f64,
    /// Sample standard deviation in seconds (0 for a single trial)
    pub std_dev: f64,
    /// Scale the run was performed at
    pub scale: ScalePoint,
    /// Number of trials the statistics were computed over
    pub trials: u32,
}

/// A result linearly scaled from a measured one. Never empirically verified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrapolatedResult {
    /// Projected mean in seconds
    pub mean: f64,
    /// Projected standard deviation in seconds
    pub std_dev: f64,
    /// Scale this value is projected to
    pub target: ScalePoint,
    /// Scale the projection was computed from
    pub original: ScalePoint,
    /// Measured result the projection was derived from
    pub source: BenchmarkResult,
}

impl ExtrapolatedResult {
    /// Multiplier applied to the source statistics.
    pub fn factor(&self) -> f64 {
        self.target.get() as f64 / self.original.get() as f64
    }
}

/// A single bar in a report: measured or extrapolated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Measurement {
    /// Taken from timed trials
    Measured(BenchmarkResult),
    /// Projected from a measured result
    Extrapolated(ExtrapolatedResult),
}

impl Measurement {
    /// Mean in seconds.
    pub fn mean(&self) -> f64 {
        match self {
            Self::Measured(result) => result.mean,
            Self::Extrapolated(result) => result.mean,
        }
    }

    /// Standard deviation in seconds.
    pub fn std_dev(&self) -> f64 {
        match self {
            Self::Measured(result) => result.std_dev,
            Self::Extrapolated(result) => result.std_dev,
        }
    }

    /// Scale the bar is drawn at: the measured scale or the projection target.
    pub fn scale(&self) -> ScalePoint {
        match self {
            Self::Measured(result) => result.scale,
            Self::Extrapolated(result) => result.target,
        }
    }

    /// True for projected values.
    pub fn is_extrapolated(&self) -> bool {
        matches!(self, Self::Extrapolated(_))
    }
}

impl From<BenchmarkResult> for Measurement {
    fn from(result: BenchmarkResult) -> Self {
        Self::Measured(result)
    }
}

impl From<ExtrapolatedResult> for Measurement {
    fn from(result: ExtrapolatedResult) -> Self {
        Self::Extrapolated(result)
    }
}
