//! Port interface for chart rendering

use std::path::{Path, PathBuf};

use cadence_domain::Result;

use super::Comparison;

/// Renders a [`Comparison`] to an artifact inside `output_dir`.
///
/// Implementations create `output_dir` when missing, name the artifact with
/// [`Comparison::file_name`] and overwrite an existing file of that name.
/// Failures are reported as `CadenceError::Reporting`.
pub trait ComparisonRenderer {
    fn render(&self, comparison: &Comparison, output_dir: &Path) -> Result<PathBuf>;
}
