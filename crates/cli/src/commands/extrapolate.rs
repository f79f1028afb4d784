//! `cadence extrapolate`: linear projection without running anything

use anyhow::{ensure, Result};
use cadence_core::extrapolate;
use cadence_domain::{BenchmarkResult, ExtrapolatedResult, ScalePoint};

use crate::cli::ExtrapolateArgs;
use crate::output;

/// Print the projections of `args`.
pub fn execute(args: &ExtrapolateArgs) -> Result<()> {
    output::print_projections(&project(args)?);
    Ok(())
}

/// Project the given statistics to every target scale.
pub fn project(args: &ExtrapolateArgs) -> Result<Vec<ExtrapolatedResult>> {
    ensure!(args.mean.is_finite() && args.mean >= 0.0, "mean must be a non-negative number");
    ensure!(args.std.is_finite() && args.std >= 0.0, "std must be a non-negative number");

    let original = ScalePoint::new(args.from);
    // Trial count is unknown for a figure typed in by hand
    let measured =
        BenchmarkResult { mean: args.mean, std_dev: args.std, scale: original, trials: 0 };
    let targets = args.to.iter().copied().map(ScalePoint::new);
    Ok(extrapolate(&measured, original, targets)?.collect())
}
