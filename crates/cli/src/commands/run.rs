//! `cadence run`: one scoped benchmark run

use anyhow::{Context, Result};
use cadence_core::{benchmark_for, run_scoped, Extrapolate};
use cadence_domain::{BenchmarkResult, Config, ExtrapolatedResult, ScalePoint};
use cadence_infra::{provider_for, FakeCatalogData};
use tracing::info;

use crate::cli::RunArgs;
use crate::config::{single_scale, HarnessOverrides};
use crate::output;

/// Measure one workload and print it with its projections.
pub fn execute(args: &RunArgs, config: &Config) -> Result<()> {
    let (result, projections) = measure(args, config)?;
    let label = format!("{} {}", args.store.label(), args.workload.label());
    output::print_run(&label, &result, &projections);
    Ok(())
}

/// Run the benchmark and project it onto the requested targets.
pub fn measure(
    args: &RunArgs,
    config: &Config,
) -> Result<(BenchmarkResult, Vec<ExtrapolatedResult>)> {
    let harness = HarnessOverrides {
        scales: &[],
        trials: args.trials,
        extrapolate_to: &args.extrapolate_to,
        seed: args.seed,
    }
    .apply(&config.harness);
    let scale = single_scale(args.scale, &harness)?;

    let provider = provider_for(args.store, &config.stores)?;
    info!(
        workload = %args.workload,
        store = provider.label(),
        scale = %scale,
        trials = harness.trial_count,
        "starting run"
    );

    let benchmark = benchmark_for(args.workload, scale, harness.trial_count);
    let result = run_scoped(provider.as_ref(), benchmark, FakeCatalogData::boxed(harness.seed))
        .with_context(|| format!("{} on {} failed", args.workload, args.store))?;

    let targets = harness.extrapolate_to.iter().copied().map(ScalePoint::new);
    let projections = result.extrapolate(targets)?.collect();
    Ok((result, projections))
}
