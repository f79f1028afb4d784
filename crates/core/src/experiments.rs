//! Workload × store × scale experiments

use cadence_domain::{
    BenchmarkResult, CadenceError, ExtrapolatedResult, HarnessConfig, Measurement, Result,
    ScalePoint, StoreKind, Workload,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{run_scoped, StoreProvider, SyntheticData};
use crate::harness::Extrapolate;
use crate::report::{Comparison, Series};
use crate::workloads::benchmark_for;

/// What to run: every workload at every scale on every provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentPlan {
    /// Workloads run for every provider
    pub workloads: Vec<Workload>,
    /// Scales every workload is measured at
    pub scales: Vec<ScalePoint>,
    /// Timed trials per run
    pub trial_count: u32,
    /// Scales the largest measured result of each series is projected to
    pub extrapolate_to: Vec<ScalePoint>,
}

impl ExperimentPlan {
    /// Plan without extrapolation.
    pub fn new(workloads: Vec<Workload>, scales: Vec<ScalePoint>, trial_count: u32) -> Self {
        Self { workloads, scales, trial_count, extrapolate_to: Vec::new() }
    }

    /// Project each series to `targets`.
    pub fn with_extrapolation(mut self, targets: Vec<ScalePoint>) -> Self {
        self.extrapolate_to = targets;
        self
    }

    /// Plan `workloads` with the scales, trial count and targets of `config`.
    pub fn from_config(config: &HarnessConfig, workloads: Vec<Workload>) -> Self {
        Self::new(workloads, config.scale_points(), config.trial_count)
            .with_extrapolation(config.extrapolation_targets())
    }

    fn validate(&self, providers: usize) -> Result<()> {
        if self.workloads.is_empty() {
            return Err(CadenceError::InvalidInput("experiment has no workloads".to_string()));
        }
        if self.scales.is_empty() {
            return Err(CadenceError::InvalidInput("experiment has no scale points".to_string()));
        }
        if providers == 0 {
            return Err(CadenceError::InvalidInput("experiment has no stores".to_string()));
        }
        Ok(())
    }
}

/// Results of one (store, workload) pair across the plan's scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesOutcome {
    /// `"<store label> <workload label>"`
    pub label: String,
    /// Label of the provider the store came from
    pub store_label: String,
    /// Backend family
    pub store: StoreKind,
    /// Workload that was timed
    pub workload: Workload,
    /// One result per scale, in plan order
    pub measured: Vec<BenchmarkResult>,
    /// Projections of the largest measured result
    pub extrapolated: Vec<ExtrapolatedResult>,
}

impl SeriesOutcome {
    /// Measured result at the largest scale.
    pub fn largest_measured(&self) -> Option<&BenchmarkResult> {
        self.measured.iter().max_by_key(|result| result.scale)
    }

    /// Measured and projected points as one report series.
    pub fn to_series(&self) -> Series {
        let points = self
            .measured
            .iter()
            .copied()
            .map(Measurement::from)
            .chain(self.extrapolated.iter().copied().map(Measurement::from))
            .collect();
        Series::new(self.label.clone(), points)
    }
}

/// Every series of one experiment, provider-major then workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentOutcome {
    /// One entry per (store, workload) pair
    pub series: Vec<SeriesOutcome>,
}

impl ExperimentOutcome {
    /// e.g. `"Document Store vs SQLite - Insert vs Insert Many Performance Comparison"`
    pub fn default_title(&self) -> String {
        let stores = unique(self.series.iter().map(|series| series.store_label.as_str()));
        let workloads = unique(self.series.iter().map(|series| series.workload.label()));
        format!("{} - {} Performance Comparison", stores.join(" vs "), workloads.join(" vs "))
    }

    /// Report model titled `title`.
    pub fn comparison(&self, title: impl Into<String>) -> Comparison {
        Comparison {
            title: title.into(),
            series: self.series.iter().map(SeriesOutcome::to_series).collect(),
        }
    }
}

fn unique<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for label in labels {
        if !seen.contains(&label) {
            seen.push(label);
        }
    }
    seen
}

/// Run `plan` against every provider.
///
/// Every (provider, workload, scale) run gets its own store lease and a fresh
/// generator from `data_factory`, so runs never observe each other's data.
///
/// # Errors
/// `InvalidInput` for an empty plan or provider list. The first failing run
/// aborts the experiment with its error.
pub fn run_experiment(
    plan: &ExperimentPlan,
    providers: &[&dyn StoreProvider],
    data_factory: &dyn Fn() -> Box<dyn SyntheticData>,
) -> Result<ExperimentOutcome> {
    plan.validate(providers.len())?;

    let mut series = Vec::with_capacity(providers.len() * plan.workloads.len());
    for provider in providers {
        for &workload in &plan.workloads {
            let label = format!("{} {}", provider.label(), workload.label());
            info!(series = %label, scales = plan.scales.len(), "running series");

            let mut measured = Vec::with_capacity(plan.scales.len());
            for &scale in &plan.scales {
                let benchmark = benchmark_for(workload, scale, plan.trial_count);
                measured.push(run_scoped(*provider, benchmark, data_factory())?);
            }

            let extrapolated = match measured.iter().max_by_key(|result| result.scale) {
                Some(largest) if !plan.extrapolate_to.is_empty() => {
                    largest.extrapolate(plan.extrapolate_to.iter().copied())?.collect()
                }
                _ => Vec::new(),
            };

            series.push(SeriesOutcome {
                label,
                store_label: provider.label().to_string(),
                store: provider.kind(),
                workload,
                measured,
                extrapolated,
            });
        }
    }

    Ok(ExperimentOutcome { series })
}
