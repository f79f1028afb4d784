//! `cadence compare`: experiment, table, chart and optional JSON export

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cadence_core::report::artifact_stem;
use cadence_core::{report, run_experiment, ExperimentOutcome, ExperimentPlan, StoreProvider};
use cadence_domain::Config;
use cadence_infra::{provider_for, FakeCatalogData, PngChartRenderer};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::cli::CompareArgs;
use crate::config::HarnessOverrides;
use crate::output;

/// What `--export` writes.
#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    title: &'a str,
    generated_at: DateTime<Utc>,
    plan: &'a ExperimentPlan,
    chart: Option<&'a Path>,
    #[serde(flatten)]
    outcome: &'a ExperimentOutcome,
}

/// Artifacts written by one comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareArtifacts {
    /// Rendered chart
    pub chart: PathBuf,
    /// JSON export, when requested
    pub export: Option<PathBuf>,
}

/// Run the experiment, print the table, then write the chart and export.
pub fn execute(args: &CompareArgs, config: &Config) -> Result<CompareArtifacts> {
    let harness = HarnessOverrides {
        scales: &args.scales,
        trials: args.trials,
        extrapolate_to: &args.extrapolate_to,
        seed: args.seed,
    }
    .apply(&config.harness);
    let plan = ExperimentPlan::from_config(&harness, args.workloads.clone());

    let providers = args
        .stores
        .iter()
        .map(|&kind| provider_for(kind, &config.stores))
        .collect::<cadence_domain::Result<Vec<_>>>()?;
    let providers: Vec<&dyn StoreProvider> = providers.iter().map(Box::as_ref).collect();

    let seed = harness.seed;
    let outcome = run_experiment(&plan, &providers, &|| FakeCatalogData::boxed(seed))
        .context("experiment failed")?;

    let title = args.title.clone().unwrap_or_else(|| outcome.default_title());
    let output_dir =
        args.output_dir.clone().unwrap_or_else(|| PathBuf::from(&config.report.output_dir));
    let renderer = PngChartRenderer::from_config(&config.report);

    // The measurements are printed and exported even when the chart fails.
    output::print_outcome(&outcome);
    let rendered = report(&renderer, &outcome.comparison(title.as_str()), &output_dir);
    let chart = rendered.as_deref().ok();

    let export = args
        .export
        .as_deref()
        .map(|dir| write_export(dir, &title, &plan, chart, &outcome))
        .transpose()?;
    output::print_artifacts(chart, export.as_deref());

    let chart = rendered.context("failed to render comparison chart")?;
    Ok(CompareArtifacts { chart, export })
}

fn write_export(
    dir: &Path,
    title: &str,
    plan: &ExperimentPlan,
    chart: Option<&Path>,
    outcome: &ExperimentOutcome,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;
    let path = dir.join(format!("{}.json", artifact_stem(title)));

    let document = ExportDocument { title, generated_at: Utc::now(), plan, chart, outcome };
    let json = serde_json::to_string_pretty(&document).context("failed to encode outcome")?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;

    info!(path = %path.display(), series = outcome.series.len(), "outcome exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use cadence_domain::{StoreConfig, StoreKind, Workload};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn compare_writes_chart_and_export() {
        let scratch = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let mut config = Config::default();
        config.stores = StoreConfig {
            postgres_url: None,
            temp_root: Some(scratch.path().display().to_string()),
        };

        let args = CompareArgs {
            workloads: vec![Workload::InsertMany, Workload::Read],
            stores: vec![StoreKind::Document, StoreKind::Sqlite],
            scales: vec![4, 8],
            trials: Some(2),
            extrapolate_to: vec![80],
            title: Some("Small Catalog".to_string()),
            output_dir: Some(out.path().join("plots")),
            export: Some(out.path().join("json")),
            seed: Some(3),
        };

        let artifacts = execute(&args, &config).unwrap();
        assert_eq!(artifacts.chart, out.path().join("plots").join("small_catalog.png"));
        assert!(artifacts.chart.is_file());

        let export = artifacts.export.unwrap();
        assert_eq!(export, out.path().join("json").join("small_catalog.json"));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&export).unwrap()).unwrap();
        assert_eq!(json["title"], "Small Catalog");
        assert_eq!(json["series"].as_array().unwrap().len(), 4);
        assert_eq!(json["plan"]["trial_count"], 2);
        assert!(json["generated_at"].is_string());
        assert!(json["chart"].as_str().unwrap().ends_with("small_catalog.png"));

        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn chart_failure_still_exports_measurements() {
        let scratch = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let blocked = out.path().join("plots");
        std::fs::write(&blocked, b"not a directory").unwrap();
        let mut config = Config::default();
        config.stores.temp_root = Some(scratch.path().display().to_string());

        let args = CompareArgs {
            workloads: vec![Workload::Read],
            stores: vec![StoreKind::Sqlite],
            scales: vec![5],
            trials: Some(2),
            extrapolate_to: Vec::new(),
            title: Some("Blocked".to_string()),
            output_dir: Some(blocked),
            export: Some(out.path().join("json")),
            seed: Some(4),
        };

        let err = execute(&args, &config).unwrap_err();
        assert!(format!("{err:#}").contains("failed to render comparison chart"));

        let export = out.path().join("json").join("blocked.json");
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(export).unwrap()).unwrap();
        assert!(json["chart"].is_null());
        assert_eq!(json["series"][0]["label"], "SQLite Read");
        assert_eq!(json["series"][0]["measured"][0]["trials"], 2);
    }
}
