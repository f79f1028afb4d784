//! Timed trial execution
//!
//! A run is: optional setup, then `trial_count` sequential timed trials, then
//! aggregation. Nothing is retried. The first failure aborts the run and the
//! samples collected so far are dropped with it.

use std::fmt;
use std::time::Instant;

use cadence_domain::constants::DEFAULT_TRIAL_COUNT;
use cadence_domain::{BenchmarkResult, CadenceError, Result, ScalePoint};
use tracing::{debug, info};

use super::stats;

/// One-shot preparation run before any trial is timed.
pub type SetupFn<'a, S> = Box<dyn FnOnce(&mut S, ScalePoint) -> Result<()> + 'a>;

/// The unit of work timed once per trial.
pub type OperationFn<'a, S> = Box<dyn FnMut(&mut S) -> Result<()> + 'a>;

/// A configured benchmark over a store (or any state) of type `S`.
///
/// ```
/// use cadence_core::harness::Benchmark;
/// use cadence_domain::ScalePoint;
///
/// let mut counter = 0_u32;
/// let result = Benchmark::new("bump", |count: &mut u32| {
///     *count += 1;
///     Ok(())
/// })
/// .trials(4)
/// .at_scale(ScalePoint::new(1))
/// .run(&mut counter)
/// .unwrap();
///
/// assert_eq!(counter, 4);
/// assert_eq!(result.trials, 4);
/// ```
pub struct Benchmark<'a, S: ?Sized> {
    name: String,
    trial_count: u32,
    scale: ScalePoint,
    setup: Option<SetupFn<'a, S>>,
    operation: OperationFn<'a, S>,
}

impl<'a, S: ?Sized> Benchmark<'a, S> {
    /// Benchmark `operation` with the default trial count at scale 1.
    pub fn new<F>(name: impl Into<String>, operation: F) -> Self
    where
        F: FnMut(&mut S) -> Result<()> + 'a,
    {
        Self {
            name: name.into(),
            trial_count: DEFAULT_TRIAL_COUNT,
            scale: ScalePoint::new(1),
            setup: None,
            operation: Box::new(operation),
        }
    }

    /// Run `setup` once before the first trial.
    pub fn with_setup<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut S, ScalePoint) -> Result<()> + 'a,
    {
        self.setup = Some(Box::new(setup));
        self
    }

    /// Number of timed trials; zero is rejected by [`Benchmark::run`].
    pub fn trials(mut self, trial_count: u32) -> Self {
        self.trial_count = trial_count;
        self
    }

    /// Scale recorded in the result and passed to setup.
    pub fn at_scale(mut self, scale: ScalePoint) -> Self {
        self.scale = scale;
        self
    }

    /// Operation name used in logs and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured number of timed trials.
    pub fn trial_count(&self) -> u32 {
        self.trial_count
    }

    /// Configured scale.
    pub fn scale(&self) -> ScalePoint {
        self.scale
    }

    /// Whether a setup step runs before the first trial.
    pub fn has_setup(&self) -> bool {
        self.setup.is_some()
    }

    /// Execute the benchmark against `store`.
    ///
    /// # Errors
    /// - `InvalidScale` when the trial count is zero (setup is not invoked)
    /// - `Setup` when setup fails (no trial runs)
    /// - `Trial` carrying the 1-based index of the first failing trial
    pub fn run(self, store: &mut S) -> Result<BenchmarkResult> {
        let Self { name, trial_count, scale, setup, mut operation } = self;

        if trial_count == 0 {
            return Err(CadenceError::InvalidScale(format!(
                "'{name}' requires at least one trial"
            )));
        }

        if let Some(setup) = setup {
            info!(operation = %name, trial_count, scale = scale.get(), "running setup");
            setup(&mut *store, scale)
                .map_err(|source| CadenceError::setup(&name, trial_count, scale, source))?;
        }

        info!(operation = %name, trial_count, scale = scale.get(), "starting benchmark");

        let mut samples = Vec::with_capacity(trial_count as usize);
        for trial in 1..=trial_count {
            let started = Instant::now();
            operation(&mut *store)
                .map_err(|source| CadenceError::trial(&name, trial, trial_count, scale, source))?;
            let elapsed = started.elapsed().as_secs_f64();

            debug!(operation = %name, trial, elapsed_secs = elapsed, "trial finished");
            samples.push(elapsed);
        }

        let result = stats::summarize(&samples, scale)?;
        info!(
            operation = %name,
            trial_count,
            scale = scale.get(),
            mean = result.mean,
            std_dev = result.std_dev,
            "benchmark finished"
        );

        Ok(result)
    }
}

impl<S: ?Sized> fmt::Debug for Benchmark<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Benchmark")
            .field("name", &self.name)
            .field("trial_count", &self.trial_count)
            .field("scale", &self.scale)
            .field("has_setup", &self.setup.is_some())
            .finish_non_exhaustive()
    }
}

/// Free-function form of [`Benchmark::run`].
pub fn run_benchmark<'a, S: ?Sized>(
    store: &mut S,
    name: &str,
    trial_count: u32,
    scale: ScalePoint,
    setup: Option<SetupFn<'a, S>>,
    operation: OperationFn<'a, S>,
) -> Result<BenchmarkResult> {
    Benchmark { name: name.to_string(), trial_count, scale, setup, operation }.run(store)
}
