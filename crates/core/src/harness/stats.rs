//! Aggregate statistics over trial samples

use cadence_domain::{BenchmarkResult, CadenceError, Result, ScalePoint};

/// Arithmetic mean of `samples`. `None` when empty.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Sample (n - 1) standard deviation. Returns 0 for fewer than two samples.
pub fn sample_std_dev(samples: &[f64]) -> f64 {
    let Some(mean) = mean(samples) else {
        return 0.0;
    };
    if samples.len() < 2 {
        return 0.0;
    }

    let squared: f64 = samples.iter().map(|sample| (sample - mean).powi(2)).sum();
    (squared / (samples.len() - 1) as f64).sqrt()
}

/// Collapse trial durations (seconds) into a [`BenchmarkResult`].
///
/// # Errors
/// Returns `CadenceError::InvalidInput` when `samples` is empty or contains
/// a negative or non-finite duration.
pub fn summarize(samples: &[f64], scale: ScalePoint) -> Result<BenchmarkResult> {
    if let Some(bad) = samples.iter().find(|sample| !sample.is_finite() || **sample < 0.0) {
        return Err(CadenceError::InvalidInput(format!(
            "trial durations must be finite and non-negative, got {bad}"
        )));
    }

    let mean = mean(samples).ok_or_else(|| {
        CadenceError::InvalidInput("cannot summarize an empty sample set".to_string())
    })?;
    let trials = u32::try_from(samples.len())
        .map_err(|_| CadenceError::InvalidInput("too many samples".to_string()))?;

    Ok(BenchmarkResult { mean, std_dev: sample_std_dev(samples), scale, trials })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn summarize_matches_mean_and_sample_std_dev() {
        let samples = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let result = summarize(&samples, ScalePoint::new(100)).unwrap();

        // Sum of squared deviations is 32, over n - 1 = 7
        assert!((result.mean - 5.0).abs() < EPSILON);
        assert!((result.std_dev - (32.0_f64 / 7.0).sqrt()).abs() < EPSILON);
        assert_eq!(result.trials, 8);
        assert_eq!(result.scale, ScalePoint::new(100));
    }

    #[test]
    fn two_samples() {
        let result = summarize(&[0.1, 0.3], ScalePoint::new(10)).unwrap();
        assert!((result.mean - 0.2).abs() < EPSILON);
        assert!((result.std_dev - 0.02_f64.sqrt()).abs() < EPSILON);
    }

    #[test]
    fn single_sample_has_zero_std_dev() {
        let result = summarize(&[0.42], ScalePoint::new(1)).unwrap();
        assert_eq!(result.mean, 0.42);
        assert_eq!(result.std_dev, 0.0);
        assert_eq!(result.trials, 1);
    }

    #[test]
    fn constant_samples_have_zero_std_dev() {
        let result = summarize(&[0.5; 6], ScalePoint::new(1)).unwrap();
        assert!((result.mean - 0.5).abs() < EPSILON);
        assert!(result.std_dev.abs() < EPSILON);
    }

    #[test]
    fn empty_samples_are_rejected() {
        let err = summarize(&[], ScalePoint::new(1)).unwrap_err();
        assert!(matches!(err, CadenceError::InvalidInput(_)));
        assert_eq!(sample_std_dev(&[]), 0.0);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn negative_or_nan_durations_are_rejected() {
        assert!(summarize(&[0.1, -0.1], ScalePoint::new(1)).is_err());
        assert!(summarize(&[f64::NAN], ScalePoint::new(1)).is_err());
    }
}
