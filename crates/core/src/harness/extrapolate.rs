//! Linear projection of measured results to other scales
//!
//! The model assumes cost grows proportionally with data volume. It does not
//! account for superlinear effects real stores show at scale (index
//! maintenance, page splits, cache misses), so projected values are a rough
//! lower-bound guide and are always reported as [`ExtrapolatedResult`], never
//! as measurements.

use cadence_domain::{BenchmarkResult, CadenceError, ExtrapolatedResult, Result, ScalePoint};

/// Iterator over projections of one measured result, in target order.
#[derive(Debug, Clone)]
pub struct Extrapolation<I> {
    source: BenchmarkResult,
    original: ScalePoint,
    targets: I,
}

impl<I> Iterator for Extrapolation<I>
where
    I: Iterator<Item = ScalePoint>,
{
    type Item = ExtrapolatedResult;

    fn next(&mut self) -> Option<Self::Item> {
        let target = self.targets.next()?;
        let factor = target.get() as f64 / self.original.get() as f64;

        Some(ExtrapolatedResult {
            mean: self.source.mean * factor,
            std_dev: self.source.std_dev * factor,
            target,
            original: self.original,
            source: self.source,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.targets.size_hint()
    }
}

/// Project `result`, measured at `original_n`, onto each of `targets`.
///
/// `mean' = mean * target_n / original_n`, and likewise for the standard
/// deviation. The returned iterator is lazy and yields one projection per
/// target, in order.
///
/// # Errors
/// Returns `CadenceError::InvalidScale` when `original_n` is zero. The check
/// happens before any projection is computed.
pub fn extrapolate<T>(
    result: &BenchmarkResult,
    original_n: ScalePoint,
    targets: T,
) -> Result<Extrapolation<T::IntoIter>>
where
    T: IntoIterator<Item = ScalePoint>,
{
    if original_n.is_zero() {
        return Err(CadenceError::InvalidScale(
            "cannot extrapolate from original_n = 0".to_string(),
        ));
    }

    Ok(Extrapolation { source: *result, original: original_n, targets: targets.into_iter() })
}

/// Extension for projecting a result from the scale it was measured at.
pub trait Extrapolate {
    /// Project onto `targets` using the result's own scale as `original_n`.
    ///
    /// # Errors
    /// Returns `CadenceError::InvalidScale` when the result was measured at
    /// scale zero.
    fn extrapolate<T>(&self, targets: T) -> Result<Extrapolation<T::IntoIter>>
    where
        T: IntoIterator<Item = ScalePoint>;
}

impl Extrapolate for BenchmarkResult {
    fn extrapolate<T>(&self, targets: T) -> Result<Extrapolation<T::IntoIter>>
    where
        T: IntoIterator<Item = ScalePoint>,
    {
        extrapolate(self, self.scale, targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measured(mean: f64, std_dev: f64, n: u64) -> BenchmarkResult {
        BenchmarkResult { mean, std_dev, scale: ScalePoint::new(n), trials: 10 }
    }

    #[test]
    fn doubling_scale_doubles_statistics_exactly() {
        let result = measured(0.37, 0.011, 100);
        let projected: Vec<_> =
            extrapolate(&result, ScalePoint::new(100), [ScalePoint::new(200)]).unwrap().collect();

        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].mean, 2.0 * 0.37);
        assert_eq!(projected[0].std_dev, 2.0 * 0.011);
        assert_eq!(projected[0].target, ScalePoint::new(200));
    }

    #[test]
    fn halving_scale_halves_statistics_exactly() {
        let result = measured(0.37, 0.011, 100);
        let projected: Vec<_> =
            extrapolate(&result, ScalePoint::new(100), [ScalePoint::new(50)]).unwrap().collect();

        assert_eq!(projected[0].mean, 0.5 * 0.37);
        assert_eq!(projected[0].std_dev, 0.5 * 0.011);
    }

    #[test]
    fn zero_original_scale_is_rejected_before_iteration() {
        let result = measured(1.0, 0.1, 0);
        let err = extrapolate(&result, ScalePoint::new(0), [ScalePoint::new(10)]).unwrap_err();
        assert!(matches!(err, CadenceError::InvalidScale(_)));

        // Targets are never pulled when validation fails
        let mut pulled = false;
        let targets = std::iter::from_fn(|| {
            pulled = true;
            Some(ScalePoint::new(1))
        });
        assert!(extrapolate(&result, ScalePoint::new(0), targets).is_err());
        assert!(!pulled);
    }

    #[test]
    fn projections_align_with_targets_and_keep_source() {
        let result = measured(0.2, 0.02, 1_000);
        let targets = [10_000, 100, 100_000].map(ScalePoint::new);
        let projected: Vec<_> = result.extrapolate(targets).unwrap().collect();

        let scales: Vec<_> = projected.iter().map(|p| p.target.get()).collect();
        assert_eq!(scales, vec![10_000, 100, 100_000]);
        assert!(projected.iter().all(|p| p.source == result));
        assert!(projected.iter().all(|p| p.original == ScalePoint::new(1_000)));
        assert!((projected[0].mean - 2.0).abs() < 1e-12);
        assert!((projected[1].mean - 0.02).abs() < 1e-12);
    }

    #[test]
    fn extrapolation_is_lazy() {
        let result = measured(1.0, 0.0, 10);
        let mut calls = 0;
        let targets = (1..=3).map(|n| {
            calls += 1;
            ScalePoint::new(n * 10)
        });

        let mut projections = extrapolate(&result, result.scale, targets).unwrap();
        let first = projections.next().unwrap();
        assert_eq!(first.mean, 1.0);
        drop(projections);
        assert_eq!(calls, 1);
    }
}
