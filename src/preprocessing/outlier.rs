//! Percentile-based outlier bounds

use serde::{Deserialize, Serialize};

/// Inclusive bounds computed from a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    /// Bounds at the `lower` and `upper` quantiles (fractions in [0, 1]).
    ///
    /// Returns `None` for an empty sample.
    pub fn percentile(values: &[f64], lower: f64, upper: f64) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Some(Self {
            lower: quantile_sorted(&sorted, lower),
            upper: quantile_sorted(&sorted, upper),
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Quantile of an ascending, non-empty slice with linear interpolation
/// between the two nearest ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile_sorted(&sorted, 0.0), 1.0);
        assert_eq!(quantile_sorted(&sorted, 0.5), 3.0);
        assert!((quantile_sorted(&sorted, 0.05) - 1.2).abs() < 1e-12);
        assert!((quantile_sorted(&sorted, 0.95) - 4.8).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let values = [10.0, 1.0, 4.0, 7.0];
        let bounds = OutlierBounds::percentile(&values, 0.0, 1.0).unwrap();
        assert!(bounds.contains(1.0));
        assert!(bounds.contains(10.0));
        assert!(!bounds.contains(10.5));
    }

    #[test]
    fn test_extreme_value_excluded() {
        let mut values: Vec<f64> = (1..=40).map(|i| i as f64 / 10.0).collect();
        values.push(400.0);
        let bounds = OutlierBounds::percentile(&values, 0.05, 0.95).unwrap();
        assert!(!bounds.contains(400.0));
        assert!(bounds.contains(2.0));
    }

    #[test]
    fn test_empty_sample() {
        assert!(OutlierBounds::percentile(&[], 0.05, 0.95).is_none());
    }
}
