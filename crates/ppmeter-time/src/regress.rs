//! Drift regressor - first-degree least-squares fit of smoothed deviation

use ppmeter_core::{
    ppm_to_millis_per_hour, ppm_to_seconds_per_day, slope_to_ppm, Domain, DriftError, DriftResult,
};

use crate::AxisBounds;

/// Minimum samples for a fit
pub const MIN_FIT_SAMPLES: usize = 2;

/// Linear drift estimate: deviation(t) ≈ slope·t + intercept
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriftEstimate {
    /// Seconds of deviation per second of actual time
    pub slope: f64,
    /// Deviation at t = 0, seconds
    pub intercept: f64,
    /// Number of points the line was fitted on
    pub sample_count: usize,
}

impl DriftEstimate {
    /// Build an estimate from known coefficients
    pub fn from_coefficients(slope: f64, intercept: f64) -> Self {
        DriftEstimate {
            slope,
            intercept,
            sample_count: 0,
        }
    }

    /// Build an estimate from a ppm rate and intercept
    pub fn from_ppm(ppm: f64, intercept: f64) -> Self {
        Self::from_coefficients(ppm / ppmeter_core::PPM_SCALE, intercept)
    }

    /// Drift rate in parts per million
    #[inline]
    pub fn ppm(&self) -> f64 {
        slope_to_ppm(self.slope)
    }

    /// Milliseconds gained per hour (negative: lost)
    #[inline]
    pub fn millis_per_hour(&self) -> f64 {
        ppm_to_millis_per_hour(self.ppm())
    }

    /// Seconds gained per day (negative: lost)
    #[inline]
    pub fn seconds_per_day(&self) -> f64 {
        ppm_to_seconds_per_day(self.ppm())
    }

    /// Evaluate the line at actual time `t`
    #[inline]
    pub fn evaluate(&self, t: f64) -> f64 {
        self.slope * t + self.intercept
    }

    /// Evaluate the line at both domain endpoints
    pub fn evaluate_domain(&self, domain: &Domain) -> [f64; 2] {
        domain.endpoints().map(|t| self.evaluate(t))
    }

    /// Suggested y-axis range for charting this line alone over `domain`
    pub fn axis_bounds(&self, domain: &Domain, padding: f64) -> AxisBounds {
        let [y0, y1] = self.evaluate_domain(domain);
        AxisBounds::around(y0.min(y1), y0.max(y1), padding)
    }
}

/// Ordinary least-squares line through `(xs[i], ys[i])`
///
/// Recomputed from scratch on every call. Errors:
/// - `LengthMismatch` when the slices differ in length
/// - `InsufficientData` with fewer than two points
/// - `DegenerateDomain` when every x is identical
pub fn fit_line(xs: &[f64], ys: &[f64]) -> DriftResult<DriftEstimate> {
    if xs.len() != ys.len() {
        return Err(DriftError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    let n = xs.len();
    if n < MIN_FIT_SAMPLES {
        return Err(DriftError::InsufficientData { have: n });
    }

    let first = xs[0];
    if xs.iter().all(|&x| x == first) {
        return Err(DriftError::DegenerateDomain);
    }

    let nf = n as f64;
    let mean_x = xs.iter().sum::<f64>() / nf;
    let mean_y = ys.iter().sum::<f64>() / nf;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }
    if sxx <= 0.0 {
        return Err(DriftError::DegenerateDomain);
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    tracing::debug!(n, slope, intercept, ppm = slope_to_ppm(slope), "fitted drift line");

    Ok(DriftEstimate {
        slope,
        intercept,
        sample_count: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_exact_recovery() {
        let xs: Vec<f64> = (0..50).map(|i| i as f64 * 12.0).collect();
        let ys: Vec<f64> = xs.iter().map(|&t| 3e-6 * t + 0.2).collect();

        let estimate = fit_line(&xs, &ys).unwrap();
        assert!(approx(estimate.slope, 3e-6, 1e-12));
        assert!(approx(estimate.intercept, 0.2, 1e-9));
        assert!(approx(estimate.ppm(), 3.0, 1e-6));
        assert_eq!(estimate.sample_count, 50);
    }

    #[test]
    fn test_two_points_is_enough() {
        let estimate = fit_line(&[0.0, 100.0], &[0.0, 0.0003]).unwrap();
        assert!(approx(estimate.ppm(), 3.0, 1e-9));
        assert!(approx(estimate.intercept, 0.0, 1e-15));
    }

    #[test]
    fn test_insufficient_data() {
        assert_eq!(fit_line(&[], &[]), Err(DriftError::InsufficientData { have: 0 }));
        assert_eq!(fit_line(&[1.0], &[0.5]), Err(DriftError::InsufficientData { have: 1 }));
    }

    #[test]
    fn test_degenerate_domain() {
        let xs = [0.1, 0.1, 0.1];
        let ys = [1.0, 2.0, 3.0];
        assert_eq!(fit_line(&xs, &ys), Err(DriftError::DegenerateDomain));
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            fit_line(&[0.0, 1.0, 2.0], &[0.0, 1.0]),
            Err(DriftError::LengthMismatch { xs: 3, ys: 2 })
        );
    }

    #[test]
    fn test_noisy_fit_is_least_squares() {
        // Reference values computed by hand: sxy = 9, sxx = 5
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.5, 2.5, 5.5, 6.5];
        let estimate = fit_line(&xs, &ys).unwrap();
        assert!(approx(estimate.slope, 1.8, 1e-12));
        assert!(approx(estimate.intercept, 1.3, 1e-12));
    }

    #[test]
    fn test_unit_conversions() {
        let estimate = DriftEstimate::from_ppm(10.0, 0.0);
        assert!(approx(estimate.ppm(), 10.0, 1e-9));
        assert!(approx(estimate.millis_per_hour(), 36.0, 1e-9));
        assert!(approx(estimate.seconds_per_day(), 0.864, 1e-9));
    }

    #[test]
    fn test_axis_bounds_single_line() {
        let estimate = DriftEstimate::from_coefficients(1e-3, 0.0);
        let bounds = estimate.axis_bounds(&Domain::default(), 0.05);
        // Line spans [0, 0.6], padded 5% each side
        assert!(approx(bounds.low, -0.03, 1e-12));
        assert!(approx(bounds.high, 0.63, 1e-12));
    }
}
