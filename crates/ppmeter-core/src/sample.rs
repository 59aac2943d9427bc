//! Samples - one reading of the clock under test against the reference

/// A single (actual, measured) reading
///
/// Both values are seconds elapsed since the trial origin: `actual_time` from
/// the reference timer, `measured_time` as reported by the clock under test.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    pub actual_time: f64,
    pub measured_time: f64,
}

impl Sample {
    #[inline]
    pub fn new(actual_time: f64, measured_time: f64) -> Self {
        Sample {
            actual_time,
            measured_time,
        }
    }

    /// Raw deviation (measured - actual), seconds
    #[inline]
    pub fn deviation(&self) -> f64 {
        self.measured_time - self.actual_time
    }

    /// Both values finite and non-negative
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.actual_time.is_finite()
            && self.measured_time.is_finite()
            && self.actual_time >= 0.0
            && self.measured_time >= 0.0
    }
}

impl From<(f64, f64)> for Sample {
    #[inline]
    fn from((actual_time, measured_time): (f64, f64)) -> Self {
        Sample::new(actual_time, measured_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_deviation() {
        let s = Sample::new(100.0, 100.0003);
        assert!((s.deviation() - 0.0003).abs() < 1e-12);

        // Clock under test running slow
        let s = Sample::new(100.0, 99.0);
        assert!((s.deviation() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_validity() {
        assert!(Sample::new(0.0, 0.0).is_valid());
        assert!(!Sample::new(-1.0, 0.0).is_valid());
        assert!(!Sample::new(1.0, f64::NAN).is_valid());
        assert!(!Sample::new(f64::INFINITY, 1.0).is_valid());
    }

    #[test]
    fn test_sample_from_tuple() {
        let s: Sample = (5.0, 6.0).into();
        assert_eq!(s, Sample::new(5.0, 6.0));
    }
}
