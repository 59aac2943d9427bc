//! Time primitives for drift estimation
//!
//! Drift is carried internally as a dimensionless slope (seconds of deviation
//! per second of actual time) and converted to human units at the edges:
//! - ppm: slope × 1e6 (µs of deviation per second)
//! - ms/h: ppm × 3.6
//! - s/d: ppm × 86400 / 1e6

use crate::{DriftError, DriftResult};

/// Slope to ppm scale factor
pub const PPM_SCALE: f64 = 1e6;

/// Seconds in one day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Milliseconds per hour accrued per ppm of drift
pub const MILLIS_PER_HOUR_PER_PPM: f64 = 3.6;

/// Default evaluation domain end (seconds)
pub const DEFAULT_DOMAIN_END: f64 = 600.0;

/// Convert a slope to ppm
#[inline]
pub fn slope_to_ppm(slope: f64) -> f64 {
    slope * PPM_SCALE
}

/// Convert ppm to milliseconds gained (or lost) per hour
#[inline]
pub fn ppm_to_millis_per_hour(ppm: f64) -> f64 {
    ppm * MILLIS_PER_HOUR_PER_PPM
}

/// Convert ppm to seconds gained (or lost) per day
#[inline]
pub fn ppm_to_seconds_per_day(ppm: f64) -> f64 {
    ppm * SECONDS_PER_DAY / PPM_SCALE
}

/// Evaluation domain [t_min, t_max] in seconds of actual time
///
/// Need not be covered by any trial's samples: evaluating regression lines
/// outside the observed range is how two trials are compared.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Domain {
    t_min: f64,
    t_max: f64,
}

impl Domain {
    /// Create a domain; both ends finite and `t_min < t_max`
    pub fn new(t_min: f64, t_max: f64) -> DriftResult<Self> {
        if !t_min.is_finite() || !t_max.is_finite() || t_min >= t_max {
            return Err(DriftError::InvalidDomain { t_min, t_max });
        }
        Ok(Domain { t_min, t_max })
    }

    #[inline]
    pub fn start(&self) -> f64 {
        self.t_min
    }

    #[inline]
    pub fn end(&self) -> f64 {
        self.t_max
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.t_max - self.t_min
    }

    #[inline]
    pub fn endpoints(&self) -> [f64; 2] {
        [self.t_min, self.t_max]
    }

    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.t_min && t <= self.t_max
    }
}

impl Default for Domain {
    fn default() -> Self {
        Domain {
            t_min: 0.0,
            t_max: DEFAULT_DOMAIN_END,
        }
    }
}
