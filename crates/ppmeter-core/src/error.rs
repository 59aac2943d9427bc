//! Error types for drift estimation

use thiserror::Error;

/// Drift estimation errors
///
/// Every variant is local to a single call. None of them is meant to end a
/// measurement run: rejected samples are skipped and failed fits just mean
/// there is nothing to report yet.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriftError {
    // Sample errors
    #[error("Out-of-order sample: actual time {actual}s does not exceed latest {latest}s")]
    OutOfOrderSample { actual: f64, latest: f64 },

    #[error("Invalid sample: actual {actual}s, measured {measured}s")]
    InvalidSample { actual: f64, measured: f64 },

    // Regression errors
    #[error("Insufficient data: need at least 2 samples, have {have}")]
    InsufficientData { have: usize },

    #[error("Degenerate domain: all actual times are identical")]
    DegenerateDomain,

    #[error("Length mismatch: {xs} x values, {ys} y values")]
    LengthMismatch { xs: usize, ys: usize },

    // Configuration errors
    #[error("Invalid domain: [{t_min}, {t_max}]")]
    InvalidDomain { t_min: f64, t_max: f64 },

    #[error("Invalid smoothing constant: {0} (must be in (0, 1])")]
    InvalidAlpha(f64),

    #[error("Invalid axis padding: {0} (must be finite and non-negative)")]
    InvalidPadding(f64),
}

impl DriftError {
    /// Rejections that `observe` swallows rather than reports
    pub fn is_rejected_sample(&self) -> bool {
        matches!(
            self,
            DriftError::OutOfOrderSample { .. } | DriftError::InvalidSample { .. }
        )
    }
}

/// Result type for drift operations
pub type DriftResult<T> = Result<T, DriftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_sample_classification() {
        assert!(DriftError::OutOfOrderSample { actual: 1.0, latest: 2.0 }.is_rejected_sample());
        assert!(DriftError::InvalidSample { actual: -1.0, measured: 0.0 }.is_rejected_sample());
        assert!(!DriftError::InsufficientData { have: 1 }.is_rejected_sample());
        assert!(!DriftError::DegenerateDomain.is_rejected_sample());
    }

    #[test]
    fn test_error_messages() {
        let err = DriftError::InsufficientData { have: 1 };
        assert_eq!(err.to_string(), "Insufficient data: need at least 2 samples, have 1");

        let err = DriftError::InvalidAlpha(1.5);
        assert!(err.to_string().contains("1.5"));
    }
}
