//! Deviation filter - exponential moving average of measured - actual

use ppmeter_core::{DriftError, DriftResult};

/// Default smoothing constant
pub const DEFAULT_ALPHA: f64 = 0.1;

/// Check a smoothing constant lies in (0, 1]
pub fn validate_alpha(alpha: f64) -> DriftResult<f64> {
    if alpha.is_finite() && alpha > 0.0 && alpha <= 1.0 {
        Ok(alpha)
    } else {
        Err(DriftError::InvalidAlpha(alpha))
    }
}

/// Causal EMA over the deviation signal
///
/// `ema[0] = deviation[0]`, then `ema[i] = α·deviation[i] + (1-α)·ema[i-1]`.
/// O(1) per update; never looks ahead.
#[derive(Clone, Debug)]
pub struct DeviationFilter {
    alpha: f64,
    ema: Option<f64>,
}

impl DeviationFilter {
    /// Filter with the default smoothing constant
    pub fn new() -> Self {
        DeviationFilter {
            alpha: DEFAULT_ALPHA,
            ema: None,
        }
    }

    /// Filter with a custom smoothing constant
    pub fn with_alpha(alpha: f64) -> DriftResult<Self> {
        Ok(DeviationFilter {
            alpha: validate_alpha(alpha)?,
            ema: None,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Feed one deviation, returns the updated EMA
    pub fn update(&mut self, deviation: f64) -> f64 {
        let ema = match self.ema {
            None => deviation,
            Some(prev) => self.alpha * deviation + (1.0 - self.alpha) * prev,
        };
        self.ema = Some(ema);
        ema
    }

    /// Latest EMA, if any deviation has been fed
    pub fn current(&self) -> Option<f64> {
        self.ema
    }

    /// Forget history, keep alpha
    pub fn reset(&mut self) {
        self.ema = None;
    }
}

impl Default for DeviationFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Smooth a whole deviation series in one pass
pub fn smooth(deviations: &[f64], alpha: f64) -> DriftResult<Vec<f64>> {
    let mut filter = DeviationFilter::with_alpha(alpha)?;
    Ok(deviations.iter().map(|&d| filter.update(d)).collect())
}
