//! Engine configuration - smoothing, axis padding and band domain

use ppmeter_core::{Domain, DriftResult};

use crate::{combine_with_padding, validate_alpha, validate_padding, Band, DriftEstimate, Trial};
use crate::{DEFAULT_ALPHA, DEFAULT_PADDING};

/// Drift engine configuration
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// EMA smoothing constant, (0, 1]
    pub alpha: f64,
    /// Axis padding as a fraction of the y range
    pub padding: f64,
    /// Shared evaluation domain for bands and axis hints
    pub domain: Domain,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            alpha: DEFAULT_ALPHA,
            padding: DEFAULT_PADDING,
            domain: Domain::default(),
        }
    }
}

impl EngineConfig {
    /// No smoothing: the regression sees the raw deviation
    pub fn unfiltered() -> Self {
        EngineConfig {
            alpha: 1.0,
            ..Self::default()
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    /// Check alpha and padding (the domain validates itself on construction)
    pub fn validate(&self) -> DriftResult<()> {
        validate_alpha(self.alpha)?;
        validate_padding(self.padding)?;
        Ok(())
    }

    /// Fresh trial using this configuration's smoothing
    pub fn trial(&self) -> DriftResult<Trial> {
        Trial::with_alpha(self.alpha)
    }

    /// Band between two estimates over the configured domain
    pub fn band(&self, a: &DriftEstimate, b: &DriftEstimate) -> DriftResult<Band> {
        combine_with_padding(a, b, self.domain, self.padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppmeter_core::DriftError;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.alpha, 0.1);
        assert_eq!(config.padding, 0.05);
        assert_eq!(config.domain.endpoints(), [0.0, 600.0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = EngineConfig::default().with_alpha(0.0);
        assert_eq!(config.validate(), Err(DriftError::InvalidAlpha(0.0)));

        let config = EngineConfig::default().with_padding(-1.0);
        assert_eq!(config.validate(), Err(DriftError::InvalidPadding(-1.0)));
    }

    #[test]
    fn test_trial_uses_alpha() {
        let trial = EngineConfig::unfiltered().trial().unwrap();
        assert_eq!(trial.alpha(), 1.0);
        assert!(EngineConfig::default().with_alpha(2.0).trial().is_err());
    }

    #[test]
    fn test_band_uses_domain() {
        let config = EngineConfig::default().with_domain(Domain::new(100.0, 200.0).unwrap());
        let band = config
            .band(
                &DriftEstimate::from_ppm(1.0, 0.0),
                &DriftEstimate::from_ppm(2.0, 0.0),
            )
            .unwrap();
        assert_eq!(band.start.t, 100.0);
        assert_eq!(band.end.t, 200.0);
    }

    #[test]
    fn test_band_rejects_bad_padding() {
        let config = EngineConfig::default().with_padding(-0.05);
        let a = DriftEstimate::from_ppm(1.0, 0.0);
        assert_eq!(config.band(&a, &a), Err(DriftError::InvalidPadding(-0.05)));
    }
}
