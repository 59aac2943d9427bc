//! Reports - frozen views of trials and bands for presentation sinks

use crate::{AxisBounds, Band, DriftEstimate, EngineConfig, Trial};

/// Drift rate in every unit a report shows
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DriftSummary {
    pub ppm: f64,
    pub millis_per_hour: f64,
    pub seconds_per_day: f64,
    pub intercept: f64,
    pub sample_count: usize,
}

impl From<&DriftEstimate> for DriftSummary {
    fn from(estimate: &DriftEstimate) -> Self {
        DriftSummary {
            ppm: estimate.ppm(),
            millis_per_hour: estimate.millis_per_hour(),
            seconds_per_day: estimate.seconds_per_day(),
            intercept: estimate.intercept,
            sample_count: estimate.sample_count,
        }
    }
}

/// Snapshot of one trial: series plus the current estimate, if any
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrialReport {
    pub label: String,
    pub alpha: f64,
    pub actual_time: Vec<f64>,
    pub deviation: Vec<f64>,
    pub ema_deviation: Vec<f64>,
    /// `None` while the trial cannot be fitted
    pub drift: Option<DriftSummary>,
    /// Regression line over the trial's own sample range
    pub segment: Option<[(f64, f64); 2]>,
    /// Axis hint for the regression line over the configured domain
    pub axis: Option<AxisBounds>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub estimate: Option<DriftEstimate>,
}

impl TrialReport {
    pub fn new(label: impl Into<String>, trial: &Trial, config: &EngineConfig) -> Self {
        let label = label.into();
        let estimate = match trial.fit() {
            Ok(estimate) => Some(estimate),
            Err(err) => {
                tracing::debug!(%label, %err, "no drift estimate");
                None
            }
        };

        TrialReport {
            alpha: trial.alpha(),
            actual_time: trial.actual_time().to_vec(),
            deviation: trial.deviation().to_vec(),
            ema_deviation: trial.ema_deviation().to_vec(),
            drift: estimate.as_ref().map(DriftSummary::from),
            segment: trial.regression_segment().ok(),
            axis: estimate
                .as_ref()
                .map(|e| e.axis_bounds(&config.domain, config.padding)),
            estimate,
            label,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.actual_time.len()
    }
}

/// Two trials and the band between them
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BandReport {
    pub label: String,
    pub first: TrialReport,
    pub second: TrialReport,
    /// `None` unless both trials could be fitted
    pub band: Option<Band>,
}

impl BandReport {
    pub fn new(
        label: impl Into<String>,
        first: TrialReport,
        second: TrialReport,
        config: &EngineConfig,
    ) -> Self {
        let band = match (&first.estimate, &second.estimate) {
            (Some(a), Some(b)) => match config.band(a, b) {
                Ok(band) => Some(band),
                Err(err) => {
                    tracing::warn!(%err, "no band");
                    None
                }
            },
            _ => None,
        };
        BandReport {
            label: label.into(),
            first,
            second,
            band,
        }
    }

    /// Chart title in the form `label: +a.a/+b.bppm`
    pub fn title(&self) -> String {
        match &self.band {
            Some(band) => format!("{}: {:+.1}/{:+.1}ppm", self.label, band.first_ppm, band.second_ppm),
            None => format!("{}: insufficient data", self.label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(ppm: f64, step: f64, n: usize) -> Trial {
        let samples = (0..n).map(|i| {
            let t = i as f64 * step;
            (t, t + ppm * 1e-6 * t)
        });
        Trial::from_samples(samples, 1.0).unwrap()
    }

    #[test]
    fn test_trial_report_with_estimate() {
        let config = EngineConfig::unfiltered();
        let report = TrialReport::new("bare", &ramp(4.0, 10.0, 30), &config);

        assert_eq!(report.label, "bare");
        assert_eq!(report.sample_count(), 30);
        let drift = report.drift.unwrap();
        assert!((drift.ppm - 4.0).abs() < 1e-6);
        assert!((drift.millis_per_hour - 14.4).abs() < 1e-5);
        assert!(report.segment.is_some());
        assert!(report.axis.is_some());
    }

    #[test]
    fn test_trial_report_insufficient_data() {
        let config = EngineConfig::default();
        let mut trial = Trial::new();
        trial.observe(1.0, 1.0);
        let report = TrialReport::new("short", &trial, &config);

        assert_eq!(report.sample_count(), 1);
        assert!(report.drift.is_none());
        assert!(report.segment.is_none());
        assert!(report.axis.is_none());
    }

    #[test]
    fn test_band_report_title() {
        let config = EngineConfig::unfiltered();
        let first = TrialReport::new("5s", &ramp(5.0, 5.0, 100), &config);
        let second = TrialReport::new("20s", &ramp(-2.0, 20.0, 30), &config);
        let report = BandReport::new("group", first, second, &config);

        assert_eq!(report.title(), "group: +5.0/-2.0ppm");
        assert!(report.band.unwrap().contains_ppm(0.0));
    }

    #[test]
    fn test_band_report_missing_fit() {
        let config = EngineConfig::default();
        let first = TrialReport::new("a", &ramp(5.0, 5.0, 10), &config);
        let second = TrialReport::new("b", &Trial::new(), &config);
        let report = BandReport::new("group", first, second, &config);

        assert!(report.band.is_none());
        assert_eq!(report.title(), "group: insufficient data");
    }
}
