//! Trial - one measurement run and its derived deviation series

use ppmeter_core::{DriftError, DriftResult, Sample};

use crate::{fit_line, DeviationFilter, DriftEstimate};

/// Result of one accepted sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    pub sample: Sample,
    /// measured - actual, seconds
    pub deviation: f64,
    /// Smoothed deviation after this sample
    pub ema_deviation: f64,
}

/// One continuous measurement run
///
/// INVARIANT: `actual_time` strictly increases; all four columns have equal
/// length. The same `observe` path serves live feeds and batch files, so
/// feeding a sequence one sample at a time or all at once yields identical
/// series.
#[derive(Clone, Debug, Default)]
pub struct Trial {
    actual_time: Vec<f64>,
    measured_time: Vec<f64>,
    deviation: Vec<f64>,
    ema_deviation: Vec<f64>,
    filter: DeviationFilter,
}

impl Trial {
    /// Empty trial with the default smoothing constant
    pub fn new() -> Self {
        Trial::default()
    }

    /// Empty trial with a custom smoothing constant
    pub fn with_alpha(alpha: f64) -> DriftResult<Self> {
        Ok(Self::with_filter(DeviationFilter::with_alpha(alpha)?))
    }

    /// Empty trial around an existing (unused) filter configuration
    pub fn with_filter(mut filter: DeviationFilter) -> Self {
        filter.reset();
        Trial {
            filter,
            ..Trial::default()
        }
    }

    /// Build a trial from a full sample sequence
    pub fn from_samples<I, S>(samples: I, alpha: f64) -> DriftResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Sample>,
    {
        let mut trial = Self::with_alpha(alpha)?;
        trial.observe_all(samples);
        Ok(trial)
    }

    /// Accept a sample or report why it was rejected
    pub fn try_observe(&mut self, actual_time: f64, measured_time: f64) -> DriftResult<Observation> {
        let sample = Sample::new(actual_time, measured_time);
        if !sample.is_valid() {
            return Err(DriftError::InvalidSample {
                actual: actual_time,
                measured: measured_time,
            });
        }
        if let Some(latest) = self.latest_actual_time() {
            if actual_time <= latest {
                return Err(DriftError::OutOfOrderSample {
                    actual: actual_time,
                    latest,
                });
            }
        }

        let deviation = sample.deviation();
        let ema_deviation = self.filter.update(deviation);

        self.actual_time.push(actual_time);
        self.measured_time.push(measured_time);
        self.deviation.push(deviation);
        self.ema_deviation.push(ema_deviation);

        Ok(Observation {
            sample,
            deviation,
            ema_deviation,
        })
    }

    /// Accept a sample; duplicates, out-of-order and invalid samples are
    /// dropped and leave the trial untouched
    pub fn observe(&mut self, actual_time: f64, measured_time: f64) -> Option<Observation> {
        match self.try_observe(actual_time, measured_time) {
            Ok(observation) => Some(observation),
            Err(err) => {
                tracing::trace!(%err, "sample discarded");
                None
            }
        }
    }

    pub fn observe_sample(&mut self, sample: Sample) -> Option<Observation> {
        self.observe(sample.actual_time, sample.measured_time)
    }

    /// Feed a batch; returns how many samples were accepted
    pub fn observe_all<I, S>(&mut self, samples: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<Sample>,
    {
        let before = self.len();
        for sample in samples {
            self.observe_sample(sample.into());
        }
        let accepted = self.len() - before;
        tracing::debug!(accepted, total = self.len(), "batch observed");
        accepted
    }

    /// Least-squares drift over the smoothed deviation, from scratch
    pub fn fit(&self) -> DriftResult<DriftEstimate> {
        fit_line(&self.actual_time, &self.ema_deviation)
    }

    /// Fitted line evaluated at the first and last actual time
    pub fn regression_segment(&self) -> DriftResult<[(f64, f64); 2]> {
        let estimate = self.fit()?;
        // fit() guarantees at least two samples
        let (first, last) = match (self.actual_time.first(), self.actual_time.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Err(DriftError::InsufficientData { have: self.len() }),
        };
        Ok([
            (first, estimate.evaluate(first)),
            (last, estimate.evaluate(last)),
        ])
    }

    pub fn len(&self) -> usize {
        self.actual_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actual_time.is_empty()
    }

    pub fn alpha(&self) -> f64 {
        self.filter.alpha()
    }

    pub fn latest_actual_time(&self) -> Option<f64> {
        self.actual_time.last().copied()
    }

    pub fn actual_time(&self) -> &[f64] {
        &self.actual_time
    }

    pub fn measured_time(&self) -> &[f64] {
        &self.measured_time
    }

    pub fn deviation(&self) -> &[f64] {
        &self.deviation
    }

    pub fn ema_deviation(&self) -> &[f64] {
        &self.ema_deviation
    }

    /// Accepted samples in order
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.actual_time
            .iter()
            .zip(&self.measured_time)
            .map(|(&a, &m)| Sample::new(a, m))
    }
}
