//! Drifting clock simulator - synthetic trials with known drift
//!
//! Simulates:
//! - A clock under test that reports whole seconds at a fixed cadence
//! - A drift rate between that clock and the reference timer
//! - Read latency on the reference side (the serial line, the host)
//! - Repeated lines for the same device second

use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use ppmeter_core::{Sample, PPM_SCALE};
use ppmeter_source::TIMESTAMP_FORMAT;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Clock drift model for the clock under test
#[derive(Clone, Debug)]
pub struct ClockDriftModel {
    /// Drift rate in ppm (>0 = device runs fast)
    pub drift_ppm: f64,
    /// Maximum read latency added to the reference time (seconds)
    pub jitter: f64,
}

impl ClockDriftModel {
    pub fn new(drift_ppm: f64, jitter: f64) -> Self {
        ClockDriftModel { drift_ppm, jitter }
    }

    /// Perfect clock, perfect line
    pub fn perfect() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Crystal running fast
    pub fn fast() -> Self {
        Self::new(20.0, 0.002)
    }

    /// Crystal running slow
    pub fn slow() -> Self {
        Self::new(-20.0, 0.002)
    }

    /// Noisy line: latency dominates over drift at short range
    pub fn unstable() -> Self {
        Self::new(5.0, 0.05)
    }

    /// Reference time at which the device shows `measured` seconds
    pub fn actual_for(&self, measured: f64, rng: &mut StdRng) -> f64 {
        let ideal = measured / (1.0 + self.drift_ppm / PPM_SCALE);
        let latency = if self.jitter > 0.0 {
            rng.gen_range(0.0..self.jitter)
        } else {
            0.0
        };
        ideal + latency
    }
}

/// One line as the device would emit it
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceReading {
    /// Rendered `dd.mm.YYYY HH:MM:SS` line
    pub line: String,
    /// Arrival time relative to the origin line
    pub arrival: Duration,
}

/// Generates trials for a clock under test
pub struct DriftSimulator {
    model: ClockDriftModel,
    /// Device seconds between samples
    interval: u32,
    /// Probability that a line is repeated
    duplicate_rate: f64,
    rng: StdRng,
}

impl DriftSimulator {
    pub fn new(model: ClockDriftModel, interval: u32, seed: u64) -> Self {
        DriftSimulator {
            model,
            interval: interval.max(1),
            duplicate_rate: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Repeat lines with probability `rate`
    pub fn with_duplicates(mut self, rate: f64) -> Self {
        self.duplicate_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn model(&self) -> &ClockDriftModel {
        &self.model
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Samples for a run lasting `duration` device seconds, origin excluded
    pub fn samples(&mut self, duration: u32) -> Vec<Sample> {
        let mut samples = Vec::new();
        let mut measured = self.interval;
        while measured <= duration {
            let m = measured as f64;
            let actual = self.model.actual_for(m, &mut self.rng);
            samples.push(Sample::new(actual, m));
            measured += self.interval;
        }
        samples
    }

    /// Device lines for the same run, origin line first
    pub fn feed(&mut self, origin: NaiveDateTime, duration: u32) -> Vec<DeviceReading> {
        let mut readings = vec![DeviceReading {
            line: origin.format(TIMESTAMP_FORMAT).to_string(),
            arrival: Duration::ZERO,
        }];

        for sample in self.samples(duration) {
            let line = (origin + chrono::Duration::seconds(sample.measured_time as i64))
                .format(TIMESTAMP_FORMAT)
                .to_string();
            let arrival = Duration::from_secs_f64(sample.actual_time);

            if self.duplicate_rate > 0.0 && self.rng.gen_bool(self.duplicate_rate) {
                readings.push(DeviceReading {
                    line: line.clone(),
                    arrival,
                });
            }
            readings.push(DeviceReading { line, arrival });
        }
        readings
    }
}

/// Place readings on a timeline starting at `t0`
pub fn arrivals<'a>(
    readings: &'a [DeviceReading],
    t0: Instant,
) -> impl Iterator<Item = (&'a str, Instant)> + 'a {
    readings
        .iter()
        .map(move |r| (r.line.as_str(), t0 + r.arrival))
}

/// Predefined trial scenarios
pub mod scenarios {
    use super::*;

    /// Fast clock sampled every 5 s
    pub fn fast_5s(seed: u64) -> DriftSimulator {
        DriftSimulator::new(ClockDriftModel::fast(), 5, seed)
    }

    /// Fast clock sampled every 20 s
    pub fn fast_20s(seed: u64) -> DriftSimulator {
        DriftSimulator::new(ClockDriftModel::fast(), 20, seed)
    }

    /// Same clock, two cadences: the pair a band is built from
    pub fn cadence_pair(model: ClockDriftModel, seed: u64) -> (DriftSimulator, DriftSimulator) {
        (
            DriftSimulator::new(model.clone(), 5, seed),
            DriftSimulator::new(model, 20, seed.wrapping_add(1)),
        )
    }
}
