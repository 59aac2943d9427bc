//! End-to-end integration - sources feeding the engine

use std::time::Instant;

use ppmeter_core::DriftResult;
use ppmeter_source::{LineOutcome, LiveSession};
use ppmeter_time::{DriftEstimate, EngineConfig, Trial};

use crate::{arrivals, DeviceReading};

/// Counters from replaying a device feed, plus the last running estimate
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FeedStats {
    pub samples: usize,
    pub duplicates: usize,
    pub rejected: usize,
    /// Estimate refreshed after the last accepted sample
    pub estimate: Option<DriftEstimate>,
}

/// Replay device readings through a live session into a fresh trial
///
/// Mirrors the live driver: every reading goes through `LiveSession`, every
/// sample through `Trial::observe`, and the estimate is refreshed after
/// each accepted sample.
pub fn replay_feed(
    readings: &[DeviceReading],
    t0: Instant,
    config: &EngineConfig,
) -> DriftResult<(Trial, FeedStats)> {
    let mut trial = config.trial()?;
    let mut session = LiveSession::new();
    let mut stats = FeedStats::default();

    for (line, now) in arrivals(readings, t0) {
        match session.ingest(line, now) {
            Ok(LineOutcome::Sample(sample)) => {
                stats.samples += 1;
                if trial.observe_sample(sample).is_some() {
                    stats.estimate = trial.fit().ok();
                } else {
                    stats.rejected += 1;
                }
            }
            Ok(LineOutcome::Duplicate(_)) => stats.duplicates += 1,
            Ok(_) | Err(_) => {}
        }
    }
    Ok((trial, stats))
}
