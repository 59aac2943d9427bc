//! Live feed - timestamp lines from the clock under test
//!
//! The device prints its own time once per second as `dd.mm.YYYY HH:MM:SS`.
//! Anything else on the line is diagnostic chatter and is passed through as
//! noise. The local monotonic timer is the reference clock.

use std::time::Instant;

use chrono::NaiveDateTime;
use ppmeter_core::Sample;

use crate::{SourceError, SourceResult};

/// Device timestamp format
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Length of a well-formed timestamp line
pub const TIMESTAMP_LEN: usize = "01.01.2000 00:00:00".len();

/// Parse one device timestamp
pub fn parse_timestamp(line: &str) -> SourceResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(line, TIMESTAMP_FORMAT).map_err(|source| SourceError::Timestamp {
        line: line.to_string(),
        source,
    })
}

/// What one line of the feed turned into
#[derive(Clone, Debug, PartialEq)]
pub enum LineOutcome {
    /// Not a timestamp line
    Noise(String),
    /// First timestamp: starts the reference timer, produces no sample
    Origin(NaiveDateTime),
    /// Same timestamp as the previous line
    Duplicate(NaiveDateTime),
    /// A new reading
    Sample(Sample),
}

/// Converts device timestamps into samples relative to the first one
///
/// `actual_time` is local timer seconds since the origin line arrived;
/// `measured_time` is whole device seconds since the origin timestamp.
/// Readings within the same device second are indistinguishable and are
/// dropped as duplicates.
#[derive(Clone, Debug, Default)]
pub struct LiveSession {
    origin: Option<(Instant, NaiveDateTime)>,
    previous: Option<NaiveDateTime>,
}

impl LiveSession {
    pub fn new() -> Self {
        LiveSession::default()
    }

    /// Feed one line received at `now`
    pub fn ingest(&mut self, line: &str, now: Instant) -> SourceResult<LineOutcome> {
        let line = line.trim();
        if line.len() != TIMESTAMP_LEN {
            return Ok(LineOutcome::Noise(line.to_string()));
        }
        let timestamp = parse_timestamp(line)?;

        let (timer_origin, device_origin) = match self.origin {
            None => {
                self.origin = Some((now, timestamp));
                self.previous = Some(timestamp);
                tracing::info!(%timestamp, "live session started");
                return Ok(LineOutcome::Origin(timestamp));
            }
            Some(origin) => origin,
        };

        if self.previous == Some(timestamp) {
            return Ok(LineOutcome::Duplicate(timestamp));
        }
        self.previous = Some(timestamp);

        let actual_time = now.saturating_duration_since(timer_origin).as_secs_f64();
        let measured_time = (timestamp - device_origin).num_seconds() as f64;

        Ok(LineOutcome::Sample(Sample::new(actual_time, measured_time)))
    }

    pub fn is_started(&self) -> bool {
        self.origin.is_some()
    }

    /// Device timestamp of the origin line
    pub fn origin_timestamp(&self) -> Option<NaiveDateTime> {
        self.origin.map(|(_, timestamp)| timestamp)
    }

    /// Start over; the next timestamp becomes the new origin
    pub fn reset(&mut self) {
        self.origin = None;
        self.previous = None;
    }
}
