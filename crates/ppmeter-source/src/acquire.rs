//! Acquisition loop - reads a live feed until the driver says stop

use std::time::Instant;

use ppmeter_core::Sample;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;

use crate::{LineOutcome, LiveSession, SourceResult};

/// Owner side of the stop signal
#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    /// Ask every loop holding a receiver to finish
    pub fn stop(&self) {
        // No receivers left means nothing to stop
        let _ = self.tx.send(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Create a stop signal: the handle stays with the driver, the receiver
/// goes into [`acquire`]. Dropping the handle also stops the loop.
pub fn stop_signal() -> (StopHandle, watch::Receiver<bool>) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, rx)
}

/// Line counters for one acquisition run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AcquisitionSummary {
    pub lines: u64,
    pub samples: u64,
    pub duplicates: u64,
    pub noise: u64,
    pub malformed: u64,
}

/// Read lines from `reader`, turning timestamps into samples
///
/// Each sample is handed to `on_sample` as soon as its line arrives. Ends
/// at end of stream or when `stop` fires. Lines that are not valid UTF-8
/// are decoded lossily and end up as noise or malformed lines; malformed
/// timestamps are logged and skipped. Only read errors end the loop with
/// an error.
pub async fn acquire<R, F>(
    mut reader: R,
    session: &mut LiveSession,
    mut stop: watch::Receiver<bool>,
    mut on_sample: F,
) -> SourceResult<AcquisitionSummary>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(Sample),
{
    let mut summary = AcquisitionSummary::default();
    // Keeps a partial line when a stop check interrupts a read
    let mut buf = Vec::new();

    loop {
        if *stop.borrow_and_update() {
            tracing::debug!("stop requested");
            break;
        }

        let read = tokio::select! {
            read = reader.read_until(b'\n', &mut buf) => read?,
            changed = stop.changed() => {
                if changed.is_err() {
                    tracing::debug!("stop handle dropped");
                    break;
                }
                continue;
            }
        };

        if read == 0 && buf.is_empty() {
            tracing::debug!("feed closed");
            break;
        }
        let now = Instant::now();
        summary.lines += 1;

        let line = String::from_utf8_lossy(&buf).into_owned();
        buf.clear();

        match session.ingest(&line, now) {
            Ok(LineOutcome::Sample(sample)) => {
                summary.samples += 1;
                on_sample(sample);
            }
            Ok(LineOutcome::Duplicate(_)) => summary.duplicates += 1,
            Ok(LineOutcome::Origin(_)) => {}
            Ok(LineOutcome::Noise(text)) => {
                summary.noise += 1;
                if !text.is_empty() {
                    tracing::info!(line = %text, "device output");
                }
            }
            Err(err) => {
                summary.malformed += 1;
                tracing::warn!(%err, "skipping malformed line");
            }
        }
    }

    tracing::info!(
        lines = summary.lines,
        samples = summary.samples,
        duplicates = summary.duplicates,
        noise = summary.noise,
        malformed = summary.malformed,
        "acquisition finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncWriteExt, BufReader};

    const FEED: &str = "boot\n01.01.2000 00:00:00\n01.01.2000 00:00:00\n\
                        01.01.2000 00:00:01\nxx.01.2000 00:00:02\n01.01.2000 00:00:02\n";

    #[tokio::test]
    async fn test_acquire_until_eof() {
        let (_handle, stop) = stop_signal();
        let mut session = LiveSession::new();
        let mut measured = Vec::new();

        let summary = acquire(BufReader::new(FEED.as_bytes()), &mut session, stop, |s| {
            measured.push(s.measured_time)
        })
        .await
        .unwrap();

        assert_eq!(measured, vec![1.0, 2.0]);
        assert_eq!(
            summary,
            AcquisitionSummary {
                lines: 6,
                samples: 2,
                duplicates: 1,
                noise: 1,
                malformed: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_does_not_end_feed() {
        let mut feed = vec![0xFF, 0xFE, b'\n'];
        feed.extend_from_slice(b"01.01.2000 00:00:00\n01.01.2000 00:00:01\n");
        // Garbage of timestamp length between two readings
        feed.extend_from_slice(&[0xC3; 19]);
        feed.extend_from_slice(b"\n01.01.2000 00:00:02\n");

        let (_handle, stop) = stop_signal();
        let mut session = LiveSession::new();
        let mut measured = Vec::new();

        let summary = acquire(BufReader::new(feed.as_slice()), &mut session, stop, |s| {
            measured.push(s.measured_time)
        })
        .await
        .unwrap();

        assert_eq!(measured, vec![1.0, 2.0]);
        assert_eq!(summary.lines, 5);
        assert_eq!(summary.samples, 2);
        assert_eq!(summary.noise + summary.malformed, 2);
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let (_handle, stop) = stop_signal();
        let mut session = LiveSession::new();
        let mut measured = Vec::new();

        let feed = "01.01.2000 00:00:00\r\n01.01.2000 00:00:05";
        let summary = acquire(BufReader::new(feed.as_bytes()), &mut session, stop, |s| {
            measured.push(s.measured_time)
        })
        .await
        .unwrap();

        assert_eq!(measured, vec![5.0]);
        assert_eq!(summary.lines, 2);
    }

    #[tokio::test]
    async fn test_stop_before_start() {
        let (handle, stop) = stop_signal();
        handle.stop();
        assert!(handle.is_stopped());

        let mut session = LiveSession::new();
        let summary = acquire(BufReader::new(FEED.as_bytes()), &mut session, stop, |_| {})
            .await
            .unwrap();
        assert_eq!(summary.lines, 0);
    }

    #[tokio::test]
    async fn test_stop_while_waiting_for_line() {
        // A feed that never sends anything
        let (mut device, host) = tokio::io::duplex(64);
        let (handle, stop) = stop_signal();

        let task = tokio::spawn(async move {
            let mut session = LiveSession::new();
            acquire(BufReader::new(host), &mut session, stop, |_| {}).await
        });

        device.write_all(b"01.01.2000 00:00:00\n").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        handle.stop();

        let summary = task.await.unwrap().unwrap();
        assert_eq!(summary.lines, 1);
        drop(device);
    }

    #[tokio::test]
    async fn test_dropped_handle_stops() {
        let (_device, host) = tokio::io::duplex(64);
        let (handle, stop) = stop_signal();
        drop(handle);

        let mut session = LiveSession::new();
        let summary = acquire(BufReader::new(host), &mut session, stop, |_| {})
            .await
            .unwrap();
        assert_eq!(summary, AcquisitionSummary::default());
    }
}
