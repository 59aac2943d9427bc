//! Live mode: device feed in, table rows and a running estimate out.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{info, warn};

use ppmeter_core::Sample;
use ppmeter_source::{acquire, stop_signal, AcquisitionSummary, LiveSession, SampleWriter};
use ppmeter_time::{EngineConfig, Trial};

use crate::output::{live_row, LIVE_HEADER};

/// Feeds samples into a trial, printing each row and optionally recording
pub struct LiveRun<W: Write, R: Write> {
    trial: Trial,
    out: W,
    recorder: Option<SampleWriter<R>>,
}

impl<W: Write, R: Write> LiveRun<W, R> {
    pub fn new(config: &EngineConfig, out: W, recorder: Option<SampleWriter<R>>) -> Result<Self> {
        Ok(LiveRun {
            trial: config.trial()?,
            out,
            recorder,
        })
    }

    pub fn header(&mut self) -> Result<()> {
        writeln!(self.out, "{LIVE_HEADER}")?;
        Ok(())
    }

    /// Handle one sample from the feed
    pub fn on_sample(&mut self, sample: Sample) {
        let Some(observation) = self.trial.observe_sample(sample) else {
            return;
        };
        let ppm = self.trial.fit().ok().map(|estimate| estimate.ppm());

        if let Err(err) = writeln!(self.out, "{}", live_row(&observation, ppm)) {
            warn!(%err, "failed to write table row");
        }

        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(err) = recorder.write(&sample) {
                warn!(%err, "recording stopped");
                self.recorder = None;
            }
        }
    }

    pub fn trial(&self) -> &Trial {
        &self.trial
    }

    pub fn into_trial(self) -> Trial {
        self.trial
    }
}

/// Open a device path, or stdin for `-`
pub async fn open_feed(device: &Path) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    if device == Path::new("-") {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let file = tokio::fs::File::open(device)
        .await
        .with_context(|| format!("Failed to open device: {}", device.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Run acquisition until end of feed or Ctrl-C
pub async fn run<W: Write>(
    device: PathBuf,
    record: Option<PathBuf>,
    delimiter: u8,
    config: &EngineConfig,
    table: W,
) -> Result<(Trial, AcquisitionSummary)> {
    let recorder = match &record {
        Some(path) => Some(
            SampleWriter::create(path, delimiter)
                .with_context(|| format!("Failed to create recording: {}", path.display()))?,
        ),
        None => None,
    };

    let reader = open_feed(&device).await?;
    info!("Reading {}", device.display());
    if let Some(path) = &record {
        info!("Recording to {}", path.display());
    }

    let (handle, stop) = stop_signal();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, finishing");
            handle.stop();
        }
    });

    let mut live = LiveRun::new(config, table, recorder)?;
    live.header()?;

    let mut session = LiveSession::new();
    let result = acquire(reader, &mut session, stop, |sample| live.on_sample(sample)).await;
    ctrl_c.abort();

    let summary = result.context("Live feed failed")?;
    Ok((live.into_trial(), summary))
}
