//! Text rendering of trials, bands and the live table.

use std::fmt::Write;

use ppmeter_time::{BandReport, DriftEstimate, Observation, TrialReport};

/// Header of the live table.
pub const LIVE_HEADER: &str = "Actual Time\tMeasured Time\tDelta\tEMA\tPPM";

/// One live table row; the PPM column stays `-` until two samples are in.
pub fn live_row(observation: &Observation, ppm: Option<f64>) -> String {
    let ppm = match ppm {
        Some(ppm) => format!("{ppm:+.3}"),
        None => "-".to_string(),
    };
    format!(
        "{:.3}\t{}\t{:.6}\t{:.6}\t{}",
        observation.sample.actual_time,
        observation.sample.measured_time,
        observation.deviation,
        observation.ema_deviation,
        ppm
    )
}

/// Drift in all three units.
pub fn drift_lines(estimate: &DriftEstimate) -> String {
    format!(
        "{:+.3} ppm\n{:+.3} ms/h\n{:+.3} s/d",
        estimate.ppm(),
        estimate.millis_per_hour(),
        estimate.seconds_per_day()
    )
}

/// Summary block for one batch trial.
pub fn trial_summary(report: &TrialReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.label);
    let _ = writeln!(out, "  samples:   {}", report.sample_count());
    match (&report.drift, &report.axis) {
        (Some(drift), axis) => {
            let _ = writeln!(out, "  drift:     {:+.3} ppm", drift.ppm);
            let _ = writeln!(out, "             {:+.3} ms/h", drift.millis_per_hour);
            let _ = writeln!(out, "             {:+.3} s/d", drift.seconds_per_day);
            let _ = writeln!(out, "  intercept: {:+.6} s", drift.intercept);
            if let Some(axis) = axis {
                let _ = writeln!(out, "  y axis:    [{:.6}, {:.6}] s", axis.low, axis.high);
            }
        }
        (None, _) => {
            let _ = writeln!(out, "  drift:     insufficient data");
        }
    }
    out
}

/// Summary block for a two-trial comparison.
pub fn band_summary(report: &BandReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.title());
    out.push_str(&trial_summary(&report.first));
    out.push_str(&trial_summary(&report.second));

    if let Some(band) = &report.band {
        let (low, high) = band.ppm_range();
        let _ = writeln!(out, "band");
        let _ = writeln!(out, "  rates:     {low:+.3} .. {high:+.3} ppm");
        for extent in [&band.start, &band.end] {
            let _ = writeln!(
                out,
                "  t = {:<6} [{:.6}, {:.6}] s",
                extent.t, extent.low, extent.high
            );
        }
        let _ = writeln!(out, "  y axis:    [{:.6}, {:.6}] s", band.axis.low, band.axis.high);
    }
    out
}
