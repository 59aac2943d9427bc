//! Trial band combiner - envelope between two trials' regression lines

use ppmeter_core::{Domain, DriftError, DriftResult};

use crate::DriftEstimate;

/// Default axis padding (fraction of the y range, each side)
pub const DEFAULT_PADDING: f64 = 0.05;

/// Check an axis padding fraction is usable
pub fn validate_padding(padding: f64) -> DriftResult<f64> {
    if padding.is_finite() && padding >= 0.0 {
        Ok(padding)
    } else {
        Err(DriftError::InvalidPadding(padding))
    }
}

/// Suggested vertical render range
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisBounds {
    pub low: f64,
    pub high: f64,
}

impl AxisBounds {
    /// Pad `[y_min, y_max]` by `padding × (y_max - y_min)` on both sides
    pub fn around(y_min: f64, y_max: f64, padding: f64) -> Self {
        let pad = (y_max - y_min) * padding;
        AxisBounds {
            low: y_min - pad,
            high: y_max + pad,
        }
    }

    /// Padded bounds over arbitrary values; `None` when empty
    pub fn padded(values: &[f64], padding: f64) -> Option<Self> {
        let (min, max) = values.iter().fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
        Some(Self::around(min, max, padding))
    }

    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Envelope of the two lines at one domain endpoint
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extent {
    pub t: f64,
    pub low: f64,
    pub high: f64,
}

impl Extent {
    fn between(t: f64, a: f64, b: f64) -> Self {
        Extent {
            t,
            low: a.min(b),
            high: a.max(b),
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// Drift uncertainty band between two trials
///
/// The two boundary rates are the result; no averaged rate is produced.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Band {
    pub domain: Domain,
    /// Rate of the first estimate passed in
    pub first_ppm: f64,
    /// Rate of the second estimate passed in
    pub second_ppm: f64,
    /// Envelope at `domain.start()`
    pub start: Extent,
    /// Envelope at `domain.end()`
    pub end: Extent,
    /// Suggested y-axis range over all four endpoint evaluations
    pub axis: AxisBounds,
}

impl Band {
    /// Boundary rates as (low, high), independent of argument order
    pub fn ppm_range(&self) -> (f64, f64) {
        (
            self.first_ppm.min(self.second_ppm),
            self.first_ppm.max(self.second_ppm),
        )
    }

    /// True when the band has no width at either endpoint
    pub fn is_degenerate(&self) -> bool {
        self.start.width() == 0.0 && self.end.width() == 0.0
    }

    /// Whether a drift rate falls inside the boundary rates
    pub fn contains_ppm(&self, ppm: f64) -> bool {
        let (low, high) = self.ppm_range();
        ppm >= low && ppm <= high
    }
}

/// Combine two estimates over `domain` with the default 5% axis padding
pub fn combine(a: &DriftEstimate, b: &DriftEstimate, domain: Domain) -> Band {
    envelope(a, b, domain, DEFAULT_PADDING)
}

/// Combine two estimates over `domain` with a custom axis padding
///
/// Fails with `InvalidPadding` for a negative or non-finite padding.
pub fn combine_with_padding(
    a: &DriftEstimate,
    b: &DriftEstimate,
    domain: Domain,
    padding: f64,
) -> DriftResult<Band> {
    let padding = validate_padding(padding)?;
    Ok(envelope(a, b, domain, padding))
}

/// Both lines are evaluated at the domain endpoints, extrapolating past
/// either trial's samples where needed.
fn envelope(a: &DriftEstimate, b: &DriftEstimate, domain: Domain, padding: f64) -> Band {
    let [a0, a1] = a.evaluate_domain(&domain);
    let [b0, b1] = b.evaluate_domain(&domain);

    let start = Extent::between(domain.start(), a0, b0);
    let end = Extent::between(domain.end(), a1, b1);
    let axis = AxisBounds::around(
        start.low.min(end.low),
        start.high.max(end.high),
        padding,
    );

    Band {
        domain,
        first_ppm: a.ppm(),
        second_ppm: b.ppm(),
        start,
        end,
        axis,
    }
}
