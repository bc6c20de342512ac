//! Running time delta on the reference lap's distance grid.
//!
//! The comparison lap's values are linearly interpolated at each reference
//! distance, clamped to the comparison lap's first and last samples. A
//! positive delta means the reference lap is behind at that distance.

use serde::Serialize;

use crate::align::AlignedPair;
use crate::types::{Channel, Lap};
use crate::{AnalysisError, Result};

/// Linear interpolation of `(xp, fp)` at `x`, clamped at both ends.
///
/// `xp` must be strictly increasing. Returns `NaN` when `xp` is empty. A
/// query equal to a knot returns that knot's value exactly.
pub fn interpolate(xp: &[f64], fp: &[f64], x: f64) -> f64 {
    debug_assert_eq!(xp.len(), fp.len());
    let (Some(&first), Some(&last)) = (xp.first(), xp.last()) else {
        return f64::NAN;
    };
    if x <= first {
        return fp[0];
    }
    if x >= last {
        return fp[fp.len() - 1];
    }

    let upper = xp.partition_point(|&knot| knot <= x);
    let lower = upper - 1;
    if xp[lower] == x {
        return fp[lower];
    }
    let t = (x - xp[lower]) / (xp[upper] - xp[lower]);
    fp[lower] + (fp[upper] - fp[lower]) * t
}

/// [`interpolate`] at every query point.
pub fn interpolate_all(xp: &[f64], fp: &[f64], queries: &[f64]) -> Vec<f64> {
    queries.iter().map(|&x| interpolate(xp, fp, x)).collect()
}

/// One reference sample annotated with the comparison time at its distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DeltaPoint {
    pub distance: f64,
    pub reference_time: f64,
    pub comparison_time: f64,
    /// `reference_time - comparison_time`
    pub delta_time: f64,
}

/// Distance-indexed time delta, one point per reference sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DeltaSeries {
    points: Vec<DeltaPoint>,
}

impl DeltaSeries {
    pub fn points(&self) -> &[DeltaPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(distance, delta_time)` pairs for plotting.
    pub fn as_pairs(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.distance, p.delta_time)).collect()
    }

    /// Mean delta over all points.
    pub fn mean_delta(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points.iter().map(|p| p.delta_time).sum::<f64>() / self.points.len() as f64)
    }

    /// Point with the largest delta (where the reference lap was furthest behind).
    ///
    /// The first point wins ties.
    pub fn max_loss(&self) -> Option<&DeltaPoint> {
        self.points.iter().reduce(|best, p| if p.delta_time > best.delta_time { p } else { best })
    }
}

/// Compute the running time delta of an aligned pair.
pub fn compute_delta(pair: &AlignedPair) -> DeltaSeries {
    let comparison = pair.comparison();
    let xp = comparison.distances();
    let fp = comparison.times();

    let points = pair
        .reference()
        .samples()
        .iter()
        .map(|sample| {
            let comparison_time = interpolate(&xp, &fp, sample.distance);
            DeltaPoint {
                distance: sample.distance,
                reference_time: sample.time,
                comparison_time,
                delta_time: sample.time - comparison_time,
            }
        })
        .collect();

    DeltaSeries { points }
}

/// A channel of both laps on the reference distance grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ChannelOverlay {
    pub channel: Channel,
    pub distance: Vec<f64>,
    pub reference: Vec<f64>,
    pub comparison: Vec<f64>,
}

/// Interpolate any channel of the comparison lap onto the reference grid.
pub fn overlay_channel(pair: &AlignedPair, channel: Channel) -> Result<ChannelOverlay> {
    let column = |lap: &Lap, which: &str| {
        lap.column(channel).filter(|_| !lap.is_empty()).ok_or_else(|| {
            AnalysisError::missing_channel(channel, format!("{which} lap overlay"))
        })
    };
    let reference = column(pair.reference(), "reference")?;
    let comparison_values = column(pair.comparison(), "comparison")?;

    let distance = pair.reference().distances();
    let comparison = interpolate_all(&pair.comparison().distances(), &comparison_values, &distance);

    Ok(ChannelOverlay { channel, distance, reference, comparison })
}
