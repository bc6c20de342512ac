//! Trimming two laps to their shared distance range.

use tracing::debug;

use crate::types::Lap;
use crate::{AnalysisError, Result};

/// Two laps truncated to the same maximum distance.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    reference: Lap,
    comparison: Lap,
    ceiling: f64,
}

impl AlignedPair {
    pub fn reference(&self) -> &Lap {
        &self.reference
    }

    pub fn comparison(&self) -> &Lap {
        &self.comparison
    }

    /// Shared maximum distance in meters.
    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }
}

/// Align two laps to `[0, min(max_ref, max_cmp)]`.
///
/// Samples keep their native spacing. The lap that extends beyond the
/// ceiling is closed with one sample interpolated at exactly the ceiling, so
/// both laps end at the same distance.
pub fn align_laps(reference: &Lap, comparison: &Lap) -> Result<AlignedPair> {
    let overlap_error = |retained_reference, retained_comparison| AnalysisError::InsufficientOverlap {
        reference_max: reference.max_distance().unwrap_or(f64::NAN),
        comparison_max: comparison.max_distance().unwrap_or(f64::NAN),
        retained_reference,
        retained_comparison,
    };

    let (Some(reference_max), Some(comparison_max)) =
        (reference.max_distance(), comparison.max_distance())
    else {
        return Err(overlap_error(0, 0));
    };

    let ceiling = reference_max.min(comparison_max);
    let reference_aligned = truncate(reference, ceiling);
    let comparison_aligned = truncate(comparison, ceiling);

    if reference_aligned.len() < 2 || comparison_aligned.len() < 2 {
        return Err(overlap_error(reference_aligned.len(), comparison_aligned.len()));
    }

    debug!(
        "Aligned laps at {:.1} m ({} reference / {} comparison samples)",
        ceiling,
        reference_aligned.len(),
        comparison_aligned.len()
    );

    Ok(AlignedPair { reference: reference_aligned, comparison: comparison_aligned, ceiling })
}

/// Keep samples within `[0, ceiling]`, closing the lap at the ceiling.
fn truncate(lap: &Lap, ceiling: f64) -> Lap {
    let samples = lap.samples();
    let start = samples.partition_point(|s| s.distance < 0.0);
    let end = samples.partition_point(|s| s.distance <= ceiling);

    let mut kept = samples[start..end.max(start)].to_vec();
    if let (Some(last), Some(next)) = (kept.last(), samples.get(end)) {
        if last.distance < ceiling {
            let t = (ceiling - last.distance) / (next.distance - last.distance);
            let mut boundary = last.lerp(next, t);
            boundary.distance = ceiling;
            kept.push(boundary);
        }
    }

    Lap::from_samples(kept)
}
