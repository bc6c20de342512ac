//! Positional corner matching

use serde::{Deserialize, Serialize};

use super::Corner;

/// The i-th reference corner paired with the i-th comparison corner.
///
/// Every delta is `reference - comparison`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct CornerDelta {
    /// 1-based position in the lap
    pub corner: usize,
    pub reference: Corner,
    pub comparison: Corner,
    pub entry_delta: f64,
    pub min_speed_delta: f64,
    pub exit_delta: f64,
    pub time_delta: f64,
    pub exit_average_delta: f64,
}

impl CornerDelta {
    fn new(corner: usize, reference: Corner, comparison: Corner) -> Self {
        Self {
            corner,
            reference,
            comparison,
            entry_delta: reference.entry_speed - comparison.entry_speed,
            min_speed_delta: reference.min_speed - comparison.min_speed,
            exit_delta: reference.exit_speed - comparison.exit_speed,
            time_delta: reference.corner_time - comparison.corner_time,
            exit_average_delta: reference.exit_average_speed - comparison.exit_average_speed,
        }
    }
}

/// Pair corners by their order in each lap.
///
/// Only the first `min(len_ref, len_cmp)` corners are paired; trailing
/// corners of the longer list are dropped. A corner missed mid-lap shifts
/// every later pairing.
pub fn match_corners(reference: &[Corner], comparison: &[Corner]) -> Vec<CornerDelta> {
    reference
        .iter()
        .zip(comparison)
        .enumerate()
        .map(|(i, (r, c))| CornerDelta::new(i + 1, *r, *c))
        .collect()
}

/// Presentation order for corner deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum CornerRanking {
    /// Lap order
    #[default]
    Sequence,
    /// Most time gained by the reference lap first (ascending time delta)
    TimeDelta,
    /// Largest reference exit-speed advantage first (descending average exit delta)
    ExitSpeedDelta,
}

/// Sort corner deltas in place. Ties keep lap order.
pub fn rank_corners(deltas: &mut [CornerDelta], ranking: CornerRanking) {
    match ranking {
        CornerRanking::Sequence => deltas.sort_by_key(|d| d.corner),
        CornerRanking::TimeDelta => deltas.sort_by(|a, b| {
            a.time_delta.total_cmp(&b.time_delta).then(a.corner.cmp(&b.corner))
        }),
        CornerRanking::ExitSpeedDelta => deltas.sort_by(|a, b| {
            b.exit_average_delta.total_cmp(&a.exit_average_delta).then(a.corner.cmp(&b.corner))
        }),
    }
}
