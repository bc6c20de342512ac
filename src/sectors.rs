//! Equal-distance sector segmentation.
//!
//! The aligned distance range is split into equal bins. Each lap's elapsed
//! time in a bin runs from the first to the last sample inside `[start, end)`.
//! A bin with no samples on either lap is left out, so a result may hold
//! fewer rows than requested sectors.

use serde::Serialize;
use tracing::debug;

use crate::align::AlignedPair;
use crate::types::Lap;
use crate::{AnalysisError, Result};

/// Time comparison over one equal-distance sector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct SectorDelta {
    /// 1-based sector number
    pub sector: usize,
    pub start_distance: f64,
    pub end_distance: f64,
    pub reference_time: f64,
    pub comparison_time: f64,
    /// `reference_time - comparison_time`
    pub delta: f64,
}

impl SectorDelta {
    /// Display label (`S1`, `S2`, ...).
    pub fn label(&self) -> String {
        format!("S{}", self.sector)
    }
}

/// Split the aligned range into `sectors` bins and compare elapsed times.
pub fn sector_deltas(pair: &AlignedPair, sectors: usize) -> Result<Vec<SectorDelta>> {
    if sectors == 0 {
        return Err(AnalysisError::invalid_config("sectors", "must be at least 1"));
    }

    let total = pair.ceiling();
    let width = total / sectors as f64;

    let rows = (0..sectors)
        .filter_map(|i| {
            let start = i as f64 * width;
            let end = (i + 1) as f64 * width;
            let reference_time = elapsed_within(pair.reference(), start, end);
            let comparison_time = elapsed_within(pair.comparison(), start, end);

            match (reference_time, comparison_time) {
                (Some(reference_time), Some(comparison_time)) => Some(SectorDelta {
                    sector: i + 1,
                    start_distance: start,
                    end_distance: end,
                    reference_time,
                    comparison_time,
                    delta: reference_time - comparison_time,
                }),
                _ => {
                    debug!("Sector S{} [{:.1}, {:.1}) has no samples on one lap; omitted", i + 1, start, end);
                    None
                }
            }
        })
        .collect();

    Ok(rows)
}

/// Time from the first to the last sample with distance in `[start, end)`.
fn elapsed_within(lap: &Lap, start: f64, end: f64) -> Option<f64> {
    let samples = lap.samples();
    let first = samples.partition_point(|s| s.distance < start);
    let past_last = samples.partition_point(|s| s.distance < end);
    (first < past_last).then(|| samples[past_last - 1].time - samples[first].time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align_laps;
    use crate::test_utils::constant_speed_lap;
    use crate::types::Sample;
    use proptest::prelude::*;

    #[test]
    fn equal_laps_have_zero_sector_deltas() {
        let lap = constant_speed_lap(301, 10.0, 0.1);
        let pair = align_laps(&lap, &lap).unwrap();

        let rows = sector_deltas(&pair, 3).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.iter().map(SectorDelta::label).collect::<Vec<_>>(), ["S1", "S2", "S3"]);
        for row in &rows {
            assert_eq!(row.delta, 0.0);
            assert!(row.reference_time > 0.0);
        }
    }

    #[test]
    fn empty_bins_are_omitted() {
        let sparse = Lap::from_samples([
            Sample::new(0.0, 0.0, 10.0),
            Sample::new(1.0, 0.1, 10.0),
            Sample::new(90.0, 9.0, 10.0),
            Sample::new(100.0, 10.0, 10.0),
        ]);
        let dense = constant_speed_lap(101, 10.0, 0.1);
        let pair = align_laps(&sparse, &dense).unwrap();

        let rows = sector_deltas(&pair, 4).unwrap();
        let sectors: Vec<_> = rows.iter().map(|r| r.sector).collect();
        assert_eq!(sectors, vec![1, 4]);
    }

    #[test]
    fn zero_sectors_is_rejected() {
        let lap = constant_speed_lap(11, 10.0, 0.1);
        let pair = align_laps(&lap, &lap).unwrap();
        assert!(matches!(
            sector_deltas(&pair, 0),
            Err(AnalysisError::InvalidConfig { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_sector_coverage_stays_within_total(
            len in 3usize..500,
            sectors in 1usize..12,
            speed in 5.0f64..90.0,
        ) {
            let reference = constant_speed_lap(len, speed, 0.05);
            let comparison = constant_speed_lap(len + 7, speed * 0.97, 0.05);
            let pair = align_laps(&reference, &comparison).unwrap();

            let rows = sector_deltas(&pair, sectors).unwrap();
            prop_assert!(rows.len() <= sectors);

            let covered: f64 = rows.iter().map(|r| r.end_distance - r.start_distance).sum();
            prop_assert!(covered <= pair.ceiling() + 1e-9);

            for row in &rows {
                prop_assert!(row.end_distance > row.start_distance);
            }
            for adjacent in rows.windows(2) {
                prop_assert!(adjacent[1].sector > adjacent[0].sector);
                prop_assert!(adjacent[1].start_distance >= adjacent[0].end_distance - 1e-9);
            }
        }
    }
}
