//! End-to-end comparison of two laps.
//!
//! [`LapComparison`] runs every stage in order: distance reconstruction,
//! alignment, delta computation, sector segmentation, corner detection on
//! both laps, corner matching and ranking, then the summary tables. Each
//! run is independent and holds no state between calls.

use serde::Serialize;
use tracing::info;

use crate::align::{AlignedPair, align_laps};
use crate::config::AnalysisConfig;
use crate::corners::{ApexLocator, Corner, CornerDelta, CornerDetector, match_corners, rank_corners};
use crate::delta::{ChannelOverlay, DeltaSeries, compute_delta, overlay_channel};
use crate::distance::DistanceReconstructor;
use crate::report::ReportRequest;
use crate::sectors::{SectorDelta, sector_deltas};
use crate::summary::{CornerTable, DrivingStats, LapSummary, SectorTable};
use crate::types::{Channel, TelemetryTable};
use crate::Result;

/// Whether the corner table has rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum CornerStatus {
    Detected { pairs: usize },
    /// No corner could be paired. Informational, not a failure.
    NoCornersDetected,
}

/// Everything produced by one comparison.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ComparisonReport {
    #[serde(skip)]
    #[cfg_attr(feature = "tauri", specta(skip))]
    pub aligned: AlignedPair,
    pub delta: DeltaSeries,
    pub sectors: Vec<SectorDelta>,
    pub reference_corners: Vec<Corner>,
    pub comparison_corners: Vec<Corner>,
    /// Matched corners in ranking order
    pub corner_deltas: Vec<CornerDelta>,
    pub corner_status: CornerStatus,
    pub sector_table: SectorTable,
    pub corner_table: CornerTable,
    pub summary: LapSummary,
    pub reference_stats: Option<DrivingStats>,
    pub comparison_stats: Option<DrivingStats>,
}

impl ComparisonReport {
    /// Input for a [`ReportGenerator`](crate::ReportGenerator).
    pub fn report_request(&self) -> ReportRequest {
        ReportRequest::new(self.summary, &self.sector_table, &self.corner_table)
    }

    /// Comparison-lap channel resampled onto the reference distance grid.
    pub fn overlay(&self, channel: Channel) -> Result<ChannelOverlay> {
        overlay_channel(&self.aligned, channel)
    }
}

/// A validated comparison pipeline.
#[derive(Debug)]
pub struct LapComparison {
    config: AnalysisConfig,
    reconstructor: DistanceReconstructor,
    detector: CornerDetector,
}

impl LapComparison {
    /// Validate `config` and build the pipeline it describes.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let detector = CornerDetector::new(&config.corners)?;
        Ok(Self::assemble(config, detector))
    }

    /// Pipeline with a custom apex locator in place of the configured strategy.
    pub fn with_locator(config: AnalysisConfig, locator: Box<dyn ApexLocator>) -> Result<Self> {
        config.validate()?;
        let detector = CornerDetector::with_locator(locator, &config.corners)?;
        Ok(Self::assemble(config, detector))
    }

    fn assemble(config: AnalysisConfig, detector: CornerDetector) -> Self {
        Self { reconstructor: DistanceReconstructor::new(config.speed_unit), config, detector }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Compare `comparison` against `reference`.
    pub fn run(&self, reference: &TelemetryTable, comparison: &TelemetryTable) -> Result<ComparisonReport> {
        let reference_lap = self.reconstructor.build_lap(reference)?;
        let comparison_lap = self.reconstructor.build_lap(comparison)?;
        let aligned = align_laps(&reference_lap, &comparison_lap)?;

        let delta = compute_delta(&aligned);
        let sectors = sector_deltas(&aligned, self.config.sectors)?;

        let reference_corners = self.detector.detect(aligned.reference())?;
        let comparison_corners = self.detector.detect(aligned.comparison())?;
        let mut corner_deltas = match_corners(&reference_corners, &comparison_corners);
        rank_corners(&mut corner_deltas, self.config.ranking);

        let corner_status = match corner_deltas.len() {
            0 => CornerStatus::NoCornersDetected,
            pairs => CornerStatus::Detected { pairs },
        };

        let summary = LapSummary::new(&aligned, &delta, reference_corners.len());
        info!(
            "Compared laps over {:.1} m: average delta {:.4} s, {} sectors, {} corner pairs",
            summary.total_distance,
            summary.average_delta,
            sectors.len(),
            corner_deltas.len()
        );

        Ok(ComparisonReport {
            sector_table: SectorTable::from_deltas(&sectors),
            corner_table: CornerTable::from_deltas(&corner_deltas),
            reference_stats: DrivingStats::from_lap(aligned.reference()),
            comparison_stats: DrivingStats::from_lap(aligned.comparison()),
            aligned,
            delta,
            sectors,
            reference_corners,
            comparison_corners,
            corner_deltas,
            corner_status,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corners::{CornerRanking, DetectionStrategy};
    use crate::test_utils::{constant_speed_lap, multi_corner_lap, table_from_lap};
    use crate::{AnalysisError, Lap};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt::try_init();
    }

    #[test]
    fn identical_laps_have_no_delta() {
        init_tracing();
        let table = table_from_lap(&multi_corner_lap(600, &[150, 300, 450], 20.0, 0.05));
        let comparison = LapComparison::new(AnalysisConfig::new(3)).unwrap();

        let report = comparison.run(&table, &table).unwrap();
        assert_eq!(report.summary.average_delta, 0.0);
        assert_eq!(report.summary.max_time_loss, 0.0);
        assert_eq!(report.sectors.len(), 3);
        assert_eq!(report.corner_status, CornerStatus::Detected { pairs: 3 });
        assert!(report.corner_deltas.iter().all(|d| d.time_delta == 0.0));
        assert_eq!(report.reference_stats, report.comparison_stats);
    }

    #[test]
    fn lap_without_corners_is_informational() {
        let table = table_from_lap(&Lap::from_samples(
            constant_speed_lap(200, 30.0, 0.05).samples().iter().map(|s| crate::Sample {
                brake: Some(0.0),
                ..*s
            }),
        ));
        let comparison = LapComparison::new(AnalysisConfig::new(2)).unwrap();

        let report = comparison.run(&table, &table).unwrap();
        assert_eq!(report.corner_status, CornerStatus::NoCornersDetected);
        assert!(report.corner_table.rows.is_empty());
        assert_eq!(report.report_request().corner_table, crate::summary::NO_CORNERS_DETECTED);
    }

    #[test]
    fn brake_strategy_needs_brake_channel() {
        let table = table_from_lap(&constant_speed_lap(100, 30.0, 0.05));
        let comparison = LapComparison::new(AnalysisConfig::new(2)).unwrap();
        let err = comparison.run(&table, &table).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingChannel { channel: Channel::Brake, .. }));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let err = LapComparison::new(AnalysisConfig::new(0)).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig { .. }));
    }

    #[test]
    fn ranking_is_applied() {
        let reference = table_from_lap(&multi_corner_lap(600, &[150, 300, 450], 20.0, 0.05));
        let comparison = table_from_lap(&multi_corner_lap(600, &[150, 300, 450], 24.0, 0.05));
        let mut config = AnalysisConfig::new(3);
        config.ranking = CornerRanking::TimeDelta;
        config.corners.strategy = DetectionStrategy::LocalMinimum;

        let report = LapComparison::new(config).unwrap().run(&reference, &comparison).unwrap();
        let deltas: Vec<f64> = report.corner_deltas.iter().map(|d| d.time_delta).collect();
        assert!(deltas.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(report.corner_table.rows.len(), 3);
    }

    #[test]
    fn overlay_uses_the_aligned_pair() {
        let table = table_from_lap(&multi_corner_lap(300, &[150], 20.0, 0.05));
        let report = LapComparison::new(AnalysisConfig::new(1)).unwrap().run(&table, &table).unwrap();

        let overlay = report.overlay(Channel::Speed).unwrap();
        assert_eq!(overlay.reference, overlay.comparison);
        assert!(report.overlay(Channel::Steering).is_err());
    }
}
