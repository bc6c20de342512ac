//! Distance-aligned comparison of two racing laps.
//!
//! lapdelta takes two telemetry traces of the same circuit and answers
//! where, and by how much, one lap gains or loses time against the other.
//!
//! # Pipeline
//!
//! - **Distance reconstruction**: laps without a distance channel get one by
//!   integrating speed over time
//! - **Alignment**: both laps are truncated to their shared distance range
//! - **Delta**: comparison time is interpolated onto the reference distance grid
//! - **Sectors**: the aligned range is split into equal-distance bins
//! - **Corners**: apexes are detected per lap, measured, and paired by position
//! - **Summary**: scalar summary plus sector and corner tables for presentation
//!
//! An optional coaching report is produced by an injected [`ReportGenerator`].
//!
//! # Quick Start
//!
//! ```rust
//! use lapdelta::{AnalysisConfig, Channel, LapComparison, SpeedUnit, TelemetryTable};
//!
//! let reference = TelemetryTable::from_columns([
//!     (Channel::Time, (0..200).map(|i| i as f64 * 0.05).collect()),
//!     (Channel::Speed, vec![30.0; 200]),
//! ])?
//! .with_speed_unit(SpeedUnit::MetersPerSecond);
//! let comparison = reference.with_channel(Channel::Speed, vec![29.0; 200])?;
//!
//! let mut config = AnalysisConfig::new(4);
//! config.corners.strategy = lapdelta::DetectionStrategy::LocalMinimum;
//!
//! let report = LapComparison::new(config)?.run(&reference, &comparison)?;
//! assert!(report.summary.average_delta < 0.0);
//! println!("{}", report.sector_table);
//! # Ok::<(), lapdelta::AnalysisError>(())
//! ```

// Core types and error handling
mod config;
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Pipeline stages
pub mod align;
pub mod corners;
pub mod delta;
pub mod distance;
pub mod sectors;
pub mod summary;

// Orchestration and collaborators
pub mod batch;
mod comparison;
pub mod report;

// Core exports
pub use config::AnalysisConfig;
pub use error::*;
pub use types::*;

// Stage exports
pub use align::{AlignedPair, align_laps};
pub use corners::{
    ApexLocator, Corner, CornerConfig, CornerDelta, CornerDetector, CornerRanking, DetectionStrategy,
    match_corners, rank_corners,
};
pub use delta::{ChannelOverlay, DeltaPoint, DeltaSeries, compute_delta, overlay_channel};
pub use distance::DistanceReconstructor;
pub use sectors::{SectorDelta, sector_deltas};
pub use summary::{CornerTable, DrivingStats, LapSummary, SectorTable};

// Orchestration exports
pub use batch::compare_all;
pub use comparison::{ComparisonReport, CornerStatus, LapComparison};
pub use report::{ReportGenerator, ReportRequest, generate_report};
