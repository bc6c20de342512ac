//! Corner detection and corner-by-corner comparison.
//!
//! Detection runs in two phases:
//! - an [`ApexLocator`] picks apex candidates (brake hysteresis, local
//!   minimum or prominence, chosen by [`DetectionStrategy`])
//! - [`CornerDetector`] measures a distance window of `±window_m` around each
//!   apex and rejects candidates whose entry speed is less than
//!   `min_speed_drop` above the window minimum
//!
//! A lap with no corners yields an empty list. That is an informational
//! state, never an error.
//!
//! ```rust
//! use lapdelta::{CornerConfig, CornerDetector, DetectionStrategy, Lap, Sample};
//!
//! let speeds = [50.0, 48.0, 40.0, 30.0, 38.0, 46.0, 50.0];
//! let lap = Lap::from_samples(
//!     speeds.iter().enumerate().map(|(i, v)| Sample::new(i as f64 * 5.0, i as f64 * 0.1, *v)),
//! );
//!
//! let config = CornerConfig { strategy: DetectionStrategy::LocalMinimum, ..CornerConfig::default() };
//! let corners = CornerDetector::new(&config)?.detect(&lap)?;
//! assert_eq!(corners.len(), 1);
//! assert_eq!(corners[0].min_speed, 30.0);
//! # Ok::<(), lapdelta::AnalysisError>(())
//! ```

mod matcher;
mod strategy;

pub use matcher::{CornerDelta, CornerRanking, match_corners, rank_corners};
pub use strategy::{ApexLocator, BrakeHysteresis, DetectionStrategy, LocalMinimum, Prominence};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::Lap;
use crate::{AnalysisError, Result};

/// Corner detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct CornerConfig {
    pub strategy: DetectionStrategy,
    /// Minimum entry-to-minimum speed loss (m/s) for a real corner
    pub min_speed_drop: f64,
    /// Half-width of the measurement window around the apex, in meters
    pub window_m: f64,
    /// Samples after the apex averaged into the exit speed
    pub exit_window: usize,
}

impl Default for CornerConfig {
    fn default() -> Self {
        Self { strategy: DetectionStrategy::default(), min_speed_drop: 8.0, window_m: 25.0, exit_window: 20 }
    }
}

impl CornerConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        self.strategy.validate()?;
        if !(self.min_speed_drop >= 0.0) {
            return Err(AnalysisError::invalid_config("corners.min_speed_drop", "must be non-negative"));
        }
        if !(self.window_m > 0.0) || !self.window_m.is_finite() {
            return Err(AnalysisError::invalid_config("corners.window_m", "must be a positive distance"));
        }
        if self.exit_window == 0 {
            return Err(AnalysisError::invalid_config("corners.exit_window", "must be at least 1 sample"));
        }
        Ok(())
    }
}

/// A corner measured on one lap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Corner {
    /// Sample index of the apex
    pub apex_index: usize,
    pub apex_distance: f64,
    /// Speed at the start of the window
    pub entry_speed: f64,
    /// Lowest speed within the window
    pub min_speed: f64,
    /// Speed at the end of the window
    pub exit_speed: f64,
    /// Seconds spent crossing the window
    pub corner_time: f64,
    /// Mean speed over the samples right after the apex
    pub exit_average_speed: f64,
}

/// Scans a lap for corners.
pub struct CornerDetector {
    locator: Box<dyn ApexLocator>,
    min_speed_drop: f64,
    window_m: f64,
    exit_window: usize,
}

impl std::fmt::Debug for CornerDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CornerDetector")
            .field("locator", &self.locator.name())
            .field("min_speed_drop", &self.min_speed_drop)
            .field("window_m", &self.window_m)
            .field("exit_window", &self.exit_window)
            .finish()
    }
}

impl CornerDetector {
    /// Detector using the configured strategy.
    pub fn new(config: &CornerConfig) -> Result<Self> {
        config.validate()?;
        Self::with_locator(config.strategy.locator(), config)
    }

    /// Detector using a custom apex locator.
    ///
    /// The configured strategy is not used, but the rest of `config` must be valid.
    pub fn with_locator(locator: Box<dyn ApexLocator>, config: &CornerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            locator,
            min_speed_drop: config.min_speed_drop,
            window_m: config.window_m,
            exit_window: config.exit_window,
        })
    }

    /// Corners in order of increasing apex distance.
    pub fn detect(&self, lap: &Lap) -> Result<Vec<Corner>> {
        if lap.len() < 3 {
            debug!("Lap has {} samples; too short for corner detection", lap.len());
            return Ok(Vec::new());
        }

        let apexes = self.locator.locate(lap)?;
        let candidates = apexes.len();
        let corners: Vec<Corner> = apexes
            .into_iter()
            .map(|apex| self.measure(lap, apex))
            .filter(|corner| {
                let drop = corner.entry_speed - corner.min_speed;
                let keep = drop >= self.min_speed_drop;
                if !keep {
                    debug!(
                        "Rejected apex at {:.1} m: speed drop {:.2} below {:.2}",
                        corner.apex_distance, drop, self.min_speed_drop
                    );
                }
                keep
            })
            .collect();

        debug!(
            "{} found {} corners from {} candidates",
            self.locator.name(),
            corners.len(),
            candidates
        );
        Ok(corners)
    }

    fn measure(&self, lap: &Lap, apex: usize) -> Corner {
        let samples = lap.samples();
        let apex_distance = samples[apex].distance;

        let first = samples.partition_point(|s| s.distance < apex_distance - self.window_m);
        let last = samples.partition_point(|s| s.distance <= apex_distance + self.window_m) - 1;
        let window = &samples[first..=last];

        let min_speed = window.iter().map(|s| s.speed).fold(f64::INFINITY, f64::min);
        let after_apex = &samples[(apex + 1).min(samples.len())..(apex + 1 + self.exit_window).min(samples.len())];
        let exit_average_speed = if after_apex.is_empty() {
            samples[apex].speed
        } else {
            after_apex.iter().map(|s| s.speed).sum::<f64>() / after_apex.len() as f64
        };

        Corner {
            apex_index: apex,
            apex_distance,
            entry_speed: samples[first].speed,
            min_speed,
            exit_speed: samples[last].speed,
            corner_time: samples[last].time - samples[first].time,
            exit_average_speed,
        }
    }
}
