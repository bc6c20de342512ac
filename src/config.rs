//! Analysis configuration.
//!
//! Every setting except `sectors` has a default. Configurations are usually
//! built in code with [`AnalysisConfig::new`] or loaded from YAML:
//!
//! ```rust
//! use lapdelta::{AnalysisConfig, CornerRanking, DetectionStrategy, SpeedUnit};
//!
//! let config = AnalysisConfig::from_yaml_str(
//!     r#"
//! sectors: 3
//! speed_unit: kilometers_per_hour
//! corners:
//!   strategy:
//!     kind: prominence
//!     min_prominence: 2.0
//! ranking: time_delta
//! "#,
//! )?;
//!
//! assert_eq!(config.sectors, 3);
//! assert_eq!(config.speed_unit, SpeedUnit::KilometersPerHour);
//! assert_eq!(config.ranking, CornerRanking::TimeDelta);
//! assert_eq!(
//!     config.corners.strategy,
//!     DetectionStrategy::Prominence { min_prominence: 2.0, min_separation_s: 0.5 }
//! );
//! # Ok::<(), lapdelta::AnalysisError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::corners::{CornerConfig, CornerRanking};
use crate::types::SpeedUnit;
use crate::{AnalysisError, Result};

/// Settings for one comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct AnalysisConfig {
    /// Number of equal-distance sectors
    pub sectors: usize,
    /// Unit of the speed channel when a table does not declare one
    #[serde(default)]
    pub speed_unit: SpeedUnit,
    #[serde(default)]
    pub corners: CornerConfig,
    /// Order of rows in the corner table
    #[serde(default)]
    pub ranking: CornerRanking,
}

impl AnalysisConfig {
    pub fn new(sectors: usize) -> Self {
        Self {
            sectors,
            speed_unit: SpeedUnit::default(),
            corners: CornerConfig::default(),
            ranking: CornerRanking::default(),
        }
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sectors == 0 {
            return Err(AnalysisError::invalid_config("sectors", "must be at least 1"));
        }
        self.corners.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corners::DetectionStrategy;

    #[test]
    fn minimal_yaml_uses_defaults() {
        let config = AnalysisConfig::from_yaml_str("sectors: 5").unwrap();
        assert_eq!(config, AnalysisConfig::new(5));
        assert_eq!(config.corners.min_speed_drop, 8.0);
        assert_eq!(config.corners.window_m, 25.0);
        assert_eq!(config.corners.exit_window, 20);
        assert_eq!(config.corners.strategy, DetectionStrategy::BrakeHysteresis { brake_threshold: 0.1 });
        assert_eq!(config.speed_unit, SpeedUnit::Auto);
    }

    #[test]
    fn sectors_are_required() {
        let err = AnalysisConfig::from_yaml_str("speed_unit: auto").unwrap_err();
        assert!(matches!(err, AnalysisError::Config { .. }));
    }

    #[test]
    fn zero_sectors_fail_validation() {
        let err = AnalysisConfig::from_yaml_str("sectors: 0").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig { ref field, .. } if field == "sectors"));
    }

    #[test]
    fn nested_corner_settings_are_validated() {
        let yaml = "sectors: 3\ncorners:\n  window_m: 0.0\n";
        let err = AnalysisConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig { ref field, .. } if field == "corners.window_m"));
    }

    #[test]
    fn full_document() {
        let yaml = r#"
sectors: 4
speed_unit: miles_per_hour
corners:
  strategy:
    kind: brake_hysteresis
    brake_threshold: 0.2
  min_speed_drop: 5.0
  window_m: 30.0
  exit_window: 10
ranking: exit_speed_delta
"#;
        let config = AnalysisConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.speed_unit, SpeedUnit::MilesPerHour);
        assert_eq!(config.corners.strategy, DetectionStrategy::BrakeHysteresis { brake_threshold: 0.2 });
        assert_eq!(config.corners.min_speed_drop, 5.0);
        assert_eq!(config.corners.exit_window, 10);
        assert_eq!(config.ranking, CornerRanking::ExitSpeedDelta);
    }

    #[test]
    fn yaml_round_trip_preserves_settings() {
        let mut config = AnalysisConfig::new(7);
        config.corners.strategy = DetectionStrategy::LocalMinimum;
        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        assert_eq!(AnalysisConfig::from_yaml_str(&yaml).unwrap(), config);
    }
}
