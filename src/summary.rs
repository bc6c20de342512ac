//! Summary tables handed to presentation and report collaborators.
//!
//! Table rows are rounded for display (speeds to 2 decimals, times to 3)
//! and serialize with the column names shown to users. `Display` renders
//! a plain-text table with right-aligned columns, the form the report
//! collaborator receives.

use serde::Serialize;
use std::fmt;

use crate::align::AlignedPair;
use crate::corners::CornerDelta;
use crate::delta::DeltaSeries;
use crate::sectors::SectorDelta;
use crate::types::{Channel, Lap};

/// Text rendered in place of an empty corner table.
pub const NO_CORNERS_DETECTED: &str = "No corners detected";

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Scalar overview of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct LapSummary {
    /// Mean of the running delta, seconds
    pub average_delta: f64,
    /// Largest running delta, seconds
    pub max_time_loss: f64,
    /// Distance at which the largest delta occurs, meters
    pub max_loss_distance: f64,
    /// Aligned lap distance, meters
    pub total_distance: f64,
    /// Corners found on the reference lap
    pub corners_detected: usize,
}

impl LapSummary {
    pub fn new(pair: &AlignedPair, delta: &DeltaSeries, corners_detected: usize) -> Self {
        let (max_loss_distance, max_time_loss) =
            delta.max_loss().map_or((0.0, 0.0), |p| (p.distance, p.delta_time));
        Self {
            average_delta: round_to(delta.mean_delta().unwrap_or_default(), 4),
            max_time_loss: round_to(max_time_loss, 4),
            max_loss_distance: round_to(max_loss_distance, 1),
            total_distance: round_to(pair.reference().max_distance().unwrap_or_default(), 1),
            corners_detected,
        }
    }
}

impl fmt::Display for LapSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average Delta (s): {:.4}", self.average_delta)?;
        writeln!(f, "Maximum Time Loss (s): {:.4} at {:.1} m", self.max_time_loss, self.max_loss_distance)?;
        writeln!(f, "Total Distance (m): {:.1}", self.total_distance)?;
        write!(f, "Corners Detected: {}", self.corners_detected)
    }
}

/// Basic driving statistics for one lap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DrivingStats {
    pub average_speed: f64,
    pub max_speed: f64,
    pub min_speed: f64,
    /// Present only when the lap has a throttle channel
    pub average_throttle: Option<f64>,
    /// Present only when the lap has a brake channel
    pub average_brake: Option<f64>,
}

impl DrivingStats {
    /// Statistics over every sample, `None` for an empty lap.
    pub fn from_lap(lap: &Lap) -> Option<Self> {
        if lap.is_empty() {
            return None;
        }
        let mean = |values: Vec<f64>| values.iter().sum::<f64>() / values.len() as f64;
        let speeds = lap.speeds();

        Some(Self {
            average_speed: round_to(mean(speeds.clone()), 2),
            max_speed: round_to(speeds.iter().copied().fold(f64::NEG_INFINITY, f64::max), 2),
            min_speed: round_to(speeds.iter().copied().fold(f64::INFINITY, f64::min), 2),
            average_throttle: lap.column(Channel::Throttle).map(|v| round_to(mean(v), 3)),
            average_brake: lap.column(Channel::Brake).map(|v| round_to(mean(v), 3)),
        })
    }
}

/// One row of the sector table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct SectorRow {
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "Reference Time (s)")]
    pub reference_time: f64,
    #[serde(rename = "Comparison Time (s)")]
    pub comparison_time: f64,
    #[serde(rename = "Delta (s)")]
    pub delta: f64,
}

/// Per-sector comparison, in sector order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct SectorTable {
    pub rows: Vec<SectorRow>,
}

impl SectorTable {
    const HEADERS: [&'static str; 4] = ["Sector", "Reference Time (s)", "Comparison Time (s)", "Delta (s)"];

    pub fn from_deltas(deltas: &[SectorDelta]) -> Self {
        let rows = deltas
            .iter()
            .map(|d| SectorRow {
                sector: d.label(),
                reference_time: round_to(d.reference_time, 3),
                comparison_time: round_to(d.comparison_time, 3),
                delta: round_to(d.delta, 3),
            })
            .collect();
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for SectorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = self
            .rows
            .iter()
            .map(|r| {
                vec![
                    r.sector.clone(),
                    format!("{:.3}", r.reference_time),
                    format!("{:.3}", r.comparison_time),
                    format!("{:.3}", r.delta),
                ]
            })
            .collect::<Vec<_>>();
        write_table(f, &Self::HEADERS, &cells)
    }
}

/// One row of the corner table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct CornerRow {
    #[serde(rename = "Corner")]
    pub corner: usize,
    #[serde(rename = "Ref Entry")]
    pub reference_entry: f64,
    #[serde(rename = "Cmp Entry")]
    pub comparison_entry: f64,
    #[serde(rename = "Ref Min")]
    pub reference_min: f64,
    #[serde(rename = "Cmp Min")]
    pub comparison_min: f64,
    #[serde(rename = "Ref Exit")]
    pub reference_exit: f64,
    #[serde(rename = "Cmp Exit")]
    pub comparison_exit: f64,
    #[serde(rename = "Ref Time")]
    pub reference_time: f64,
    #[serde(rename = "Cmp Time")]
    pub comparison_time: f64,
    #[serde(rename = "Delta (s)")]
    pub delta: f64,
}

/// Per-corner comparison, in the order the deltas were ranked.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct CornerTable {
    pub rows: Vec<CornerRow>,
}

impl CornerTable {
    const HEADERS: [&'static str; 10] = [
        "Corner", "Ref Entry", "Cmp Entry", "Ref Min", "Cmp Min", "Ref Exit", "Cmp Exit", "Ref Time",
        "Cmp Time", "Delta (s)",
    ];

    pub fn from_deltas(deltas: &[CornerDelta]) -> Self {
        let rows = deltas
            .iter()
            .map(|d| CornerRow {
                corner: d.corner,
                reference_entry: round_to(d.reference.entry_speed, 2),
                comparison_entry: round_to(d.comparison.entry_speed, 2),
                reference_min: round_to(d.reference.min_speed, 2),
                comparison_min: round_to(d.comparison.min_speed, 2),
                reference_exit: round_to(d.reference.exit_speed, 2),
                comparison_exit: round_to(d.comparison.exit_speed, 2),
                reference_time: round_to(d.reference.corner_time, 3),
                comparison_time: round_to(d.comparison.corner_time, 3),
                delta: round_to(d.time_delta, 3),
            })
            .collect();
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for CornerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return f.write_str(NO_CORNERS_DETECTED);
        }
        let speed = |v: f64| format!("{:.2}", v);
        let time = |v: f64| format!("{:.3}", v);
        let cells = self
            .rows
            .iter()
            .map(|r| {
                vec![
                    r.corner.to_string(),
                    speed(r.reference_entry),
                    speed(r.comparison_entry),
                    speed(r.reference_min),
                    speed(r.comparison_min),
                    speed(r.reference_exit),
                    speed(r.comparison_exit),
                    time(r.reference_time),
                    time(r.comparison_time),
                    time(r.delta),
                ]
            })
            .collect::<Vec<_>>();
        write_table(f, &Self::HEADERS, &cells)
    }
}

/// Right-aligned columns separated by two spaces.
fn write_table(f: &mut fmt::Formatter<'_>, headers: &[&str], rows: &[Vec<String>]) -> fmt::Result {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| rows.iter().map(|r| r[i].len()).chain([h.len()]).max().unwrap_or_default())
        .collect();

    f.write_str(&format_line(headers.iter().copied(), &widths))?;
    for row in rows {
        f.write_str("\n")?;
        f.write_str(&format_line(row.iter().map(String::as_str), &widths))?;
    }
    Ok(())
}

fn format_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells.zip(widths.iter().copied()).map(|(cell, width)| format!("{cell:>width$}")).collect::<Vec<_>>().join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corners::{Corner, match_corners};
    use crate::test_utils::lap_from_speeds;

    fn corner(min_speed: f64, corner_time: f64) -> Corner {
        Corner {
            apex_index: 10,
            apex_distance: 120.0,
            entry_speed: 52.346,
            min_speed,
            exit_speed: 47.0,
            corner_time,
            exit_average_speed: 44.0,
        }
    }

    #[test]
    fn sector_table_renders_aligned_columns() {
        let deltas = [SectorDelta {
            sector: 1,
            start_distance: 0.0,
            end_distance: 100.0,
            reference_time: 10.12345,
            comparison_time: 10.0,
            delta: 0.12345,
        }];
        let table = SectorTable::from_deltas(&deltas);
        assert_eq!(table.rows[0].delta, 0.123);

        let text = table.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Sector  Reference Time (s)  Comparison Time (s)  Delta (s)");
        assert_eq!(lines[1].len(), lines[0].len());
        assert!(lines[1].starts_with("    S1"));
        assert!(lines[1].ends_with("    0.123"));
    }

    #[test]
    fn corner_table_rounds_and_orders() {
        let deltas = match_corners(&[corner(30.0, 2.5)], &[corner(28.0, 2.25)]);
        let table = CornerTable::from_deltas(&deltas);

        assert_eq!(table.rows[0].reference_entry, 52.35);
        assert_eq!(table.rows[0].delta, 0.25);
        assert!(table.to_string().contains("52.35"));
    }

    #[test]
    fn empty_corner_table_says_so() {
        assert_eq!(CornerTable::default().to_string(), NO_CORNERS_DETECTED);
        assert!(CornerTable::default().is_empty());
    }

    #[test]
    fn serialized_rows_use_display_column_names() {
        let rows = SectorTable {
            rows: vec![SectorRow {
                sector: "S2".to_string(),
                reference_time: 1.0,
                comparison_time: 2.0,
                delta: -1.0,
            }],
        };
        let yaml = serde_yaml_ng::to_string(&rows).unwrap();
        assert!(yaml.contains("Reference Time (s): 1.0"));
        assert!(yaml.contains("Delta (s): -1.0"));
    }

    #[test]
    fn driving_stats_include_optional_channels_only_when_present() {
        let brake = [0.0, 0.5, 1.0];
        let with_brake = lap_from_speeds(&[10.0, 20.0, 30.0], Some(&brake), 0.1);
        let stats = DrivingStats::from_lap(&with_brake).unwrap();
        assert_eq!(stats.average_speed, 20.0);
        assert_eq!(stats.max_speed, 30.0);
        assert_eq!(stats.min_speed, 10.0);
        assert_eq!(stats.average_brake, Some(0.5));
        assert_eq!(stats.average_throttle, Some(0.333));

        let bare = lap_from_speeds(&[10.0, 20.0], None, 0.1);
        let stats = DrivingStats::from_lap(&bare).unwrap();
        assert_eq!(stats.average_brake, None);
        assert!(DrivingStats::from_lap(&Lap::from_samples([])).is_none());
    }
}
