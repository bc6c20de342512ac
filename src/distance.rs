//! Distance reconstruction from speed and time.
//!
//! Laps exported without a distance channel get one by integrating speed
//! over time. Speed is first normalized to m/s: a declared unit wins, then
//! the configured unit, and only then the magnitude heuristic (mean speed
//! above [`KPH_MEAN_SPEED_THRESHOLD`] is read as km/h). The heuristic
//! misclassifies m/s traces from disciplines averaging over 144 km/h, so
//! callers who know their unit should declare it.

use tracing::{debug, warn};

use crate::types::{Channel, Lap, SpeedUnit, TelemetryTable};
use crate::Result;

/// Time step assumed before the first sample, in seconds.
pub const FIRST_SAMPLE_DT: f64 = 0.05;

/// Mean speed above which an undeclared speed channel is read as km/h.
pub const KPH_MEAN_SPEED_THRESHOLD: f64 = 40.0;

/// Resolve `declared` to a concrete unit, inferring from magnitude when unknown.
pub fn resolve_speed_unit(declared: SpeedUnit, speeds: &[f64]) -> SpeedUnit {
    if declared.is_resolved() {
        return declared;
    }

    let finite: Vec<f64> = speeds.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return SpeedUnit::MetersPerSecond;
    }

    let mean = finite.iter().sum::<f64>() / finite.len() as f64;
    let unit = if mean > KPH_MEAN_SPEED_THRESHOLD {
        SpeedUnit::KilometersPerHour
    } else {
        SpeedUnit::MetersPerSecond
    };
    debug!("Inferred speed unit {:?} from mean speed {:.2}", unit, mean);
    unit
}

/// Guarantees every lap has a monotonic distance axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceReconstructor {
    speed_unit: SpeedUnit,
}

impl DistanceReconstructor {
    /// Create a reconstructor using `speed_unit` for tables that do not declare one.
    pub fn new(speed_unit: SpeedUnit) -> Self {
        Self { speed_unit }
    }

    /// Return a table with a distance channel.
    ///
    /// Tables that already have one are returned unchanged. Without `speed`
    /// or `time` the distance falls back to the sample index; such a table
    /// still fails later when a [`Lap`] is built from it.
    /// The placeholder table is for callers only and never reaches a comparison.
    pub fn reconstruct(&self, table: &TelemetryTable) -> Result<TelemetryTable> {
        if table.has_channel(Channel::Distance) {
            return Ok(table.clone());
        }

        let (Some(speed), Some(time)) = (table.channel(Channel::Speed), table.channel(Channel::Time))
        else {
            warn!("Speed or time channel missing; using sample index as distance");
            let placeholder: Vec<f64> = (0..table.len()).map(|i| i as f64).collect();
            return table.with_channel(Channel::Distance, placeholder);
        };

        let unit = resolve_speed_unit(table.speed_unit().or(self.speed_unit), speed);
        let factor = unit.to_meters_per_second().unwrap_or(1.0);
        let speed_mps: Vec<f64> = speed.iter().map(|v| v * factor).collect();

        let distance = integrate(&speed_mps, time);
        debug!(
            "Reconstructed {:.1} m over {} samples from {:?} speed",
            distance.last().copied().unwrap_or_default(),
            distance.len(),
            unit
        );

        table
            .with_channel(Channel::Speed, speed_mps)?
            .with_channel(Channel::Distance, distance)
            .map(|t| t.with_speed_unit(SpeedUnit::MetersPerSecond))
    }

    /// Reconstruct distance if needed and build the normalized lap.
    pub fn build_lap(&self, table: &TelemetryTable) -> Result<Lap> {
        let table = self.reconstruct(table)?;
        Lap::from_table(&table, self.speed_unit)
    }
}

/// Cumulative `speed * dt`, never decreasing.
fn integrate(speed: &[f64], time: &[f64]) -> Vec<f64> {
    let mut total = 0.0;
    speed
        .iter()
        .zip(time)
        .enumerate()
        .map(|(i, (v, t))| {
            let dt = if i == 0 { FIRST_SAMPLE_DT } else { t - time[i - 1] };
            let step = v.max(0.0) * dt.max(0.0);
            if step.is_finite() {
                total += step;
            }
            total
        })
        .collect()
}
