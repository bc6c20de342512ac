//! Synthetic lap builders shared by unit tests and benchmarks
//!
//! Laps are generated from a speed profile sampled at a fixed time step,
//! so every builder is deterministic.

#![cfg(any(test, feature = "benchmark"))]

use crate::types::{Channel, Lap, Sample, SpeedUnit, TelemetryTable};

/// Cruise speed used by the profile builders, in m/s.
pub const CRUISE_SPEED: f64 = 50.0;

/// A lap at constant speed with `len` samples `dt` seconds apart.
pub fn constant_speed_lap(len: usize, speed: f64, dt: f64) -> Lap {
    Lap::from_samples((0..len).map(|i| Sample::new(i as f64 * speed * dt, i as f64 * dt, speed)))
}

/// A lap following `speeds`, integrated with a fixed time step.
///
/// Throttle is full whenever the brake is released.
pub fn lap_from_speeds(speeds: &[f64], brake: Option<&[f64]>, dt: f64) -> Lap {
    let mut distance = 0.0;
    let samples: Vec<Sample> = speeds
        .iter()
        .enumerate()
        .map(|(i, &speed)| {
            if i > 0 {
                distance += speeds[i - 1] * dt;
            }
            let brake = brake.map(|b| b[i]);
            Sample {
                brake,
                throttle: brake.map(|b| if b > 0.0 { 0.0 } else { 1.0 }),
                ..Sample::new(distance, i as f64 * dt, speed)
            }
        })
        .collect();
    Lap::from_samples(samples)
}

/// Speed profile with a V-shaped dip of `depth` centred on `apex`.
pub fn dip_profile(len: usize, apex: usize, depth: f64, half_width: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let offset = i.abs_diff(apex) as f64 / half_width as f64;
            CRUISE_SPEED - depth * (1.0 - offset).max(0.0)
        })
        .collect()
}

/// Brake channel at `level` on `[start, end)` and zero elsewhere.
pub fn brake_window(len: usize, start: usize, end: usize, level: f64) -> Vec<f64> {
    (0..len).map(|i| if (start..end).contains(&i) { level } else { 0.0 }).collect()
}

/// A braked corner at each of `apexes` on an otherwise constant-speed lap.
pub fn multi_corner_lap(len: usize, apexes: &[usize], depth: f64, dt: f64) -> Lap {
    let half_width = 20;
    let mut speeds = vec![CRUISE_SPEED; len];
    let mut brake = vec![0.0; len];
    for &apex in apexes {
        for (i, (speed, pressure)) in speeds.iter_mut().zip(brake.iter_mut()).enumerate() {
            let offset = i.abs_diff(apex) as f64 / half_width as f64;
            *speed = speed.min(CRUISE_SPEED - depth * (1.0 - offset).max(0.0));
            if i + half_width >= apex && i <= apex {
                *pressure = 0.6;
            }
        }
    }
    lap_from_speeds(&speeds, Some(&brake), dt)
}

/// Column table carrying every channel of `lap`, speed declared in m/s.
pub fn table_from_lap(lap: &Lap) -> TelemetryTable {
    let columns = Channel::ALL.into_iter().filter_map(|c| lap.column(c).map(|values| (c, values)));
    TelemetryTable::from_columns(columns)
        .map(|table| table.with_speed_unit(SpeedUnit::MetersPerSecond))
        .unwrap_or_default()
}
