//! Distance-indexed lap samples

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Channel, SpeedUnit, TelemetryTable};
use crate::{AnalysisError, Result};

/// One telemetry reading with speed in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Sample {
    /// Meters from the start of the lap
    pub distance: f64,
    /// Seconds
    pub time: f64,
    /// Meters per second
    pub speed: f64,
    pub throttle: Option<f64>,
    pub brake: Option<f64>,
    pub steering: Option<f64>,
}

impl Sample {
    /// Sample with only the required channels.
    pub fn new(distance: f64, time: f64, speed: f64) -> Self {
        Self { distance, time, speed, throttle: None, brake: None, steering: None }
    }

    /// Value of a channel on this sample.
    pub fn value(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Distance => Some(self.distance),
            Channel::Time => Some(self.time),
            Channel::Speed => Some(self.speed),
            Channel::Throttle => self.throttle,
            Channel::Brake => self.brake,
            Channel::Steering => self.steering,
        }
    }

    fn is_finite(&self) -> bool {
        self.distance.is_finite() && self.time.is_finite() && self.speed.is_finite()
    }

    /// Linear blend towards `next` at fraction `t` of the way.
    pub(crate) fn lerp(&self, next: &Sample, t: f64) -> Sample {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        let mix_opt = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (Some(a), Some(b)) => Some(mix(a, b)),
            _ => None,
        };
        Sample {
            distance: mix(self.distance, next.distance),
            time: mix(self.time, next.time),
            speed: mix(self.speed, next.speed),
            throttle: mix_opt(self.throttle, next.throttle),
            brake: mix_opt(self.brake, next.brake),
            steering: mix_opt(self.steering, next.steering),
        }
    }
}

/// An immutable lap with strictly increasing distance.
///
/// Samples are shared via `Arc`; every transformation returns a new `Lap`.
#[derive(Debug, Clone, PartialEq)]
pub struct Lap {
    samples: Arc<[Sample]>,
}

impl Lap {
    /// Build a lap from samples, enforcing strictly increasing distance.
    ///
    /// Rows with a non-finite distance, time or speed are dropped. Equal
    /// distances collapse to the later sample and samples whose distance
    /// goes backwards are discarded.
    pub fn from_samples(samples: impl IntoIterator<Item = Sample>) -> Self {
        let mut kept: Vec<Sample> = Vec::new();
        let mut non_finite = 0usize;
        let mut regressions = 0usize;

        for sample in samples {
            if !sample.is_finite() {
                non_finite += 1;
                continue;
            }
            match kept.last_mut() {
                Some(last) if sample.distance == last.distance => *last = sample,
                Some(last) if sample.distance < last.distance => regressions += 1,
                _ => kept.push(sample),
            }
        }

        if non_finite > 0 {
            debug!("Dropped {} samples with non-finite values", non_finite);
        }
        if regressions > 0 {
            warn!("Dropped {} samples whose distance went backwards", regressions);
        }

        Self { samples: kept.into() }
    }

    /// Build a lap from a table that already carries a distance channel.
    ///
    /// Speed is converted to m/s using the table's declared unit, then
    /// `configured`. With neither, speed is taken as m/s: the magnitude
    /// heuristic only applies when distance has to be integrated.
    pub fn from_table(table: &TelemetryTable, configured: SpeedUnit) -> Result<Self> {
        let required = |channel: Channel| {
            table
                .channel(channel)
                .ok_or_else(|| AnalysisError::missing_channel(channel, "building a lap"))
        };
        let distance = required(Channel::Distance)?;
        let time = required(Channel::Time)?;
        let speed = required(Channel::Speed)?;

        let unit = table.speed_unit().or(configured).or(SpeedUnit::MetersPerSecond);
        let factor = unit.to_meters_per_second().unwrap_or(1.0);

        let throttle = table.channel(Channel::Throttle);
        let brake = table.channel(Channel::Brake);
        let steering = table.channel(Channel::Steering);
        let at = |column: Option<&[f64]>, i: usize| column.map(|values| values[i]);

        Ok(Self::from_samples((0..table.len()).map(|i| Sample {
            distance: distance[i],
            time: time[i],
            speed: speed[i] * factor,
            throttle: at(throttle, i),
            brake: at(brake, i),
            steering: at(steering, i),
        })))
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Check whether every sample carries `channel`.
    pub fn has_channel(&self, channel: Channel) -> bool {
        !self.samples.is_empty() && self.samples.iter().all(|s| s.value(channel).is_some())
    }

    /// Values of a channel, `None` unless every sample carries it.
    pub fn column(&self, channel: Channel) -> Option<Vec<f64>> {
        self.samples.iter().map(|s| s.value(channel)).collect()
    }

    pub fn distances(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.distance).collect()
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    pub fn speeds(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.speed).collect()
    }

    /// Distance of the last sample.
    pub fn max_distance(&self) -> Option<f64> {
        self.samples.last().map(|s| s.distance)
    }
}
