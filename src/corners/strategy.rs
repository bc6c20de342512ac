//! Apex location strategies
//!
//! Three interchangeable ways of finding apex candidates, selected by
//! [`DetectionStrategy`]. Each returns sample indices in increasing order;
//! window measurement and rejection happen in [`CornerDetector`](super::CornerDetector).

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::{Channel, Lap};
use crate::{AnalysisError, Result};

/// Time step assumed when a lap's median sample interval is not positive.
const FALLBACK_DT: f64 = 0.05;

/// Finds apex candidates in a lap.
pub trait ApexLocator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Apex sample indices in increasing order.
    fn locate(&self, lap: &Lap) -> Result<Vec<usize>>;
}

/// Configured apex location strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum DetectionStrategy {
    /// Speed minimum while the brake is above a threshold; needs the brake channel.
    BrakeHysteresis {
        #[serde(default = "default_brake_threshold")]
        brake_threshold: f64,
    },
    /// Every strict local speed minimum.
    LocalMinimum,
    /// Speed valleys with a minimum prominence and separation.
    Prominence {
        #[serde(default = "default_min_prominence")]
        min_prominence: f64,
        #[serde(default = "default_min_separation_s")]
        min_separation_s: f64,
    },
}

fn default_brake_threshold() -> f64 {
    0.1
}

fn default_min_prominence() -> f64 {
    1.5
}

fn default_min_separation_s() -> f64 {
    0.5
}

impl Default for DetectionStrategy {
    fn default() -> Self {
        DetectionStrategy::BrakeHysteresis { brake_threshold: default_brake_threshold() }
    }
}

impl DetectionStrategy {
    /// Build the locator for this strategy.
    pub fn locator(&self) -> Box<dyn ApexLocator> {
        match *self {
            DetectionStrategy::BrakeHysteresis { brake_threshold } => {
                Box::new(BrakeHysteresis { brake_threshold })
            }
            DetectionStrategy::LocalMinimum => Box::new(LocalMinimum),
            DetectionStrategy::Prominence { min_prominence, min_separation_s } => {
                Box::new(Prominence { min_prominence, min_separation_s })
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            DetectionStrategy::BrakeHysteresis { brake_threshold } if !(brake_threshold >= 0.0) => {
                Err(AnalysisError::invalid_config("corners.strategy.brake_threshold", "must be non-negative"))
            }
            DetectionStrategy::Prominence { min_prominence, .. } if !(min_prominence >= 0.0) => {
                Err(AnalysisError::invalid_config("corners.strategy.min_prominence", "must be non-negative"))
            }
            DetectionStrategy::Prominence { min_separation_s, .. } if !(min_separation_s >= 0.0) => {
                Err(AnalysisError::invalid_config("corners.strategy.min_separation_s", "must be non-negative"))
            }
            _ => Ok(()),
        }
    }
}

/// Braking state machine: a corner opens when the brake rises above the
/// threshold and closes when it falls back, at the lowest speed seen while open.
#[derive(Debug, Clone, Copy)]
pub struct BrakeHysteresis {
    pub brake_threshold: f64,
}

#[derive(Debug, Default)]
struct CornerState {
    in_corner: bool,
    running_min_speed: f64,
    running_min_index: usize,
}

impl ApexLocator for BrakeHysteresis {
    fn name(&self) -> &'static str {
        "brake_hysteresis"
    }

    fn locate(&self, lap: &Lap) -> Result<Vec<usize>> {
        let brake = lap
            .column(Channel::Brake)
            .filter(|_| !lap.is_empty())
            .ok_or_else(|| AnalysisError::missing_channel(Channel::Brake, "brake-based corner detection"))?;

        let mut state = CornerState::default();
        let mut apexes = Vec::new();

        for (i, (sample, &pressure)) in lap.samples().iter().zip(&brake).enumerate() {
            let braking = pressure > self.brake_threshold;
            if braking && !state.in_corner {
                trace!("Corner opened at sample {} ({:.1} m)", i, sample.distance);
                state = CornerState { in_corner: true, running_min_speed: sample.speed, running_min_index: i };
            } else if braking {
                if sample.speed < state.running_min_speed {
                    state.running_min_speed = sample.speed;
                    state.running_min_index = i;
                }
            } else if state.in_corner {
                trace!("Corner closed at sample {}, apex {}", i, state.running_min_index);
                apexes.push(state.running_min_index);
                state.in_corner = false;
            }
        }

        if state.in_corner {
            trace!("Discarding corner still braking at end of lap (apex {})", state.running_min_index);
        }

        Ok(apexes)
    }
}

/// Every sample slower than both neighbours.
#[derive(Debug, Clone, Copy)]
pub struct LocalMinimum;

impl ApexLocator for LocalMinimum {
    fn name(&self) -> &'static str {
        "local_minimum"
    }

    fn locate(&self, lap: &Lap) -> Result<Vec<usize>> {
        let speeds = lap.speeds();
        Ok((1..speeds.len().saturating_sub(1))
            .filter(|&i| speeds[i] < speeds[i - 1] && speeds[i] < speeds[i + 1])
            .collect())
    }
}

/// Speed valleys filtered by separation and prominence.
///
/// Candidates closer than `min_separation_s` (converted to samples with the
/// lap's median time step) are thinned keeping the slowest valley first;
/// survivors must then rise at least `min_prominence` on their shallower side.
#[derive(Debug, Clone, Copy)]
pub struct Prominence {
    pub min_prominence: f64,
    pub min_separation_s: f64,
}

impl Prominence {
    fn min_samples(&self, lap: &Lap) -> usize {
        let times = lap.times();
        let mut steps: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
        steps.sort_by(|a, b| a.total_cmp(b));
        let median = match steps.len() {
            0 => FALLBACK_DT,
            n if n % 2 == 1 => steps[n / 2],
            n => (steps[n / 2 - 1] + steps[n / 2]) / 2.0,
        };
        let dt = if median > 0.0 { median } else { FALLBACK_DT };
        // absorb rounding noise in the median so 0.5 s at 0.1 s is 5 samples, not 4
        ((self.min_separation_s / dt + 1e-9) as usize).max(1)
    }
}

impl ApexLocator for Prominence {
    fn name(&self) -> &'static str {
        "prominence"
    }

    fn locate(&self, lap: &Lap) -> Result<Vec<usize>> {
        let speeds = lap.speeds();
        let candidates = valleys(&speeds);
        let spaced = thin_by_separation(&speeds, candidates, self.min_samples(lap));

        let mut apexes: Vec<usize> = spaced
            .into_iter()
            .filter(|&i| valley_prominence(&speeds, i) >= self.min_prominence)
            .collect();
        apexes.sort_unstable();
        Ok(apexes)
    }
}

/// Local minima; a flat valley floor resolves to its middle sample.
fn valleys(speeds: &[f64]) -> Vec<usize> {
    let mut found = Vec::new();
    let mut i = 1;
    while i + 1 < speeds.len() {
        if speeds[i - 1] > speeds[i] {
            let mut ahead = i + 1;
            while ahead + 1 < speeds.len() && speeds[ahead] == speeds[i] {
                ahead += 1;
            }
            if speeds[ahead] > speeds[i] {
                found.push((i + ahead - 1) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    found
}

/// Drop valleys within `min_samples` of a slower one.
fn thin_by_separation(speeds: &[f64], mut candidates: Vec<usize>, min_samples: usize) -> Vec<usize> {
    candidates.sort_by(|&a, &b| speeds[a].total_cmp(&speeds[b]).then(a.cmp(&b)));
    let mut kept: Vec<usize> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if kept.iter().all(|&k| k.abs_diff(candidate) >= min_samples) {
            kept.push(candidate);
        }
    }
    kept
}

/// Rise from the valley floor to the lower of the two enclosing maxima.
fn valley_prominence(speeds: &[f64], valley: usize) -> f64 {
    let floor = speeds[valley];
    let left_peak = speeds[..=valley].iter().rev().take_while(|&&v| v >= floor).fold(floor, |a, &b| a.max(b));
    let right_peak = speeds[valley..].iter().take_while(|&&v| v >= floor).fold(floor, |a, &b| a.max(b));
    left_peak.min(right_peak) - floor
}
