//! Telemetry channel identifiers and speed units

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named telemetry column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum Channel {
    /// Distance along the lap in meters
    Distance,
    /// Elapsed time in seconds
    Time,
    /// Vehicle speed (unit given by [`SpeedUnit`])
    Speed,
    /// Throttle position, normalized 0-1
    Throttle,
    /// Brake pressure, normalized 0-1
    Brake,
    /// Steering input
    Steering,
}

impl Channel {
    /// All channels in column order.
    pub const ALL: [Channel; 6] = [
        Channel::Distance,
        Channel::Time,
        Channel::Speed,
        Channel::Throttle,
        Channel::Brake,
        Channel::Steering,
    ];

    /// Column name as used in telemetry exports.
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Distance => "distance",
            Channel::Time => "time",
            Channel::Speed => "speed",
            Channel::Throttle => "throttle",
            Channel::Brake => "brake",
            Channel::Steering => "steering",
        }
    }

    /// Whether a [`Lap`](crate::Lap) can exist without this channel.
    pub const fn is_optional(self) -> bool {
        matches!(self, Channel::Throttle | Channel::Brake | Channel::Steering)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit of the speed channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum SpeedUnit {
    /// Unknown; inferred from magnitude (mean above 40 means km/h)
    #[default]
    Auto,
    MetersPerSecond,
    KilometersPerHour,
    MilesPerHour,
}

impl SpeedUnit {
    /// Multiplier converting this unit to m/s, `None` while still unresolved.
    pub const fn to_meters_per_second(self) -> Option<f64> {
        match self {
            SpeedUnit::Auto => None,
            SpeedUnit::MetersPerSecond => Some(1.0),
            SpeedUnit::KilometersPerHour => Some(1.0 / 3.6),
            SpeedUnit::MilesPerHour => Some(0.447_04),
        }
    }

    /// Whether the unit is known.
    pub const fn is_resolved(self) -> bool {
        !matches!(self, SpeedUnit::Auto)
    }

    /// First resolved unit out of `self` and `fallback`.
    pub const fn or(self, fallback: SpeedUnit) -> SpeedUnit {
        match self {
            SpeedUnit::Auto => fallback,
            unit => unit,
        }
    }
}
