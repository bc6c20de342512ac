//! Core value types for lap telemetry.
//!
//! - [`TelemetryTable`] is the column-oriented input handed over by ingestion
//! - [`Lap`] is the normalized, distance-indexed form every component works on
//! - [`Channel`] and [`SpeedUnit`] name columns and speed units
//!
//! All of them are immutable once built: transformations return new values
//! sharing the underlying data via `Arc`.
//!
//! ```rust
//! use lapdelta::{Channel, Lap, SpeedUnit, TelemetryTable};
//!
//! let table = TelemetryTable::from_columns([
//!     (Channel::Distance, vec![0.0, 12.5, 25.0]),
//!     (Channel::Time, vec![0.0, 0.5, 1.0]),
//!     (Channel::Speed, vec![25.0, 25.0, 25.0]),
//! ])?;
//!
//! let lap = Lap::from_table(&table, SpeedUnit::MetersPerSecond)?;
//! assert_eq!(lap.max_distance(), Some(25.0));
//! # Ok::<(), lapdelta::AnalysisError>(())
//! ```

mod channel;
mod lap;
mod table;

pub use channel::{Channel, SpeedUnit};
pub use lap::{Lap, Sample};
pub use table::TelemetryTable;
