//! Column-oriented telemetry input

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Channel, SpeedUnit};
use crate::{AnalysisError, Result};

/// Raw lap telemetry as delivered by the ingestion layer.
///
/// Columns are shared via `Arc`, so cloning a table and deriving a new one
/// with an extra column never copies the existing data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryTable {
    columns: BTreeMap<Channel, Arc<[f64]>>,
    speed_unit: SpeedUnit,
}

impl TelemetryTable {
    /// Build a table from named columns.
    ///
    /// Every column must have the same length as `time` (or as the first
    /// column when `time` is absent).
    pub fn from_columns<I>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Channel, Vec<f64>)>,
    {
        columns
            .into_iter()
            .try_fold(Self::default(), |table, (channel, values)| table.with_channel(channel, values))
    }

    /// Return a new table with `channel` set to `values`.
    pub fn with_channel(&self, channel: Channel, values: impl Into<Arc<[f64]>>) -> Result<Self> {
        let values = values.into();
        if let Some(expected) = self.reference_len(channel) {
            if values.len() != expected {
                return Err(AnalysisError::ChannelLength { channel, expected, found: values.len() });
            }
        }

        let mut columns = self.columns.clone();
        columns.insert(channel, values);
        Ok(Self { columns, speed_unit: self.speed_unit })
    }

    /// Return a new table with the declared speed unit.
    pub fn with_speed_unit(&self, speed_unit: SpeedUnit) -> Self {
        Self { columns: self.columns.clone(), speed_unit }
    }

    /// Length every column is checked against, ignoring `channel` itself.
    fn reference_len(&self, channel: Channel) -> Option<usize> {
        self.columns
            .get(&Channel::Time)
            .filter(|_| channel != Channel::Time)
            .or_else(|| self.columns.iter().find(|(c, _)| **c != channel).map(|(_, v)| v))
            .map(|values| values.len())
    }

    /// Values of a channel, if present.
    pub fn channel(&self, channel: Channel) -> Option<&[f64]> {
        self.columns.get(&channel).map(|values| values.as_ref())
    }

    /// Check whether a channel is present.
    pub fn has_channel(&self, channel: Channel) -> bool {
        self.columns.contains_key(&channel)
    }

    /// Channels present, in column order.
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.columns.keys().copied()
    }

    /// Declared unit of the speed channel.
    pub fn speed_unit(&self) -> SpeedUnit {
        self.speed_unit
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.values().next().map_or(0, |values| values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
