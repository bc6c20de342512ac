//! Error types for lap comparison.
//!
//! Only conditions that stop a comparison are errors. Empty corner detection,
//! dropped sectors and ambiguous speed units degrade to empty or partial output
//! and never surface here.
//!
//! ## Error Categories
//!
//! - **Input Errors**: a channel is missing or has the wrong length
//! - **Alignment Errors**: the two laps share no usable distance range
//! - **Configuration Errors**: invalid values or unparseable YAML
//! - **Report Errors**: the external report collaborator failed, timed out or was cancelled
//!
//! ```rust
//! use lapdelta::{AnalysisError, Channel};
//!
//! let error = AnalysisError::missing_channel(Channel::Brake, "brake-based corner detection");
//! assert!(error.is_fatal());
//! assert!(error.to_string().contains("brake"));
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::time::Duration;
use thiserror::Error;

use crate::types::Channel;

/// Result type alias for analysis operations.
pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;

/// Main error type for analysis operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error("Required channel '{channel}' is missing (needed for {context})")]
    MissingChannel { channel: Channel, context: String },

    #[error(
        "Laps do not cover a common distance range: reference reaches {reference_max:.1} m, \
         comparison reaches {comparison_max:.1} m, {retained_reference}/{retained_comparison} \
         samples retained"
    )]
    InsufficientOverlap {
        reference_max: f64,
        comparison_max: f64,
        retained_reference: usize,
        retained_comparison: usize,
    },

    #[error("Channel '{channel}' has {found} values, expected {expected}")]
    ChannelLength { channel: Channel, expected: usize, found: usize },

    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Failed to parse analysis configuration")]
    Config {
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("Report generation failed: {reason}")]
    Report {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Report generation timed out after {duration:?}")]
    ReportTimeout { duration: Duration },

    #[error("Report generation was cancelled")]
    ReportCancelled,

    #[error("Comparison task failed: {reason}")]
    Task { reason: String },
}

impl AnalysisError {
    /// Returns whether the comparison itself cannot proceed.
    ///
    /// Report collaborator failures are not fatal: the summary tables are
    /// already complete when the report is requested.
    pub fn is_fatal(&self) -> bool {
        match self {
            AnalysisError::MissingChannel { .. } => true,
            AnalysisError::InsufficientOverlap { .. } => true,
            AnalysisError::ChannelLength { .. } => true,
            AnalysisError::InvalidConfig { .. } => true,
            AnalysisError::Config { .. } => true,
            AnalysisError::Task { .. } => true,
            AnalysisError::Report { .. } => false,
            AnalysisError::ReportTimeout { .. } => false,
            AnalysisError::ReportCancelled => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            AnalysisError::MissingChannel { .. } => vec![
                "Check the telemetry export includes the named column",
                "Switch corner detection to a strategy that only needs speed",
            ],
            AnalysisError::InsufficientOverlap { .. } => vec![
                "Verify both laps were recorded on the same circuit",
                "Check the distance channel starts near zero for both laps",
                "Confirm the speed unit so reconstructed distances are comparable",
            ],
            AnalysisError::ChannelLength { .. } => vec![
                "Check the export did not truncate a column",
                "Re-export the lap with all channels sampled together",
            ],
            AnalysisError::InvalidConfig { .. } => vec![
                "Use at least one sector",
                "Use non-negative thresholds and a positive corner window",
            ],
            AnalysisError::Config { .. } => vec![
                "Check the YAML syntax",
                "Compare field names against the documented configuration keys",
            ],
            AnalysisError::Report { .. } => vec![
                "Check the report service credentials",
                "Retry the report request",
            ],
            AnalysisError::ReportTimeout { .. } => vec![
                "Increase the report timeout",
                "Retry when the report service is less loaded",
            ],
            AnalysisError::ReportCancelled => vec!["Request the report again if it is still needed"],
            AnalysisError::Task { .. } => vec![
                "Run the failing pair on its own to inspect the error",
                "Check the process has not run out of memory",
            ],
        }
    }

    /// Helper constructor for missing channel errors.
    pub fn missing_channel(channel: Channel, context: impl Into<String>) -> Self {
        AnalysisError::MissingChannel { channel, context: context.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidConfig { field: field.into(), reason: reason.into() }
    }

    /// Helper constructor for report collaborator errors.
    pub fn report_failed(reason: impl Into<String>) -> Self {
        AnalysisError::Report { reason: reason.into(), source: None }
    }

    /// Helper constructor for report collaborator errors with source.
    pub fn report_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        AnalysisError::Report { reason: reason.into(), source: Some(source) }
    }
}

impl From<serde_yaml_ng::Error> for AnalysisError {
    fn from(source: serde_yaml_ng::Error) -> Self {
        AnalysisError::Config { source }
    }
}
