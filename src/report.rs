//! Coaching report collaborator.
//!
//! The engine never talks to a text-generation service itself. Callers pass
//! a [`ReportGenerator`] to [`generate_report`], which bounds the call with a
//! deadline and a cancellation token. The summary tables are complete before
//! a report is requested, so report failures never invalidate a comparison.

use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::summary::{CornerTable, LapSummary, SectorTable};
use crate::{AnalysisError, Result};

/// Instructions given to the report service ahead of the comparison data.
pub const SYSTEM_PROMPT: &str = "\
You are a senior race engineer with 15+ years experience in:
- GT3 / GT4
- Formula racing
- Professional sim racing (iRacing, ACC)

Your tone is:
- Technical
- Precise
- Instruction-focused
- No motivation, no hype

You speak like an engineer reviewing data in a debrief.";

/// Outline every report must follow, in order.
pub const REPORT_SECTIONS: [&str; 6] = [
    "Overall Lap Time Analysis",
    "Sector Performance Review",
    "Braking & Entry Technique",
    "Minimum Speed & Mid-Corner",
    "Exit & Throttle Application",
    "Top 5 Actionable Coaching Points",
];

/// Generates free-form coaching text from a comparison.
///
/// Implementations wrap a remote service or a test double. The engine does
/// not inspect the returned text.
#[async_trait::async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, request: &ReportRequest) -> Result<String>;
}

/// Everything the report collaborator receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ReportRequest {
    pub summary: LapSummary,
    /// Sector table rendered as text
    pub sector_table: String,
    /// Corner table rendered as text, or "No corners detected"
    pub corner_table: String,
}

impl ReportRequest {
    pub fn new(summary: LapSummary, sectors: &SectorTable, corners: &CornerTable) -> Self {
        Self { summary, sector_table: sectors.to_string(), corner_table: corners.to_string() }
    }

    pub fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    /// User-facing prompt carrying the summary, both tables and the outline.
    pub fn prompt(&self) -> String {
        let outline = REPORT_SECTIONS
            .iter()
            .enumerate()
            .map(|(i, section)| format!("{}. {}", i + 1, section))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Analyze the following telemetry comparison.\n\n\
             LAP SUMMARY:\n{}\n\n\
             SECTOR DELTAS:\n{}\n\n\
             CORNER ANALYSIS:\n{}\n\n\
             Return feedback in EXACTLY this structure:\n\n{}\n",
            self.summary, self.sector_table, self.corner_table, outline
        )
    }
}

/// Run the collaborator, giving up after `timeout` or when `cancel` fires.
pub async fn generate_report<G>(
    generator: &G,
    request: &ReportRequest,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<String>
where
    G: ReportGenerator + ?Sized,
{
    debug!("Requesting coaching report (timeout {:?})", timeout);

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("Report request cancelled");
            return Err(AnalysisError::ReportCancelled);
        }
        result = tokio::time::timeout(timeout, generator.generate(request)) => result,
    };

    match result {
        Ok(Ok(text)) => {
            debug!("Report received ({} bytes)", text.len());
            Ok(text)
        }
        Ok(Err(e)) => {
            warn!("Report generation failed: {}", e);
            Err(e)
        }
        Err(_) => {
            warn!("Report generation timed out after {:?}", timeout);
            Err(AnalysisError::ReportTimeout { duration: timeout })
        }
    }
}
