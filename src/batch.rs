//! Many comparisons at once.
//!
//! Comparisons share no state, so each pair runs on the blocking pool and
//! results come back in input order. A failing pair does not affect the rest.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error};

use crate::comparison::{ComparisonReport, LapComparison};
use crate::types::TelemetryTable;
use crate::{AnalysisError, Result};

/// Run `comparison` over every `(reference, comparison)` pair.
pub async fn compare_all(
    comparison: Arc<LapComparison>,
    pairs: Vec<(TelemetryTable, TelemetryTable)>,
) -> Vec<Result<ComparisonReport>> {
    debug!("Dispatching {} lap comparisons", pairs.len());

    let handles = pairs.into_iter().map(|(reference, candidate)| {
        let comparison = Arc::clone(&comparison);
        tokio::task::spawn_blocking(move || comparison.run(&reference, &candidate))
    });

    join_all(handles)
        .await
        .into_iter()
        .enumerate()
        .map(|(i, joined)| {
            joined.unwrap_or_else(|e| {
                error!("Comparison {} did not complete: {}", i, e);
                Err(AnalysisError::Task { reason: e.to_string() })
            })
        })
        .collect()
}
