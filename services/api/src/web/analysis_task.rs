//! services/api/src/web/analysis_task.rs
//!
//! This module contains the asynchronous "worker" function responsible for
//! one analysis round trip: clear, ask the oracle, reconcile, apply.

use crate::{error::ApiError, web::state::AppState};
use luminary_core::{
    reconciler::DropReason,
    workspace::{AnalysisReport, AnalysisTicket, WorkspaceError},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Analyzes the active document.
///
/// The workspace lock is held only to start and to finish. The result is
/// applied to the document the analysis started on, even if the user switched
/// documents in between.
///
/// The oracle call and `finish_analysis` run on their own task, so dropping
/// the caller (a client disconnect) still clears the in-flight flag.
pub async fn analysis_process(app_state: Arc<AppState>) -> Result<AnalysisReport, ApiError> {
    let ticket = {
        let mut workspace = app_state.workspace.lock().await;
        workspace.begin_analysis()?
    };
    info!(
        "Analysis started for document {} ({} bytes).",
        ticket.document_id,
        ticket.text.len()
    );

    tokio::spawn(analysis_round_trip(app_state, ticket))
        .await
        .map_err(|e| ApiError::Internal(format!("Analysis task failed: {}", e)))?
}

async fn analysis_round_trip(
    app_state: Arc<AppState>,
    ticket: AnalysisTicket,
) -> Result<AnalysisReport, ApiError> {
    let llm_start = Instant::now();
    let result = app_state.analysis_adapter.analyze(&ticket.text).await;
    info!("Analysis oracle took: {:?}", llm_start.elapsed());

    let mut workspace = app_state.workspace.lock().await;
    match workspace.finish_analysis(&ticket, result) {
        Ok(report) => {
            for dropped in &report.dropped {
                let reason = match dropped.reason {
                    DropReason::QuoteNotFound => "quote not found in document",
                    DropReason::InvalidSpan => "empty quote",
                    DropReason::Overlap => "overlaps an accepted highlight",
                };
                debug!(
                    "Dropped {} candidate {:?}: {}",
                    dropped.candidate.category, dropped.candidate.quote, reason
                );
            }
            info!(
                "Analysis applied to document {}: {} highlights accepted, {} dropped.",
                report.document_id,
                report.accepted,
                report.dropped.len()
            );
            Ok(report)
        }
        Err(WorkspaceError::DocumentNotFound(id)) => {
            warn!("Document {} was deleted during analysis; result discarded.", id);
            Err(WorkspaceError::DocumentNotFound(id).into())
        }
        Err(e) => {
            error!("Analysis of document {} failed: {}", ticket.document_id, e);
            Err(e.into())
        }
    }
}
