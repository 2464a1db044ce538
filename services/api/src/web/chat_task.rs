//! services/api/src/web/chat_task.rs
//!
//! This module contains the asynchronous "worker" function responsible for
//! answering one question about the active document.

use crate::{error::ApiError, web::state::AppState};
use luminary_core::{domain::ChatMessage, workspace::ChatTicket};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Asks the chat oracle about the active document and records the exchange.
///
/// Only a bounded window of prior turns is sent along. The question and the
/// answer are appended to the history together, and only when the call succeeds.
/// Like analysis, the round trip runs on its own task so a dropped caller still
/// clears the in-flight flag.
pub async fn chat_process(app_state: Arc<AppState>, question: String) -> Result<ChatMessage, ApiError> {
    let window = app_state.config.chat_history_window;
    let ticket = {
        let mut workspace = app_state.workspace.lock().await;
        workspace.begin_chat(&question, window)?
    };
    info!(
        "Chat question on document {} with {} prior messages.",
        ticket.document_id,
        ticket.history.len()
    );

    tokio::spawn(chat_round_trip(app_state, ticket))
        .await
        .map_err(|e| ApiError::Internal(format!("Chat task failed: {}", e)))?
}

async fn chat_round_trip(app_state: Arc<AppState>, ticket: ChatTicket) -> Result<ChatMessage, ApiError> {
    let llm_start = Instant::now();
    let result = app_state
        .chat_adapter
        .chat(&ticket.text, &ticket.question.text, &ticket.history)
        .await;
    info!("Chat oracle took: {:?}", llm_start.elapsed());

    let document_id = ticket.document_id;
    let mut workspace = app_state.workspace.lock().await;
    workspace.finish_chat(ticket, result).map_err(|e| {
        error!("Chat on document {} failed: {}", document_id, e);
        e.into()
    })
}
