pub mod analysis_task;
pub mod chat_task;
pub mod protocol;
pub mod rest;
pub mod state;

#[cfg(test)]
mod test_support;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use rest::*;
use state::AppState;
use std::sync::Arc;

/// Builds the REST router over the shared state.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/categories", get(list_categories_handler))
        .route(
            "/documents",
            get(list_documents_handler).post(create_document_handler),
        )
        .route("/documents/active", get(get_active_document_handler))
        .route("/documents/active/text", put(update_text_handler))
        .route("/documents/active/segments", get(segments_handler))
        .route("/documents/active/sidebar", get(sidebar_handler))
        .route("/documents/active/selection", post(selection_handler))
        .route(
            "/documents/active/highlights",
            post(add_highlight_handler).delete(clear_highlights_handler),
        )
        .route(
            "/documents/active/highlights/{id}",
            delete(delete_highlight_handler),
        )
        .route(
            "/documents/active/highlights/{id}/note",
            put(annotate_highlight_handler),
        )
        .route("/documents/active/analyze", post(analyze_handler))
        .route("/documents/active/chat", post(chat_handler))
        .route("/documents/{id}", delete(delete_document_handler))
        .route("/documents/{id}/activate", post(activate_document_handler))
        .with_state(app_state)
}
