//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::{
    error::{ApiError, ErrorBody},
    web::{
        analysis_task::analysis_process,
        chat_task::chat_process,
        protocol::*,
        state::AppState,
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use luminary_core::{
    domain::HighlightCategory, selection::MappedSelection, span::Span, workspace::Workspace,
    WorkspaceError,
};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_categories_handler,
        list_documents_handler,
        create_document_handler,
        get_active_document_handler,
        update_text_handler,
        activate_document_handler,
        delete_document_handler,
        segments_handler,
        sidebar_handler,
        selection_handler,
        add_highlight_handler,
        clear_highlights_handler,
        delete_highlight_handler,
        annotate_highlight_handler,
        analyze_handler,
        chat_handler,
    ),
    components(
        schemas(
            ErrorBody,
            CreateDocumentRequest,
            UpdateTextRequest,
            SelectionRequest,
            ManualHighlightRequest,
            NoteRequest,
            ChatRequest,
            CategoryInfo,
            DocumentListResponse,
            DocumentResponse,
            RunView,
            SegmentsResponse,
            SidebarEntry,
            SidebarGroup,
            SidebarResponse,
            SelectionResponse,
            ManualHighlightResponse,
            HighlightResponse,
            DroppedQuote,
            AnalyzeResponse,
            ChatResponse,
        )
    ),
    tags(
        (name = "Luminary API", description = "Document highlighting, AI analysis and document chat.")
    )
)]
pub struct ApiDoc;

fn document_response(workspace: &Workspace) -> DocumentResponse {
    DocumentResponse {
        document: workspace.active().clone(),
        processing: workspace.processing(),
    }
}

//=========================================================================================
// Documents
//=========================================================================================

/// List the highlight categories in sidebar order.
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "All categories", body = [CategoryInfo]))
)]
pub async fn list_categories_handler() -> Json<Vec<CategoryInfo>> {
    Json(
        HighlightCategory::SIDEBAR_ORDER
            .into_iter()
            .map(CategoryInfo::from)
            .collect(),
    )
}

/// List document history, most recently modified first.
#[utoipa::path(
    get,
    path = "/documents",
    responses((status = 200, description = "Document history", body = DocumentListResponse))
)]
pub async fn list_documents_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<DocumentListResponse> {
    let workspace = app_state.workspace.lock().await;
    Json(DocumentListResponse {
        documents: workspace.documents(),
    })
}

/// Create a document and make it active.
#[utoipa::path(
    post,
    path = "/documents",
    request_body = CreateDocumentRequest,
    responses((status = 201, description = "Document created", body = DocumentResponse))
)]
pub async fn create_document_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateDocumentRequest>,
) -> impl IntoResponse {
    let mut workspace = app_state.workspace.lock().await;
    let id = workspace.create_document(payload.text.unwrap_or_default());
    info!("Created document {}.", id);
    (StatusCode::CREATED, Json(document_response(&workspace)))
}

/// Fetch the active document and the processing flags.
#[utoipa::path(
    get,
    path = "/documents/active",
    responses((status = 200, description = "The active document", body = DocumentResponse))
)]
pub async fn get_active_document_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<DocumentResponse> {
    let workspace = app_state.workspace.lock().await;
    Json(document_response(&workspace))
}

/// Replace the active document's text. Existing highlights are kept as they are.
#[utoipa::path(
    put,
    path = "/documents/active/text",
    request_body = UpdateTextRequest,
    responses((status = 200, description = "Text replaced", body = DocumentResponse))
)]
pub async fn update_text_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<UpdateTextRequest>,
) -> Json<DocumentResponse> {
    let mut workspace = app_state.workspace.lock().await;
    workspace.set_text(payload.text);
    Json(document_response(&workspace))
}

/// Make a stored document the active one.
#[utoipa::path(
    post,
    path = "/documents/{id}/activate",
    params(("id" = Uuid, Path, description = "Document to activate")),
    responses(
        (status = 200, description = "Document activated", body = DocumentResponse),
        (status = 404, description = "No such document", body = ErrorBody)
    )
)]
pub async fn activate_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let mut workspace = app_state.workspace.lock().await;
    workspace.switch_document(id)?;
    Ok(Json(document_response(&workspace)))
}

/// Delete a document. The last remaining document cannot be deleted.
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document to delete")),
    responses(
        (status = 200, description = "Remaining documents", body = DocumentListResponse),
        (status = 404, description = "No such document", body = ErrorBody),
        (status = 409, description = "It is the last document", body = ErrorBody)
    )
)]
pub async fn delete_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentListResponse>, ApiError> {
    let mut workspace = app_state.workspace.lock().await;
    workspace.delete_document(id)?;
    info!("Deleted document {}.", id);
    Ok(Json(DocumentListResponse {
        documents: workspace.documents(),
    }))
}

//=========================================================================================
// Rendering
//=========================================================================================

/// The active document split into plain and highlighted runs.
#[utoipa::path(
    get,
    path = "/documents/active/segments",
    responses((status = 200, description = "Display runs", body = SegmentsResponse))
)]
pub async fn segments_handler(State(app_state): State<Arc<AppState>>) -> Json<SegmentsResponse> {
    let workspace = app_state.workspace.lock().await;
    let runs = workspace.segments().iter().map(RunView::from).collect();
    Json(SegmentsResponse { runs })
}

/// The summary and the highlights grouped by category.
#[utoipa::path(
    get,
    path = "/documents/active/sidebar",
    responses((status = 200, description = "Sidebar contents", body = SidebarResponse))
)]
pub async fn sidebar_handler(State(app_state): State<Arc<AppState>>) -> Json<SidebarResponse> {
    let workspace = app_state.workspace.lock().await;
    let buffer = &workspace.active().text;
    let groups = workspace
        .sidebar()
        .iter()
        .map(|group| SidebarGroup::of(group, buffer))
        .collect();
    Json(SidebarResponse {
        summary: workspace.active().summary.clone(),
        groups,
    })
}

//=========================================================================================
// Highlights
//=========================================================================================

/// Map a selected substring to offsets in the active document.
#[utoipa::path(
    post,
    path = "/documents/active/selection",
    request_body = SelectionRequest,
    responses((status = 200, description = "The resolved selection, if any", body = SelectionResponse))
)]
pub async fn selection_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<SelectionRequest>,
) -> Json<SelectionResponse> {
    let workspace = app_state.workspace.lock().await;
    Json(SelectionResponse {
        selection: workspace.select(&payload.selected_text),
    })
}

/// Highlight a resolved selection. Overlapping highlights are removed.
#[utoipa::path(
    post,
    path = "/documents/active/highlights",
    request_body = ManualHighlightRequest,
    responses(
        (status = 201, description = "Highlight created", body = ManualHighlightResponse),
        (status = 422, description = "The span does not match the document", body = ErrorBody)
    )
)]
pub async fn add_highlight_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ManualHighlightRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let selection = MappedSelection {
        text: payload.text,
        span: Span::new(payload.start_index, payload.end_index),
    };
    let category = payload.category.unwrap_or(HighlightCategory::Custom);

    let mut workspace = app_state.workspace.lock().await;
    let outcome = workspace.add_manual_highlight(&selection, category)?;
    let highlight = workspace
        .active()
        .highlights
        .iter()
        .find(|h| h.id == outcome.inserted)
        .cloned()
        .ok_or(WorkspaceError::HighlightNotFound(outcome.inserted))?;
    if !outcome.evicted.is_empty() {
        info!(
            "Manual highlight {} replaced {} overlapping highlights.",
            highlight.id,
            outcome.evicted.len()
        );
    }

    let response = ManualHighlightResponse {
        highlight,
        evicted: outcome.evicted.iter().map(|h| h.id).collect(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Remove every highlight and the summary from the active document.
#[utoipa::path(
    delete,
    path = "/documents/active/highlights",
    responses((status = 200, description = "Highlights cleared", body = DocumentResponse))
)]
pub async fn clear_highlights_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<DocumentResponse> {
    let mut workspace = app_state.workspace.lock().await;
    workspace.clear_highlights();
    Json(document_response(&workspace))
}

/// Remove one highlight from the active document.
#[utoipa::path(
    delete,
    path = "/documents/active/highlights/{id}",
    params(("id" = Uuid, Path, description = "Highlight to remove")),
    responses(
        (status = 200, description = "The removed highlight", body = HighlightResponse),
        (status = 404, description = "No such highlight", body = ErrorBody)
    )
)]
pub async fn delete_highlight_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<HighlightResponse>, ApiError> {
    let mut workspace = app_state.workspace.lock().await;
    let highlight = workspace.delete_highlight(id)?;
    Ok(Json(HighlightResponse { highlight }))
}

/// Set or clear the note attached to a highlight.
#[utoipa::path(
    put,
    path = "/documents/active/highlights/{id}/note",
    params(("id" = Uuid, Path, description = "Highlight to annotate")),
    request_body = NoteRequest,
    responses(
        (status = 200, description = "The annotated highlight", body = HighlightResponse),
        (status = 404, description = "No such highlight", body = ErrorBody)
    )
)]
pub async fn annotate_highlight_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NoteRequest>,
) -> Result<Json<HighlightResponse>, ApiError> {
    let mut workspace = app_state.workspace.lock().await;
    let highlight = workspace.annotate_highlight(id, payload.note)?.clone();
    Ok(Json(HighlightResponse { highlight }))
}

//=========================================================================================
// Oracle Round Trips
//=========================================================================================

/// Run AI analysis on the active document, replacing its highlights and summary.
#[utoipa::path(
    post,
    path = "/documents/active/analyze",
    responses(
        (status = 200, description = "Analysis applied", body = AnalyzeResponse),
        (status = 409, description = "An analysis is already running", body = ErrorBody),
        (status = 422, description = "The document is empty", body = ErrorBody),
        (status = 502, description = "The oracle failed", body = ErrorBody)
    )
)]
pub async fn analyze_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let report = analysis_process(app_state.clone()).await?;

    let workspace = app_state.workspace.lock().await;
    let document = workspace
        .document(report.document_id)
        .ok_or(WorkspaceError::DocumentNotFound(report.document_id))?;
    Ok(Json(AnalyzeResponse {
        document_id: report.document_id,
        summary: document.summary.clone(),
        highlights: document.highlights.clone(),
        dropped: report.dropped.iter().map(DroppedQuote::from).collect(),
    }))
}

/// Ask a question about the active document.
#[utoipa::path(
    post,
    path = "/documents/active/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "The oracle's answer", body = ChatResponse),
        (status = 409, description = "A question is already pending", body = ErrorBody),
        (status = 422, description = "Empty question or document", body = ErrorBody),
        (status = 502, description = "The oracle failed", body = ErrorBody)
    )
)]
pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = chat_process(app_state, payload.question).await?;
    Ok(Json(ChatResponse { message }))
}
