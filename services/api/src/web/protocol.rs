//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser client and the API
//! server. Core types that have no schema of their own are documented as
//! plain objects.

use luminary_core::{
    domain::{ChatMessage, Document, Highlight, HighlightCategory},
    listing::{CategoryGroup, DocumentSummary},
    reconciler::DroppedCandidate,
    segments::{Run, RunKind},
    selection::MappedSelection,
    workspace::ProcessingState,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Payloads Sent FROM the Client (Browser) TO the Server
//=========================================================================================

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct CreateDocumentRequest {
    /// Optional seed text for the new document.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UpdateTextRequest {
    pub text: String,
}

/// A substring the user selected on the rendered document.
#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    pub selected_text: String,
}

/// A resolved selection to turn into a highlight.
#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualHighlightRequest {
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
    /// Defaults to `CUSTOM`.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub category: Option<HighlightCategory>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct NoteRequest {
    /// A blank or missing note clears it.
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ChatRequest {
    pub question: String,
}

//=========================================================================================
// Payloads Sent FROM the Server TO the Client (Browser)
//=========================================================================================

#[derive(Serialize, Debug, ToSchema)]
pub struct CategoryInfo {
    pub category: String,
    pub label: String,
    pub description: String,
}

impl From<HighlightCategory> for CategoryInfo {
    fn from(category: HighlightCategory) -> Self {
        Self {
            category: category.as_str().to_string(),
            label: category.label().to_string(),
            description: category.description().to_string(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct DocumentListResponse {
    #[schema(value_type = Vec<Object>)]
    pub documents: Vec<DocumentSummary>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct DocumentResponse {
    #[schema(value_type = Object)]
    pub document: Document,
    #[schema(value_type = Object)]
    pub processing: ProcessingState,
}

/// One display run. `highlightId` and `category` are set on highlighted runs.
#[derive(Serialize, Debug, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunView {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub highlighted: bool,
    pub highlight_id: Option<Uuid>,
    pub category: Option<String>,
}

impl From<&Run<'_>> for RunView {
    fn from(run: &Run<'_>) -> Self {
        let (highlight_id, category) = match run.kind {
            RunKind::Plain => (None, None),
            RunKind::Highlighted { id, category } => {
                (Some(id), Some(category.as_str().to_string()))
            }
        };
        Self {
            start: run.span.start,
            end: run.span.end,
            text: run.text.to_string(),
            highlighted: highlight_id.is_some(),
            highlight_id,
            category,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct SegmentsResponse {
    pub runs: Vec<RunView>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SidebarEntry {
    pub id: Uuid,
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
    pub note: Option<String>,
    /// The buffer under this highlight was edited after it was created.
    pub stale: bool,
}

impl SidebarEntry {
    pub fn of(highlight: &Highlight, buffer: &str) -> Self {
        Self {
            id: highlight.id,
            text: highlight.text.clone(),
            start_index: highlight.start_index,
            end_index: highlight.end_index,
            note: highlight.note.clone(),
            stale: highlight.is_stale(buffer),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct SidebarGroup {
    pub category: CategoryInfo,
    pub highlights: Vec<SidebarEntry>,
}

impl SidebarGroup {
    pub fn of(group: &CategoryGroup<'_>, buffer: &str) -> Self {
        Self {
            category: group.category.into(),
            highlights: group
                .highlights
                .iter()
                .map(|h| SidebarEntry::of(h, buffer))
                .collect(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct SidebarResponse {
    pub summary: Option<String>,
    pub groups: Vec<SidebarGroup>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct SelectionResponse {
    /// `null` when the selection is blank or not found in the document.
    #[schema(value_type = Option<Object>)]
    pub selection: Option<MappedSelection>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ManualHighlightResponse {
    #[schema(value_type = Object)]
    pub highlight: Highlight,
    pub evicted: Vec<Uuid>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct HighlightResponse {
    #[schema(value_type = Object)]
    pub highlight: Highlight,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct DroppedQuote {
    pub quote: String,
    pub category: String,
    pub reason: String,
}

impl From<&DroppedCandidate> for DroppedQuote {
    fn from(dropped: &DroppedCandidate) -> Self {
        Self {
            quote: dropped.candidate.quote.clone(),
            category: dropped.candidate.category.as_str().to_string(),
            reason: format!("{:?}", dropped.reason),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub document_id: Uuid,
    pub summary: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub highlights: Vec<Highlight>,
    pub dropped: Vec<DroppedQuote>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ChatResponse {
    #[schema(value_type = Object)]
    pub message: ChatMessage,
}
