//! crates/luminary_core/src/workspace.rs
//!
//! The session context: a table of documents plus exactly one live, active
//! document. Switching documents moves the live document back into the table
//! and takes the target out of it in one step.
//!
//! Oracle calls are split into `begin_*` and `finish_*`. The caller releases the
//! workspace while the oracle works, so each `begin_*` hands out a ticket tagged
//! with the originating document. `finish_*` applies the result to that document
//! wherever it lives by then, or discards it if the document was deleted.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{ChatMessage, ChatRole, Document, Highlight, HighlightCategory};
use crate::listing::{group_by_category, CategoryGroup, DocumentSummary};
use crate::ports::{AnalysisResult, PortError, PortResult};
use crate::reconciler::{self, DroppedCandidate, ManualOutcome, ReconcileError};
use crate::segments::{segment, Run};
use crate::selection::{map_selection, MappedSelection};

/// Message recorded when an analysis call fails.
pub const ANALYSIS_FAILED: &str =
    "Failed to analyze text. Please check your API key or try again.";
/// Message recorded when a chat call fails.
pub const CHAT_FAILED: &str = "Failed to get an answer. Please check your API key or try again.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),
    #[error("Highlight not found: {0}")]
    HighlightNotFound(Uuid),
    #[error("The last remaining document cannot be deleted")]
    LastDocument,
    #[error("The document is empty")]
    EmptyDocument,
    #[error("The question is empty")]
    EmptyQuestion,
    #[error("An analysis is already in progress")]
    AnalysisInFlight,
    #[error("A chat request is already in progress")]
    ChatInFlight,
    #[error("Invalid highlight: {0}")]
    Reconcile(#[from] ReconcileError),
    #[error("{0}")]
    Oracle(#[from] PortError),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// In-flight flags and the last user-visible failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingState {
    pub is_analyzing: bool,
    pub is_chat_loading: bool,
    pub error: Option<String>,
}

/// Snapshot handed to an analysis call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub document_id: Uuid,
    pub text: String,
}

/// What a finished analysis did to its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    pub document_id: Uuid,
    pub accepted: usize,
    pub dropped: Vec<DroppedCandidate>,
}

/// Snapshot handed to a chat call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTicket {
    pub document_id: Uuid,
    pub text: String,
    pub question: ChatMessage,
    /// Most recent prior turns, oldest first.
    pub history: Vec<ChatMessage>,
}

#[derive(Debug)]
pub struct Workspace {
    active: Document,
    stored: HashMap<Uuid, Document>,
    /// Creation order of every document, active included.
    order: Vec<Uuid>,
    analyzing: Option<Uuid>,
    chatting: Option<Uuid>,
    last_error: Option<String>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// A workspace holding one empty document.
    pub fn new() -> Self {
        Self::with_seed("")
    }

    /// A workspace holding one document seeded with `text`.
    pub fn with_seed(text: impl Into<String>) -> Self {
        let active = Document::new(text);
        Self {
            order: vec![active.id],
            active,
            stored: HashMap::new(),
            analyzing: None,
            chatting: None,
            last_error: None,
        }
    }

    //=====================================================================================
    // Document collection
    //=====================================================================================

    pub fn active(&self) -> &Document {
        &self.active
    }

    pub fn active_id(&self) -> Uuid {
        self.active.id
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn document(&self, id: Uuid) -> Option<&Document> {
        if id == self.active.id {
            Some(&self.active)
        } else {
            self.stored.get(&id)
        }
    }

    fn document_mut(&mut self, id: Uuid) -> Option<&mut Document> {
        if id == self.active.id {
            Some(&mut self.active)
        } else {
            self.stored.get_mut(&id)
        }
    }

    /// Every document, in creation order.
    pub fn snapshot(&self) -> Vec<Document> {
        self.order
            .iter()
            .filter_map(|id| self.document(*id))
            .cloned()
            .collect()
    }

    /// Document history rows, most recently modified first.
    pub fn documents(&self) -> Vec<DocumentSummary> {
        let mut rows: Vec<DocumentSummary> = self
            .order
            .iter()
            .filter_map(|id| self.document(*id))
            .map(|doc| DocumentSummary::of(doc, doc.id == self.active.id))
            .collect();
        rows.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        rows
    }

    /// Creates a document and makes it active.
    pub fn create_document(&mut self, text: impl Into<String>) -> Uuid {
        let document = Document::new(text);
        let id = document.id;
        self.order.push(id);
        self.activate(document);
        id
    }

    /// Makes `id` the active document.
    pub fn switch_document(&mut self, id: Uuid) -> WorkspaceResult<()> {
        if id == self.active.id {
            return Ok(());
        }
        let target = self
            .stored
            .remove(&id)
            .ok_or(WorkspaceError::DocumentNotFound(id))?;
        self.activate(target);
        Ok(())
    }

    fn activate(&mut self, document: Document) {
        let previous = std::mem::replace(&mut self.active, document);
        self.stored.insert(previous.id, previous);
    }

    /// Deletes a document. The last remaining document is never deleted.
    /// Deleting the active document activates the oldest remaining one.
    pub fn delete_document(&mut self, id: Uuid) -> WorkspaceResult<()> {
        if self.document(id).is_none() {
            return Err(WorkspaceError::DocumentNotFound(id));
        }
        if self.order.len() <= 1 {
            return Err(WorkspaceError::LastDocument);
        }

        self.order.retain(|other| *other != id);
        if id == self.active.id {
            let fallback = self.order[0];
            if let Some(next) = self.stored.remove(&fallback) {
                // The deleted document is dropped rather than flushed.
                self.active = next;
            }
        } else {
            self.stored.remove(&id);
        }
        Ok(())
    }

    //=====================================================================================
    // Active document editing
    //=====================================================================================

    /// Replaces the active buffer. Highlight offsets are not rebased, so
    /// highlights under edited text go stale.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.active.text != text {
            self.active.text = text;
            self.active.touch();
        }
    }

    /// Maps a selected substring to offsets in the active buffer.
    pub fn select(&self, selected: &str) -> Option<MappedSelection> {
        map_selection(&self.active.text, selected)
    }

    pub fn add_manual_highlight(
        &mut self,
        selection: &MappedSelection,
        category: HighlightCategory,
    ) -> WorkspaceResult<ManualOutcome> {
        let doc = &mut self.active;
        let outcome = reconciler::insert_manual(&mut doc.highlights, &doc.text, selection, category)?;
        doc.touch();
        Ok(outcome)
    }

    pub fn delete_highlight(&mut self, id: Uuid) -> WorkspaceResult<Highlight> {
        let removed = reconciler::remove_highlight(&mut self.active.highlights, id)
            .ok_or(WorkspaceError::HighlightNotFound(id))?;
        self.active.touch();
        Ok(removed)
    }

    pub fn annotate_highlight(&mut self, id: Uuid, note: Option<String>) -> WorkspaceResult<&Highlight> {
        let doc = &mut self.active;
        let index = doc
            .highlights
            .iter()
            .position(|h| h.id == id)
            .ok_or(WorkspaceError::HighlightNotFound(id))?;
        doc.highlights[index].note = note.filter(|n| !n.trim().is_empty());
        doc.touch();
        Ok(&doc.highlights[index])
    }

    /// Drops every highlight and the summary derived from them.
    pub fn clear_highlights(&mut self) {
        let doc = &mut self.active;
        if !doc.highlights.is_empty() || doc.summary.is_some() {
            doc.highlights.clear();
            doc.summary = None;
            doc.touch();
        }
    }

    pub fn segments(&self) -> Vec<Run<'_>> {
        segment(&self.active.text, &self.active.highlights)
    }

    pub fn sidebar(&self) -> Vec<CategoryGroup<'_>> {
        group_by_category(&self.active.highlights)
    }

    //=====================================================================================
    // Oracle round trips
    //=====================================================================================

    pub fn processing(&self) -> ProcessingState {
        ProcessingState {
            is_analyzing: self.analyzing.is_some(),
            is_chat_loading: self.chatting.is_some(),
            error: self.last_error.clone(),
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Starts an analysis of the active document.
    ///
    /// Prior highlights and summary are cleared here, before the oracle is
    /// called, so a failed call leaves the document with no annotations.
    pub fn begin_analysis(&mut self) -> WorkspaceResult<AnalysisTicket> {
        if self.active.text.trim().is_empty() {
            return Err(WorkspaceError::EmptyDocument);
        }
        if self.analyzing.is_some() {
            return Err(WorkspaceError::AnalysisInFlight);
        }

        self.last_error = None;
        self.analyzing = Some(self.active.id);
        self.active.highlights.clear();
        self.active.summary = None;
        self.active.touch();

        Ok(AnalysisTicket {
            document_id: self.active.id,
            text: self.active.text.clone(),
        })
    }

    /// Applies the oracle's answer to the ticket's document in one step.
    ///
    /// Quotes are resolved against the document's current text, which may have
    /// been edited while the oracle was working.
    pub fn finish_analysis(
        &mut self,
        ticket: &AnalysisTicket,
        result: PortResult<AnalysisResult>,
    ) -> WorkspaceResult<AnalysisReport> {
        if self.analyzing == Some(ticket.document_id) {
            self.analyzing = None;
        }

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                self.last_error = Some(ANALYSIS_FAILED.to_string());
                return Err(e.into());
            }
        };

        let doc = self
            .document_mut(ticket.document_id)
            .ok_or(WorkspaceError::DocumentNotFound(ticket.document_id))?;
        let batch = reconciler::reconcile_analysis(&doc.text, &result.highlights);
        let accepted = batch.highlights.len();
        doc.highlights = batch.highlights;
        doc.summary = Some(result.summary);
        doc.touch();

        Ok(AnalysisReport {
            document_id: ticket.document_id,
            accepted,
            dropped: batch.dropped,
        })
    }

    /// Starts a chat turn on the active document, handing over at most `window`
    /// prior messages.
    pub fn begin_chat(&mut self, question: &str, window: usize) -> WorkspaceResult<ChatTicket> {
        if self.active.text.trim().is_empty() {
            return Err(WorkspaceError::EmptyDocument);
        }
        if question.trim().is_empty() {
            return Err(WorkspaceError::EmptyQuestion);
        }
        if self.chatting.is_some() {
            return Err(WorkspaceError::ChatInFlight);
        }

        self.last_error = None;
        self.chatting = Some(self.active.id);

        let history = &self.active.chat_history;
        let skip = history.len().saturating_sub(window);
        Ok(ChatTicket {
            document_id: self.active.id,
            text: self.active.text.clone(),
            question: ChatMessage::new(ChatRole::User, question),
            history: history[skip..].to_vec(),
        })
    }

    /// Appends the question and the answer to the ticket's document. On failure
    /// the history is left as it was.
    pub fn finish_chat(
        &mut self,
        ticket: ChatTicket,
        result: PortResult<String>,
    ) -> WorkspaceResult<ChatMessage> {
        if self.chatting == Some(ticket.document_id) {
            self.chatting = None;
        }

        let answer = match result {
            Ok(answer) => answer,
            Err(e) => {
                self.last_error = Some(CHAT_FAILED.to_string());
                return Err(e.into());
            }
        };

        let doc = self
            .document_mut(ticket.document_id)
            .ok_or(WorkspaceError::DocumentNotFound(ticket.document_id))?;
        let reply = ChatMessage::new(ChatRole::Ai, answer);
        doc.chat_history.push(ticket.question);
        doc.chat_history.push(reply.clone());
        doc.touch();
        Ok(reply)
    }
}
