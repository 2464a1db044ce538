//! crates/luminary_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the external text-analysis oracle.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of which AI provider answers the calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, HighlightCategory};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all oracle operations.
/// This abstracts away the specific errors from the provider (network, auth, parsing).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),
    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Oracle Payloads
//=========================================================================================

/// A quote the oracle suggests highlighting. `quote` is supposed to be verbatim
/// from the document, but nothing guarantees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteCandidate {
    pub quote: String,
    pub category: HighlightCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QuoteCandidate {
    pub fn new(quote: impl Into<String>, category: HighlightCategory) -> Self {
        Self {
            quote: quote.into(),
            category,
            explanation: None,
        }
    }
}

/// Everything one analysis call returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub highlights: Vec<QuoteCandidate>,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AnalysisOracle: Send + Sync {
    /// Summarizes the document and suggests categorized quotes from it.
    async fn analyze(&self, document_text: &str) -> PortResult<AnalysisResult>;
}

#[async_trait]
pub trait ChatOracle: Send + Sync {
    /// Answers a question about the document. `history` is the bounded window of
    /// prior turns the caller chose to supply.
    async fn chat(
        &self,
        document_text: &str,
        question: &str,
        history: &[ChatMessage],
    ) -> PortResult<String>;
}
