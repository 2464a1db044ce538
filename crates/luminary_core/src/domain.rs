//! crates/luminary_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These serialize losslessly as camelCase JSON, which is the only persisted
//! layout the application relies on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::span::Span;

/// Title shown for a document whose text is blank.
pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

const TITLE_CHARS: usize = 50;

/// The closed set of semantic categories a highlight can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HighlightCategory {
    Important,
    Fact,
    Action,
    Warning,
    Custom,
}

impl HighlightCategory {
    /// Display order for sidebar listings.
    pub const SIDEBAR_ORDER: [HighlightCategory; 5] = [
        HighlightCategory::Important,
        HighlightCategory::Warning,
        HighlightCategory::Action,
        HighlightCategory::Fact,
        HighlightCategory::Custom,
    ];

    /// Categories the analysis oracle is asked to assign. `Custom` is reserved
    /// for manual selections.
    pub const ORACLE_CATEGORIES: [HighlightCategory; 4] = [
        HighlightCategory::Important,
        HighlightCategory::Fact,
        HighlightCategory::Action,
        HighlightCategory::Warning,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HighlightCategory::Important => "IMPORTANT",
            HighlightCategory::Fact => "FACT",
            HighlightCategory::Action => "ACTION",
            HighlightCategory::Warning => "WARNING",
            HighlightCategory::Custom => "CUSTOM",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HighlightCategory::Important => "Key Insight",
            HighlightCategory::Fact => "Fact & Data",
            HighlightCategory::Action => "Action Item",
            HighlightCategory::Warning => "Critical",
            HighlightCategory::Custom => "User Highlight",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            HighlightCategory::Important => "Core ideas and main takeaways",
            HighlightCategory::Fact => "Statistics, dates, and verifiable facts",
            HighlightCategory::Action => "Tasks, steps, and required actions",
            HighlightCategory::Warning => "Risks, warnings, and limitations",
            HighlightCategory::Custom => "Manually selected text",
        }
    }
}

impl fmt::Display for HighlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown highlight category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for HighlightCategory {
    type Err = UnknownCategory;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        HighlightCategory::SIDEBAR_ORDER
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A category-tagged, non-overlapping span over a document's text.
///
/// `text` is a copy of the buffer slice taken at creation. It is never
/// re-synced; rendering always uses the offsets against the live buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: Uuid,
    pub text: String,
    pub category: HighlightCategory,
    pub start_index: usize,
    pub end_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Highlight {
    /// Creates a highlight with a fresh id.
    pub fn new(text: impl Into<String>, category: HighlightCategory, span: Span) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            category,
            start_index: span.start,
            end_index: span.end,
            note: None,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start_index, self.end_index)
    }

    /// The buffer was edited under this highlight: its live slice no longer
    /// matches the text captured at creation.
    pub fn is_stale(&self, buffer: &str) -> bool {
        self.span().slice(buffer) != Some(self.text.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Ai,
}

/// One turn of the question-answering chat over a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A session: one independent text buffer with its annotations and chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub text: String,
    pub highlights: Vec<Highlight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
    pub last_modified: DateTime<Utc>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            highlights: Vec::new(),
            summary: None,
            chat_history: Vec::new(),
            last_modified: Utc::now(),
        }
    }

    /// First characters of the trimmed text, or a placeholder for blank documents.
    pub fn title(&self) -> String {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            UNTITLED_DOCUMENT.to_string()
        } else {
            trimmed.chars().take(TITLE_CHARS).collect()
        }
    }

    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}
