//! crates/luminary_core/src/listing.rs
//!
//! Sidebar-style views over a document's highlights and the document table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Document, Highlight, HighlightCategory};

/// Highlights of one category, in set order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup<'a> {
    pub category: HighlightCategory,
    pub highlights: Vec<&'a Highlight>,
}

/// Groups highlights by category in `HighlightCategory::SIDEBAR_ORDER`.
/// Categories with no highlights are left out.
pub fn group_by_category(highlights: &[Highlight]) -> Vec<CategoryGroup<'_>> {
    HighlightCategory::SIDEBAR_ORDER
        .iter()
        .filter_map(|&category| {
            let members: Vec<&Highlight> =
                highlights.iter().filter(|h| h.category == category).collect();
            (!members.is_empty()).then_some(CategoryGroup {
                category,
                highlights: members,
            })
        })
        .collect()
}

/// One row of the document history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: Uuid,
    pub title: String,
    pub highlight_count: usize,
    pub last_modified: DateTime<Utc>,
    pub active: bool,
}

impl DocumentSummary {
    pub fn of(document: &Document, active: bool) -> Self {
        Self {
            id: document.id,
            title: document.title(),
            highlight_count: document.highlights.len(),
            last_modified: document.last_modified,
            active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    fn groups_follow_sidebar_order_and_skip_empty() {
        let highlights = vec![
            Highlight::new("a", HighlightCategory::Fact, Span::new(0, 1)),
            Highlight::new("b", HighlightCategory::Custom, Span::new(1, 2)),
            Highlight::new("c", HighlightCategory::Important, Span::new(2, 3)),
            Highlight::new("d", HighlightCategory::Fact, Span::new(3, 4)),
        ];
        let groups = group_by_category(&highlights);
        let order: Vec<_> = groups.iter().map(|g| g.category).collect();
        assert_eq!(
            order,
            [
                HighlightCategory::Important,
                HighlightCategory::Fact,
                HighlightCategory::Custom
            ]
        );
        let facts: Vec<_> = groups[1].highlights.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(facts, ["a", "d"]);
    }

    #[test]
    fn no_highlights_no_groups() {
        assert!(group_by_category(&[]).is_empty());
    }
}
