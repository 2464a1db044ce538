//! crates/luminary_core/src/segments.rs
//!
//! Turns a buffer and its highlight set into the ordered runs a display draws.
//! The runs cover the buffer exactly once, left to right.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Highlight, HighlightCategory};
use crate::span::{compare_by_start, floor_char_boundary, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RunKind {
    Plain,
    Highlighted {
        id: Uuid,
        category: HighlightCategory,
    },
}

/// A contiguous slice of the buffer with its display kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run<'a> {
    pub span: Span,
    pub text: &'a str,
    #[serde(flatten)]
    pub kind: RunKind,
}

impl<'a> Run<'a> {
    fn plain(text: &'a str, span: Span) -> Self {
        Self {
            span,
            text: &text[span.start..span.end],
            kind: RunKind::Plain,
        }
    }

    pub fn is_plain(&self) -> bool {
        self.kind == RunKind::Plain
    }
}

/// Segments `text` into plain and highlighted runs.
///
/// Assumes the highlight set is non-overlapping. Highlights past the end of the
/// buffer, reversed, or empty after clamping produce no run. Offsets left inside a
/// multi-byte char by an earlier edit are floored to the char boundary.
pub fn segment<'a>(text: &'a str, highlights: &[Highlight]) -> Vec<Run<'a>> {
    let mut sorted: Vec<&Highlight> = highlights.iter().collect();
    sorted.sort_by(|a, b| compare_by_start(&a.span(), &b.span()));

    let mut runs = Vec::with_capacity(sorted.len() * 2 + 1);
    let mut cursor = 0;

    for highlight in sorted {
        let end = floor_char_boundary(text, highlight.end_index);
        let start = floor_char_boundary(text, highlight.start_index).max(cursor);
        if start >= end {
            continue;
        }

        if start > cursor {
            runs.push(Run::plain(text, Span::new(cursor, start)));
        }
        runs.push(Run {
            span: Span::new(start, end),
            text: &text[start..end],
            kind: RunKind::Highlighted {
                id: highlight.id,
                category: highlight.category,
            },
        });
        cursor = end;
    }

    if cursor < text.len() {
        runs.push(Run::plain(text, Span::new(cursor, text.len())));
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hl(start: usize, end: usize, category: HighlightCategory) -> Highlight {
        Highlight::new("", category, Span::new(start, end))
    }

    fn shape(runs: &[Run<'_>]) -> Vec<(&'static str, String)> {
        runs.iter()
            .map(|r| {
                let tag = if r.is_plain() { "plain" } else { "hl" };
                (tag, r.text.to_string())
            })
            .collect()
    }

    #[test]
    fn no_highlights_is_one_plain_run() {
        let runs = segment("hello", &[]);
        assert_eq!(shape(&runs), vec![("plain", "hello".to_string())]);
    }

    #[test]
    fn empty_text_has_no_runs() {
        assert!(segment("", &[]).is_empty());
        assert!(segment("", &[hl(0, 3, HighlightCategory::Fact)]).is_empty());
    }

    #[test]
    fn gaps_are_filled_in_order_regardless_of_input_order() {
        let text = "cat sat on the mat";
        let highlights = [
            hl(15, 18, HighlightCategory::Warning),
            hl(0, 3, HighlightCategory::Fact),
        ];
        let runs = segment(text, &highlights);
        assert_eq!(
            shape(&runs),
            vec![
                ("hl", "cat".to_string()),
                ("plain", " sat on the ".to_string()),
                ("hl", "mat".to_string()),
            ]
        );
        assert_eq!(
            runs[2].kind,
            RunKind::Highlighted {
                id: highlights[0].id,
                category: HighlightCategory::Warning
            }
        );
    }

    #[test]
    fn touching_highlights_have_no_plain_run_between() {
        let runs = segment(
            "abcdef",
            &[hl(0, 3, HighlightCategory::Fact), hl(3, 6, HighlightCategory::Action)],
        );
        assert_eq!(runs.len(), 2);
        assert!(runs.iter().all(|r| !r.is_plain()));
        assert_eq!(runs[0].span, Span::new(0, 3));
        assert_eq!(runs[1].span, Span::new(3, 6));
    }

    #[test]
    fn out_of_bounds_highlight_is_skipped() {
        let runs = segment("short", &[hl(10, 20, HighlightCategory::Fact)]);
        assert_eq!(shape(&runs), vec![("plain", "short".to_string())]);
    }

    #[test]
    fn highlight_running_past_end_is_clamped() {
        let runs = segment("short", &[hl(2, 20, HighlightCategory::Fact)]);
        assert_eq!(
            shape(&runs),
            vec![("plain", "sh".to_string()), ("hl", "ort".to_string())]
        );
    }

    #[test]
    fn zero_length_highlight_emits_nothing() {
        let runs = segment("abc", &[hl(1, 1, HighlightCategory::Fact)]);
        assert_eq!(shape(&runs), vec![("plain", "abc".to_string())]);
    }

    #[test]
    fn reversed_highlight_is_skipped() {
        let text = "0123456789";
        let runs = segment(text, &[hl(8, 2, HighlightCategory::Fact)]);
        assert_eq!(shape(&runs), vec![("plain", text.to_string())]);
    }

    #[test]
    fn reversed_highlight_between_valid_ones_keeps_coverage() {
        let text = "0123456789";
        let runs = segment(
            text,
            &[
                hl(0, 2, HighlightCategory::Fact),
                hl(6, 3, HighlightCategory::Warning),
                hl(7, 9, HighlightCategory::Action),
            ],
        );
        let joined: String = runs.iter().map(|r| r.text).collect();
        assert_eq!(joined, text);
        assert_eq!(
            shape(&runs),
            vec![
                ("hl", "01".to_string()),
                ("plain", "23456".to_string()),
                ("hl", "78".to_string()),
                ("plain", "9".to_string()),
            ]
        );
    }

    #[test]
    fn offsets_inside_a_char_are_floored() {
        // 'é' occupies bytes 1..3; a stale highlight points into its middle.
        let text = "héllo";
        let runs = segment(text, &[hl(2, 3, HighlightCategory::Fact)]);
        let joined: String = runs.iter().map(|r| r.text).collect();
        assert_eq!(joined, text);
        assert_eq!(runs[1].text, "é");
    }

    #[test]
    fn overlapping_input_never_duplicates_text() {
        let text = "0123456789";
        let runs = segment(
            text,
            &[hl(0, 6, HighlightCategory::Fact), hl(4, 8, HighlightCategory::Action)],
        );
        let joined: String = runs.iter().map(|r| r.text).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn run_serializes_with_flattened_kind() {
        let highlight = hl(0, 3, HighlightCategory::Important);
        let runs = segment("cat sat", std::slice::from_ref(&highlight));
        let value = serde_json::to_value(&runs).expect("serialize");
        assert_eq!(value[0]["kind"], "highlighted");
        assert_eq!(value[0]["category"], "IMPORTANT");
        assert_eq!(value[0]["text"], "cat");
        assert_eq!(value[1]["kind"], "plain");
        assert_eq!(value[1]["span"]["start"], 3);
    }
}
