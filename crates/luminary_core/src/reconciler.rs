//! crates/luminary_core/src/reconciler.rs
//!
//! Merges candidate spans into a document's highlight set while keeping the set
//! free of overlaps. Both insertion paths use `Span::overlaps`; they differ only
//! in policy. Oracle candidates lose on conflict and are dropped. A manual
//! selection wins and evicts whatever it collides with.

use uuid::Uuid;

use crate::domain::{Highlight, HighlightCategory};
use crate::ports::QuoteCandidate;
use crate::selection::MappedSelection;
use crate::span::Span;

/// A manual span that cannot become a highlight.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("span {start}..{end} is empty or outside a buffer of {len} bytes")]
    InvalidSpan { start: usize, end: usize, len: usize },
    #[error("offset {0} does not fall on a character boundary")]
    NotCharBoundary(usize),
    #[error("selected text no longer matches the buffer at {start}..{end}")]
    SelectionMismatch { start: usize, end: usize },
}

/// Why an oracle candidate did not make it into the highlight set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The quote does not occur verbatim in the buffer.
    QuoteNotFound,
    /// The quote resolves to an empty span.
    InvalidSpan,
    /// The quote collides with a highlight accepted earlier in the batch.
    Overlap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedCandidate {
    pub candidate: QuoteCandidate,
    pub reason: DropReason,
}

/// The outcome of one analysis batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Accepted highlights in discovery order. Replaces the prior set.
    pub highlights: Vec<Highlight>,
    pub dropped: Vec<DroppedCandidate>,
}

/// Resolves oracle quotes against `text` into a fresh, non-overlapping set.
///
/// Every quote resolves to its first occurrence, searched from the start of the
/// buffer. A quote repeated by the oracle therefore lands on the same span twice
/// and the repeat is dropped as an overlap.
pub fn reconcile_analysis(text: &str, candidates: &[QuoteCandidate]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for candidate in candidates {
        let reason = match text.find(&candidate.quote) {
            None => Some(DropReason::QuoteNotFound),
            Some(index) => {
                let span = Span::at(index, &candidate.quote);
                if span.is_empty() {
                    Some(DropReason::InvalidSpan)
                } else if outcome.highlights.iter().any(|h| h.span().overlaps(&span)) {
                    Some(DropReason::Overlap)
                } else {
                    outcome.highlights.push(Highlight::new(
                        candidate.quote.clone(),
                        candidate.category,
                        span,
                    ));
                    None
                }
            }
        };

        if let Some(reason) = reason {
            outcome.dropped.push(DroppedCandidate {
                candidate: candidate.clone(),
                reason,
            });
        }
    }

    outcome
}

/// Result of a manual insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualOutcome {
    pub inserted: Uuid,
    pub evicted: Vec<Highlight>,
}

/// Checks that `span` is a valid highlight range over `text`.
pub fn validate_span(text: &str, span: Span) -> Result<(), ReconcileError> {
    if !span.fits(text.len()) {
        return Err(ReconcileError::InvalidSpan {
            start: span.start,
            end: span.end,
            len: text.len(),
        });
    }
    for offset in [span.start, span.end] {
        if !text.is_char_boundary(offset) {
            return Err(ReconcileError::NotCharBoundary(offset));
        }
    }
    Ok(())
}

/// Inserts a user selection, evicting every highlight it overlaps.
///
/// On error `highlights` is left untouched.
pub fn insert_manual(
    highlights: &mut Vec<Highlight>,
    text: &str,
    selection: &MappedSelection,
    category: HighlightCategory,
) -> Result<ManualOutcome, ReconcileError> {
    let span = selection.span;
    validate_span(text, span)?;
    if span.slice(text) != Some(selection.text.as_str()) {
        return Err(ReconcileError::SelectionMismatch {
            start: span.start,
            end: span.end,
        });
    }

    let (evicted, kept): (Vec<_>, Vec<_>) = std::mem::take(highlights)
        .into_iter()
        .partition(|h| h.span().overlaps(&span));
    *highlights = kept;

    let highlight = Highlight::new(selection.text.clone(), category, span);
    let inserted = highlight.id;
    highlights.push(highlight);

    Ok(ManualOutcome { inserted, evicted })
}

/// Removes the highlight with `id`, returning it.
pub fn remove_highlight(highlights: &mut Vec<Highlight>, id: Uuid) -> Option<Highlight> {
    let position = highlights.iter().position(|h| h.id == id)?;
    Some(highlights.remove(position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn candidate(quote: &str, category: HighlightCategory) -> QuoteCandidate {
        QuoteCandidate::new(quote, category)
    }

    fn manual(text: &str, start: usize, end: usize) -> MappedSelection {
        MappedSelection {
            text: text.to_string(),
            span: Span::new(start, end),
        }
    }

    #[test]
    fn quote_resolves_to_first_occurrence() {
        let outcome = reconcile_analysis(
            "cat sat cat",
            &[candidate("cat", HighlightCategory::Important)],
        );
        assert_eq!(outcome.highlights.len(), 1);
        assert_eq!(outcome.highlights[0].span(), Span::new(0, 3));
    }

    #[test]
    fn batch_rejects_candidate_overlapping_earlier_acceptance() {
        let outcome = reconcile_analysis(
            "cat sat cat",
            &[
                candidate("cat", HighlightCategory::Important),
                candidate("cat sat", HighlightCategory::Fact),
            ],
        );
        assert_eq!(outcome.highlights.len(), 1);
        assert_eq!(outcome.highlights[0].category, HighlightCategory::Important);
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(outcome.dropped[0].reason, DropReason::Overlap);
        assert_eq!(outcome.dropped[0].candidate.quote, "cat sat");
    }

    #[test]
    fn repeated_quote_is_dropped_not_moved_to_second_occurrence() {
        let outcome = reconcile_analysis(
            "cat sat cat",
            &[
                candidate("cat", HighlightCategory::Important),
                candidate("cat", HighlightCategory::Warning),
            ],
        );
        assert_eq!(outcome.highlights.len(), 1);
        assert_eq!(outcome.highlights[0].span(), Span::new(0, 3));
        assert_eq!(outcome.dropped[0].reason, DropReason::Overlap);
    }

    #[test]
    fn later_candidate_containing_earlier_one_is_dropped() {
        // "sat" is accepted first; "cat sat cat" fully contains it.
        let outcome = reconcile_analysis(
            "cat sat cat",
            &[
                candidate("sat", HighlightCategory::Fact),
                candidate("cat sat cat", HighlightCategory::Important),
            ],
        );
        assert_eq!(outcome.highlights.len(), 1);
        assert_eq!(outcome.highlights[0].text, "sat");
    }

    #[rstest]
    #[case("dog", DropReason::QuoteNotFound)]
    #[case("", DropReason::InvalidSpan)]
    fn unusable_quotes_are_dropped_silently(#[case] quote: &str, #[case] reason: DropReason) {
        let outcome = reconcile_analysis(
            "cat sat cat",
            &[
                candidate(quote, HighlightCategory::Fact),
                candidate("sat", HighlightCategory::Action),
            ],
        );
        assert_eq!(outcome.highlights.len(), 1);
        assert_eq!(outcome.highlights[0].span(), Span::new(4, 7));
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(outcome.dropped[0].reason, reason);
    }

    #[test]
    fn touching_quotes_are_both_accepted() {
        let outcome = reconcile_analysis(
            "abcdef",
            &[
                candidate("abc", HighlightCategory::Fact),
                candidate("def", HighlightCategory::Action),
            ],
        );
        assert_eq!(outcome.highlights.len(), 2);
        assert!(outcome.dropped.is_empty());
    }

    #[test]
    fn accepted_highlights_get_distinct_ids_in_discovery_order() {
        let outcome = reconcile_analysis(
            "alpha beta gamma",
            &[
                candidate("gamma", HighlightCategory::Fact),
                candidate("alpha", HighlightCategory::Fact),
            ],
        );
        let texts: Vec<_> = outcome.highlights.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, ["gamma", "alpha"]);
        assert_ne!(outcome.highlights[0].id, outcome.highlights[1].id);
    }

    #[test]
    fn manual_selection_evicts_overlapping_highlight() {
        let text = "cat sat cat";
        let mut highlights = vec![Highlight::new("cat", HighlightCategory::Fact, Span::new(0, 3))];
        let outcome = insert_manual(
            &mut highlights,
            text,
            &manual("cat sat", 0, 7),
            HighlightCategory::Custom,
        )
        .expect("valid selection");

        assert_eq!(outcome.evicted.len(), 1);
        assert_eq!(outcome.evicted[0].category, HighlightCategory::Fact);
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].category, HighlightCategory::Custom);
        assert_eq!(highlights[0].span(), Span::new(0, 7));
        assert_eq!(highlights[0].id, outcome.inserted);
    }

    #[rstest]
    #[case::start_inside(Span::new(2, 6))]
    #[case::end_inside(Span::new(0, 5))]
    #[case::contains_old(Span::new(3, 9))]
    #[case::inside_old(Span::new(5, 6))]
    fn manual_eviction_covers_every_overlap_shape(#[case] span: Span) {
        let text = "0123456789";
        let mut highlights = vec![Highlight::new("4567", HighlightCategory::Fact, Span::new(4, 8))];
        let selection = MappedSelection {
            text: text[span.start..span.end].to_string(),
            span,
        };
        let outcome =
            insert_manual(&mut highlights, text, &selection, HighlightCategory::Custom).expect("valid");
        assert_eq!(outcome.evicted.len(), 1);
        assert_eq!(highlights.len(), 1);
    }

    #[test]
    fn manual_selection_keeps_touching_neighbours() {
        let text = "0123456789";
        let mut highlights = vec![
            Highlight::new("012", HighlightCategory::Fact, Span::new(0, 3)),
            Highlight::new("789", HighlightCategory::Action, Span::new(7, 10)),
        ];
        let outcome = insert_manual(
            &mut highlights,
            text,
            &manual("3456", 3, 7),
            HighlightCategory::Custom,
        )
        .expect("valid");
        assert!(outcome.evicted.is_empty());
        assert_eq!(highlights.len(), 3);
    }

    #[rstest]
    #[case::empty(manual("", 3, 3))]
    #[case::reversed(manual("", 5, 2))]
    #[case::past_end(manual("sat cat!", 4, 12))]
    #[case::mismatch(manual("dog", 0, 3))]
    fn invalid_manual_selection_leaves_set_untouched(#[case] selection: MappedSelection) {
        let text = "cat sat cat";
        let original = vec![Highlight::new("sat", HighlightCategory::Fact, Span::new(4, 7))];
        let mut highlights = original.clone();
        let result = insert_manual(&mut highlights, text, &selection, HighlightCategory::Custom);
        assert!(result.is_err());
        assert_eq!(highlights, original);
    }

    #[test]
    fn manual_span_splitting_a_char_is_rejected() {
        let text = "añb";
        let mut highlights = Vec::new();
        let err = insert_manual(&mut highlights, text, &manual("a", 0, 2), HighlightCategory::Custom)
            .expect_err("split char");
        assert_eq!(err, ReconcileError::NotCharBoundary(2));
        assert!(highlights.is_empty());
    }

    #[test]
    fn remove_by_id() {
        let mut highlights = vec![
            Highlight::new("cat", HighlightCategory::Fact, Span::new(0, 3)),
            Highlight::new("sat", HighlightCategory::Fact, Span::new(4, 7)),
        ];
        let id = highlights[0].id;
        let removed = remove_highlight(&mut highlights, id).expect("present");
        assert_eq!(removed.text, "cat");
        assert_eq!(highlights.len(), 1);
        assert!(remove_highlight(&mut highlights, id).is_none());
    }
}
