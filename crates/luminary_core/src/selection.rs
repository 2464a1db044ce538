//! crates/luminary_core/src/selection.rs
//!
//! Maps a selected substring from a display surface back to buffer offsets.
//!
//! The display surface only hands over the selected text, so the mapping uses
//! the first occurrence of that text in the buffer. Selecting the second of two
//! identical passages resolves to the first one. This is an accepted limitation.

use serde::{Deserialize, Serialize};

use crate::span::Span;

/// A selection resolved to offsets in the canonical buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedSelection {
    pub text: String,
    pub span: Span,
}

/// Resolves `selected` to its first occurrence in `buffer`.
///
/// Returns `None` for an empty or whitespace-only selection, and for text that
/// does not occur in the buffer.
pub fn map_selection(buffer: &str, selected: &str) -> Option<MappedSelection> {
    if selected.trim().is_empty() {
        return None;
    }
    let start = buffer.find(selected)?;
    Some(MappedSelection {
        text: selected.to_string(),
        span: Span::at(start, selected),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn maps_to_offsets() {
        let mapped = map_selection("the quick fox", "quick").expect("mapped");
        assert_eq!(mapped.span, Span::new(4, 9));
        assert_eq!(mapped.text, "quick");
    }

    #[test]
    fn repeated_text_maps_to_first_occurrence() {
        let mapped = map_selection("cat sat cat", "cat").expect("mapped");
        assert_eq!(mapped.span, Span::new(0, 3));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    #[case("dog")]
    fn yields_no_selection(#[case] selected: &str) {
        assert_eq!(map_selection("cat sat  cat\n\t", selected), None);
    }

    #[test]
    fn offsets_are_bytes_on_char_boundaries() {
        let mapped = map_selection("über café", "café").expect("mapped");
        assert_eq!(mapped.span, Span::new(6, 11));
        assert_eq!(mapped.span.slice("über café"), Some("café"));
    }
}
