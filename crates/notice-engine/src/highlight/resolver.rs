//! Longest-match span resolution
//!
//! Terms are tried longest first, so a full name claims its text before any
//! fragment of it is tried. A later occurrence may still displace spans it
//! fully contains; any other overlap is rejected.

use shared_types::{CandidateTerm, HighlightSpan};

use crate::matcher::{Boundary, FoldedText};

/// Disjoint spans accepted so far, kept sorted by start
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanLayout {
    spans: Vec<HighlightSpan>,
}

impl SpanLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a span. Accepted if it overlaps nothing, or if it fully contains
    /// every span it overlaps (those are removed). Returns whether it was kept.
    pub fn offer(&mut self, start: usize, end: usize, term: &str) -> bool {
        if start >= end {
            return false;
        }

        let overlapping: Vec<usize> = self
            .spans
            .iter()
            .enumerate()
            .filter(|(_, s)| s.overlaps(start, end))
            .map(|(i, _)| i)
            .collect();

        if overlapping
            .iter()
            .any(|&i| !self.spans[i].is_within(start, end))
        {
            return false;
        }

        for i in overlapping.into_iter().rev() {
            self.spans.remove(i);
        }

        let at = self.spans.partition_point(|s| s.start < start);
        self.spans.insert(
            at,
            HighlightSpan {
                start,
                end,
                term: term.to_string(),
            },
        );
        true
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn spans(&self) -> &[HighlightSpan] {
        &self.spans
    }

    pub fn into_spans(self) -> Vec<HighlightSpan> {
        self.spans
    }
}

/// Resolves a term set against paragraph text
#[derive(Debug, Clone)]
pub struct SpanResolver {
    terms: Vec<String>,
    boundary: Boundary,
}

impl SpanResolver {
    /// `whole_word` restricts matches to occurrences not glued to letters or digits
    pub fn new<'a, I>(terms: I, whole_word: bool) -> Self
    where
        I: IntoIterator<Item = &'a CandidateTerm>,
    {
        let mut terms: Vec<String> = terms
            .into_iter()
            .map(|t| t.text.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        // Stable: equal lengths keep discovery order
        terms.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));

        Self {
            terms,
            boundary: if whole_word {
                Boundary::Both
            } else {
                Boundary::None
            },
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Sorted, disjoint highlight spans for one paragraph's normalized text
    pub fn resolve(&self, text: &str) -> Vec<HighlightSpan> {
        if text.is_empty() || self.terms.is_empty() {
            return Vec::new();
        }

        let folded = FoldedText::new(text);
        let mut layout = SpanLayout::new();
        for term in &self.terms {
            for (start, end) in folded.find_all(term, self.boundary) {
                layout.offer(start, end, term);
            }
        }
        layout.into_spans()
    }
}
