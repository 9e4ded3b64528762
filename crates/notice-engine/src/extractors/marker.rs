//! Role-marker windows
//!
//! Every occurrence of a role marker ("Parte(s):", "Apelante:") opens a
//! window that runs to the nearest stop-token or attorney registration
//! number. A registration number also opens a continuation window for the
//! same marker, so "A OAB SP-1 B OAB SP-2" yields both names. Windows are
//! handed to the [`Shredder`].

use shared_types::{CandidateTerm, SkipReason, TermSource};
use tracing::debug;

use crate::extractors::shredder::{trim_piece, Shredder};
use crate::matcher::{Boundary, FoldedText};
use crate::patterns::{ATTORNEY_REGISTRATION, DOCUMENT_ID};
use crate::ruleset::Ruleset;
use crate::validator::TermValidator;

pub type CandidateList = Vec<CandidateTerm>;

#[derive(Debug, Clone)]
struct Marker {
    label: String,
    source: TermSource,
    open_ended: bool,
}

/// A marker window located in a publication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerWindow {
    pub label: String,
    pub source: TermSource,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Extracts candidates from role-marker windows
#[derive(Debug, Clone)]
pub struct MarkerExtractor {
    markers: Vec<Marker>,
    terminators: Vec<String>,
    guard_words: Vec<String>,
    shredder: Shredder,
    validator: TermValidator,
}

impl MarkerExtractor {
    pub fn new(ruleset: &Ruleset) -> Self {
        Self {
            markers: ruleset
                .role_markers
                .iter()
                .map(|m| Marker {
                    label: m.label.trim().to_string(),
                    source: m.source(),
                    open_ended: ruleset.is_open_ended(m),
                })
                .collect(),
            terminators: ruleset
                .window_terminators()
                .into_iter()
                .map(|t| t.trim().to_string())
                .collect(),
            guard_words: ruleset
                .syntax_guard_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
            shredder: Shredder::new(ruleset),
            validator: TermValidator::new(ruleset),
        }
    }

    pub fn validator(&self) -> &TermValidator {
        &self.validator
    }

    /// Nearest window terminator at or after byte offset `from`
    fn window_end(&self, folded: &FoldedText<'_>, from: usize) -> Option<usize> {
        let text = folded.as_str();
        let stop = self
            .terminators
            .iter()
            .filter_map(|t| folded.find(t, from, Boundary::Both).map(|(start, _)| start))
            .min();
        let document_id = DOCUMENT_ID.find_at(text, from).map(|m| m.start());
        let registration = ATTORNEY_REGISTRATION.find_at(text, from).map(|m| m.start());

        [stop, document_id, registration].into_iter().flatten().min()
    }

    /// Where a continuation window starts when a registration number
    /// begins exactly at `at`: past the number and whatever is glued to it
    fn after_registration(text: &str, at: usize) -> Option<usize> {
        let found = ATTORNEY_REGISTRATION.find_at(text, at)?;
        if found.start() != at {
            return None;
        }
        let rest = &text[found.end()..];
        let glued = rest.find(char::is_whitespace).unwrap_or(rest.len());
        Some(found.end() + glued)
    }

    fn window(marker: &Marker, text: &str, start: usize, end: usize) -> MarkerWindow {
        MarkerWindow {
            label: marker.label.clone(),
            source: marker.source.clone(),
            start,
            end,
            text: trim_piece(&text[start..end]).to_string(),
        }
    }

    fn opens_with_guard_word(&self, window: &str) -> bool {
        window
            .split_whitespace()
            .next()
            .map(|w| w.trim_end_matches([',', ';', ':', '.']).to_lowercase())
            .is_some_and(|w| self.guard_words.contains(&w))
    }

    /// Windows of every marker occurrence, in marker order then position.
    /// Unterminated windows of closed-list markers are left out. The count
    /// is of marker occurrences, not of continuation windows.
    pub fn windows(&self, text: &str) -> (usize, Vec<MarkerWindow>) {
        let folded = FoldedText::new(text);
        let mut occurrences = 0;
        let mut windows = Vec::new();

        for marker in &self.markers {
            for (_, content_start) in folded.find_all(&marker.label, Boundary::Start) {
                occurrences += 1;
                let end = match self.window_end(&folded, content_start) {
                    Some(end) => end,
                    None if marker.open_ended => text.len(),
                    None => {
                        debug!(marker = %marker.label, at = content_start, "Unterminated marker window");
                        continue;
                    }
                };
                windows.push(Self::window(marker, text, content_start, end));

                // Continuations must be terminated even for open-ended markers
                let mut next = Self::after_registration(text, end);
                while let Some(start) = next {
                    let Some(end) = self.window_end(&folded, start) else {
                        break;
                    };
                    let window = Self::window(marker, text, start, end);
                    if !window.text.is_empty() {
                        windows.push(window);
                    }
                    next = Self::after_registration(text, end);
                }
            }
        }

        (occurrences, windows)
    }

    /// Candidates of one publication, or why there are none
    pub fn extract(&self, text: &str) -> Result<CandidateList, SkipReason> {
        if text.trim().is_empty() {
            return Err(SkipReason::Empty);
        }

        let (occurrences, windows) = self.windows(text);
        if occurrences == 0 {
            return Err(SkipReason::NoRoleMarker);
        }

        let mut candidates = Vec::new();
        for window in windows {
            if window.text.is_empty() {
                continue;
            }
            if self.opens_with_guard_word(&window.text) {
                debug!(marker = %window.label, window = %window.text, "Discarded window opening with a connector");
                continue;
            }
            for name in self.shredder.shred(&window.text, &self.validator) {
                candidates.push(CandidateTerm::new(name, window.source.clone()));
            }
        }

        if candidates.is_empty() {
            return Err(SkipReason::NoCandidates {
                windows: occurrences,
            });
        }
        Ok(candidates)
    }
}
