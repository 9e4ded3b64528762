//! Candidate terms, highlight spans and the per-document report

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a candidate term came from. Serialized as its display tag
/// (`party`, `role:apelante`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TermSource {
    /// Listed under a party marker ("Parte(s):")
    Party,
    /// Listed under a named role marker ("Apelante:", "Advogado(s)")
    Role(String),
    ProcessNumber,
    /// Supplied by the caller
    Manual,
    /// Proposed by an audit service and accepted by the validator
    Audit,
}

impl TermSource {
    /// Whether terms from this source skip the validator
    pub fn bypasses_validation(&self) -> bool {
        matches!(self, TermSource::ProcessNumber)
    }
}

impl fmt::Display for TermSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermSource::Party => f.write_str("party"),
            TermSource::Role(name) => write!(f, "role:{}", name),
            TermSource::ProcessNumber => f.write_str("process-number"),
            TermSource::Manual => f.write_str("manual"),
            TermSource::Audit => f.write_str("audit"),
        }
    }
}

/// A tag that names no term source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTermSource(pub String);

impl fmt::Display for UnknownTermSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown term source '{}'", self.0)
    }
}

impl std::error::Error for UnknownTermSource {}

impl FromStr for TermSource {
    type Err = UnknownTermSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "party" => Ok(TermSource::Party),
            "process-number" => Ok(TermSource::ProcessNumber),
            "manual" => Ok(TermSource::Manual),
            "audit" => Ok(TermSource::Audit),
            _ => match s.strip_prefix("role:") {
                Some(name) if !name.is_empty() => Ok(TermSource::Role(name.to_string())),
                _ => Err(UnknownTermSource(s.to_string())),
            },
        }
    }
}

impl From<TermSource> for String {
    fn from(source: TermSource) -> Self {
        source.to_string()
    }
}

impl TryFrom<String> for TermSource {
    type Error = UnknownTermSource;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTerm {
    pub text: String,
    pub source: TermSource,
}

impl CandidateTerm {
    pub fn new(text: impl Into<String>, source: TermSource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// A highlighted region of one paragraph's normalized text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub start: usize, // Byte offset, inclusive
    pub end: usize,   // Byte offset, exclusive
    pub term: String,
}

impl HighlightSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        start < self.end && self.start < end
    }

    /// True if `[start, end)` fully covers this span
    pub fn is_within(&self, start: usize, end: usize) -> bool {
        start <= self.start && self.end <= end
    }
}

/// Why a publication produced no candidates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SkipReason {
    /// The publication has no text
    Empty,
    /// None of the role markers occurs in the publication
    NoRoleMarker,
    /// Markers were found but every window was discarded or rejected
    NoCandidates { windows: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Empty => f.write_str("empty publication"),
            SkipReason::NoRoleMarker => f.write_str("no role marker"),
            SkipReason::NoCandidates { windows } => {
                write!(f, "{} marker window(s) yielded no candidates", windows)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSkip {
    pub publication: usize,
    pub first_paragraph: Option<usize>,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Outcome of one highlighting run over a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightReport {
    pub paragraphs: usize,
    pub publications: usize,
    pub terms: Vec<CandidateTerm>,
    pub spans_highlighted: usize, // User-facing "terms highlighted" count
    pub paragraphs_rewritten: usize,
    pub paragraphs_failed: Vec<usize>,
    pub skipped_publications: Vec<SegmentSkip>,
}
