use thiserror::Error;

/// Errors loading or validating a ruleset
#[derive(Error, Debug)]
pub enum RulesetError {
    #[error("Failed to read ruleset file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse ruleset TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown ruleset version: {0}")]
    UnknownVersion(String),

    #[error("Invalid ruleset: {0}")]
    Invalid(String),
}

/// A span layout that cannot be applied to a paragraph.
/// The paragraph is left untouched when this is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconstructError {
    #[error("Empty span at {start}..{end}")]
    EmptySpan { start: usize, end: usize },

    #[error("Span end {end} beyond text length {len}")]
    OutOfBounds { end: usize, len: usize },

    #[error("Span offset {0} is not on a character boundary")]
    NotCharBoundary(usize),

    #[error("Span starting at {start} overlaps or precedes previous span ending at {previous_end}")]
    Unordered { start: usize, previous_end: usize },
}

/// Failures reported by an audit service
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Audit service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid audit response: {0}")]
    InvalidResponse(String),
}
