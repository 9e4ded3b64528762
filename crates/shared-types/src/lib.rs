pub mod report;
pub mod types;

pub use report::{
    CandidateTerm, HighlightReport, HighlightSpan, SegmentSkip, SkipReason, TermSource,
    UnknownTermSource,
};
pub use types::{Paragraph, ParagraphSequence, Publication, Run};
