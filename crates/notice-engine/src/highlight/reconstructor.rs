//! Rewrites a paragraph's runs around its highlight spans

use shared_types::{HighlightSpan, Paragraph, Run};

use crate::error::ReconstructError;

/// Check a span list against the text it was resolved on
pub fn validate_spans(text: &str, spans: &[HighlightSpan]) -> Result<(), ReconstructError> {
    let mut previous_end = 0;
    for span in spans {
        if span.is_empty() {
            return Err(ReconstructError::EmptySpan {
                start: span.start,
                end: span.end,
            });
        }
        if span.end > text.len() {
            return Err(ReconstructError::OutOfBounds {
                end: span.end,
                len: text.len(),
            });
        }
        for offset in [span.start, span.end] {
            if !text.is_char_boundary(offset) {
                return Err(ReconstructError::NotCharBoundary(offset));
            }
        }
        if span.start < previous_end {
            return Err(ReconstructError::Unordered {
                start: span.start,
                previous_end,
            });
        }
        previous_end = span.end;
    }
    Ok(())
}

/// Runs for `text` with every span bold and highlighted, in the font of `template`
pub fn build_runs(text: &str, spans: &[HighlightSpan], template: &Run) -> Vec<Run> {
    let mut runs = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0;

    for span in spans {
        if span.start > cursor {
            runs.push(Run::plain(&text[cursor..span.start]).with_font_of(template));
        }
        runs.push(Run {
            text: text[span.start..span.end].to_string(),
            bold: true,
            highlight: true,
            ..Run::default()
        }
        .with_font_of(template));
        cursor = span.end;
    }
    if cursor < text.len() {
        runs.push(Run::plain(&text[cursor..]).with_font_of(template));
    }

    runs
}

/// Replace the paragraph's runs so `spans` of `text` are highlighted.
///
/// `text` is the paragraph's normalized text and becomes its new content.
/// Returns `Ok(false)` without touching the paragraph when there is nothing
/// to highlight; on error the paragraph is left as it was.
pub fn reconstruct(
    paragraph: &mut Paragraph,
    text: &str,
    spans: &[HighlightSpan],
) -> Result<bool, ReconstructError> {
    if spans.is_empty() {
        return Ok(false);
    }
    validate_spans(text, spans)?;

    let template = paragraph.runs().first().cloned().unwrap_or_default();
    paragraph.replace_runs(build_runs(text, spans, &template));
    Ok(true)
}
