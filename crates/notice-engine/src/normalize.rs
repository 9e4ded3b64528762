//! Paragraph text normalization
//!
//! Both passes of the engine see text through the same [`Normalizer`], so
//! span offsets computed on normalized text are valid for the text the
//! reconstructor writes back.

use crate::ruleset::Ruleset;

/// Glyphs with no visible width
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'
    )
}

/// Non-breaking and figure spaces
fn is_fixed_space(c: char) -> bool {
    matches!(c, '\u{00A0}' | '\u{2007}' | '\u{202F}')
}

/// Whether a keyword preceded by `prev` is fused to the previous word
fn fuses_with(prev: char) -> bool {
    prev.is_alphanumeric() || matches!(prev, '.' | ',' | ';' | ':' | ')')
}

#[derive(Debug, Clone)]
struct Keyword {
    text: String,
    all_caps: bool,
    bounded_end: bool,
}

/// Whitespace flattening, glyph stripping and keyword separation
#[derive(Debug, Clone)]
pub struct Normalizer {
    keywords: Vec<Keyword>,
}

impl Normalizer {
    pub fn new(ruleset: &Ruleset) -> Self {
        Self::with_keywords(ruleset.keyword_separators.iter().map(String::as_str))
    }

    pub fn with_keywords<'a>(keywords: impl IntoIterator<Item = &'a str>) -> Self {
        let mut keywords: Vec<Keyword> = keywords
            .into_iter()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| Keyword {
                text: k.to_string(),
                all_caps: !k.chars().any(char::is_lowercase),
                bounded_end: k.chars().last().is_some_and(char::is_alphanumeric),
            })
            .collect();
        keywords.sort_by(|a, b| a.text.cmp(&b.text));
        keywords.dedup_by(|a, b| a.text == b.text);
        Self { keywords }
    }

    /// Normalize one paragraph's text. Idempotent.
    pub fn normalize(&self, text: &str) -> String {
        let stripped: String = text
            .chars()
            .filter(|c| !is_invisible(*c))
            .map(|c| if is_fixed_space(c) { ' ' } else { c })
            .collect();

        let separated = self.separate_keywords(stripped);
        flatten_whitespace(&separated)
    }

    fn separate_keywords(&self, mut text: String) -> String {
        loop {
            let cuts = self.fused_positions(&text);
            if cuts.is_empty() {
                return text;
            }
            let mut out = String::with_capacity(text.len() + cuts.len());
            let mut last = 0;
            for cut in cuts {
                out.push_str(&text[last..cut]);
                out.push(' ');
                last = cut;
            }
            out.push_str(&text[last..]);
            text = out;
        }
    }

    /// Sorted, deduplicated byte offsets of keywords glued to the previous word
    fn fused_positions(&self, text: &str) -> Vec<usize> {
        let mut cuts = Vec::new();
        for keyword in &self.keywords {
            for (start, _) in text.match_indices(keyword.text.as_str()) {
                let Some(prev) = text[..start].chars().next_back() else {
                    continue;
                };
                let end = start + keyword.text.len();
                if keyword.bounded_end
                    && text[end..].chars().next().is_some_and(char::is_alphanumeric)
                {
                    continue;
                }
                // "JOAB" is a name, "silvaOAB" and "LTDAProcesso" are fusions
                let fused = fuses_with(prev) && !(keyword.all_caps && prev.is_uppercase());
                if fused {
                    cuts.push(start);
                }
            }
        }
        cuts.sort_unstable();
        cuts.dedup();
        cuts
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&Ruleset::default())
    }
}

/// Collapse every whitespace run (including line breaks and tabs) to a single
/// space and trim the ends
pub fn flatten_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
