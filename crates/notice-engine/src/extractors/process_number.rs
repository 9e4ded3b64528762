//! Case identifiers matched against a publication's full text

use regex::Regex;
use shared_types::{CandidateTerm, TermSource};

use crate::patterns::{CNJ_NUMBER, LEGACY_NUMBER, LONG_DIGIT_RUN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessPattern {
    /// NNNNNNN-DD.AAAA.J.TR.OOOO
    Cnj,
    /// 1.0000.24.175224-5/004
    Legacy,
    /// 15 to 25 bare digits
    LongDigits,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessMatch {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub pattern: ProcessPattern,
}

impl ProcessMatch {
    fn overlaps(&self, start: usize, end: usize) -> bool {
        start < self.end && self.start < end
    }
}

const PATTERN_ORDER: [ProcessPattern; 3] = [
    ProcessPattern::Cnj,
    ProcessPattern::Legacy,
    ProcessPattern::LongDigits,
];

fn regex_for(pattern: ProcessPattern) -> &'static Regex {
    match pattern {
        ProcessPattern::Cnj => &CNJ_NUMBER,
        ProcessPattern::Legacy => &LEGACY_NUMBER,
        ProcessPattern::LongDigits => &LONG_DIGIT_RUN,
    }
}

/// All process numbers in `text`, sorted by position. Patterns are tried in
/// priority order and a later pattern never claims text an earlier one matched.
pub fn find_process_numbers(text: &str) -> Vec<ProcessMatch> {
    let mut matches: Vec<ProcessMatch> = Vec::new();

    for pattern in PATTERN_ORDER {
        for m in regex_for(pattern).find_iter(text) {
            if matches.iter().any(|p| p.overlaps(m.start(), m.end())) {
                continue;
            }
            matches.push(ProcessMatch {
                start: m.start(),
                end: m.end(),
                text: m.as_str().to_string(),
                pattern,
            });
        }
    }

    matches.sort_by_key(|m| m.start);
    matches
}

/// Process numbers as candidate terms, verbatim
pub fn extract_process_numbers(text: &str) -> Vec<CandidateTerm> {
    find_process_numbers(text)
        .into_iter()
        .map(|m| CandidateTerm::new(m.text, TermSource::ProcessNumber))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(text: &str) -> Vec<String> {
        find_process_numbers(text)
            .into_iter()
            .map(|m| m.text)
            .collect()
    }

    #[test]
    fn test_cnj_number_matched_verbatim() {
        let found = find_process_numbers("Processo 0001234-56.2023.8.26.0100 - Procedimento Comum");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "0001234-56.2023.8.26.0100");
        assert_eq!(found[0].pattern, ProcessPattern::Cnj);
    }

    #[test]
    fn test_cnj_variants() {
        assert_eq!(
            texts("nº 0001234 56 2023 8 26 0100/0001 e 1002003-44.2021.8.26.0564"),
            vec![
                "0001234 56 2023 8 26 0100/0001".to_string(),
                "1002003-44.2021.8.26.0564".to_string()
            ]
        );
    }

    #[test]
    fn test_legacy_number() {
        let found = find_process_numbers("Agravo 1.0000.24.175224-5/004 (MG)");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "1.0000.24.175224-5/004");
        assert_eq!(found[0].pattern, ProcessPattern::Legacy);
    }

    #[test]
    fn test_long_digits_do_not_shadow_structured_matches() {
        let found = find_process_numbers("00012345620238260100 e 1234567890123456");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].pattern, ProcessPattern::Cnj);
        assert_eq!(found[1].pattern, ProcessPattern::LongDigits);
        assert_eq!(found[1].text, "1234567890123456");
    }

    #[test]
    fn test_short_numbers_ignored() {
        assert!(find_process_numbers("R$ 1.234,56 em 10/03/2023, CEP 01310-100").is_empty());
    }

    #[test]
    fn test_candidates_tagged_as_process_numbers() {
        let terms = extract_process_numbers("Autos 0001234-56.2023.8.26.0100");
        assert_eq!(
            terms,
            vec![CandidateTerm::new(
                "0001234-56.2023.8.26.0100",
                TermSource::ProcessNumber
            )]
        );
    }
}
