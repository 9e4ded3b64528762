//! Negative-heuristic filter for candidate entity names
//!
//! The validator is deliberately conservative: anything that looks like
//! docket boilerplate, a label or a registration number is rejected, at the
//! cost of occasionally dropping a real name.

use std::fmt;

use crate::patterns::{
    contains_phrase, fold_key, ATTORNEY_REGISTRATION, BARE_ACRONYM, DATE_PHRASE, LEADING_INDEX,
};
use crate::ruleset::Ruleset;

/// Why a candidate was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    TooShort { len: usize, min: usize },
    TooLong { len: usize, max: usize },
    LeadingPunctuation,
    NoLetters,
    LeadingIndex,
    UnbalancedBrackets,
    BareAcronym,
    DatePhrase,
    Blocklisted(String),
    HeaderLabel(String),
    RegistrationNumber,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooShort { len, min } => write!(f, "too short ({} < {})", len, min),
            Rejection::TooLong { len, max } => write!(f, "too long ({} > {})", len, max),
            Rejection::LeadingPunctuation => f.write_str("starts with punctuation"),
            Rejection::NoLetters => f.write_str("no letters"),
            Rejection::LeadingIndex => f.write_str("leading list index"),
            Rejection::UnbalancedBrackets => f.write_str("unbalanced brackets"),
            Rejection::BareAcronym => f.write_str("bare acronym"),
            Rejection::DatePhrase => f.write_str("contains a date"),
            Rejection::Blocklisted(phrase) => write!(f, "blocklisted phrase '{}'", phrase),
            Rejection::HeaderLabel(label) => write!(f, "header label '{}'", label),
            Rejection::RegistrationNumber => f.write_str("attorney registration number"),
        }
    }
}

/// Every `(` and `[` closed by a matching bracket in order
fn brackets_balanced(term: &str) -> bool {
    let mut open = Vec::new();
    for c in term.chars() {
        match c {
            '(' | '[' => open.push(c),
            ')' if open.pop() != Some('(') => return false,
            ']' if open.pop() != Some('[') => return false,
            _ => {}
        }
    }
    open.is_empty()
}

/// Validator bound to one ruleset, with its phrase tables pre-folded
#[derive(Debug, Clone)]
pub struct TermValidator {
    min_len: usize,
    max_len: usize,
    blocklist: Vec<(String, String)>, // (folded, original)
    header_labels: Vec<(String, String)>,
}

impl TermValidator {
    pub fn new(ruleset: &Ruleset) -> Self {
        let fold_all = |items: &[String]| -> Vec<(String, String)> {
            items
                .iter()
                .map(|s| (fold_key(s.trim()), s.clone()))
                .filter(|(folded, _)| !folded.is_empty())
                .collect()
        };

        Self {
            min_len: ruleset.min_term_len,
            max_len: ruleset.max_term_len,
            blocklist: fold_all(&ruleset.blocklist),
            header_labels: fold_all(&ruleset.header_labels),
        }
    }

    /// Verdict with the first failing rule
    pub fn check(&self, candidate: &str) -> Result<(), Rejection> {
        let term = candidate.trim();
        let len = term.chars().count();

        if len < self.min_len {
            return Err(Rejection::TooShort {
                len,
                min: self.min_len,
            });
        }
        if len > self.max_len {
            return Err(Rejection::TooLong {
                len,
                max: self.max_len,
            });
        }
        if term.chars().next().is_some_and(|c| !c.is_alphanumeric()) {
            return Err(Rejection::LeadingPunctuation);
        }
        if !term.chars().any(char::is_alphabetic) {
            return Err(Rejection::NoLetters);
        }
        if LEADING_INDEX.is_match(term) {
            return Err(Rejection::LeadingIndex);
        }
        if !brackets_balanced(term) {
            return Err(Rejection::UnbalancedBrackets);
        }
        if BARE_ACRONYM.is_match(term) {
            return Err(Rejection::BareAcronym);
        }
        if DATE_PHRASE.is_match(term) {
            return Err(Rejection::DatePhrase);
        }

        let folded = fold_key(term);
        if let Some((_, phrase)) = self
            .blocklist
            .iter()
            .find(|(key, _)| contains_phrase(&folded, key))
        {
            return Err(Rejection::Blocklisted(phrase.clone()));
        }

        let label_key = folded.trim_end_matches(':').trim_end();
        if let Some((_, label)) = self
            .header_labels
            .iter()
            .find(|(key, _)| key.trim_end_matches(':') == label_key)
        {
            return Err(Rejection::HeaderLabel(label.clone()));
        }

        if ATTORNEY_REGISTRATION.is_match(term) {
            return Err(Rejection::RegistrationNumber);
        }

        Ok(())
    }

    pub fn is_valid(&self, candidate: &str) -> bool {
        self.check(candidate).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::RulesetVersion;
    use pretty_assertions::assert_eq;

    fn validator() -> TermValidator {
        TermValidator::new(&Ruleset::default())
    }

    #[test]
    fn test_accepts_ordinary_names() {
        let v = validator();
        assert!(v.is_valid("JOSÉ DA SILVA"));
        assert!(v.is_valid("BANCO DO BRASIL S.A."));
        assert!(v.is_valid("Maria Aparecida de Souza"));
        assert!(v.is_valid("AUTOSERVIÇO PAULISTA LTDA"));
    }

    #[test]
    fn test_rejects_by_length() {
        let v = validator();
        assert_eq!(v.check("AB"), Err(Rejection::TooShort { len: 2, min: 3 }));

        let v1 = TermValidator::new(&Ruleset::preset(RulesetVersion::V1));
        let long = "A".repeat(201);
        assert_eq!(
            v1.check(&long),
            Err(Rejection::TooLong { len: 201, max: 200 })
        );
        assert!(v.is_valid(&long));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // Three two-byte characters
        assert!(validator().is_valid("ÇÃO"));
    }

    #[test]
    fn test_rejects_leading_punctuation_and_digit_only() {
        let v = validator();
        assert_eq!(v.check("- JOÃO"), Err(Rejection::LeadingPunctuation));
        assert_eq!(v.check("123.456/789"), Err(Rejection::NoLetters));
    }

    #[test]
    fn test_rejects_leading_index() {
        let v = validator();
        assert_eq!(v.check("1. JOÃO"), Err(Rejection::LeadingIndex));
        assert_eq!(v.check("2- MARIA"), Err(Rejection::LeadingIndex));
        assert_eq!(v.check("3) PEDRO"), Err(Rejection::LeadingIndex));
    }

    #[test]
    fn test_rejects_unbalanced_brackets() {
        let v = validator();
        assert_eq!(v.check("MARIA SOUZA ("), Err(Rejection::UnbalancedBrackets));
        assert_eq!(v.check("ACME LTDA)"), Err(Rejection::UnbalancedBrackets));
        assert_eq!(v.check("CLUBE [SÃO PAULO)"), Err(Rejection::UnbalancedBrackets));
        assert!(v.is_valid("CLUBE (SÃO PAULO)"));
    }

    #[test]
    fn test_rejects_bare_acronyms() {
        let v = validator();
        assert_eq!(v.check("S.A."), Err(Rejection::BareAcronym));
        assert_eq!(v.check("S/A"), Err(Rejection::BareAcronym));
    }

    #[test]
    fn test_rejects_dates() {
        assert_eq!(
            validator().check("SÃO PAULO, 10 DE MARÇO DE 2023"),
            Err(Rejection::DatePhrase)
        );
    }

    #[test]
    fn test_poder_judiciario_rejected_in_any_case() {
        let v = validator();
        for s in ["PODER JUDICIÁRIO", "poder judiciário", "Poder Judiciario"] {
            assert!(
                matches!(v.check(s), Err(Rejection::Blocklisted(_))),
                "{} should be blocklisted",
                s
            );
        }
    }

    #[test]
    fn test_blocklist_is_word_bounded() {
        let v = validator();
        assert!(v.is_valid("SANTA VARANDA COMÉRCIO"));
        assert!(!v.is_valid("2ª VARA CÍVEL"));
    }

    #[test]
    fn test_rejects_header_labels_ignoring_colon() {
        let v = validator();
        assert_eq!(v.check("OAB"), Err(Rejection::HeaderLabel("OAB".into())));
        assert!(matches!(v.check("Autora:"), Err(Rejection::HeaderLabel(_))));
        assert!(matches!(v.check("réu"), Err(Rejection::HeaderLabel(_))));
    }

    #[test]
    fn test_rejects_registration_numbers() {
        let v = validator();
        assert_eq!(v.check("OAB: 12345"), Err(Rejection::RegistrationNumber));
        assert_eq!(v.check("OAB SP-123456"), Err(Rejection::RegistrationNumber));
        assert_eq!(
            v.check("FULANO SP123456"),
            Err(Rejection::RegistrationNumber)
        );
    }

    #[test]
    fn test_ruleset_blocklist_extension_applies() {
        let ruleset =
            Ruleset::from_toml_str("extend_blocklist = [\"CONDOMÍNIO EDIFÍCIO\"]").unwrap();
        let v = TermValidator::new(&ruleset);
        assert!(!v.is_valid("Condominio Edificio Aurora"));
    }
}
