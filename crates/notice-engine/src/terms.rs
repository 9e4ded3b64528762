use std::collections::HashSet;

use shared_types::{CandidateTerm, TermSource};

/// Candidate terms in discovery order, deduplicated case-insensitively.
/// The first spelling seen is the one kept.
#[derive(Debug, Clone, Default)]
pub struct TermSet {
    terms: Vec<CandidateTerm>,
    keys: HashSet<String>,
}

fn key(text: &str) -> String {
    text.trim().to_lowercase()
}

impl TermSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a term; returns false if it was empty or already present
    pub fn insert(&mut self, term: CandidateTerm) -> bool {
        let text = term.text.trim();
        if text.is_empty() {
            return false;
        }
        if !self.keys.insert(key(text)) {
            return false;
        }
        self.terms.push(CandidateTerm::new(text, term.source));
        true
    }

    pub fn insert_text(&mut self, text: &str, source: TermSource) -> bool {
        self.insert(CandidateTerm::new(text, source))
    }

    pub fn extend<I: IntoIterator<Item = CandidateTerm>>(&mut self, terms: I) -> usize {
        terms
            .into_iter()
            .map(|t| self.insert(t))
            .filter(|added| *added)
            .count()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.keys.contains(&key(text))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateTerm> {
        self.terms.iter()
    }

    pub fn texts(&self) -> Vec<String> {
        self.terms.iter().map(|t| t.text.clone()).collect()
    }

    pub fn into_vec(self) -> Vec<CandidateTerm> {
        self.terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_spelling_wins() {
        let mut set = TermSet::new();
        assert!(set.insert_text("José da Silva", TermSource::Party));
        assert!(!set.insert_text("JOSÉ DA SILVA", TermSource::Role("autor".into())));
        assert!(!set.insert_text("  josé da silva ", TermSource::Manual));
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.iter().next(),
            Some(&CandidateTerm::new("José da Silva", TermSource::Party))
        );
    }

    #[test]
    fn test_keeps_discovery_order() {
        let mut set = TermSet::new();
        let added = set.extend(vec![
            CandidateTerm::new("B", TermSource::Party),
            CandidateTerm::new("A", TermSource::Party),
            CandidateTerm::new("b", TermSource::Party),
            CandidateTerm::new("   ", TermSource::Party),
        ]);
        assert_eq!(added, 2);
        assert_eq!(set.texts(), vec!["B".to_string(), "A".to_string()]);
        assert!(set.contains("a"));
    }
}
