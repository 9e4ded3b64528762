//! Splits a marker window into individual entity names
//!
//! A party list is a run of names with almost no punctuation between them:
//! "BANCO ABC S.A. JOSÉ DA SILVA X MARIA SOUZA LTDA". The shredder cuts it
//! after corporate suffixes and institutional names, at adversarial
//! connectors and at `;` or `/`, then cleans and validates every piece.

use tracing::debug;

use crate::matcher::{Boundary, FoldedText};
use crate::patterns::fold_key;
use crate::ruleset::Ruleset;
use crate::validator::TermValidator;

/// Stands in for the slash of a protected abbreviation while splitting
const SLASH_PLACEHOLDER: char = '\u{E000}';

const LEADING_TRIM: &[char] = &[':', ',', ';', '.', '-', '–', ')', ']'];
const TRAILING_TRIM: &[char] = &[',', ';', ':', '-', '–'];

/// Comparison key of one token: trailing list punctuation dropped, folded
fn token_key(token: &str) -> String {
    let token: String = token
        .trim_end_matches([',', ';', ':'])
        .chars()
        .map(|c| if c == SLASH_PLACEHOLDER { '/' } else { c })
        .collect();
    fold_key(&token)
}

/// Token keys of a multi-word table entry
fn phrase_keys(phrase: &str) -> Vec<String> {
    phrase.split_whitespace().map(token_key).collect()
}

fn phrase_table(items: &[String]) -> Vec<Vec<String>> {
    let mut table: Vec<Vec<String>> = items
        .iter()
        .map(|s| phrase_keys(s))
        .filter(|k| !k.is_empty())
        .collect();
    // Longest phrase first
    table.sort_by(|a, b| b.len().cmp(&a.len()));
    table
}

/// Byte ranges of whitespace-separated tokens
fn token_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                ranges.push((s, i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        ranges.push((s, text.len()));
    }
    ranges
}

/// Cut at the first `(` or `[` that is never closed
fn drop_unclosed_bracket(piece: &str) -> &str {
    let mut open: Vec<(usize, char)> = Vec::new();
    for (i, c) in piece.char_indices() {
        match c {
            '(' | '[' => open.push((i, c)),
            ')' | ']' => {
                let expected = if c == ')' { '(' } else { '[' };
                if open.last().is_some_and(|&(_, o)| o == expected) {
                    open.pop();
                }
            }
            _ => {}
        }
    }
    match open.first() {
        Some(&(at, _)) => &piece[..at],
        None => piece,
    }
}

pub fn trim_piece(piece: &str) -> &str {
    let piece =
        piece.trim_start_matches(|c: char| c.is_whitespace() || LEADING_TRIM.contains(&c));
    drop_unclosed_bracket(piece)
        .trim_end_matches(|c: char| c.is_whitespace() || TRAILING_TRIM.contains(&c))
}

/// Name splitter bound to one ruleset
#[derive(Debug, Clone)]
pub struct Shredder {
    corporate_suffixes: Vec<Vec<String>>,
    exception_suffixes: Vec<Vec<String>>,
    institutional_tokens: Vec<Vec<String>>,
    tail_boilerplate: Vec<Vec<String>>,
    connectors: Vec<String>,
    guard_words: Vec<String>,
    protected: Vec<String>,
    representative_clauses: Vec<String>,
}

impl Shredder {
    pub fn new(ruleset: &Ruleset) -> Self {
        Self {
            corporate_suffixes: phrase_table(&ruleset.corporate_suffixes),
            exception_suffixes: phrase_table(&ruleset.exception_suffixes),
            institutional_tokens: phrase_table(&ruleset.institutional_tokens),
            tail_boilerplate: phrase_table(&ruleset.tail_boilerplate),
            connectors: ruleset.split_connectors.iter().map(|s| token_key(s)).collect(),
            guard_words: ruleset
                .syntax_guard_words
                .iter()
                .map(|s| fold_key(s))
                .collect(),
            protected: ruleset
                .protected_slash_abbreviations
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| s.contains('/'))
                .collect(),
            representative_clauses: ruleset
                .representative_clauses
                .iter()
                .map(|s| fold_key(s.trim()))
                .collect(),
        }
    }

    /// Split, clean and validate; returns the accepted names in order
    pub fn shred(&self, chunk: &str, validator: &TermValidator) -> Vec<String> {
        self.split(chunk)
            .into_iter()
            .filter(|piece| match validator.check(piece) {
                Ok(()) => true,
                Err(rejection) => {
                    debug!(piece = %piece, reason = %rejection, "Rejected candidate");
                    false
                }
            })
            .collect()
    }

    /// Split and clean without validating
    pub fn split(&self, chunk: &str) -> Vec<String> {
        let escaped = self.escape_protected(chunk);
        let mut pieces = Vec::new();

        for segment in self.split_tokens(&escaped) {
            for part in segment.split([';', '/']) {
                let restored: String = part
                    .chars()
                    .map(|c| if c == SLASH_PLACEHOLDER { '/' } else { c })
                    .collect();
                let cleaned = self.clean(&restored);
                if !cleaned.is_empty() {
                    pieces.push(cleaned);
                }
            }
        }

        pieces
    }

    fn escape_protected(&self, chunk: &str) -> String {
        let folded = FoldedText::new(chunk);
        let protected: Vec<(usize, usize)> = self
            .protected
            .iter()
            .flat_map(|abbreviation| folded.find_all(abbreviation, Boundary::Both))
            .collect();
        if protected.is_empty() {
            return chunk.to_string();
        }

        chunk
            .char_indices()
            .map(|(i, c)| {
                let inside = protected.iter().any(|&(s, e)| s <= i && i < e);
                if c == '/' && inside {
                    SLASH_PLACEHOLDER
                } else {
                    c
                }
            })
            .collect()
    }

    /// Length of the longest table phrase that starts at token `at`
    fn match_phrase(table: &[Vec<String>], keys: &[String], at: usize) -> Option<usize> {
        table
            .iter()
            .find(|phrase| keys.get(at..at + phrase.len()) == Some(phrase.as_slice()))
            .map(Vec::len)
    }

    /// Whether a new name may start at token `at`
    fn opens_name(&self, tokens: &[&str], keys: &[String], at: usize) -> bool {
        let Some(token) = tokens.get(at) else {
            return false;
        };
        let starts_upper = token.chars().next().is_some_and(char::is_uppercase);
        starts_upper
            && !self.connectors.contains(&keys[at])
            && !self.guard_words.contains(&keys[at])
            && Self::match_phrase(&self.exception_suffixes, keys, at).is_none()
    }

    /// Token pass: cuts after suffixes and institutional names, drops connectors
    fn split_tokens<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let ranges = token_ranges(text);
        let tokens: Vec<&str> = ranges.iter().map(|&(s, e)| &text[s..e]).collect();
        let keys: Vec<String> = tokens.iter().map(|t| token_key(t)).collect();

        // Half-open token index ranges of each piece
        let mut pieces: Vec<(usize, usize)> = Vec::new();
        let mut piece_start: Option<usize> = None;

        let mut i = 0;
        while i < tokens.len() {
            if self.connectors.contains(&keys[i]) {
                if let Some(start) = piece_start.take() {
                    pieces.push((start, i));
                }
                i += 1;
                continue;
            }
            let start = *piece_start.get_or_insert(i);

            let boundary = Self::match_phrase(&self.corporate_suffixes, &keys, i)
                .or_else(|| Self::match_phrase(&self.institutional_tokens, &keys, i));
            match boundary {
                Some(len) => {
                    let next = i + len;
                    if self.opens_name(&tokens, &keys, next) {
                        pieces.push((start, next));
                        piece_start = None;
                    }
                    i = next;
                }
                None => i += 1,
            }
        }
        if let Some(start) = piece_start {
            pieces.push((start, tokens.len()));
        }

        pieces
            .into_iter()
            .map(|(from, to)| &text[ranges[from].0..ranges[to - 1].1])
            .collect()
    }

    /// Trim punctuation, representative clauses and tail boilerplate until stable
    fn clean(&self, piece: &str) -> String {
        let mut current = trim_piece(piece).to_string();
        loop {
            let next = self.strip_tail_boilerplate(self.strip_representative(&current));
            let next = trim_piece(next).to_string();
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn strip_representative<'a>(&self, piece: &'a str) -> &'a str {
        let Some(open) = piece.rfind('(') else {
            return piece;
        };
        let inside = fold_key(piece[open + 1..].trim_start());
        if self
            .representative_clauses
            .iter()
            .any(|clause| inside.starts_with(clause.as_str()))
        {
            &piece[..open]
        } else {
            piece
        }
    }

    fn strip_tail_boilerplate<'a>(&self, piece: &'a str) -> &'a str {
        let ranges = token_ranges(piece);
        let keys: Vec<String> = ranges.iter().map(|&(s, e)| token_key(&piece[s..e])).collect();

        for phrase in &self.tail_boilerplate {
            if phrase.len() >= keys.len() {
                continue;
            }
            let at = keys.len() - phrase.len();
            if keys[at..] == phrase[..] {
                return &piece[..ranges[at].0];
            }
        }
        piece
    }
}
