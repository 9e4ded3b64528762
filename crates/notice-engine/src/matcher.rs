//! Case-insensitive literal search that reports byte offsets into the
//! original text
//!
//! Lowercasing a string can change its byte length, so offsets found in a
//! lowercased copy are not valid for the original. [`FoldedText`] folds one
//! character at a time and keeps the original byte offset of every character.

/// Fold a single character; multi-character lowercase forms keep the original
fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Fold a needle the same way [`FoldedText`] folds its haystack
pub fn fold_needle(needle: &str) -> Vec<char> {
    needle.chars().map(fold_char).collect()
}

/// How strictly a match must be delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Any substring
    None,
    /// No letter or digit glued before the match
    Start,
    /// No letter or digit glued on either side
    Both,
}

/// A haystack prepared for repeated case-insensitive searches
#[derive(Debug, Clone)]
pub struct FoldedText<'a> {
    text: &'a str,
    original: Vec<char>,
    folded: Vec<char>,
    offsets: Vec<usize>,
}

impl<'a> FoldedText<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut original = Vec::with_capacity(text.len());
        let mut folded = Vec::with_capacity(text.len());
        let mut offsets = Vec::with_capacity(text.len());
        for (offset, c) in text.char_indices() {
            original.push(c);
            folded.push(fold_char(c));
            offsets.push(offset);
        }
        Self {
            text,
            original,
            folded,
            offsets,
        }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.folded.len()
    }

    /// Byte offset of a character index (`char_len()` maps to the text length)
    pub fn byte_offset(&self, char_index: usize) -> usize {
        self.offsets
            .get(char_index)
            .copied()
            .unwrap_or(self.text.len())
    }

    /// Character index at or after a byte offset
    pub fn char_index(&self, byte_offset: usize) -> usize {
        self.offsets.partition_point(|&o| o < byte_offset)
    }

    fn glued(&self, char_index: Option<usize>) -> bool {
        char_index
            .and_then(|i| self.original.get(i))
            .is_some_and(|c| c.is_alphanumeric())
    }

    fn boundary_holds(&self, needle: &[char], start: usize, boundary: Boundary) -> bool {
        let end = start + needle.len();
        let check_start = matches!(boundary, Boundary::Start | Boundary::Both)
            && needle.first().is_some_and(|c| c.is_alphanumeric());
        let check_end = boundary == Boundary::Both
            && needle.last().is_some_and(|c| c.is_alphanumeric());

        if check_start && self.glued(start.checked_sub(1)) {
            return false;
        }
        if check_end && self.glued(Some(end)) {
            return false;
        }
        true
    }

    /// First occurrence at or after `from` (character index), as a character index
    pub fn find_chars(&self, needle: &[char], from: usize, boundary: Boundary) -> Option<usize> {
        if needle.is_empty() || needle.len() > self.folded.len() {
            return None;
        }
        let last_start = self.folded.len() - needle.len();
        (from..=last_start).find(|&i| {
            self.folded[i..i + needle.len()] == *needle
                && self.boundary_holds(needle, i, boundary)
        })
    }

    /// First occurrence at or after byte offset `from`, as a byte range
    pub fn find(&self, needle: &str, from: usize, boundary: Boundary) -> Option<(usize, usize)> {
        let needle = fold_needle(needle);
        let start = self.find_chars(&needle, self.char_index(from), boundary)?;
        Some((self.byte_offset(start), self.byte_offset(start + needle.len())))
    }

    /// Every non-overlapping occurrence left to right, as byte ranges.
    /// An occurrence rejected by the boundary check does not consume text.
    pub fn find_all(&self, needle: &str, boundary: Boundary) -> Vec<(usize, usize)> {
        let needle = fold_needle(needle);
        let mut found = Vec::new();
        let mut from = 0;
        while let Some(start) = self.find_chars(&needle, from, boundary) {
            let end = start + needle.len();
            found.push((self.byte_offset(start), self.byte_offset(end)));
            from = end;
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_case_insensitive_with_byte_offsets() {
        let text = FoldedText::new("José da SILVA e jOSÉ");
        assert_eq!(
            text.find_all("josé", Boundary::None),
            vec![(0, 5), (17, 22)]
        );
    }

    #[test]
    fn test_offsets_survive_length_changing_case() {
        // 'İ' lowercases to two chars, so it is kept as is
        let text = FoldedText::new("İSTANBUL SILVA");
        let (start, end) = text.find("silva", 0, Boundary::None).unwrap();
        assert_eq!(&text.as_str()[start..end], "SILVA");
    }

    #[test]
    fn test_whole_word_boundary() {
        let text = FoldedText::new("SILVANA SILVA");
        assert_eq!(text.find_all("SILVA", Boundary::Both), vec![(8, 13)]);
        assert_eq!(text.find_all("SILVA", Boundary::None), vec![(0, 5), (8, 13)]);
    }

    #[test]
    fn test_start_boundary_allows_glued_end() {
        let text = FoldedText::new("xParte(s): A Parte(s):B");
        assert_eq!(text.find_all("parte(s):", Boundary::Start), vec![(13, 22)]);
    }

    #[test]
    fn test_rejected_boundary_retries_next_char() {
        let text = FoldedText::new("AAA A");
        assert_eq!(text.find_all("AA", Boundary::None), vec![(0, 2)]);
        assert_eq!(text.find_all("A", Boundary::Both), vec![(4, 5)]);
    }

    #[test]
    fn test_find_from_byte_offset() {
        let text = FoldedText::new("ação ação");
        assert_eq!(text.find("AÇÃO", 1, Boundary::None), Some((7, 13)));
        assert_eq!(text.char_len(), 9);
    }

    #[test]
    fn test_empty_or_oversized_needle() {
        let text = FoldedText::new("abc");
        assert!(text.find_all("", Boundary::None).is_empty());
        assert!(text.find("abcd", 0, Boundary::None).is_none());
    }
}
