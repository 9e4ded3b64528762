//! Splits a paragraph stream into publications
//!
//! A diary page lists one notice after another, each opening with a numbered
//! entry ("12. PROCESSO ..."). The segmenter groups paragraphs between two
//! entry starts without buffering more than the publication being built.

use shared_types::Publication;

use crate::patterns::ENTRY_START;

/// True when a paragraph opens a new publication
pub fn is_entry_start(text: &str) -> bool {
    ENTRY_START.is_match(text.trim())
}

/// Streaming adapter over `(paragraph index, normalized text)` pairs
pub struct PublicationSegmenter<I> {
    paragraphs: I,
    current: Option<Publication>,
    next_index: usize,
    done: bool,
}

impl<I> PublicationSegmenter<I>
where
    I: Iterator<Item = (usize, String)>,
{
    pub fn new(paragraphs: I) -> Self {
        Self {
            paragraphs,
            current: None,
            next_index: 0,
            done: false,
        }
    }

    fn open(&mut self) -> Publication {
        let publication = Publication {
            index: self.next_index,
            ..Publication::default()
        };
        self.next_index += 1;
        publication
    }

    /// Close the current publication if it carries any text
    fn take_non_empty(&mut self) -> Option<Publication> {
        match self.current.take() {
            Some(p) if !p.text.is_empty() => Some(p),
            Some(p) => {
                // Reuse the slot number for the next publication
                self.next_index = p.index;
                None
            }
            None => None,
        }
    }
}

impl<I> Iterator for PublicationSegmenter<I>
where
    I: Iterator<Item = (usize, String)>,
{
    type Item = Publication;

    fn next(&mut self) -> Option<Publication> {
        if self.done {
            return None;
        }

        loop {
            let Some((index, text)) = self.paragraphs.next() else {
                self.done = true;
                return self.take_non_empty();
            };

            let mut finished = None;
            if is_entry_start(&text) {
                finished = self.take_non_empty();
            }

            let mut current = match self.current.take() {
                Some(p) => p,
                None => self.open(),
            };
            current.paragraphs.push(index);
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                if !current.text.is_empty() {
                    current.text.push(' ');
                }
                current.text.push_str(trimmed);
            }
            self.current = Some(current);

            if let Some(publication) = finished {
                return Some(publication);
            }
        }
    }
}
