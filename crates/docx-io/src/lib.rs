//! DOCX container access for the highlight engine
//!
//! [`DocxDocument`] exposes the paragraphs of `word/document.xml` through
//! [`ParagraphSequence`]. Only paragraphs whose runs were replaced are
//! re-serialized; the rest of the package is written back untouched.

pub mod error;
pub mod package;
pub mod reader;
pub mod sanitize;
pub mod writer;

use std::path::Path;

use shared_types::{Paragraph, ParagraphSequence};
use tracing::{debug, info};

pub use error::{DocxError, Result};
pub use package::{Package, DOCUMENT_PART};
pub use reader::{Anchor, ParagraphSlot};
pub use sanitize::{sanitize_container, sanitize_document_xml};

/// A Word document opened for highlighting
#[derive(Debug, Clone)]
pub struct DocxDocument {
    package: Package,
    xml: String,
    slots: Vec<ParagraphSlot>,
}

impl DocxDocument {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let doc = Self::from_bytes(&bytes)?;
        info!(path = %path.display(), paragraphs = doc.slots.len(), "Opened document");
        Ok(doc)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let package = Package::from_bytes(bytes)?;
        let xml = package.part_str(DOCUMENT_PART)?.to_string();
        let slots = reader::read_paragraphs(&xml)?;
        Ok(Self {
            package,
            xml,
            slots,
        })
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.slots.iter().map(|s| &s.paragraph)
    }

    /// Whether the paragraph at `index` accepts new runs
    pub fn is_editable(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.editable)
    }

    /// Visible text, one line per paragraph
    pub fn text(&self) -> String {
        self.paragraphs()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn rewritten_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.paragraph.is_rewritten())
            .count()
    }

    /// `word/document.xml` with the current paragraph contents
    pub fn render_document_xml(&self) -> String {
        writer::render(&self.xml, &self.slots)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.rewritten_count() == 0 {
            debug!("No rewritten paragraphs, writing package as read");
            return self.package.to_bytes();
        }
        let mut package = self.package.clone();
        package.set_part(DOCUMENT_PART, self.render_document_xml().into_bytes());
        package.to_bytes()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_bytes()?)?;
        info!(
            path = %path.display(),
            rewritten = self.rewritten_count(),
            "Saved document"
        );
        Ok(())
    }
}

impl ParagraphSequence for DocxDocument {
    fn paragraph_count(&self) -> usize {
        self.slots.len()
    }

    fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.slots.get(index).map(|s| &s.paragraph)
    }

    fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        self.slots
            .get_mut(index)
            .filter(|s| s.editable)
            .map(|s| &mut s.paragraph)
    }
}
