//! Removes markup that splits words across runs without affecting layout

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::package::{Package, DOCUMENT_PART};

lazy_static! {
    /// Spell-check marks, optional hyphens, language tags and cached page breaks
    static ref NOISE_ELEMENTS: Regex = Regex::new(
        r"<w:(?:proofErr|noBreakHyphen|softHyphen|lang|lastRenderedPageBreak)\b[^>]*/>"
    )
    .unwrap();
}

pub fn sanitize_document_xml(xml: &str) -> Cow<'_, str> {
    NOISE_ELEMENTS.replace_all(xml, "")
}

/// Rewrite a DOCX with its main document part sanitized
pub fn sanitize_container(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut package = Package::from_bytes(bytes)?;
    let xml = package.part_str(DOCUMENT_PART)?;

    let sanitized = match sanitize_document_xml(xml) {
        Cow::Borrowed(_) => {
            debug!("Document XML already clean");
            return Ok(bytes.to_vec());
        }
        Cow::Owned(s) => s,
    };

    debug!(
        removed_bytes = xml.len() - sanitized.len(),
        "Sanitized document XML"
    );
    package.set_part(DOCUMENT_PART, sanitized.into_bytes());
    package.to_bytes()
}
