//! Paragraph extraction from `word/document.xml`
//!
//! The reader keeps the byte range of every paragraph so the writer can
//! splice rewritten paragraphs back into the untouched XML.

use std::ops::Range;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use shared_types::{Paragraph, Run};
use tracing::debug;

use crate::error::{DocxError, Result};

/// Elements whose content is not paragraph text (drawings, text boxes, OLE)
const OPAQUE_ELEMENTS: &[&[u8]] = &[
    b"w:drawing",
    b"w:pict",
    b"w:object",
    b"mc:AlternateContent",
    b"w:txbxContent",
];

/// Elements that are read but whose markup a run rewrite would lose
const LOCKING_ELEMENTS: &[&[u8]] = &[
    b"w:fldChar",
    b"w:fldSimple",
    b"w:instrText",
    b"w:footnoteReference",
    b"w:endnoteReference",
    b"w:commentReference",
    b"w:commentRangeStart",
    b"w:commentRangeEnd",
    b"w:ins",
    b"w:del",
    b"w:moveFrom",
    b"w:moveTo",
    b"w:sdt",
    b"w:smartTag",
    b"w:hyperlink",
    b"m:oMath",
    b"m:oMathPara",
];

/// Zero-width markers kept around rewritten runs
const ANCHOR_ELEMENTS: &[&[u8]] = &[
    b"w:bookmarkStart",
    b"w:bookmarkEnd",
    b"w:permStart",
    b"w:permEnd",
    b"w:proofErr",
];

/// An empty paragraph-level marker such as `<w:bookmarkStart/>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub range: Range<usize>,
    /// Ends a marked region and goes after the runs
    pub closes: bool,
}

impl Anchor {
    fn new(e: &BytesStart<'_>, range: Range<usize>) -> Self {
        let name = e.name();
        let closes = if name.as_ref() == b"w:proofErr" {
            attribute(e, b"type").is_some_and(|t| t.ends_with("End"))
        } else {
            name.as_ref().ends_with(b"End")
        };
        Self { range, closes }
    }
}

/// A paragraph and where it lives in the source XML
#[derive(Debug, Clone)]
pub struct ParagraphSlot {
    /// Whole `<w:p>` element
    pub range: Range<usize>,
    /// The opening tag alone
    pub open_tag: Range<usize>,
    /// `<w:pPr>` element, if any
    pub properties: Option<Range<usize>>,
    /// Bookmarks and similar markers, in document order
    pub anchors: Vec<Anchor>,
    pub self_closing: bool,
    /// Whether runs can be replaced without losing markup
    pub editable: bool,
    pub paragraph: Paragraph,
}

#[derive(Debug, Default)]
struct RunState {
    run: Run,
    in_properties: bool,
}

#[derive(Debug)]
struct OpenParagraph {
    start: usize,
    open_tag: Range<usize>,
    properties_start: Option<usize>,
    properties: Option<Range<usize>>,
    anchors: Vec<Anchor>,
    editable: bool,
    runs: Vec<Run>,
    run: Option<RunState>,
    in_text: bool,
    opaque_depth: usize,
}

impl OpenParagraph {
    fn new(start: usize, open_tag: Range<usize>) -> Self {
        Self {
            start,
            open_tag,
            properties_start: None,
            properties: None,
            anchors: Vec::new(),
            editable: true,
            runs: Vec::new(),
            run: None,
            in_text: false,
            opaque_depth: 0,
        }
    }

    fn finish(self, end: usize) -> ParagraphSlot {
        ParagraphSlot {
            range: self.start..end,
            open_tag: self.open_tag,
            properties: self.properties,
            anchors: self.anchors,
            self_closing: false,
            editable: self.editable,
            paragraph: Paragraph::new(self.runs),
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(state) = self.run.as_mut() {
            state.run.text.push_str(text);
        }
    }

    /// Start or empty element inside the paragraph
    fn element(&mut self, e: &BytesStart<'_>, start: usize, end: usize, empty: bool) {
        let name = e.name();
        let name = name.as_ref();

        if OPAQUE_ELEMENTS.contains(&name) || name == b"w:p" {
            self.editable = false;
            if !empty {
                self.opaque_depth = 1;
            }
            return;
        }
        if LOCKING_ELEMENTS.contains(&name) {
            self.editable = false;
        }
        if ANCHOR_ELEMENTS.contains(&name) && self.run.is_none() {
            if empty {
                self.anchors.push(Anchor::new(e, start..end));
            } else {
                self.editable = false;
            }
            return;
        }

        match name {
            b"w:pPr" if self.run.is_none() => {
                if empty {
                    self.properties = Some(start..end);
                } else {
                    self.properties_start = Some(start);
                }
            }
            b"w:r" if !empty => self.run = Some(RunState::default()),
            b"w:rPr" if !empty => {
                if let Some(state) = self.run.as_mut() {
                    state.in_properties = true;
                }
            }
            b"w:t" if !empty => self.in_text = self.run.is_some(),
            _ => {}
        }

        let Some(state) = self.run.as_mut() else {
            return;
        };
        if state.in_properties {
            apply_run_property(&mut state.run, name, e);
        } else {
            match name {
                b"w:tab" => state.run.text.push('\t'),
                b"w:br" | b"w:cr" => state.run.text.push('\n'),
                b"w:noBreakHyphen" => state.run.text.push('-'),
                _ => {}
            }
        }
    }

    fn end_element(&mut self, name: &[u8], end: usize) {
        match name {
            b"w:pPr" if self.run.is_none() => {
                if let Some(start) = self.properties_start.take() {
                    self.properties = Some(start..end);
                }
            }
            b"w:rPr" => {
                if let Some(state) = self.run.as_mut() {
                    state.in_properties = false;
                }
            }
            b"w:t" => self.in_text = false,
            b"w:r" => {
                if let Some(state) = self.run.take() {
                    if !state.run.text.is_empty() {
                        self.runs.push(state.run);
                    }
                }
            }
            _ => {}
        }
    }
}

fn attribute(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Toggle properties are on unless `w:val` says otherwise
fn toggle_on(e: &BytesStart<'_>) -> bool {
    !matches!(
        attribute(e, b"val").as_deref(),
        Some("0" | "false" | "off")
    )
}

fn apply_run_property(run: &mut Run, name: &[u8], e: &BytesStart<'_>) {
    match name {
        b"w:b" => run.bold = toggle_on(e),
        b"w:highlight" => {
            run.highlight = attribute(e, b"val").is_some_and(|v| v != "none");
        }
        b"w:rFonts" => {
            run.font_name = attribute(e, b"ascii")
                .or_else(|| attribute(e, b"hAnsi"))
                .or_else(|| attribute(e, b"cs"));
        }
        b"w:sz" => {
            run.font_size = attribute(e, b"val").and_then(|v| v.parse().ok());
        }
        _ => {}
    }
}

fn xml_error(position: usize, err: impl std::fmt::Display) -> DocxError {
    DocxError::Xml {
        position,
        message: err.to_string(),
    }
}

/// Every `<w:p>` of the document in order, body and table cells alike.
/// Paragraphs nested in text boxes are folded into their host paragraph.
pub fn read_paragraphs(xml: &str) -> Result<Vec<ParagraphSlot>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut slots = Vec::new();
    let mut current: Option<OpenParagraph> = None;

    loop {
        let start = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| xml_error(reader.buffer_position(), e))?;
        let end = reader.buffer_position();

        match event {
            Event::Eof => break,
            Event::Start(e) => match current.as_mut() {
                Some(p) if p.opaque_depth > 0 => p.opaque_depth += 1,
                Some(p) => p.element(&e, start, end, false),
                None if e.name().as_ref() == b"w:p" => {
                    current = Some(OpenParagraph::new(start, start..end));
                }
                None => {}
            },
            Event::Empty(e) => match current.as_mut() {
                Some(p) if p.opaque_depth > 0 => {}
                Some(p) => p.element(&e, start, end, true),
                None if e.name().as_ref() == b"w:p" => slots.push(ParagraphSlot {
                    range: start..end,
                    open_tag: start..end,
                    properties: None,
                    anchors: Vec::new(),
                    self_closing: true,
                    editable: true,
                    paragraph: Paragraph::default(),
                }),
                None => {}
            },
            Event::End(e) => {
                let Some(p) = current.as_mut() else {
                    continue;
                };
                if p.opaque_depth > 0 {
                    p.opaque_depth -= 1;
                    continue;
                }
                if e.name().as_ref() == b"w:p" {
                    if let Some(p) = current.take() {
                        slots.push(p.finish(end));
                    }
                } else {
                    p.end_element(e.name().as_ref(), end);
                }
            }
            Event::Text(t) => {
                if let Some(p) = current.as_mut() {
                    if p.in_text && p.opaque_depth == 0 {
                        let text = t.unescape().map_err(|e| xml_error(start, e))?;
                        p.push_text(&text);
                    }
                }
            }
            Event::CData(t) => {
                if let Some(p) = current.as_mut() {
                    if p.in_text && p.opaque_depth == 0 {
                        p.push_text(&String::from_utf8_lossy(&t));
                    }
                }
            }
            _ => {}
        }
    }

    if current.is_some() {
        return Err(xml_error(xml.len(), "unterminated w:p element"));
    }

    debug!(
        paragraphs = slots.len(),
        locked = slots.iter().filter(|s| !s.editable).count(),
        "Read document paragraphs"
    );
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn body(inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{inner}<w:sectPr/></w:body></w:document>"#
        )
    }

    #[test]
    fn test_reads_runs_with_formatting() {
        let xml = body(
            r#"<w:p><w:pPr><w:jc w:val="both"/><w:rPr><w:b/></w:rPr></w:pPr><w:r><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial"/><w:b w:val="0"/><w:sz w:val="20"/></w:rPr><w:t xml:space="preserve">Parte(s): </w:t></w:r><w:r><w:rPr><w:b/><w:highlight w:val="yellow"/></w:rPr><w:t>JOSÉ &amp; FILHOS</w:t></w:r></w:p>"#,
        );
        let slots = read_paragraphs(&xml).unwrap();
        assert_eq!(slots.len(), 1);

        let slot = &slots[0];
        assert!(slot.editable);
        assert!(xml[slot.properties.clone().unwrap()].starts_with("<w:pPr>"));
        assert!(xml[slot.properties.clone().unwrap()].ends_with("</w:pPr>"));
        assert_eq!(&xml[slot.open_tag.clone()], "<w:p>");

        let runs = slot.paragraph.runs();
        assert_eq!(
            runs[0],
            Run {
                text: "Parte(s): ".into(),
                bold: false,
                highlight: false,
                font_name: Some("Arial".into()),
                font_size: Some(20),
            }
        );
        assert_eq!(runs[1].text, "JOSÉ & FILHOS");
        assert!(runs[1].bold && runs[1].highlight);
    }

    #[test]
    fn test_tabs_breaks_and_hyphens() {
        let xml = body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>A</w:t><w:tab/><w:t>B</w:t><w:br/><w:t>C</w:t><w:noBreakHyphen/><w:t>D</w:t></w:r></w:p>"#,
        );
        let slots = read_paragraphs(&xml).unwrap();
        assert_eq!(slots[0].paragraph.text(), "A\tB\nC-D");
    }

    #[test]
    fn test_table_cells_and_empty_paragraphs() {
        let xml = body(
            r#"<w:p/><w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p><w:r><w:t></w:t></w:r></w:p>"#,
        );
        let slots = read_paragraphs(&xml).unwrap();
        assert_eq!(slots.len(), 3);
        assert!(slots[0].self_closing);
        assert_eq!(&xml[slots[0].range.clone()], "<w:p/>");
        assert_eq!(slots[1].paragraph.text(), "cell");
        assert!(slots[2].paragraph.runs().is_empty());
    }

    #[test]
    fn test_drawings_are_opaque_and_lock_the_paragraph() {
        let xml = body(
            r#"<w:p><w:r><w:t>Antes </w:t></w:r><w:r><w:drawing><wp:inline><w:txbxContent><w:p><w:r><w:t>caixa</w:t></w:r></w:p></w:txbxContent></wp:inline></w:drawing></w:r><w:r><w:t>depois</w:t></w:r></w:p>"#,
        );
        let slots = read_paragraphs(&xml).unwrap();
        assert_eq!(slots.len(), 1);
        assert!(!slots[0].editable);
        assert_eq!(slots[0].paragraph.text(), "Antes depois");
    }

    #[test]
    fn test_fields_lock_but_are_read() {
        let xml = body(
            r#"<w:p><w:hyperlink r:id="rId4"><w:r><w:t>ACME LTDA</w:t></w:r></w:hyperlink></w:p><w:p><w:del><w:r><w:delText>velho</w:delText></w:r></w:del><w:r><w:t>novo</w:t></w:r></w:p>"#,
        );
        let slots = read_paragraphs(&xml).unwrap();
        assert_eq!(slots[0].paragraph.text(), "ACME LTDA");
        assert!(!slots[0].editable);
        assert_eq!(slots[1].paragraph.text(), "novo");
        assert!(!slots[1].editable);
    }

    #[test]
    fn test_bookmarks_are_recorded_as_anchors() {
        let xml = body(
            r#"<w:p><w:bookmarkStart w:id="0" w:name="_GoBack"/><w:r><w:t>ACME</w:t></w:r><w:proofErr w:type="spellStart"/><w:r><w:t> LTDA</w:t></w:r><w:proofErr w:type="spellEnd"/><w:bookmarkEnd w:id="0"/></w:p>"#,
        );
        let slots = read_paragraphs(&xml).unwrap();
        let slot = &slots[0];
        assert!(slot.editable);
        assert_eq!(slot.paragraph.text(), "ACME LTDA");

        let anchors: Vec<(&str, bool)> = slot
            .anchors
            .iter()
            .map(|a| (&xml[a.range.clone()], a.closes))
            .collect();
        assert_eq!(
            anchors,
            vec![
                (r#"<w:bookmarkStart w:id="0" w:name="_GoBack"/>"#, false),
                (r#"<w:proofErr w:type="spellStart"/>"#, false),
                (r#"<w:proofErr w:type="spellEnd"/>"#, true),
                (r#"<w:bookmarkEnd w:id="0"/>"#, true),
            ]
        );
    }

    #[test]
    fn test_malformed_xml() {
        let xml = body("<w:p><w:r><w:t>x</w:r></w:p>");
        assert!(matches!(read_paragraphs(&xml), Err(DocxError::Xml { .. })));
    }
}
