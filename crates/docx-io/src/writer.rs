//! Splices rewritten paragraphs back into the source XML

use quick_xml::escape::escape;
use shared_types::Run;

use crate::reader::ParagraphSlot;

fn push_text(out: &mut String, text: &str) {
    let mut pending = String::new();
    let flush = |out: &mut String, pending: &mut String| {
        if !pending.is_empty() {
            out.push_str(r#"<w:t xml:space="preserve">"#);
            out.push_str(&escape(pending.as_str()));
            out.push_str("</w:t>");
            pending.clear();
        }
    };

    for c in text.chars() {
        match c {
            '\t' => {
                flush(out, &mut pending);
                out.push_str("<w:tab/>");
            }
            '\n' => {
                flush(out, &mut pending);
                out.push_str("<w:br/>");
            }
            _ => pending.push(c),
        }
    }
    flush(out, &mut pending);
}

/// WordprocessingML for one run
pub fn run_xml(run: &Run) -> String {
    let mut out = String::from("<w:r>");

    let has_properties =
        run.font_name.is_some() || run.font_size.is_some() || run.bold || run.highlight;
    if has_properties {
        out.push_str("<w:rPr>");
        if let Some(font) = &run.font_name {
            let font = escape(font.as_str());
            out.push_str(&format!(
                r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>"#
            ));
        }
        if run.bold {
            out.push_str("<w:b/><w:bCs/>");
        }
        if let Some(size) = run.font_size {
            out.push_str(&format!(r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#));
        }
        if run.highlight {
            out.push_str(r#"<w:highlight w:val="yellow"/>"#);
        }
        out.push_str("</w:rPr>");
    }

    push_text(&mut out, &run.text);
    out.push_str("</w:r>");
    out
}

/// Rewritten `<w:p>` element: original opening tag and properties, then
/// opening anchors, new runs and closing anchors
pub fn paragraph_xml(xml: &str, slot: &ParagraphSlot) -> String {
    let mut out = String::new();

    let open_tag = &xml[slot.open_tag.clone()];
    if slot.self_closing {
        out.push_str(open_tag.trim_end_matches("/>").trim_end());
        out.push('>');
    } else {
        out.push_str(open_tag);
    }
    if let Some(properties) = &slot.properties {
        out.push_str(&xml[properties.clone()]);
    }
    for anchor in slot.anchors.iter().filter(|a| !a.closes) {
        out.push_str(&xml[anchor.range.clone()]);
    }
    for run in slot.paragraph.runs() {
        out.push_str(&run_xml(run));
    }
    for anchor in slot.anchors.iter().filter(|a| a.closes) {
        out.push_str(&xml[anchor.range.clone()]);
    }
    out.push_str("</w:p>");
    out
}

/// Source XML with every rewritten paragraph replaced, everything else
/// copied byte for byte
pub fn render(xml: &str, slots: &[ParagraphSlot]) -> String {
    let mut out = String::with_capacity(xml.len() + xml.len() / 8);
    let mut cursor = 0;

    for slot in slots.iter().filter(|s| s.paragraph.is_rewritten()) {
        out.push_str(&xml[cursor..slot.range.start]);
        out.push_str(&paragraph_xml(xml, slot));
        cursor = slot.range.end;
    }
    out.push_str(&xml[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_paragraphs;
    use pretty_assertions::assert_eq;

    const XML: &str = r#"<w:body><w:p w:rsidR="00A1"><w:pPr><w:jc w:val="both"/></w:pPr><w:r><w:rPr><w:rFonts w:ascii="Arial"/><w:sz w:val="20"/></w:rPr><w:t>ACME &amp; CIA LTDA</w:t></w:r></w:p><w:p/></w:body>"#;

    #[test]
    fn test_untouched_slots_render_identically() {
        let slots = read_paragraphs(XML).unwrap();
        assert_eq!(render(XML, &slots), XML);
    }

    #[test]
    fn test_rewritten_paragraph_keeps_tag_and_properties() {
        let mut slots = read_paragraphs(XML).unwrap();
        let template = slots[0].paragraph.runs()[0].clone();
        slots[0].paragraph.replace_runs(vec![
            Run {
                text: "ACME & CIA LTDA".into(),
                bold: true,
                highlight: true,
                ..Run::default()
            }
            .with_font_of(&template),
            Run::plain(" fim").with_font_of(&template),
        ]);

        let rendered = render(XML, &slots);
        assert_eq!(
            rendered,
            concat!(
                r#"<w:body><w:p w:rsidR="00A1"><w:pPr><w:jc w:val="both"/></w:pPr>"#,
                r#"<w:r><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial" w:cs="Arial"/><w:b/><w:bCs/><w:sz w:val="20"/><w:szCs w:val="20"/><w:highlight w:val="yellow"/></w:rPr><w:t xml:space="preserve">ACME &amp; CIA LTDA</w:t></w:r>"#,
                r#"<w:r><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial" w:cs="Arial"/><w:sz w:val="20"/><w:szCs w:val="20"/></w:rPr><w:t xml:space="preserve"> fim</w:t></w:r>"#,
                r#"</w:p><w:p/></w:body>"#
            )
        );

        let reread = read_paragraphs(&rendered).unwrap();
        assert_eq!(reread[0].paragraph.runs(), slots[0].paragraph.runs());
    }

    #[test]
    fn test_self_closing_paragraph_is_opened() {
        let mut slots = read_paragraphs(XML).unwrap();
        slots[1].paragraph.replace_runs(vec![Run::plain("novo")]);
        assert!(render(XML, &slots).ends_with(
            r#"<w:p><w:r><w:t xml:space="preserve">novo</w:t></w:r></w:p></w:body>"#
        ));
    }

    #[test]
    fn test_anchors_wrap_the_new_runs() {
        let xml = r#"<w:body><w:p><w:pPr><w:jc w:val="both"/></w:pPr><w:bookmarkStart w:id="3" w:name="_Ref1"/><w:r><w:t>JOSÉ</w:t></w:r><w:bookmarkEnd w:id="3"/><w:r><w:t> DA SILVA</w:t></w:r></w:p></w:body>"#;
        let mut slots = read_paragraphs(xml).unwrap();
        slots[0].paragraph.replace_runs(vec![Run::plain("JOSÉ DA SILVA")]);
        assert_eq!(
            render(xml, &slots),
            concat!(
                r#"<w:body><w:p><w:pPr><w:jc w:val="both"/></w:pPr><w:bookmarkStart w:id="3" w:name="_Ref1"/>"#,
                r#"<w:r><w:t xml:space="preserve">JOSÉ DA SILVA</w:t></w:r>"#,
                r#"<w:bookmarkEnd w:id="3"/></w:p></w:body>"#
            )
        );
    }

    #[test]
    fn test_tabs_and_breaks_become_elements() {
        assert_eq!(
            run_xml(&Run::plain("a\tb\n")),
            r#"<w:r><w:t xml:space="preserve">a</w:t><w:tab/><w:t xml:space="preserve">b</w:t><w:br/></w:r>"#
        );
    }
}
