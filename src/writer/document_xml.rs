//! Emission of WordprocessingML parts: the main document body and the
//! shared block/run serialization used by header and footer parts.

use crate::error::Result;
use crate::model::{
    Block, BreakKind, Document, Paragraph, ParagraphProps, Run, RunContent, RunProps, Section,
    Table, TableCell,
};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// Namespaces declared on every part root.
///
/// The full Word set, not just the prefixes this writer emits itself:
/// drawing subtrees captured at parse time reference prefixes like
/// `a:`, `pic:`, and `wp14:` that the source document declared on its
/// root, and they must stay resolvable after the rewrite.
pub(crate) const PART_NAMESPACES: &[(&str, &str)] = &[
    (
        "xmlns:w",
        "http://schemas.openxmlformats.org/wordprocessingml/2006/main",
    ),
    (
        "xmlns:r",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
    ),
    (
        "xmlns:wp",
        "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing",
    ),
    (
        "xmlns:a",
        "http://schemas.openxmlformats.org/drawingml/2006/main",
    ),
    (
        "xmlns:pic",
        "http://schemas.openxmlformats.org/drawingml/2006/picture",
    ),
    (
        "xmlns:m",
        "http://schemas.openxmlformats.org/officeDocument/2006/math",
    ),
    (
        "xmlns:mc",
        "http://schemas.openxmlformats.org/markup-compatibility/2006",
    ),
    ("xmlns:v", "urn:schemas-microsoft-com:vml"),
    ("xmlns:o", "urn:schemas-microsoft-com:office:office"),
    ("xmlns:w10", "urn:schemas-microsoft-com:office:word"),
    (
        "xmlns:w14",
        "http://schemas.microsoft.com/office/word/2010/wordml",
    ),
    (
        "xmlns:wp14",
        "http://schemas.microsoft.com/office/word/2010/wordprocessingDrawing",
    ),
    (
        "xmlns:wps",
        "http://schemas.microsoft.com/office/word/2010/wordprocessingShape",
    ),
    (
        "xmlns:wpg",
        "http://schemas.microsoft.com/office/word/2010/wordprocessingGroup",
    ),
    ("mc:Ignorable", "w14 wp14"),
];

/// Which part a header/footer reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HfKind {
    Header,
    Footer,
}

/// A header/footer reference to emit inside a sectPr.
#[derive(Debug, Clone)]
pub(crate) struct HfRef {
    pub kind: HfKind,
    /// `w:type` attribute: "first", "default", or "even"
    pub slot: &'static str,
    /// Relationship id in document.xml.rels
    pub rel_id: String,
}

/// Per-section header/footer references, parallel to
/// `Document::sections`.
#[derive(Debug, Clone, Default)]
pub(crate) struct HeaderFooterPlan {
    pub refs: Vec<Vec<HfRef>>,
}

impl HeaderFooterPlan {
    fn refs_for(&self, section_index: usize) -> &[HfRef] {
        self.refs
            .get(section_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn start_with_attrs(name: &str, attrs: &[(&str, &str)]) -> BytesStart<'static> {
    let mut start = BytesStart::new(name.to_string());
    for (key, value) in attrs {
        start.push_attribute((*key, *value));
    }
    start
}

fn empty_element(writer: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    writer.write_event(Event::Empty(start_with_attrs(name, attrs)))?;
    Ok(())
}

fn toggle_element(writer: &mut XmlWriter, name: &str, on: bool) -> Result<()> {
    if on {
        empty_element(writer, name, &[])
    } else {
        empty_element(writer, name, &[("w:val", "0")])
    }
}

/// Serialize `word/document.xml`.
pub(crate) fn write_document(document: &Document, plan: &HeaderFooterPlan) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut root = BytesStart::new("w:document");
    for (key, value) in PART_NAMESPACES {
        root.push_attribute((*key, *value));
    }
    writer.write_event(Event::Start(root))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;

    write_blocks(&mut writer, &document.body, Some((document, plan)))?;

    // Body-trailing section.
    if let Some(section) = document.sections.last() {
        let section_index = document.sections.len() - 1;
        write_section_properties(&mut writer, section, plan.refs_for(section_index))?;
    }

    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;
    Ok(writer.into_inner().into_inner())
}

/// Serialize a block sequence. `section_context` is present only for
/// the main document part, where paragraphs may carry section breaks.
pub(crate) fn write_blocks(
    writer: &mut XmlWriter,
    blocks: &[Block],
    section_context: Option<(&Document, &HeaderFooterPlan)>,
) -> Result<()> {
    for block in blocks {
        match block {
            Block::Paragraph(paragraph) => write_paragraph(writer, paragraph, section_context)?,
            Block::Table(table) => write_table(writer, table, section_context)?,
        }
    }
    Ok(())
}

fn write_paragraph(
    writer: &mut XmlWriter,
    paragraph: &Paragraph,
    section_context: Option<(&Document, &HeaderFooterPlan)>,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    write_paragraph_properties(writer, paragraph, section_context)?;
    for run in &paragraph.runs {
        write_run(writer, run)?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn has_paragraph_properties(paragraph: &Paragraph) -> bool {
    paragraph.style_id.is_some()
        || paragraph.style_name.is_some()
        || paragraph.section_break.is_some()
        || paragraph.props != ParagraphProps::default()
}

fn write_paragraph_properties(
    writer: &mut XmlWriter,
    paragraph: &Paragraph,
    section_context: Option<(&Document, &HeaderFooterPlan)>,
) -> Result<()> {
    if !has_paragraph_properties(paragraph) {
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;

    let style_id = paragraph
        .style_id
        .clone()
        .or_else(|| paragraph.style_name.as_ref().map(|n| n.replace(' ', "")));
    if let Some(id) = style_id {
        empty_element(writer, "w:pStyle", &[("w:val", id.as_str())])?;
    }

    let props = &paragraph.props;
    if let Some(keep_next) = props.keep_with_next {
        toggle_element(writer, "w:keepNext", keep_next)?;
    }
    if let Some(keep_together) = props.keep_together {
        toggle_element(writer, "w:keepLines", keep_together)?;
    }
    if let Some(widow_control) = props.widow_control {
        toggle_element(writer, "w:widowControl", widow_control)?;
    }

    if props.border_top || props.border_bottom {
        writer.write_event(Event::Start(BytesStart::new("w:pBdr")))?;
        let border_attrs = [
            ("w:val", "single"),
            ("w:sz", "12"),
            ("w:space", "1"),
            ("w:color", "000000"),
        ];
        if props.border_top {
            empty_element(writer, "w:top", &border_attrs)?;
        }
        if props.border_bottom {
            empty_element(writer, "w:bottom", &border_attrs)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:pBdr")))?;
    }

    if props.space_before_pts.is_some()
        || props.space_after_pts.is_some()
        || props.line_spacing.is_some()
    {
        let mut spacing = BytesStart::new("w:spacing");
        if let Some(before) = props.space_before_pts {
            spacing.push_attribute(("w:before", format!("{}", (before * 20.0) as i64).as_str()));
        }
        if let Some(after) = props.space_after_pts {
            spacing.push_attribute(("w:after", format!("{}", (after * 20.0) as i64).as_str()));
        }
        if let Some(line) = props.line_spacing {
            spacing.push_attribute(("w:line", format!("{}", (line * 240.0) as i64).as_str()));
            spacing.push_attribute(("w:lineRule", "auto"));
        }
        writer.write_event(Event::Empty(spacing))?;
    }

    if props.left_indent_twips.is_some()
        || props.right_indent_twips.is_some()
        || props.first_line_indent_twips.is_some()
    {
        let mut ind = BytesStart::new("w:ind");
        if let Some(left) = props.left_indent_twips {
            ind.push_attribute(("w:left", left.to_string().as_str()));
        }
        if let Some(right) = props.right_indent_twips {
            ind.push_attribute(("w:right", right.to_string().as_str()));
        }
        if let Some(first_line) = props.first_line_indent_twips {
            ind.push_attribute(("w:firstLine", first_line.to_string().as_str()));
        }
        writer.write_event(Event::Empty(ind))?;
    }

    if let Some(alignment) = props.alignment {
        empty_element(writer, "w:jc", &[("w:val", alignment.as_wml())])?;
    }

    if let Some(section_index) = paragraph.section_break {
        if let Some((document, plan)) = section_context {
            if let Some(section) = document.sections.get(section_index) {
                let refs = plan
                    .refs
                    .get(section_index)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                write_section_properties(writer, section, refs)?;
            }
        }
    }

    writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;
    Ok(())
}

fn has_run_properties(props: &RunProps) -> bool {
    *props != RunProps::default()
}

fn write_run(writer: &mut XmlWriter, run: &Run) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:r")))?;

    if has_run_properties(&run.props) {
        writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;
        if let Some(font) = &run.props.font {
            empty_element(
                writer,
                "w:rFonts",
                &[("w:ascii", font.as_str()), ("w:hAnsi", font.as_str())],
            )?;
        }
        if let Some(bold) = run.props.bold {
            toggle_element(writer, "w:b", bold)?;
        }
        if let Some(italic) = run.props.italic {
            toggle_element(writer, "w:i", italic)?;
        }
        if let Some(color) = &run.props.color {
            empty_element(writer, "w:color", &[("w:val", color.as_str())])?;
        }
        if let Some(size_pts) = run.props.size_pts {
            let half_points = format!("{}", (size_pts * 2.0) as i64);
            empty_element(writer, "w:sz", &[("w:val", half_points.as_str())])?;
            empty_element(writer, "w:szCs", &[("w:val", half_points.as_str())])?;
        }
        if let Some(underline) = run.props.underline {
            let val = if underline { "single" } else { "none" };
            empty_element(writer, "w:u", &[("w:val", val)])?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
    }

    for content in &run.content {
        match content {
            RunContent::Text(text) => {
                writer.write_event(Event::Start(start_with_attrs(
                    "w:t",
                    &[("xml:space", "preserve")],
                )))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new("w:t")))?;
            }
            RunContent::Drawing(drawing) => {
                // Raw subtree captured at parse time (or built by the
                // layout mutator); already well-formed markup.
                writer.write_event(Event::Text(BytesText::from_escaped(drawing.xml.as_str())))?;
            }
            RunContent::FieldChar(kind) => {
                empty_element(writer, "w:fldChar", &[("w:fldCharType", kind.as_wml())])?;
            }
            RunContent::InstrText(instr) => {
                writer.write_event(Event::Start(start_with_attrs(
                    "w:instrText",
                    &[("xml:space", "preserve")],
                )))?;
                writer.write_event(Event::Text(BytesText::new(instr)))?;
                writer.write_event(Event::End(BytesEnd::new(
                    "w:instrText",
                )))?;
            }
            RunContent::Break(kind) => match kind {
                BreakKind::Page => empty_element(writer, "w:br", &[("w:type", "page")])?,
                BreakKind::Line => empty_element(writer, "w:br", &[])?,
            },
        }
    }

    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    Ok(())
}

fn write_table(
    writer: &mut XmlWriter,
    table: &Table,
    section_context: Option<(&Document, &HeaderFooterPlan)>,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:tbl")))?;

    writer.write_event(Event::Start(BytesStart::new("w:tblPr")))?;
    if let Some(width) = table.width_twips {
        // The absolute dxa width attribute is what width-challenged
        // renderers actually honor.
        empty_element(
            writer,
            "w:tblW",
            &[("w:w", width.to_string().as_str()), ("w:type", "dxa")],
        )?;
    }
    empty_element(writer, "w:jc", &[("w:val", table.alignment.as_wml())])?;
    if !table.autofit {
        empty_element(writer, "w:tblLayout", &[("w:type", "fixed")])?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:tblPr")))?;

    if !table.grid.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("w:tblGrid")))?;
        for width in &table.grid {
            empty_element(writer, "w:gridCol", &[("w:w", width.to_string().as_str())])?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:tblGrid")))?;
    }

    for row in &table.rows {
        writer.write_event(Event::Start(BytesStart::new("w:tr")))?;
        for cell in &row.cells {
            write_cell(writer, cell, section_context)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:tr")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("w:tbl")))?;
    Ok(())
}

fn write_cell(
    writer: &mut XmlWriter,
    cell: &TableCell,
    section_context: Option<(&Document, &HeaderFooterPlan)>,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:tc")))?;
    if let Some(width) = cell.width_twips {
        writer.write_event(Event::Start(BytesStart::new("w:tcPr")))?;
        empty_element(
            writer,
            "w:tcW",
            &[("w:w", width.to_string().as_str()), ("w:type", "dxa")],
        )?;
        writer.write_event(Event::End(BytesEnd::new("w:tcPr")))?;
    }

    if cell.blocks.is_empty() {
        // A cell must hold at least one paragraph.
        writer.write_event(Event::Start(BytesStart::new("w:p")))?;
        writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    } else {
        write_blocks(writer, &cell.blocks, section_context)?;
    }

    writer.write_event(Event::End(BytesEnd::new("w:tc")))?;
    Ok(())
}

fn write_section_properties(
    writer: &mut XmlWriter,
    section: &Section,
    refs: &[HfRef],
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:sectPr")))?;

    for hf_ref in refs {
        let name = match hf_ref.kind {
            HfKind::Header => "w:headerReference",
            HfKind::Footer => "w:footerReference",
        };
        empty_element(
            writer,
            name,
            &[("w:type", hf_ref.slot), ("r:id", hf_ref.rel_id.as_str())],
        )?;
    }

    empty_element(writer, "w:type", &[("w:val", section.start.as_wml())])?;
    empty_element(
        writer,
        "w:pgSz",
        &[
            ("w:w", section.page.width_twips.to_string().as_str()),
            ("w:h", section.page.height_twips.to_string().as_str()),
        ],
    )?;
    empty_element(
        writer,
        "w:pgMar",
        &[
            ("w:top", section.page.margin_top_twips.to_string().as_str()),
            (
                "w:right",
                section.page.margin_right_twips.to_string().as_str(),
            ),
            (
                "w:bottom",
                section.page.margin_bottom_twips.to_string().as_str(),
            ),
            (
                "w:left",
                section.page.margin_left_twips.to_string().as_str(),
            ),
            ("w:header", "720"),
            ("w:footer", "720"),
        ],
    )?;

    if let Some(numbering) = section.line_numbering {
        empty_element(
            writer,
            "w:lnNumType",
            &[
                ("w:countBy", numbering.count_by.to_string().as_str()),
                ("w:start", numbering.start.to_string().as_str()),
                ("w:distance", numbering.distance_twips.to_string().as_str()),
                ("w:restart", numbering.restart.as_wml()),
            ],
        )?;
    }

    if let Some(numbering) = section.page_numbering {
        match numbering.start {
            Some(start) => empty_element(
                writer,
                "w:pgNumType",
                &[("w:start", start.to_string().as_str())],
            )?,
            // No explicit start: numbering continues from the
            // previous section.
            None => empty_element(writer, "w:pgNumType", &[])?,
        }
    }

    empty_element(
        writer,
        "w:cols",
        &[
            ("w:num", section.columns.count.to_string().as_str()),
            ("w:space", section.columns.space_twips.to_string().as_str()),
        ],
    )?;

    if section.title_page {
        empty_element(writer, "w:titlePg", &[])?;
    }

    writer.write_event(Event::End(BytesEnd::new("w:sectPr")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Alignment, Document, Paragraph};

    fn render(document: &Document) -> String {
        let bytes = write_document(document, &HeaderFooterPlan::default()).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_write_basic_document() {
        let mut doc = Document::new();
        let mut p = Paragraph::styled("Heading 1", "Introduction");
        p.props.alignment = Some(Alignment::Center);
        doc.push_paragraph(p);

        let xml = render(&doc);
        assert!(xml.contains(r#"<w:pStyle w:val="Heading1"/>"#));
        assert!(xml.contains(r#"<w:jc w:val="center"/>"#));
        assert!(xml.contains(r#"<w:t xml:space="preserve">Introduction</w:t>"#));
        assert!(xml.contains("<w:sectPr>"));
        assert!(xml.ends_with("</w:document>"));
    }

    #[test]
    fn test_write_escapes_text() {
        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::with_text("a < b & c"));
        let xml = render(&doc);
        assert!(xml.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_write_drawing_passthrough() {
        use crate::model::{Drawing, Run};
        let mut doc = Document::new();
        let mut p = Paragraph::new();
        p.add_run(Run::drawing(Drawing::new(
            r#"<w:drawing><wp:inline><wp:extent cx="10" cy="10"/></wp:inline></w:drawing>"#,
            None,
        )));
        doc.push_paragraph(p);

        let xml = render(&doc);
        // Raw markup must come through unescaped.
        assert!(xml.contains(r#"<w:drawing><wp:inline>"#));
        assert!(!xml.contains("&lt;w:drawing"));
    }

    #[test]
    fn test_write_section_with_header_refs() {
        let doc = Document::from_texts(["body"]);
        let plan = HeaderFooterPlan {
            refs: vec![vec![HfRef {
                kind: HfKind::Header,
                slot: "default",
                rel_id: "rIdHF1".into(),
            }]],
        };
        let bytes = write_document(&doc, &plan).unwrap();
        let xml = String::from_utf8(bytes).unwrap();
        assert!(xml.contains(r#"<w:headerReference w:type="default" r:id="rIdHF1"/>"#));
    }
}
