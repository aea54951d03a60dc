//! Writer/parser round-trip fidelity tests.

use redocx::model::{Columns, Paragraph};
use redocx::{format_file_with_policy, parse_file, Document, DocxParser, DocxWriter, StylePolicy};

const STYLES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#,
    r#"<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="Heading 1"/></w:style>"#,
    r#"<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/></w:style>"#,
    r#"</w:styles>"#,
);

fn sample_document() -> Document {
    let mut doc = Document::new();
    doc.styles_xml = Some(STYLES_XML.to_string());
    doc.push_paragraph(Paragraph::styled("Title", "A Study of Round Trips"));
    doc.push_paragraph(Paragraph::with_text("A. Author"));
    doc.push_paragraph(Paragraph::styled("Heading 1", "Introduction"));
    doc.push_paragraph(Paragraph::with_text("Body text with special chars: < & >"));
    doc
}

#[test]
fn texts_and_styles_survive_roundtrip() {
    let doc = sample_document();
    let bytes = DocxWriter::write_bytes(&doc).unwrap();
    let parsed = DocxParser::from_bytes(&bytes).unwrap().parse().unwrap();

    let texts: Vec<String> = parsed.paragraphs().map(|p| p.text()).collect();
    assert_eq!(
        texts,
        vec![
            "A Study of Round Trips",
            "A. Author",
            "Introduction",
            "Body text with special chars: < & >",
        ]
    );

    let styles: Vec<Option<&str>> = parsed
        .paragraphs()
        .map(|p| p.style_name.as_deref())
        .collect();
    assert_eq!(styles, vec![Some("Title"), None, Some("Heading 1"), None]);
}

#[test]
fn section_geometry_survives_roundtrip() {
    let mut doc = sample_document();
    let section = doc.sections.last_mut().unwrap();
    section.page.width_twips = 11906;
    section.page.height_twips = 16838;
    section.page.margin_left_twips = 900;
    section.columns = Columns::multi(2, 340);
    section.title_page = true;

    let bytes = DocxWriter::write_bytes(&doc).unwrap();
    let parsed = DocxParser::from_bytes(&bytes).unwrap().parse().unwrap();

    let section = parsed.sections.last().unwrap();
    assert_eq!(section.page.width_twips, 11906);
    assert_eq!(section.page.height_twips, 16838);
    assert_eq!(section.page.margin_left_twips, 900);
    assert_eq!(section.columns.count, 2);
    assert_eq!(section.columns.space_twips, 340);
    assert!(section.title_page);
}

#[test]
fn run_formatting_survives_roundtrip() {
    use redocx::model::{Run, RunProps};

    let mut doc = sample_document();
    let mut p = Paragraph::new();
    p.add_run(Run::styled(
        "styled span",
        RunProps {
            font: Some("Minion Pro".into()),
            size_pts: Some(10.5),
            bold: Some(true),
            italic: Some(false),
            underline: Some(true),
            color: Some("000000".into()),
        },
    ));
    doc.push_paragraph(p);

    let bytes = DocxWriter::write_bytes(&doc).unwrap();
    let parsed = DocxParser::from_bytes(&bytes).unwrap().parse().unwrap();

    let run = &parsed
        .paragraphs()
        .find(|p| p.text() == "styled span")
        .unwrap()
        .runs[0];
    assert_eq!(run.props.font.as_deref(), Some("Minion Pro"));
    assert_eq!(run.props.size_pts, Some(10.5));
    assert_eq!(run.props.bold, Some(true));
    assert_eq!(run.props.underline, Some(true));
    assert_eq!(run.props.color.as_deref(), Some("000000"));
}

#[test]
fn formatted_file_reparses_with_house_style() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("paper.docx");
    let output = dir.path().join("paper.formatted.docx");

    DocxWriter::write_file(&sample_document(), &input).unwrap();

    let mut policy = StylePolicy::tech_science();
    policy.masthead = None;
    let written = format_file_with_policy(&input, &output, policy.clone()).unwrap();
    assert_eq!(written, output);

    let formatted = parse_file(&output).unwrap();
    let text = formatted.plain_text();
    assert!(text.contains("DOI:"));
    assert!(text.contains("Paper Type"));
    assert!(text.contains("A Study of Round Trips"));

    let section = formatted.sections.last().unwrap();
    assert_eq!(section.page.width_twips, policy.page.width_twips);
    assert_eq!(section.columns.count, 1);
    assert!(section.line_numbering.is_some());
}
