//! DOCX package assembly: part planning, content types, relationships,
//! and ZIP output.

use super::document_xml::{self, HeaderFooterPlan, HfKind, HfRef};
use super::header_footer;
use crate::error::{Error, Result};
use crate::model::{Document, HeaderFooter, HeaderFooterSlot, Relationship};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const REL_TYPE_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_TYPE_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_TYPE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_TYPE_NUMBERING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
const REL_TYPE_SETTINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
const REL_TYPE_HEADER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
const REL_TYPE_FOOTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";

/// Fallback styles part for documents parsed without one.
const DEFAULT_STYLES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal">"#,
    r#"<w:name w:val="Normal"/></w:style></w:styles>"#,
);

/// Serializer from the document tree back to a `.docx` package.
pub struct DocxWriter;

impl DocxWriter {
    /// Write a document to a file, returning the path written.
    pub fn write_file<P: AsRef<Path>>(document: &Document, path: P) -> Result<PathBuf> {
        let bytes = Self::write_bytes(document)?;
        fs::write(&path, bytes)?;
        Ok(path.as_ref().to_path_buf())
    }

    /// Serialize a document to package bytes.
    pub fn write_bytes(document: &Document) -> Result<Vec<u8>> {
        build_package(document)
    }
}

/// One header/footer part scheduled for emission.
struct HfPart<'a> {
    part_name: String,
    root: &'static str,
    content: &'a HeaderFooter,
}

fn build_package(document: &Document) -> Result<Vec<u8>> {
    let mut plan = HeaderFooterPlan::default();
    let mut hf_parts: Vec<HfPart> = Vec::new();

    // Carry only relationships whose targets will exist in the output
    // package; a reference to a part that is not written (source
    // headers, themes, font tables) reads as corruption downstream.
    let mut document_rels: Vec<Relationship> = document
        .relationships
        .iter()
        .filter(|rel| rel.external || target_is_written(document, &rel.target))
        .cloned()
        .collect();

    let mut header_count = 0usize;
    let mut footer_count = 0usize;
    for section in &document.sections {
        let slots: [(&HeaderFooterSlot, &'static str, HfKind); 5] = [
            (&section.header_first, "first", HfKind::Header),
            (&section.header_default, "default", HfKind::Header),
            (&section.header_even, "even", HfKind::Header),
            (&section.footer_first, "first", HfKind::Footer),
            (&section.footer_default, "default", HfKind::Footer),
        ];

        let mut refs = Vec::new();
        for (slot, slot_name, kind) in slots {
            let HeaderFooterSlot::Content(content) = slot else {
                continue;
            };
            let (part_name, root, rel_type) = match kind {
                HfKind::Header => {
                    header_count += 1;
                    (
                        format!("header{}.xml", header_count),
                        "w:hdr",
                        REL_TYPE_HEADER,
                    )
                }
                HfKind::Footer => {
                    footer_count += 1;
                    (
                        format!("footer{}.xml", footer_count),
                        "w:ftr",
                        REL_TYPE_FOOTER,
                    )
                }
            };
            let rel_id = format!("rIdHF{}", header_count + footer_count);
            document_rels.push(Relationship {
                id: rel_id.clone(),
                rel_type: rel_type.into(),
                target: part_name.clone(),
                external: false,
            });
            refs.push(HfRef {
                kind,
                slot: slot_name,
                rel_id,
            });
            hf_parts.push(HfPart {
                part_name,
                root,
                content,
            });
        }
        plan.refs.push(refs);
    }

    ensure_relationship(&mut document_rels, REL_TYPE_STYLES, "styles.xml", "rIdStyles");
    if document.numbering_xml.is_some() {
        ensure_relationship(
            &mut document_rels,
            REL_TYPE_NUMBERING,
            "numbering.xml",
            "rIdNumbering",
        );
    }
    let needs_settings = document.sections.iter().any(|s| s.even_odd_headers);
    if needs_settings {
        ensure_relationship(
            &mut document_rels,
            REL_TYPE_SETTINGS,
            "settings.xml",
            "rIdSettings",
        );
    }

    let document_xml = document_xml::write_document(document, &plan)?;

    let cursor = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(cursor);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    write_entry(
        &mut zip,
        "[Content_Types].xml",
        content_types_xml(document, &hf_parts, needs_settings).as_bytes(),
        options,
    )?;
    write_entry(&mut zip, "_rels/.rels", package_rels_xml().as_bytes(), options)?;
    write_entry(&mut zip, "word/document.xml", &document_xml, options)?;
    write_entry(
        &mut zip,
        "word/_rels/document.xml.rels",
        relationships_xml(&document_rels).as_bytes(),
        options,
    )?;

    let styles_xml = document.styles_xml.as_deref().unwrap_or(DEFAULT_STYLES_XML);
    write_entry(&mut zip, "word/styles.xml", styles_xml.as_bytes(), options)?;

    if let Some(numbering_xml) = &document.numbering_xml {
        write_entry(&mut zip, "word/numbering.xml", numbering_xml.as_bytes(), options)?;
    }
    if needs_settings {
        write_entry(&mut zip, "word/settings.xml", settings_xml().as_bytes(), options)?;
    }

    for part in &hf_parts {
        let bytes = header_footer::write_header_footer_part(part.content, part.root)?;
        write_entry(&mut zip, &format!("word/{}", part.part_name), &bytes, options)?;
        if !part.content.relationships.is_empty() {
            write_entry(
                &mut zip,
                &format!("word/_rels/{}.rels", part.part_name),
                relationships_xml(&part.content.relationships).as_bytes(),
                options,
            )?;
        }
    }

    write_entry(
        &mut zip,
        "docProps/core.xml",
        core_properties_xml(document).as_bytes(),
        options,
    )?;

    for media in &document.media {
        write_entry(&mut zip, &media.name, &media.data, options)?;
    }

    let cursor = zip.finish().map_err(|e| Error::Write(e.to_string()))?;
    Ok(cursor.into_inner())
}

fn write_entry(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    data: &[u8],
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(name, options)
        .map_err(|e| Error::Write(e.to_string()))?;
    zip.write_all(data)?;
    Ok(())
}

/// Whether a document-relative relationship target is a part this
/// writer emits.
fn target_is_written(document: &Document, target: &str) -> bool {
    let normalized = target
        .trim_start_matches('/')
        .trim_start_matches("word/");
    if normalized.starts_with("media/") {
        let part_name = format!("word/{}", normalized);
        return document.media.iter().any(|m| m.name == part_name);
    }
    normalized == "styles.xml" || (normalized == "numbering.xml" && document.numbering_xml.is_some())
}

fn ensure_relationship(rels: &mut Vec<Relationship>, rel_type: &str, target: &str, id: &str) {
    if !rels.iter().any(|r| r.rel_type == rel_type) {
        rels.push(Relationship {
            id: id.into(),
            rel_type: rel_type.into(),
            target: target.into(),
            external: false,
        });
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn media_content_type(name: &str) -> Option<(&'static str, &'static str)> {
    let extension = name.rsplit('.').next()?.to_lowercase();
    match extension.as_str() {
        "png" => Some(("png", "image/png")),
        "jpg" => Some(("jpg", "image/jpeg")),
        "jpeg" => Some(("jpeg", "image/jpeg")),
        "gif" => Some(("gif", "image/gif")),
        "bmp" => Some(("bmp", "image/bmp")),
        "tiff" | "tif" => Some(("tiff", "image/tiff")),
        "emf" => Some(("emf", "image/x-emf")),
        "wmf" => Some(("wmf", "image/x-wmf")),
        _ => None,
    }
}

fn content_types_xml(document: &Document, hf_parts: &[HfPart], needs_settings: bool) -> String {
    let mut defaults = vec![
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#.to_string(),
        r#"<Default Extension="xml" ContentType="application/xml"/>"#.to_string(),
    ];
    let mut seen_extensions = Vec::new();
    for media in &document.media {
        if let Some((extension, mime)) = media_content_type(&media.name) {
            if !seen_extensions.contains(&extension) {
                seen_extensions.push(extension);
                defaults.push(format!(
                    r#"<Default Extension="{}" ContentType="{}"/>"#,
                    extension, mime
                ));
            }
        }
    }

    let mut overrides = vec![
        r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#.to_string(),
        r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#.to_string(),
        r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#.to_string(),
    ];
    if document.numbering_xml.is_some() {
        overrides.push(r#"<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>"#.to_string());
    }
    if needs_settings {
        overrides.push(r#"<Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/>"#.to_string());
    }
    for part in hf_parts {
        let content_type = match part.root {
            "w:hdr" => "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml",
            _ => "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml",
        };
        overrides.push(format!(
            r#"<Override PartName="/word/{}" ContentType="{}"/>"#,
            part.part_name, content_type
        ));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            "{}{}",
            r#"</Types>"#,
        ),
        defaults.join(""),
        overrides.join("")
    )
}

fn package_rels_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
        r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
        r#"</Relationships>"#,
    )
    .to_string()
}

fn relationships_xml(rels: &[Relationship]) -> String {
    let mut entries = String::new();
    for rel in rels {
        entries.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
            escape_xml(&rel.id),
            escape_xml(&rel.rel_type),
            escape_xml(&rel.target),
            if rel.external {
                r#" TargetMode="External""#
            } else {
                ""
            }
        ));
    }
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            "{}",
            r#"</Relationships>"#,
        ),
        entries
    )
}

fn settings_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        r#"<w:evenAndOddHeaders/>"#,
        r#"</w:settings>"#,
    )
    .to_string()
}

fn core_properties_xml(document: &Document) -> String {
    let mut fields = String::new();
    if let Some(title) = &document.metadata.title {
        fields.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(title)));
    }
    if let Some(creator) = &document.metadata.creator {
        fields.push_str(&format!("<dc:creator>{}</dc:creator>", escape_xml(creator)));
    }
    if let Some(created) = &document.metadata.created {
        fields.push_str(&format!(
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
            created.to_rfc3339()
        ));
    }
    if let Some(modified) = &document.metadata.modified {
        fields.push_str(&format!(
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>"#,
            modified.to_rfc3339()
        ));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<cp:coreProperties "#,
            r#"xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" "#,
            r#"xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "{}",
            r#"</cp:coreProperties>"#,
        ),
        fields
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Paragraph};
    use crate::parser::DocxParser;

    #[test]
    fn test_roundtrip_basic_document() {
        let mut doc = Document::from_texts(["First paragraph", "Second paragraph"]);
        doc.paragraph_mut(0).unwrap().style_name = Some("Title".into());
        doc.paragraph_mut(0).unwrap().style_id = Some("Title".into());
        doc.metadata.title = Some("Roundtrip".into());

        let bytes = DocxWriter::write_bytes(&doc).unwrap();
        assert!(crate::detect::is_docx_bytes(&bytes));

        let parsed = DocxParser::from_bytes(&bytes).unwrap().parse().unwrap();
        let texts: Vec<String> = parsed.paragraphs().map(|p| p.text()).collect();
        assert_eq!(texts, vec!["First paragraph", "Second paragraph"]);
        assert_eq!(parsed.metadata.title.as_deref(), Some("Roundtrip"));
    }

    #[test]
    fn test_header_parts_planned_per_slot() {
        let mut doc = Document::from_texts(["body"]);
        let section = doc.sections.last_mut().unwrap();
        section.clear_header_footer_slots();
        section
            .header_default
            .unlinked_mut()
            .add_block(Block::Paragraph(Paragraph::with_text("running head")));

        let bytes = DocxWriter::write_bytes(&doc).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        // Five cleared slots -> three headers + two footers.
        assert!(names.iter().any(|n| n == "word/header1.xml"));
        assert!(names.iter().any(|n| n == "word/header2.xml"));
        assert!(names.iter().any(|n| n == "word/header3.xml"));
        assert!(names.iter().any(|n| n == "word/footer1.xml"));
        assert!(names.iter().any(|n| n == "word/footer2.xml"));

        use std::io::Read;
        let mut part = String::new();
        archive
            .by_name("word/header2.xml")
            .unwrap()
            .read_to_string(&mut part)
            .unwrap();
        assert!(part.contains("running head"));
    }

    #[test]
    fn test_even_odd_headers_emit_settings_part() {
        let mut doc = Document::from_texts(["body"]);
        doc.sections.last_mut().unwrap().even_odd_headers = true;

        let bytes = DocxWriter::write_bytes(&doc).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"word/settings.xml"));
    }

    #[test]
    fn test_dangling_relationships_are_filtered() {
        use crate::model::MediaPart;
        let mut doc = Document::from_texts(["body"]);
        doc.media.push(MediaPart {
            name: "word/media/image1.png".into(),
            data: vec![1, 2, 3],
        });
        doc.relationships.push(Relationship {
            id: "rId1".into(),
            rel_type: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image"
                .into(),
            target: "media/image1.png".into(),
            external: false,
        });
        // The source had a theme part this writer does not emit.
        doc.relationships.push(Relationship {
            id: "rId2".into(),
            rel_type: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme"
                .into(),
            target: "theme/theme1.xml".into(),
            external: false,
        });

        let bytes = DocxWriter::write_bytes(&doc).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        use std::io::Read;
        let mut rels = String::new();
        archive
            .by_name("word/_rels/document.xml.rels")
            .unwrap()
            .read_to_string(&mut rels)
            .unwrap();
        assert!(rels.contains("media/image1.png"));
        assert!(!rels.contains("theme/theme1.xml"));
    }

    #[test]
    fn test_media_round_trips() {
        use crate::model::MediaPart;
        let mut doc = Document::from_texts(["body"]);
        doc.media.push(MediaPart {
            name: "word/media/image1.png".into(),
            data: vec![1, 2, 3, 4],
        });

        let bytes = DocxWriter::write_bytes(&doc).unwrap();
        let parsed = DocxParser::from_bytes(&bytes).unwrap().parse().unwrap();
        assert_eq!(parsed.media.len(), 1);
        assert_eq!(parsed.media[0].data, vec![1, 2, 3, 4]);
    }
}
