//! Layout mutation: page geometry, columns, numbering, and
//! header/footer trees.

use super::policy::{Masthead, RunningFooter, RunningHeader, StylePolicy};
use crate::error::{Error, Result};
use crate::model::{
    cm_to_emu, cm_to_twips, Alignment, Block, Document, Drawing, Extent, FieldCharKind, MediaPart,
    PageNumbering, Paragraph, Relationship, Run, RunContent, RunProps, Section, Table, TableCell,
    TableRow,
};
use std::fs;
use std::path::Path;

/// OOXML relationship type for images.
const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Build the three sibling runs of a well-formed PAGE field: begin
/// marker, instruction text, end marker.
///
/// All field injection goes through this builder; a field missing one
/// of the three parts renders as a blank page number instead of
/// erroring, so the triplet is never assembled inline at call sites.
pub fn page_field_runs() -> Vec<Run> {
    vec![
        Run {
            props: RunProps::default(),
            content: vec![RunContent::FieldChar(FieldCharKind::Begin)],
        },
        Run {
            props: RunProps::default(),
            content: vec![RunContent::InstrText(" PAGE ".into())],
        },
        Run {
            props: RunProps::default(),
            content: vec![RunContent::FieldChar(FieldCharKind::End)],
        },
    ]
}

/// Apply the policy's column count, spacing, and section start type to
/// every section.
pub fn apply_column_policy(document: &mut Document, policy: &StylePolicy) {
    for section in &mut document.sections {
        section.columns = policy.columns;
        section.start = policy.section_start;
    }
}

/// Apply the policy's page size and margins to every section.
pub fn apply_page_geometry(document: &mut Document, policy: &StylePolicy) {
    for section in &mut document.sections {
        section.page = policy.page;
    }
}

/// Apply line numbering and continuous page numbering.
///
/// Only the first section carries an explicit page-number start; later
/// sections omit the value so numbering continues across breaks.
pub fn apply_numbering(document: &mut Document, policy: &StylePolicy) {
    for (i, section) in document.sections.iter_mut().enumerate() {
        section.line_numbering = policy
            .line_numbering
            .map(crate::model::LineNumbering::continuous);
        section.page_numbering = Some(PageNumbering {
            start: if i == 0 { Some(1) } else { None },
        });
    }
}

/// Rewrite every section's header/footer trees per the policy.
///
/// Slots are cleared to an explicit unlinked state first; masthead
/// content goes only on the first section's first page, running
/// headers/footers on every section. Missing masthead assets abort the
/// conversion.
pub fn apply_headers_footers(document: &mut Document, policy: &StylePolicy) -> Result<()> {
    // A single-paragraph document cannot exercise the recto/verso
    // headers; give it a second page.
    if document.paragraph_count() < 2 {
        let mut page_break = Paragraph::new();
        page_break.add_run(Run::page_break());
        document.push_paragraph(page_break);
    }

    let usable = policy.usable_width_twips();
    let mut new_media: Vec<MediaPart> = Vec::new();

    for (i, section) in document.sections.iter_mut().enumerate() {
        section.clear_header_footer_slots();
        section.title_page = policy.title_page && i == 0;
        section.even_odd_headers = policy.distinct_even_odd;

        if i == 0 {
            if let Some(masthead) = &policy.masthead {
                inject_masthead(section, masthead, usable, &mut new_media)?;
            }
        }

        match &policy.header {
            RunningHeader::None => {}
            RunningHeader::CenteredText { text, bordered } => {
                let header = section.header_default.unlinked_mut();
                header.add_block(Block::Paragraph(centered_header_text(
                    text, *bordered, policy,
                )));
            }
            RunningHeader::MirroredCitation { citation, size_pts } => {
                // Odd pages: citation left, page number right.
                let header = section.header_default.unlinked_mut();
                header.add_block(Block::Table(citation_table(
                    usable,
                    citation,
                    *size_pts,
                    policy,
                    false,
                )));
                if policy.distinct_even_odd {
                    // Even pages mirror the odd layout.
                    let header = section.header_even.unlinked_mut();
                    header.add_block(Block::Table(citation_table(
                        usable,
                        citation,
                        *size_pts,
                        policy,
                        true,
                    )));
                }
            }
        }

        match policy.footer {
            RunningFooter::None => {}
            RunningFooter::CenteredPageField => {
                let mut paragraph = Paragraph::new();
                paragraph.props.alignment = Some(Alignment::Center);
                paragraph.runs = page_field_runs();
                let footer = section.footer_default.unlinked_mut();
                footer.add_block(Block::Paragraph(paragraph));
            }
        }
    }

    document.media.extend(new_media);
    Ok(())
}

/// A two-cell, single-row table spanning `total_width` twips.
fn two_cell_table(total_width: i64, left_width: i64, left: TableCell, right: TableCell) -> Table {
    let right_width = total_width - left_width;
    let mut table = Table::new();
    table.width_twips = Some(total_width);
    table.autofit = false;
    table.alignment = Alignment::Left;
    table.grid = vec![left_width, right_width];
    table.add_row(TableRow::new(vec![
        left.width(left_width),
        right.width(right_width),
    ]));
    table
}

/// Running-header table: static journal citation on one side, dynamic
/// page number on the other, sides swapped for even pages.
fn citation_table(
    usable: i64,
    citation: &str,
    size_pts: f32,
    policy: &StylePolicy,
    even_page: bool,
) -> Table {
    let mut citation_paragraph = Paragraph::new();
    citation_paragraph.add_run(Run::styled(
        citation,
        RunProps {
            font: Some(policy.roles.body.font.clone()),
            size_pts: Some(size_pts),
            ..Default::default()
        },
    ));

    let mut number_paragraph = Paragraph::new();
    number_paragraph.runs = page_field_runs();

    let (mut left_paragraph, mut right_paragraph) = if even_page {
        (number_paragraph, citation_paragraph)
    } else {
        (citation_paragraph, number_paragraph)
    };
    left_paragraph.props.alignment = Some(Alignment::Left);
    right_paragraph.props.alignment = Some(Alignment::Right);

    two_cell_table(
        usable,
        usable / 2,
        TableCell::with_paragraph(left_paragraph),
        TableCell::with_paragraph(right_paragraph),
    )
}

/// Single centered header line, optionally ruled below.
fn centered_header_text(text: &str, bordered: bool, policy: &StylePolicy) -> Paragraph {
    let mut paragraph = Paragraph::new();
    paragraph.props.alignment = Some(Alignment::Center);
    paragraph.props.border_bottom = bordered;
    paragraph.add_run(Run::styled(
        text,
        RunProps {
            font: Some(policy.roles.body.font.clone()),
            size_pts: Some(12.0),
            bold: Some(true),
            ..Default::default()
        },
    ));
    paragraph
}

/// First-page masthead: image pair in the header, image plus copyright
/// line in the footer.
fn inject_masthead(
    section: &mut Section,
    masthead: &Masthead,
    usable: i64,
    new_media: &mut Vec<MediaPart>,
) -> Result<()> {
    let extent = Extent {
        cx: cm_to_emu(masthead.image_width_cm),
        cy: cm_to_emu(masthead.image_height_cm),
    };

    let left = load_masthead_image(&masthead.left_image, "word/media/masthead_left", new_media)?;
    let right =
        load_masthead_image(&masthead.right_image, "word/media/masthead_right", new_media)?;
    let footer =
        load_masthead_image(&masthead.footer_image, "word/media/masthead_footer", new_media)?;

    // Header: one image per cell, outer-aligned.
    let header = section.header_first.unlinked_mut();
    header.add_relationship(image_relationship("rId1", &left));
    header.add_relationship(image_relationship("rId2", &right));
    header.add_block(Block::Table(two_cell_table(
        usable,
        usable / 2,
        TableCell::with_paragraph(image_paragraph("rId1", extent, Alignment::Left)),
        TableCell::with_paragraph(image_paragraph("rId2", extent, Alignment::Right)),
    )));

    // Footer: image left, copyright line right.
    let footer_slot = section.footer_first.unlinked_mut();
    footer_slot.add_relationship(image_relationship("rId1", &footer));
    let mut copyright = Paragraph::with_text(&masthead.copyright);
    copyright.props.alignment = Some(Alignment::Left);
    footer_slot.add_block(Block::Table(two_cell_table(
        usable,
        cm_to_twips(5.0),
        TableCell::with_paragraph(image_paragraph("rId1", extent, Alignment::Left)),
        TableCell::with_paragraph(copyright),
    )));

    Ok(())
}

/// Read a masthead asset from disk into a package media part, keyed by
/// `stem` plus the source extension. A missing file is a hard failure.
fn load_masthead_image(
    path: &Path,
    stem: &str,
    new_media: &mut Vec<MediaPart>,
) -> Result<String> {
    let data =
        fs::read(path).map_err(|_| Error::ResourceMissing(path.display().to_string()))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("jpg")
        .to_lowercase();
    let name = format!("{}.{}", stem, extension);
    if !new_media.iter().any(|m| m.name == name) {
        new_media.push(MediaPart {
            name: name.clone(),
            data,
        });
    }
    Ok(name)
}

fn image_relationship(id: &str, media_name: &str) -> Relationship {
    // Header part rels resolve targets relative to word/.
    let target = media_name.trim_start_matches("word/").to_string();
    Relationship {
        id: id.into(),
        rel_type: IMAGE_REL_TYPE.into(),
        target,
        external: false,
    }
}

/// A paragraph holding one inline picture referencing `rel_id`.
fn image_paragraph(rel_id: &str, extent: Extent, alignment: Alignment) -> Paragraph {
    let mut paragraph = Paragraph::new();
    paragraph.props.alignment = Some(alignment);
    paragraph.add_run(Run::drawing(Drawing::new(
        inline_picture_xml(rel_id, extent),
        Some(extent),
    )));
    paragraph
}

/// Minimal inline-picture DrawingML referencing an image relationship.
fn inline_picture_xml(rel_id: &str, extent: Extent) -> String {
    format!(
        concat!(
            r#"<w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:docPr id="1" name="{id}"/>"#,
            r#"<a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
            r#"<a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:nvPicPr><pic:cNvPr id="0" name="{id}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="{id}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            r#"</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>"#,
        ),
        cx = extent.cx,
        cy = extent.cy,
        id = rel_id,
    )
}
