//! Structural surgery: front-matter insertion, heading-relative
//! indentation, image isolation, and inline whitespace normalization.
//!
//! Every operation here is idempotent on an already-conformant
//! document.

use super::formatting::apply_formatting;
use super::front_matter::{self, FrontMatter};
use super::policy::StylePolicy;
use crate::model::{Alignment, Block, Document, Paragraph, Run, RunContent};
use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Space in points under inserted spacer paragraphs.
const SPACER_SPACE_AFTER_PTS: f32 = 6.0;

fn spacer_paragraph() -> Paragraph {
    let mut spacer = Paragraph::new();
    spacer.props.space_after_pts = Some(SPACER_SPACE_AFTER_PTS);
    spacer
}

/// Insert missing DOI and paper-type blocks and settle the spacing
/// before the title.
///
/// Insertions are sibling-level tree edits; afterwards the locator is
/// re-run on the mutated tree, so no caller-held index survives a
/// shift. Returns the final front-matter positions.
pub fn insert_missing_front_matter(document: &mut Document, policy: &StylePolicy) -> FrontMatter {
    let mut front = front_matter::locate(document, policy.doi_match);

    if !front.has_doi {
        log::debug!("no DOI line found, inserting placeholder");
        let mut doi = Paragraph::with_text(&policy.doi_placeholder);
        apply_formatting(&mut doi, &policy.roles.doi_number);
        document.insert_paragraph_before(0, doi);
        document.insert_paragraph_after(0, spacer_paragraph());
        front = front_matter::locate(document, policy.doi_match);
    } else if let Some(index) = front.doi {
        if let Some(paragraph) = document.paragraph_mut(index) {
            apply_formatting(paragraph, &policy.roles.doi_number);
        }
    }

    if !front.has_paper_type {
        log::debug!("no paper-type line found, inserting placeholder");
        let mut paper_type = Paragraph::with_text(&policy.paper_type_placeholder);
        apply_formatting(&mut paper_type, &policy.roles.article_type);

        // Place the block right after the DOI line, skipping one blank
        // spacer if present.
        let mut insert_at = front.doi.map(|i| i + 1).unwrap_or(0);
        if document
            .paragraph(insert_at)
            .map(|p| p.is_blank())
            .unwrap_or(false)
        {
            insert_at += 1;
        }
        document.insert_paragraph_before(insert_at, paper_type);
        document.insert_paragraph_after(insert_at, spacer_paragraph());
        front = front_matter::locate(document, policy.doi_match);
    } else if let Some(index) = front.paper_type {
        if let Some(paragraph) = document.paragraph_mut(index) {
            apply_formatting(paragraph, &policy.roles.article_type);
        }
    }

    // One blank line between the front-matter block and the title.
    if let Some(title_index) = front.title {
        if title_index > 0 {
            let prev_blank = document
                .paragraph(title_index - 1)
                .map(|p| p.is_blank())
                .unwrap_or(true);
            if !prev_blank {
                document.insert_paragraph_before(title_index, spacer_paragraph());
                front = front_matter::locate(document, policy.doi_match);
            } else if let Some(prev) = document.paragraph_mut(title_index - 1) {
                prev.props.space_after_pts = Some(SPACER_SPACE_AFTER_PTS);
            }
        }
    }

    front
}

/// Whether a paragraph that follows a heading should receive a
/// first-line indent.
///
/// The text must start with a letter; a leading digit or a single
/// capital letter followed by whitespace reads as a list or label
/// marker and is skipped, as is a fully emphasized (all-bold)
/// paragraph.
pub fn should_indent_after_heading(paragraph: &Paragraph) -> bool {
    let text = paragraph.text();
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }
    if first.is_ascii_uppercase() && chars.next().map(char::is_whitespace).unwrap_or(false) {
        return false;
    }
    !paragraph.all_text_runs_bold()
}

/// Split every paragraph that mixes text and drawings.
///
/// The original paragraph keeps only its text runs; a new
/// center-aligned paragraph inserted immediately after receives the
/// drawing runs in their original order, each image scaled by `scale`.
/// Paragraphs that are already text-only or drawing-only are left
/// alone, which makes a second pass a no-op.
pub fn isolate_images(document: &mut Document, scale: f64) {
    let mut block_index = 0;
    while block_index < document.body.len() {
        let needs_split = match &document.body[block_index] {
            Block::Paragraph(p) => p.has_text() && p.has_drawing(),
            Block::Table(_) => false,
        };
        if !needs_split {
            block_index += 1;
            continue;
        }

        let Block::Paragraph(paragraph) = &mut document.body[block_index] else {
            unreachable!("checked above");
        };

        let mut moved: Vec<Run> = Vec::new();
        let mut kept: Vec<Run> = Vec::new();
        for run in paragraph.runs.drain(..) {
            if run.has_drawing() {
                moved.push(run);
            } else {
                kept.push(run);
            }
        }
        paragraph.runs = kept;

        for run in &mut moved {
            for content in &mut run.content {
                if let RunContent::Drawing(drawing) = content {
                    drawing.scale(scale);
                }
            }
        }

        let mut image_paragraph = Paragraph::new();
        image_paragraph.props.alignment = Some(Alignment::Center);
        image_paragraph.runs = moved;
        document
            .body
            .insert(block_index + 1, Block::Paragraph(image_paragraph));

        // Skip past the paragraph we just inserted.
        block_index += 2;
    }
}

static MULTI_SPACE: OnceLock<Regex> = OnceLock::new();

fn multi_space_re() -> &'static Regex {
    MULTI_SPACE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Collapse runs of whitespace to single spaces across every text-only
/// paragraph, normalizing to NFC on the way.
///
/// Paragraphs carrying drawings are left untouched so image anchors
/// survive. When a rebuild happens the merged run inherits the first
/// text run's character properties.
pub fn normalize_inline_spacing(document: &mut Document) {
    for paragraph in document.paragraphs_mut() {
        if paragraph.has_drawing() {
            continue;
        }
        let full_text = paragraph.text();
        if full_text.is_empty() {
            continue;
        }
        let composed: String = full_text.nfc().collect();
        let normalized = multi_space_re()
            .replace_all(&composed, " ")
            .trim()
            .to_string();
        if normalized != full_text {
            let props = paragraph
                .runs
                .iter()
                .find(|r| !r.text().is_empty())
                .map(|r| r.props.clone())
                .unwrap_or_default();
            paragraph.runs = vec![Run::styled(normalized, props)];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::policy::StylePolicy;
    use crate::model::{Drawing, Extent, RunProps};

    fn policy() -> StylePolicy {
        StylePolicy::tech_science()
    }

    #[test]
    fn test_inserts_doi_and_paper_type() {
        let mut doc = Document::from_texts(["Some Title", "A. Author"]);
        let front = insert_missing_front_matter(&mut doc, &policy());

        let texts: Vec<String> = doc.paragraphs().map(|p| p.text()).collect();
        assert!(texts[0].starts_with("DOI:"));
        assert!(texts[1].is_empty());
        assert!(texts[2].starts_with("Paper Type"));
        assert!(texts[3].is_empty());
        assert_eq!(front.title, Some(4));
        assert_eq!(front.authors, Some(5));
    }

    #[test]
    fn test_insertion_is_idempotent() {
        let mut doc = Document::from_texts(["Some Title", "A. Author"]);
        insert_missing_front_matter(&mut doc, &policy());
        let count_after_first = doc.paragraph_count();
        insert_missing_front_matter(&mut doc, &policy());
        assert_eq!(doc.paragraph_count(), count_after_first);
    }

    #[test]
    fn test_existing_doi_is_only_reformatted() {
        let mut doc = Document::from_texts(["DOI: 10.1000/xyz", "Some Title"]);
        let front = insert_missing_front_matter(&mut doc, &policy());
        assert_eq!(front.doi, Some(0));
        let doi = doc.paragraph(0).unwrap();
        assert_eq!(doi.runs[0].props.size_pts, Some(7.0));
        // No duplicate DOI block.
        assert_eq!(
            doc.paragraphs().filter(|p| p.text().starts_with("DOI")).count(),
            1
        );
    }

    #[test]
    fn test_indent_predicate() {
        assert!(should_indent_after_heading(&Paragraph::with_text(
            "the results show"
        )));
        assert!(should_indent_after_heading(&Paragraph::with_text(
            "Results follow."
        )));
        // Leading digit: probable numbered list.
        assert!(!should_indent_after_heading(&Paragraph::with_text(
            "1. first item"
        )));
        // Single capital + whitespace: probable label.
        assert!(!should_indent_after_heading(&Paragraph::with_text(
            "A label follows"
        )));
        assert!(!should_indent_after_heading(&Paragraph::new()));

        let mut bold = Paragraph::new();
        bold.add_run(Run::styled(
            "All bold text",
            RunProps {
                bold: Some(true),
                ..Default::default()
            },
        ));
        assert!(!should_indent_after_heading(&bold));
    }

    fn drawing_run() -> Run {
        Run::drawing(Drawing::new(
            r#"<w:drawing><wp:inline><wp:extent cx="914400" cy="914400"/></wp:inline></w:drawing>"#,
            Some(Extent {
                cx: 914400,
                cy: 914400,
            }),
        ))
    }

    #[test]
    fn test_isolate_images_splits_mixed_paragraph() {
        let mut doc = Document::new();
        let mut mixed = Paragraph::with_text("Figure 1 shows");
        mixed.add_run(drawing_run());
        doc.push_paragraph(mixed);

        isolate_images(&mut doc, 0.85);

        assert_eq!(doc.paragraph_count(), 2);
        let text_paragraph = doc.paragraph(0).unwrap();
        assert!(!text_paragraph.has_drawing());
        assert_eq!(text_paragraph.text(), "Figure 1 shows");

        let image_paragraph = doc.paragraph(1).unwrap();
        assert!(image_paragraph.has_drawing());
        assert!(!image_paragraph.has_text());
        assert_eq!(image_paragraph.props.alignment, Some(Alignment::Center));
        let RunContent::Drawing(drawing) = &image_paragraph.runs[0].content[0] else {
            panic!("expected drawing content");
        };
        assert_eq!(
            drawing.extent,
            Some(Extent {
                cx: 777240,
                cy: 777240
            })
        );
    }

    #[test]
    fn test_isolate_images_moves_all_images_in_order() {
        let mut doc = Document::new();
        let mut mixed = Paragraph::with_text("two figures");
        let mut first = drawing_run();
        first.content.push(RunContent::Text(String::new()));
        mixed.add_run(first);
        mixed.add_run(drawing_run());
        doc.push_paragraph(mixed);

        isolate_images(&mut doc, 1.0);

        let image_paragraph = doc.paragraph(1).unwrap();
        assert_eq!(image_paragraph.runs.len(), 2);
    }

    #[test]
    fn test_isolate_images_is_idempotent() {
        let mut doc = Document::new();
        let mut mixed = Paragraph::with_text("Figure 1 shows");
        mixed.add_run(drawing_run());
        doc.push_paragraph(mixed);

        isolate_images(&mut doc, 0.85);
        let count = doc.paragraph_count();
        isolate_images(&mut doc, 0.85);
        assert_eq!(doc.paragraph_count(), count);
    }

    #[test]
    fn test_normalize_inline_spacing() {
        let mut doc = Document::from_texts(["too   many\t spaces  here "]);
        normalize_inline_spacing(&mut doc);
        assert_eq!(doc.paragraph(0).unwrap().text(), "too many spaces here");
    }

    #[test]
    fn test_normalize_keeps_run_props() {
        let mut doc = Document::new();
        let mut p = Paragraph::new();
        p.add_run(Run::styled(
            "spaced   out",
            RunProps {
                font: Some("Minion Pro".into()),
                ..Default::default()
            },
        ));
        doc.push_paragraph(p);
        normalize_inline_spacing(&mut doc);
        let run = &doc.paragraph(0).unwrap().runs[0];
        assert_eq!(run.text(), "spaced out");
        assert_eq!(run.props.font.as_deref(), Some("Minion Pro"));
    }

    #[test]
    fn test_normalize_skips_drawing_paragraphs() {
        let mut doc = Document::new();
        let mut p = Paragraph::with_text("text   with image");
        p.add_run(drawing_run());
        doc.push_paragraph(p);
        normalize_inline_spacing(&mut doc);
        assert_eq!(doc.paragraph(0).unwrap().text(), "text   with image");
    }
}
