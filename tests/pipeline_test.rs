//! Integration tests for the reflow pipeline.

use redocx::engine::{classify, isolate_images, DoiMatch, ReferencesMatch};
use redocx::model::{cm_to_twips, Drawing, Extent, Run, RunContent};
use redocx::{Document, Paragraph, Pipeline, SemanticRole, StylePolicy};

fn policy_without_masthead() -> StylePolicy {
    let mut policy = StylePolicy::tech_science();
    policy.masthead = None;
    policy
}

fn manuscript() -> Document {
    let mut doc = Document::new();
    doc.push_paragraph(Paragraph::with_text("Some Title"));
    doc.push_paragraph(Paragraph::with_text("A. Author"));
    doc.push_paragraph(Paragraph::with_text("Abstract: We measure a thing."));
    doc.push_paragraph(Paragraph::with_text("References"));
    doc.push_paragraph(Paragraph::with_text("Smith, J. (2020)."));
    doc
}

#[test]
fn front_matter_scenario_produces_expected_order_and_roles() {
    let mut doc = manuscript();
    Pipeline::new(policy_without_masthead()).format(&mut doc).unwrap();

    let non_empty: Vec<String> = doc
        .paragraphs()
        .map(|p| p.text())
        .filter(|t| !t.trim().is_empty())
        .collect();

    assert!(non_empty[0].starts_with("DOI:"));
    assert!(non_empty[1].starts_with("Paper Type"));
    assert_eq!(non_empty[2], "Some Title");
    assert_eq!(non_empty[3], "A. Author");
    assert!(non_empty[4].starts_with("ABSTRACT:"));
    assert_eq!(non_empty[5], "References");
    assert!(non_empty[6].starts_with("Smith, J."));

    let title = doc.paragraphs().find(|p| p.text() == "Some Title").unwrap();
    assert_eq!(title.runs[0].props.size_pts, Some(14.0));
    assert_eq!(title.runs[0].props.bold, Some(true));

    let author = doc.paragraphs().find(|p| p.text() == "A. Author").unwrap();
    assert_eq!(author.runs[0].props.size_pts, Some(12.0));
    assert_eq!(author.runs[0].props.bold, Some(true));

    // The references boundary suppresses indentation for everything
    // after it.
    let entry = doc
        .paragraphs()
        .find(|p| p.text().starts_with("Smith"))
        .unwrap();
    assert_eq!(entry.props.first_line_indent_twips, Some(0));
}

#[test]
fn second_pass_inserts_nothing() {
    let mut doc = manuscript();
    let pipeline = Pipeline::new(policy_without_masthead());
    pipeline.format(&mut doc).unwrap();

    let doi_lines = |doc: &Document| {
        doc.paragraphs()
            .filter(|p| p.text().to_lowercase().starts_with("doi:"))
            .count()
    };
    let paragraph_count = doc.paragraph_count();
    assert_eq!(doi_lines(&doc), 1);

    pipeline.format(&mut doc).unwrap();
    assert_eq!(doi_lines(&doc), 1);
    assert_eq!(doc.paragraph_count(), paragraph_count);
}

#[test]
fn classification_is_stable_across_calls() {
    let paragraph = Paragraph::styled("Heading 2", "2.1 Experimental Setup");
    let first = classify(&paragraph);
    let second = classify(&paragraph);
    assert_eq!(first, SemanticRole::Heading(2));
    assert_eq!(first, second);
}

#[test]
fn mixed_paragraph_splits_into_text_and_centered_image() {
    let mut doc = Document::new();
    let mut mixed = Paragraph::with_text("Figure 1: apparatus");
    mixed.add_run(Run::drawing(Drawing::new(
        r#"<w:drawing><wp:inline><wp:extent cx="1000000" cy="500000"/></wp:inline></w:drawing>"#,
        Some(Extent {
            cx: 1_000_000,
            cy: 500_000,
        }),
    )));
    doc.push_paragraph(mixed);

    isolate_images(&mut doc, 0.85);

    assert_eq!(doc.paragraph_count(), 2);
    let text = doc.paragraph(0).unwrap();
    let image = doc.paragraph(1).unwrap();
    assert!(!text.has_drawing());
    assert!(image.has_drawing() && !image.has_text());

    let RunContent::Drawing(drawing) = &image.runs[0].content[0] else {
        panic!("expected a drawing run");
    };
    assert_eq!(
        drawing.extent,
        Some(Extent {
            cx: 850_000,
            cy: 425_000
        })
    );
    assert!(drawing.xml.contains(r#"cx="850000""#));
}

#[test]
fn empty_document_comes_out_valid() {
    let mut doc = Document::new();
    Pipeline::new(policy_without_masthead()).format(&mut doc).unwrap();

    assert!(doc.paragraph_count() >= 1);
    let section = doc.sections.last().unwrap();
    assert_eq!(section.page.margin_left_twips, cm_to_twips(2.54));
    assert_eq!(section.columns.count, 1);
    assert!(section.line_numbering.is_some());
}

#[test]
fn tables_rescale_to_usable_width() {
    use redocx::model::Table;

    let policy = policy_without_masthead();
    let usable = policy.usable_width_twips();

    let mut doc = manuscript();
    doc.push_table(Table::from_texts(&[&["a", "b", "c"]], vec![2, 3, 5]));
    Pipeline::new(policy).format(&mut doc).unwrap();

    let table = doc.tables().next().unwrap();
    assert_eq!(table.width_twips, Some(usable));
    assert_eq!(table.total_grid_width(), usable);
    assert!(!table.autofit);

    // width_i / usable tracks original_i / 10 within rounding.
    for (width, original) in table.grid.iter().zip([2i64, 3, 5]) {
        let expected = usable * original / 10;
        assert!((width - expected).abs() <= 1, "{} vs {}", width, expected);
    }
}

#[test]
fn doi_strictness_is_a_policy_choice() {
    let build = || {
        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::with_text("DOI 10.1000/unqualified"));
        doc.push_paragraph(Paragraph::with_text("A Title"));
        doc.push_paragraph(Paragraph::with_text("A. Author"));
        doc
    };

    // Strict: the colon-less line is not a DOI, a placeholder goes in.
    let mut strict_policy = policy_without_masthead();
    strict_policy.doi_match = DoiMatch::StrictPrefix;
    let mut doc = build();
    Pipeline::new(strict_policy).format(&mut doc).unwrap();
    assert!(doc.paragraphs().any(|p| p.text().starts_with("DOI: ___")));

    // Loose: the existing line counts, nothing is inserted.
    let mut loose_policy = policy_without_masthead();
    loose_policy.doi_match = DoiMatch::BareSubstring;
    let mut doc = build();
    Pipeline::new(loose_policy).format(&mut doc).unwrap();
    assert!(!doc.paragraphs().any(|p| p.text().starts_with("DOI: ___")));
}

#[test]
fn references_case_sensitivity_is_a_policy_choice() {
    let build = || {
        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::with_text("DOI: 10.1/x"));
        doc.push_paragraph(Paragraph::with_text("Paper Type (Review)"));
        doc.push_paragraph(Paragraph::with_text("A Title"));
        doc.push_paragraph(Paragraph::with_text("A. Author"));
        doc.push_paragraph(Paragraph::styled("Heading 1", "References"));
        doc.push_paragraph(Paragraph::with_text("smith, j. (2020). a paper."));
        doc
    };
    let indent = |doc: &Document| {
        doc.paragraphs()
            .find(|p| p.text().starts_with("smith"))
            .unwrap()
            .props
            .first_line_indent_twips
    };

    // Any-case: "References" is the boundary, no indent afterwards.
    let mut any_case = policy_without_masthead();
    any_case.references_match = ReferencesMatch::AnyCase;
    let mut doc = build();
    Pipeline::new(any_case).format(&mut doc).unwrap();
    assert_eq!(indent(&doc), Some(0));

    // Exact-case: capital "References" is not recognized, so the entry
    // after the heading still gets the first-line indent.
    let mut exact_case = policy_without_masthead();
    exact_case.references_match = ReferencesMatch::ExactCase;
    let mut doc = build();
    Pipeline::new(exact_case).format(&mut doc).unwrap();
    assert_eq!(indent(&doc), Some(cm_to_twips(0.5)));
}

#[test]
fn formatting_leaves_blank_paragraphs_alone() {
    let mut doc = Document::new();
    doc.push_paragraph(Paragraph::with_text("DOI: 10.1/x"));
    doc.push_paragraph(Paragraph::with_text("Paper Type (Review)"));
    doc.push_paragraph(Paragraph::with_text("A Title"));
    let mut blank = Paragraph::new();
    blank.props.space_after_pts = Some(12.0);
    doc.push_paragraph(blank);
    doc.push_paragraph(Paragraph::with_text("body text"));

    Pipeline::new(policy_without_masthead()).format(&mut doc).unwrap();

    // The original blank keeps its input spacing; only inserted
    // spacers carry the standard 6pt.
    assert!(doc
        .paragraphs()
        .filter(|p| p.is_blank())
        .any(|p| p.props.space_after_pts == Some(12.0)));
}
