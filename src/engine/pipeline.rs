//! The orchestrator: one fixed pass sequence over one document.

use super::emphasis;
use super::formatting::apply_formatting;
use super::front_matter::{self, FrontMatter};
use super::layout;
use super::policy::StylePolicy;
use super::role::{classify, SemanticRole};
use super::structure;
use super::tables;
use crate::error::Result;
use crate::model::Document;

/// The section-classification-and-reflow pipeline.
///
/// Stateless between documents: every call to [`Pipeline::format`]
/// derives everything from the document it is given and the policy it
/// was built with.
#[derive(Debug, Clone)]
pub struct Pipeline {
    policy: StylePolicy,
}

impl Pipeline {
    /// Create a pipeline for a style policy.
    pub fn new(policy: StylePolicy) -> Self {
        Self { policy }
    }

    /// The active policy.
    pub fn policy(&self) -> &StylePolicy {
        &self.policy
    }

    /// Run the full reflow sequence over a document, in place.
    ///
    /// The stage order is fixed; later stages (image isolation, the
    /// emphasis pass) depend on the paragraph set settled by earlier
    /// ones.
    pub fn format(&self, document: &mut Document) -> Result<()> {
        document.ensure_non_empty();

        log::debug!("resolving front matter");
        let front = structure::insert_missing_front_matter(document, &self.policy);
        self.format_title_and_authors(document, &front);

        layout::apply_column_policy(document, &self.policy);

        log::debug!("classifying {} paragraphs", document.paragraph_count());
        self.format_body(document, &front);

        structure::normalize_inline_spacing(document);
        structure::isolate_images(document, self.policy.image_scale);

        log::debug!("applying layout for {} sections", document.sections.len());
        layout::apply_page_geometry(document, &self.policy);
        layout::apply_numbering(document, &self.policy);
        layout::apply_headers_footers(document, &self.policy)?;

        emphasis::emphasize_front_matter_terms(document);
        tables::normalize_tables(document, self.policy.usable_width_twips());
        Ok(())
    }

    fn format_title_and_authors(&self, document: &mut Document, front: &FrontMatter) {
        if let Some(index) = front.title {
            if let Some(paragraph) = document.paragraph_mut(index) {
                apply_formatting(paragraph, &self.policy.roles.title);
                if self.policy.title_borders {
                    paragraph.props.border_top = true;
                    paragraph.props.border_bottom = true;
                }
            }
        }
        if let Some(index) = front.authors {
            if let Some(paragraph) = document.paragraph_mut(index) {
                apply_formatting(paragraph, &self.policy.roles.author);
            }
        }
    }

    /// Role-driven pass over every paragraph not already handled,
    /// applying heading-relative indentation along the way.
    fn format_body(&self, document: &mut Document, front: &FrontMatter) {
        let mut in_references = false;
        let mut previous_role: Option<SemanticRole> = None;
        let count = document.paragraph_count();

        for i in 0..count {
            if Some(i) == front.title {
                previous_role = Some(SemanticRole::Title);
                continue;
            }
            if Some(i) == front.authors {
                previous_role = Some(SemanticRole::Author);
                continue;
            }

            let (text, role) = {
                let paragraph = document.paragraph(i).expect("index within count");
                (paragraph.text(), classify(paragraph))
            };
            let trimmed = text.trim().to_string();

            // Front-matter lines are index-bounded: a stray "doi:"
            // deep in the body is body text, not a DOI line.
            if front_matter::is_doi_line(&trimmed, self.policy.doi_match) && i <= 1 {
                if let Some(paragraph) = document.paragraph_mut(i) {
                    apply_formatting(paragraph, &self.policy.roles.doi_number);
                }
                previous_role = Some(SemanticRole::DoiNumber);
                continue;
            }
            if front_matter::is_paper_type_line(&trimmed) && i <= 3 {
                if let Some(paragraph) = document.paragraph_mut(i) {
                    apply_formatting(paragraph, &self.policy.roles.article_type);
                }
                previous_role = Some(SemanticRole::ArticleType);
                continue;
            }

            // Blank paragraphs keep their input spacing untouched.
            if trimmed.is_empty() {
                previous_role = Some(role);
                continue;
            }

            let spec = self.policy.roles.for_role(role);
            if let Some(paragraph) = document.paragraph_mut(i) {
                apply_formatting(paragraph, spec);
            }

            if self.policy.references_match.matches(&trimmed) {
                log::debug!("references boundary at paragraph {}", i);
                in_references = true;
                previous_role = Some(role);
                continue;
            }

            if !in_references
                && previous_role.map(|r| r.is_heading()).unwrap_or(false)
                && !role.is_heading()
            {
                if let Some(paragraph) = document.paragraph_mut(i) {
                    if structure::should_indent_after_heading(paragraph) {
                        paragraph.props.first_line_indent_twips =
                            Some(self.policy.first_line_indent_twips);
                    }
                }
            }
            previous_role = Some(role);
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(StylePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{cm_to_twips, Paragraph};

    fn pipeline_without_masthead() -> Pipeline {
        let mut policy = StylePolicy::tech_science();
        policy.masthead = None;
        Pipeline::new(policy)
    }

    #[test]
    fn test_empty_document_does_not_fail() {
        let mut doc = Document::new();
        pipeline_without_masthead().format(&mut doc).unwrap();
        assert!(doc.paragraph_count() >= 1);
        assert_eq!(
            doc.sections[0].page.margin_left_twips,
            cm_to_twips(2.54)
        );
    }

    #[test]
    fn test_indentation_after_heading() {
        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::with_text("DOI: 10.1/x"));
        doc.push_paragraph(Paragraph::with_text("Paper Type (Review)"));
        doc.push_paragraph(Paragraph::with_text("Title Here"));
        doc.push_paragraph(Paragraph::with_text("A. Author"));
        doc.push_paragraph(Paragraph::styled("Heading 1", "Introduction"));
        doc.push_paragraph(Paragraph::with_text("the opening paragraph"));
        doc.push_paragraph(Paragraph::with_text("a second paragraph"));

        let pipeline = pipeline_without_masthead();
        pipeline.format(&mut doc).unwrap();

        let indent = cm_to_twips(0.5);
        let after_heading = doc
            .paragraphs()
            .find(|p| p.text() == "the opening paragraph")
            .unwrap();
        assert_eq!(after_heading.props.first_line_indent_twips, Some(indent));

        // Only the paragraph directly after the heading is indented.
        let second = doc
            .paragraphs()
            .find(|p| p.text() == "a second paragraph")
            .unwrap();
        assert_eq!(second.props.first_line_indent_twips, Some(0));
    }

    #[test]
    fn test_references_boundary_stops_indentation() {
        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::with_text("DOI: 10.1/x"));
        doc.push_paragraph(Paragraph::with_text("Paper Type (Review)"));
        doc.push_paragraph(Paragraph::with_text("Title Here"));
        doc.push_paragraph(Paragraph::with_text("A. Author"));
        doc.push_paragraph(Paragraph::styled("Heading 1", "References"));
        doc.push_paragraph(Paragraph::with_text("smith, j. (2020). a paper."));

        pipeline_without_masthead().format(&mut doc).unwrap();

        let entry = doc
            .paragraphs()
            .find(|p| p.text().starts_with("smith"))
            .unwrap();
        assert_eq!(entry.props.first_line_indent_twips, Some(0));
    }

    #[test]
    fn test_pipeline_is_idempotent_on_structure() {
        let mut doc = Document::from_texts(["Some Title", "A. Author", "Abstract: text"]);
        let pipeline = pipeline_without_masthead();
        pipeline.format(&mut doc).unwrap();
        let count = doc.paragraph_count();
        pipeline.format(&mut doc).unwrap();
        assert_eq!(doc.paragraph_count(), count);
    }

    #[test]
    fn test_title_borders_for_smart_city() {
        let mut policy = StylePolicy::smart_city();
        policy.masthead = None;
        let mut doc = Document::from_texts(["City Title", "A. Author"]);
        Pipeline::new(policy).format(&mut doc).unwrap();

        let title = doc
            .paragraphs()
            .find(|p| p.text() == "City Title")
            .unwrap();
        assert!(title.props.border_top);
        assert!(title.props.border_bottom);
    }
}
