//! Front-matter location: title, authors, abstract, DOI, paper type.

use super::policy::DoiMatch;
use crate::model::Document;

/// Prefixes that disqualify a paragraph from being the title or the
/// author list.
const NON_TITLE_PREFIXES: &[&str] = &["doi", "paper type", "articletype", "abstract"];

/// Derived front-matter positions, all in the full paragraph index
/// space (blank paragraphs included, tables excluded).
///
/// Computed once per document and recomputed after any structural
/// insertion; never mix these indices with positions into a filtered
/// non-empty list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontMatter {
    /// Index of the DOI line, if present
    pub doi: Option<usize>,

    /// Index of the paper-type line, if present
    pub paper_type: Option<usize>,

    /// Index of the title paragraph
    pub title: Option<usize>,

    /// Index of the author-list paragraph
    pub authors: Option<usize>,

    /// Index of the paragraph opening the abstract
    pub abstract_start: Option<usize>,

    /// Whether a DOI line exists under the active match policy
    pub has_doi: bool,

    /// Whether a paper-type line exists
    pub has_paper_type: bool,
}

/// Whether a trimmed, lower-cased text is a DOI line under `policy`.
pub fn is_doi_line(text: &str, policy: DoiMatch) -> bool {
    let lower = text.trim().to_lowercase();
    match policy {
        DoiMatch::StrictPrefix => lower.starts_with("doi:") && lower.len() > 4,
        DoiMatch::BareSubstring => lower.starts_with("doi"),
    }
}

/// Whether a trimmed, lower-cased text is a paper-type line.
pub fn is_paper_type_line(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    lower.starts_with("paper type") || lower.starts_with("articletype")
}

/// Scan the paragraph sequence once and derive front-matter positions.
///
/// Title is the first non-empty paragraph whose text does not start
/// with any of the DOI / paper-type / abstract prefixes; authors is the
/// next such paragraph after it. The scan is content-based only, so it
/// stays correct on documents whose styles carry no front-matter names.
pub fn locate(document: &Document, doi_match: DoiMatch) -> FrontMatter {
    let mut front = FrontMatter::default();

    for (i, paragraph) in document.paragraphs().enumerate() {
        let text = paragraph.text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        let lower = trimmed.to_lowercase();

        if front.doi.is_none() && is_doi_line(trimmed, doi_match) {
            front.doi = Some(i);
            front.has_doi = true;
        }
        if front.paper_type.is_none() && is_paper_type_line(trimmed) {
            front.paper_type = Some(i);
            front.has_paper_type = true;
        }
        if front.abstract_start.is_none() && lower.starts_with("abstract") {
            front.abstract_start = Some(i);
        }

        let disqualified = NON_TITLE_PREFIXES.iter().any(|p| lower.starts_with(p));
        if !disqualified {
            if front.title.is_none() {
                front.title = Some(i);
            } else if front.authors.is_none() && Some(i) != front.title {
                front.authors = Some(i);
            }
        }
    }

    front
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_basic_manuscript() {
        let doc = Document::from_texts([
            "DOI: 10.1000/xyz",
            "",
            "Paper Type (Research Article)",
            "A Study of Things",
            "A. Author, B. Author",
            "Abstract: We study things.",
        ]);
        let front = locate(&doc, DoiMatch::StrictPrefix);
        assert!(front.has_doi);
        assert!(front.has_paper_type);
        assert_eq!(front.doi, Some(0));
        assert_eq!(front.paper_type, Some(2));
        assert_eq!(front.title, Some(3));
        assert_eq!(front.authors, Some(4));
        assert_eq!(front.abstract_start, Some(5));
    }

    #[test]
    fn test_indices_are_full_list_positions() {
        // Blank paragraphs count toward indices.
        let doc = Document::from_texts(["", "", "Some Title", "", "An Author"]);
        let front = locate(&doc, DoiMatch::StrictPrefix);
        assert_eq!(front.title, Some(2));
        assert_eq!(front.authors, Some(4));
    }

    #[test]
    fn test_doi_strict_prefix() {
        assert!(is_doi_line("DOI: 10.1/x", DoiMatch::StrictPrefix));
        assert!(is_doi_line("doi:10.1/x", DoiMatch::StrictPrefix));
        // Bare "doi" without the colon is not enough in strict mode.
        assert!(!is_doi_line("DOI 10.1/x", DoiMatch::StrictPrefix));
        // The colon alone is too short.
        assert!(!is_doi_line("doi:", DoiMatch::StrictPrefix));
    }

    #[test]
    fn test_doi_bare_substring() {
        assert!(is_doi_line("DOI 10.1/x", DoiMatch::BareSubstring));
        assert!(is_doi_line("doi:10.1/x", DoiMatch::BareSubstring));
        assert!(!is_doi_line("The DOI is here", DoiMatch::BareSubstring));
    }

    #[test]
    fn test_strictness_changes_detection() {
        let doc = Document::from_texts(["DOI 10.1000/xyz (unqualified)", "Title"]);
        let strict = locate(&doc, DoiMatch::StrictPrefix);
        assert!(!strict.has_doi);
        // The unqualified line is also not title material: the title
        // exclusion list uses the bare prefix.
        assert_eq!(strict.title, Some(1));

        let loose = locate(&doc, DoiMatch::BareSubstring);
        assert!(loose.has_doi);
        assert_eq!(loose.doi, Some(0));
    }

    #[test]
    fn test_missing_front_matter() {
        let doc = Document::from_texts(["Only a body paragraph."]);
        let front = locate(&doc, DoiMatch::StrictPrefix);
        assert!(!front.has_doi);
        assert!(!front.has_paper_type);
        assert_eq!(front.title, Some(0));
        assert_eq!(front.authors, None);
        assert_eq!(front.abstract_start, None);
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::new();
        let front = locate(&doc, DoiMatch::StrictPrefix);
        assert_eq!(front, FrontMatter::default());
    }
}
